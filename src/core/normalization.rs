use crate::core::vector::Vector;

pub trait Normalization {
    fn to_unity(&mut self, lb: f64, ub: f64);
    fn from_unity(&mut self, lb: f64, ub: f64);
}

impl Normalization for Vector {
    fn to_unity(&mut self, lb: f64, ub: f64) {
        let range = ub - lb;

        // If the range is zero or nearly zero, all values become 0.0
        if range.abs() < f64::EPSILON {
            self.apply(|_| 0.0);
        } else {
            self.apply(|x| (x - lb) / range);
        }
    }

    fn from_unity(&mut self, lb: f64, ub: f64) {
        let range = ub - lb;

        // If the range is zero or nearly zero, all values become lb
        if range.abs() < f64::EPSILON {
            self.apply(|_| lb);
        } else {
            self.apply(|x| x * range + lb);
        }
    }
}
