// Operator plumbing shared by `Vector` and `Matrix`.
//
// The implementing type provides `map`, `apply`, `zip_map` and `zip_apply`;
// the shape check lives in the `zip_*` helpers so every elementwise operator
// panics on mismatched operands.

macro_rules! impl_buffer_ops {
    ($ty:ty) => {
        impl_buffer_ops!(@elementwise $ty, Add, add, AddAssign, add_assign, +);
        impl_buffer_ops!(@elementwise $ty, Sub, sub, SubAssign, sub_assign, -);
        impl_buffer_ops!(@scalar $ty, Add, add, AddAssign, add_assign, +);
        impl_buffer_ops!(@scalar $ty, Sub, sub, SubAssign, sub_assign, -);
        impl_buffer_ops!(@scalar $ty, Mul, mul, MulAssign, mul_assign, *);
        impl_buffer_ops!(@scalar $ty, Div, div, DivAssign, div_assign, /);

        impl std::ops::Neg for &$ty {
            type Output = $ty;
            fn neg(self) -> $ty {
                self.map(|a| -a)
            }
        }

        impl std::ops::Neg for $ty {
            type Output = $ty;
            fn neg(mut self) -> $ty {
                self.apply(|a| -a);
                self
            }
        }
    };

    (@elementwise $ty:ty, $tr:ident, $m:ident, $atr:ident, $am:ident, $op:tt) => {
        impl std::ops::$tr<&$ty> for &$ty {
            type Output = $ty;
            fn $m(self, rhs: &$ty) -> $ty {
                self.zip_map(rhs, stringify!($m), |a, b| a $op b)
            }
        }

        impl std::ops::$tr<&$ty> for $ty {
            type Output = $ty;
            fn $m(mut self, rhs: &$ty) -> $ty {
                self.zip_apply(rhs, stringify!($m), |a, b| a $op b);
                self
            }
        }

        impl std::ops::$tr<$ty> for $ty {
            type Output = $ty;
            fn $m(self, rhs: $ty) -> $ty {
                std::ops::$tr::$m(self, &rhs)
            }
        }

        impl std::ops::$tr<$ty> for &$ty {
            type Output = $ty;
            fn $m(self, rhs: $ty) -> $ty {
                std::ops::$tr::$m(self, &rhs)
            }
        }

        impl std::ops::$atr<&$ty> for $ty {
            fn $am(&mut self, rhs: &$ty) {
                self.zip_apply(rhs, stringify!($am), |a, b| a $op b);
            }
        }

        impl std::ops::$atr<$ty> for $ty {
            fn $am(&mut self, rhs: $ty) {
                std::ops::$atr::$am(self, &rhs);
            }
        }
    };

    (@scalar $ty:ty, $tr:ident, $m:ident, $atr:ident, $am:ident, $op:tt) => {
        impl std::ops::$tr<f64> for &$ty {
            type Output = $ty;
            fn $m(self, rhs: f64) -> $ty {
                self.map(|a| a $op rhs)
            }
        }

        impl std::ops::$tr<f64> for $ty {
            type Output = $ty;
            fn $m(mut self, rhs: f64) -> $ty {
                self.apply(|a| a $op rhs);
                self
            }
        }

        impl std::ops::$tr<&$ty> for f64 {
            type Output = $ty;
            fn $m(self, rhs: &$ty) -> $ty {
                rhs.map(|b| self $op b)
            }
        }

        impl std::ops::$tr<$ty> for f64 {
            type Output = $ty;
            fn $m(self, mut rhs: $ty) -> $ty {
                rhs.apply(|b| self $op b);
                rhs
            }
        }

        impl std::ops::$atr<f64> for $ty {
            fn $am(&mut self, rhs: f64) {
                self.apply(|a| a $op rhs);
            }
        }
    };
}
