//! Raw binary persistence.
//!
//! Values are written with bincode's fixed-width little-endian encoding, so a
//! [`Vector`](crate::core::Vector) is `[u64 len][f64; len]` and a
//! [`Matrix`](crate::core::Matrix) is `[u64 rows][u64 cols][f64; rows * cols]`
//! with no padding.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};

use crate::error::Result;

pub fn write<W: Write, T: Serialize + ?Sized>(writer: W, value: &T) -> Result<()> {
    bincode::serialize_into(writer, value)?;
    Ok(())
}

pub fn read<R: Read, T: DeserializeOwned>(reader: R) -> Result<T> {
    Ok(bincode::deserialize_from(reader)?)
}
