#![doc = include_str!("../README.md")]

pub mod distance;
mod error;
pub mod kdtree;
mod point;

pub use error::{KdIndexError, Result};
pub use point::{KdCoord, KdPoint};
