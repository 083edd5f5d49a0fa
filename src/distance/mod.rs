//! Travel-time matrices.
//!
//! Provides a dense travel-minute matrix over an ordered point list, with the
//! depot conventionally at index 0 and deliveries at 1..n.

mod matrix;

pub use matrix::TravelMatrix;
