#![warn(clippy::pedantic)]

pub mod accum;
pub mod base_index;
pub mod checksum;
pub mod error;
pub mod record;

pub use error::WireError;
