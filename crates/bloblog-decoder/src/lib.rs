#![warn(clippy::pedantic)]

pub mod decoder;
pub mod error;
pub mod payload;
pub mod record;
pub mod streaming;

pub use decoder::{Decoder, DecoderConfig};
pub use error::{DecodeError, PayloadError};
pub use payload::PayloadStream;
pub use record::{RecordDescriptor, RecordStream};
pub use streaming::{DEFAULT_CHUNK_SIZE, decode_reader, spawn_decode_reader};
