#![warn(clippy::pedantic)]

//! Test-support library for the bloblog workspace.
//!
//! Holds the [`LogBuilder`] fixture builder used by the integration
//! tests and benches. Building log bytes is deliberately not part of
//! the production crates — the system decodes logs, it does not write
//! them — so the write side lives here, on top of the wire-level
//! helpers.

use bloblog_wire::base_index::write_base_index;
use bloblog_wire::record::write_record;

/// Builds the byte image of a blob log for tests and benches.
///
/// ```rust
/// use bloblog_tests::LogBuilder;
///
/// let bytes = LogBuilder::new(1001).record(b"a").record(b"b").build();
/// assert_eq!(&bytes[..4], &[0x00, 0x00, 0x03, 0xE9]);
/// ```
pub struct LogBuilder {
    buf: Vec<u8>,
}

impl LogBuilder {
    /// Start a log with the given base index.
    #[must_use]
    pub fn new(base_index: u32) -> Self {
        let mut buf = Vec::new();
        write_base_index(&mut buf, base_index).expect("vec write cannot fail");
        Self { buf }
    }

    /// Append one record with a correct length field and CRC-32.
    ///
    /// # Panics
    ///
    /// Panics on an empty payload — the wire format cannot express one.
    #[must_use]
    pub fn record(mut self, payload: &[u8]) -> Self {
        write_record(&mut self.buf, payload).expect("vec write cannot fail");
        self
    }

    /// Append raw bytes verbatim, for corrupt or truncated fixtures.
    #[must_use]
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Finish and return the log bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

/// A fully-drained record, for asserting on decode output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedRecord {
    pub index: u32,
    pub length: u32,
    pub crc: u32,
    pub payload: Vec<u8>,
}

/// Decode a complete log image, feeding it in `chunk_size` pieces, and
/// drain every record. The feeder and the consumer run concurrently so
/// bounded channels never deadlock regardless of log size.
///
/// # Errors
///
/// Returns the session's fatal error, if any. Records completed before
/// the failure are lost here (the consumer task is detached); tests
/// that care about partial output drive the decoder by hand.
///
/// # Panics
///
/// Panics if the consumer task itself fails.
pub async fn decode_all(
    bytes: &[u8],
    chunk_size: usize,
) -> Result<Vec<DecodedRecord>, bloblog_decoder::DecodeError> {
    use bloblog_decoder::{Decoder, DecoderConfig};

    let (mut decoder, mut records) = Decoder::new(DecoderConfig::default());

    let consumer = tokio::spawn(async move {
        let mut out = Vec::new();
        while let Some(record) = records.next().await {
            let (index, length, crc) = (record.index, record.length, record.crc);
            let payload = record.payload.read_to_vec().await?;
            out.push(DecodedRecord {
                index,
                length,
                crc,
                payload,
            });
        }
        Ok::<_, bloblog_decoder::PayloadError>(out)
    });

    for chunk in bytes.chunks(chunk_size.max(1)) {
        decoder.feed(chunk).await?;
    }
    decoder.finish()?;

    Ok(consumer
        .await
        .expect("consumer task panicked")
        .expect("payload stream interrupted on a valid log"))
}
