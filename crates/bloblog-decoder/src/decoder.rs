use bloblog_wire::accum::U32Accumulator;
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::DecodeError;
use crate::payload::PayloadStream;
use crate::record::{RecordDescriptor, RecordStream};

/// Channel capacities for one decode session.
///
/// Both channels are bounded on purpose: a full channel stalls
/// [`Decoder::feed`], which stalls whoever is reading the byte source —
/// that is the backpressure path from a slow consumer back to the log.
#[derive(Clone, Copy, Debug)]
pub struct DecoderConfig {
    /// Capacity of the descriptor channel behind [`RecordStream`].
    pub record_capacity: usize,

    /// Capacity of each per-record payload channel.
    pub payload_capacity: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            record_capacity: 8,
            payload_capacity: 16,
        }
    }
}

/// Internal state machine for one decode session.
///
/// ```text
///   ReadBaseIndex → Idle → ReadLength → ReadCrc → ReadPayload
///                     ↑                               │
///                     └───────── payload done ────────┘
/// ```
///
/// `Idle` means the previous record (if any) is fully attributed and no
/// byte of the next record has arrived. Exactly one record is in flight
/// at a time; its index is assigned when `Idle` hands off to
/// `ReadLength` and never changes. `Failed` is terminal — the session
/// consumes no further input after a fatal error.
enum DecodeState {
    ReadBaseIndex { accum: U32Accumulator },
    Idle,
    ReadLength { index: u32, accum: U32Accumulator },
    ReadCrc { index: u32, length: u32, accum: U32Accumulator },
    ReadPayload {
        index: u32,
        remaining: u32,
        /// Write side of the record's payload stream. `None` once the
        /// consumer has dropped the read side — remaining payload bytes
        /// for this record are then discarded, not delivered.
        sink: Option<mpsc::Sender<Bytes>>,
    },
    Failed(FailKind),
}

/// Why the session stopped. Kept so repeat `feed` calls after a fatal
/// error report the same condition instead of consuming input.
#[derive(Clone, Copy)]
enum FailKind {
    ZeroLength { index: u32 },
    Cancelled,
}

impl FailKind {
    fn to_error(self) -> DecodeError {
        match self {
            Self::ZeroLength { index } => DecodeError::ZeroLength { index },
            Self::Cancelled => DecodeError::Cancelled,
        }
    }
}

/// Streaming decoder for an append-only blob log.
///
/// One `Decoder` is one decode session: it consumes the log's bytes in
/// chunks of any size and produces, on the paired [`RecordStream`], a
/// descriptor per record as soon as that record's header is complete.
/// Payload bytes flow separately through each descriptor's
/// [`PayloadStream`], so a consumer can read record N's payload at its
/// own pace while the decoder frames record N+1.
///
/// All session state lives in this struct — a fresh instance per
/// decode, nothing shared, nothing global.
///
/// # Example
///
/// ```rust,no_run
/// use bloblog_decoder::{Decoder, DecoderConfig};
///
/// async fn decode(chunks: Vec<Vec<u8>>) {
///     let (mut decoder, mut records) = Decoder::new(DecoderConfig::default());
///
///     let feeder = tokio::spawn(async move {
///         for chunk in chunks {
///             decoder.feed(&chunk).await?;
///         }
///         decoder.finish()
///     });
///
///     while let Some(record) = records.next().await {
///         let payload = record.payload.read_to_vec().await.unwrap();
///         println!("record {}: {} bytes", record.index, payload.len());
///     }
///     feeder.await.unwrap().unwrap();
/// }
/// ```
pub struct Decoder {
    /// Valid once the state machine has left `ReadBaseIndex`.
    base_index: u32,
    /// Descriptors emitted so far; the next record's index is
    /// `base_index + emitted`.
    emitted: u32,
    state: DecodeState,
    records: mpsc::Sender<RecordDescriptor>,
    payload_capacity: usize,
}

impl Decoder {
    /// Create a decode session and the record stream it feeds.
    #[must_use]
    pub fn new(config: DecoderConfig) -> (Self, RecordStream) {
        let (tx, rx) = mpsc::channel(config.record_capacity);
        let decoder = Self {
            base_index: 0,
            emitted: 0,
            state: DecodeState::ReadBaseIndex {
                accum: U32Accumulator::new(),
            },
            records: tx,
            payload_capacity: config.payload_capacity,
        };
        (decoder, RecordStream::new(rx))
    }

    /// Process one chunk of log bytes.
    ///
    /// Chunks may split anywhere — mid-field, mid-payload, one byte at
    /// a time. The call resolves only once every descriptor and payload
    /// fragment produced from this chunk has been accepted by its
    /// bounded channel, so a caller that awaits `feed` before reading
    /// more input inherits the consumers' backpressure.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::ZeroLength`] if a record's length field decodes
    ///   to 0. Fatal: the session consumes no further input, and every
    ///   later `feed` returns the same error.
    /// - [`DecodeError::Cancelled`] if the [`RecordStream`] was dropped
    ///   while a descriptor was pending. Also fatal.
    pub async fn feed(&mut self, mut chunk: &[u8]) -> Result<(), DecodeError> {
        if let DecodeState::Failed(kind) = &self.state {
            return Err(kind.to_error());
        }

        while !chunk.is_empty() {
            match &mut self.state {
                DecodeState::ReadBaseIndex { accum } => {
                    let (consumed, value) = accum.fill_from(chunk);
                    chunk = &chunk[consumed..];
                    if let Some(base) = value {
                        self.base_index = base;
                        self.state = DecodeState::Idle;
                    }
                }

                // A byte is waiting and no record is in flight: start
                // the next record. Consumes nothing itself.
                DecodeState::Idle => {
                    self.state = DecodeState::ReadLength {
                        index: self.base_index.wrapping_add(self.emitted),
                        accum: U32Accumulator::new(),
                    };
                }

                DecodeState::ReadLength { index, accum } => {
                    let index = *index;
                    let (consumed, value) = accum.fill_from(chunk);
                    chunk = &chunk[consumed..];
                    if let Some(length) = value {
                        if length == 0 {
                            self.state = DecodeState::Failed(FailKind::ZeroLength { index });
                            return Err(DecodeError::ZeroLength { index });
                        }
                        self.state = DecodeState::ReadCrc {
                            index,
                            length,
                            accum: U32Accumulator::new(),
                        };
                    }
                }

                DecodeState::ReadCrc { index, length, accum } => {
                    let (index, length) = (*index, *length);
                    let (consumed, value) = accum.fill_from(chunk);
                    chunk = &chunk[consumed..];
                    if let Some(crc) = value {
                        // Header complete: emit the descriptor before
                        // any payload byte goes downstream.
                        let (tx, rx) = mpsc::channel(self.payload_capacity);
                        let descriptor = RecordDescriptor {
                            index,
                            length,
                            crc,
                            payload: PayloadStream::new(rx, length),
                        };
                        if self.records.send(descriptor).await.is_err() {
                            self.state = DecodeState::Failed(FailKind::Cancelled);
                            return Err(DecodeError::Cancelled);
                        }
                        self.emitted = self.emitted.wrapping_add(1);
                        self.state = DecodeState::ReadPayload {
                            index,
                            remaining: length,
                            sink: Some(tx),
                        };
                    }
                }

                DecodeState::ReadPayload { remaining, sink, .. } => {
                    #[allow(clippy::cast_possible_truncation)]
                    let take = (*remaining as usize).min(chunk.len());

                    if let Some(tx) = sink {
                        let fragment = Bytes::copy_from_slice(&chunk[..take]);
                        if tx.send(fragment).await.is_err() {
                            // Consumer dropped the payload stream; skip
                            // the rest of this record's payload.
                            *sink = None;
                        }
                    }
                    chunk = &chunk[take..];

                    // Cast is in range: take <= remaining.
                    #[allow(clippy::cast_possible_truncation)]
                    {
                        *remaining -= take as u32;
                    }
                    if *remaining == 0 {
                        // Leaving this state drops the sender, which
                        // closes the payload stream after the queued
                        // fragments drain — end-of-data reaches the
                        // consumer only after the last byte.
                        self.state = DecodeState::Idle;
                    }
                }

                DecodeState::Failed(kind) => return Err(kind.to_error()),
            }
        }

        Ok(())
    }

    /// End-of-input check. Call when the byte source has no more bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::IncompleteRecord`] if a record was still
    /// in flight: `missing_bytes` is the undelivered payload count, or
    /// 0 when the gap is inside the header. An interrupted payload
    /// stream additionally yields
    /// [`PayloadError::Interrupted`](crate::PayloadError::Interrupted)
    /// to its consumer when this decoder is dropped.
    ///
    /// Input that ends inside the 4-byte base index field is not this
    /// decoder's error — no record existed yet, and judging the byte
    /// source's framing is the caller's concern.
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.state {
            DecodeState::ReadBaseIndex { .. } | DecodeState::Idle => Ok(()),
            DecodeState::ReadLength { index, .. } | DecodeState::ReadCrc { index, .. } => {
                Err(DecodeError::IncompleteRecord {
                    index,
                    missing_bytes: 0,
                })
            }
            DecodeState::ReadPayload { index, remaining, .. } => {
                Err(DecodeError::IncompleteRecord {
                    index,
                    missing_bytes: remaining,
                })
            }
            DecodeState::Failed(kind) => Err(kind.to_error()),
        }
    }

    /// Abort the session.
    ///
    /// Dropping the decoder has the same effect; the method exists to
    /// make cancellation explicit at call sites. Every open payload
    /// stream wakes with
    /// [`PayloadError::Interrupted`](crate::PayloadError::Interrupted)
    /// rather than hanging, and the [`RecordStream`] ends. No
    /// descriptor is emitted for a record whose header was incomplete.
    pub fn abort(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal wire image: base index, then (length, crc, payload) per
    /// record with correct lengths and CRC-32 values.
    fn log_bytes(base_index: u32, payloads: &[&[u8]]) -> Vec<u8> {
        let mut buf = Vec::new();
        bloblog_wire::base_index::write_base_index(&mut buf, base_index).unwrap();
        for payload in payloads {
            bloblog_wire::record::write_record(&mut buf, payload).unwrap();
        }
        buf
    }

    #[tokio::test]
    async fn single_record_single_chunk() {
        let bytes = log_bytes(1001, &[b"this is a test"]);
        let (mut decoder, mut records) = Decoder::new(DecoderConfig::default());

        decoder.feed(&bytes).await.unwrap();

        let record = records.next().await.unwrap();
        assert_eq!(record.index, 1001);
        assert_eq!(record.length, 14);
        assert_eq!(record.crc, bloblog_wire::checksum::crc32(b"this is a test"));
        assert_eq!(record.payload.read_to_vec().await.unwrap(), b"this is a test");

        decoder.finish().unwrap();
    }

    #[tokio::test]
    async fn one_byte_at_a_time() {
        let bytes = log_bytes(7, &[b"a", b"b"]);
        let (mut decoder, mut records) = Decoder::new(DecoderConfig::default());

        for byte in &bytes {
            decoder.feed(std::slice::from_ref(byte)).await.unwrap();
        }
        decoder.finish().unwrap();

        let first = records.next().await.unwrap();
        assert_eq!(first.index, 7);
        assert_eq!(first.payload.read_to_vec().await.unwrap(), b"a");

        let second = records.next().await.unwrap();
        assert_eq!(second.index, 8);
        assert_eq!(second.payload.read_to_vec().await.unwrap(), b"b");

        assert!(records.next().await.is_none());
    }

    #[tokio::test]
    async fn zero_length_fails_with_index() {
        let mut bytes = Vec::new();
        bloblog_wire::base_index::write_base_index(&mut bytes, 1).unwrap();
        // length = 0 (corrupt), followed by junk that must not be read.
        bytes.extend_from_slice(&[0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]);

        let (mut decoder, mut records) = Decoder::new(DecoderConfig::default());
        let err = decoder.feed(&bytes).await.unwrap_err();
        assert!(matches!(err, DecodeError::ZeroLength { index: 1 }));

        // The failure is sticky.
        let err = decoder.feed(b"more").await.unwrap_err();
        assert!(matches!(err, DecodeError::ZeroLength { index: 1 }));

        drop(decoder);
        assert!(records.next().await.is_none());
    }

    #[tokio::test]
    async fn truncated_payload_reports_missing_bytes() {
        let mut bytes = Vec::new();
        bloblog_wire::base_index::write_base_index(&mut bytes, 1).unwrap();
        bloblog_wire::record::RecordHeader::for_payload(b"test")
            .write_to(&mut bytes)
            .unwrap();
        bytes.extend_from_slice(b"tes"); // one byte short

        let (mut decoder, mut records) = Decoder::new(DecoderConfig::default());
        decoder.feed(&bytes).await.unwrap();

        let err = decoder.finish().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::IncompleteRecord {
                index: 1,
                missing_bytes: 1
            }
        ));

        // The descriptor was emitted (header was complete) and its
        // stream ends in the interrupted state.
        let record = records.next().await.unwrap();
        assert_eq!(
            record.payload.read_to_vec().await,
            Err(crate::PayloadError::Interrupted { missing_bytes: 1 })
        );
    }

    #[tokio::test]
    async fn truncated_header_reports_zero_missing() {
        let mut bytes = Vec::new();
        bloblog_wire::base_index::write_base_index(&mut bytes, 5).unwrap();
        bytes.extend_from_slice(&[0x00, 0x00]); // two bytes of the length field

        let (mut decoder, _records) = Decoder::new(DecoderConfig::default());
        decoder.feed(&bytes).await.unwrap();

        let err = decoder.finish().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::IncompleteRecord {
                index: 5,
                missing_bytes: 0
            }
        ));
    }

    #[tokio::test]
    async fn empty_input_finishes_clean() {
        let (decoder, _records) = Decoder::new(DecoderConfig::default());
        decoder.finish().unwrap();
    }

    #[tokio::test]
    async fn partial_base_index_finishes_clean() {
        // Judging a malformed base index is the byte source's concern;
        // no record ever existed, so there is nothing incomplete.
        let (mut decoder, _records) = Decoder::new(DecoderConfig::default());
        decoder.feed(&[0x00, 0x01]).await.unwrap();
        decoder.finish().unwrap();
    }

    #[tokio::test]
    async fn record_boundary_finishes_clean() {
        let bytes = log_bytes(0, &[b"x"]);
        let (mut decoder, mut records) = Decoder::new(DecoderConfig::default());
        decoder.feed(&bytes).await.unwrap();
        decoder.finish().unwrap();

        let record = records.next().await.unwrap();
        assert_eq!(record.payload.read_to_vec().await.unwrap(), b"x");
    }

    #[tokio::test]
    async fn dropped_record_stream_cancels_session() {
        let bytes = log_bytes(0, &[b"a"]);
        let (mut decoder, records) = Decoder::new(DecoderConfig::default());
        drop(records);

        let err = decoder.feed(&bytes).await.unwrap_err();
        assert!(matches!(err, DecodeError::Cancelled));
    }

    #[tokio::test]
    async fn dropped_payload_stream_skips_to_next_record() {
        // Payload capacity 1 so a sender on a dropped channel fails
        // fast; the decoder must discard and keep framing.
        let config = DecoderConfig {
            record_capacity: 8,
            payload_capacity: 1,
        };
        let bytes = log_bytes(40, &[b"discard me", b"keep"]);
        let (mut decoder, mut records) = Decoder::new(config);

        let consumer = tokio::spawn(async move {
            let first = records.next().await.unwrap();
            drop(first.payload);
            let second = records.next().await.unwrap();
            assert_eq!(second.index, 41);
            second.payload.read_to_vec().await.unwrap()
        });

        decoder.feed(&bytes).await.unwrap();
        decoder.finish().unwrap();
        assert_eq!(consumer.await.unwrap(), b"keep");
    }

    #[tokio::test]
    async fn abort_releases_waiting_consumer() {
        let mut bytes = Vec::new();
        bloblog_wire::base_index::write_base_index(&mut bytes, 9).unwrap();
        bloblog_wire::record::RecordHeader::for_payload(b"abcd")
            .write_to(&mut bytes)
            .unwrap();
        bytes.extend_from_slice(b"ab"); // half the payload

        let (mut decoder, mut records) = Decoder::new(DecoderConfig::default());
        decoder.feed(&bytes).await.unwrap();

        let mut record = records.next().await.unwrap();
        decoder.abort();

        assert_eq!(record.payload.next().await.unwrap().unwrap(), "ab");
        assert_eq!(
            record.payload.next().await,
            Some(Err(crate::PayloadError::Interrupted { missing_bytes: 2 }))
        );
        assert!(records.next().await.is_none());
    }
}
