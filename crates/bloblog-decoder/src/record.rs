use tokio::sync::mpsc;

use crate::payload::PayloadStream;

/// One decoded record, emitted as soon as its header is fully parsed.
///
/// ```text
/// ┌──────────────────────────────────────────────────────┐
/// │ RecordDescriptor                                     │
/// │   index   : u32  ← base_index + position in the log  │
/// │   length  : u32  ← declared payload byte count       │
/// │   crc     : u32  ← stored CRC-32, not verified       │
/// │   payload : PayloadStream ← live, independently read │
/// └──────────────────────────────────────────────────────┘
/// ```
///
/// The descriptor always arrives before any of its payload bytes are
/// delivered downstream, so a consumer can route or skip the payload
/// based on the header alone.
pub struct RecordDescriptor {
    /// Record index: `base_index` plus the record's 0-based position.
    pub index: u32,

    /// Declared payload length in bytes. Always greater than zero.
    pub length: u32,

    /// CRC-32 field as stored in the log. Verifying it against the
    /// payload bytes is the caller's choice.
    pub crc: u32,

    /// The record's payload, streamed at the consumer's pace.
    pub payload: PayloadStream,
}

/// The ordered sequence of record descriptors for one decode session.
///
/// Descriptors arrive in strictly increasing index order with no gaps,
/// starting at the log's base index. The stream ends when the session
/// finishes, fails, or is dropped; errors are reported by the feeding
/// side ([`Decoder::feed`](crate::Decoder::feed) /
/// [`Decoder::finish`](crate::Decoder::finish)), not here.
///
/// Dropping the `RecordStream` cancels the session: the next `feed`
/// that needs to emit a descriptor fails with
/// [`DecodeError::Cancelled`](crate::DecodeError::Cancelled).
pub struct RecordStream {
    rx: mpsc::Receiver<RecordDescriptor>,
}

impl RecordStream {
    pub(crate) fn new(rx: mpsc::Receiver<RecordDescriptor>) -> Self {
        Self { rx }
    }

    /// Receive the next record descriptor, or `None` once the session
    /// has ended and all emitted descriptors have been consumed.
    pub async fn next(&mut self) -> Option<RecordDescriptor> {
        self.rx.recv().await
    }
}
