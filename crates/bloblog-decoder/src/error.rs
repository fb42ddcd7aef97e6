/// Errors that can end a decode session.
///
/// Only two conditions are detectable from the wire itself — a zero
/// length field and a log that ends mid-record. Both are fatal: the
/// session stops consuming input, and no descriptor is emitted for the
/// offending record. Per-record streams that already completed remain
/// valid for their consumers.
///
/// ```text
///   DecodeError
///   ├── ZeroLength        ← length field decoded to 0 (corruption)
///   ├── IncompleteRecord  ← input ended mid-header or mid-payload
///   ├── Cancelled         ← descriptor consumer went away
///   └── Io(std::io::Error)← from the byte source driving loop
/// ```
///
/// Checksum mismatches are deliberately absent: the `crc` field is
/// parsed verbatim and handed to the caller unverified.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A record's declared length field decoded to 0.
    ///
    /// The wire format has no empty records, so a zero length can only
    /// mean corruption. Raised as soon as the 4-byte length field is
    /// complete; no descriptor or payload stream exists for the record.
    #[error("zero-length record at index {index}")]
    ZeroLength { index: u32 },

    /// End of input reached while a record was only partially received.
    ///
    /// `missing_bytes` counts undelivered payload bytes; it is 0 when
    /// the gap is inside the 8-byte header.
    #[error("incomplete record at index {index}: {missing_bytes} payload bytes missing")]
    IncompleteRecord { index: u32, missing_bytes: u32 },

    /// The [`RecordStream`](crate::RecordStream) was dropped while the
    /// session still had descriptors to emit.
    ///
    /// With nobody to receive descriptors the session cannot make
    /// progress, so feeding more input reports this instead of silently
    /// discarding records.
    #[error("record consumer dropped before the decode session finished")]
    Cancelled,

    /// An I/O error from the byte source (reader-driving loop only).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Error yielded by a [`PayloadStream`](crate::PayloadStream) whose
/// decode session went away before delivering the full payload.
///
/// This is how an aborted or failed session releases a partially-filled
/// stream: the consumer is woken, receives `Interrupted` exactly once,
/// and then end-of-stream. A stream that already received all `length`
/// bytes is unaffected by the session ending.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    /// The stream closed with payload bytes still undelivered.
    #[error("payload stream closed with {missing_bytes} bytes undelivered")]
    Interrupted { missing_bytes: u32 },
}
