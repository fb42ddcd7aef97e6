use crate::checksum::crc32;
use crate::error::WireError;

/// Size in bytes of a record header on the wire.
pub const RECORD_HEADER_SIZE: usize = 8;

/// Record header — the 8 bytes preceding every record's payload.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────────┐
/// │ Offset │ Size    │ Description                      │
/// ├────────┼─────────┼──────────────────────────────────┤
/// │ 0x00   │ 4 bytes │ length, u32 BE (must be > 0)     │
/// │ 0x04   │ 4 bytes │ crc, u32 BE (CRC-32 of payload)  │
/// └────────┴─────────┴──────────────────────────────────┘
/// ```
///
/// Length-then-crc is the canonical field order. A historical variant
/// of the format placed crc first; the two are mutually incompatible
/// and carry no version marker, so this crate parses only the
/// canonical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordHeader {
    /// Payload byte count. Never zero in a valid log.
    pub length: u32,

    /// CRC-32 of the payload, stored verbatim and not verified here.
    pub crc: u32,
}

impl RecordHeader {
    /// Build the header for a payload, computing its CRC-32.
    ///
    /// # Panics
    ///
    /// Panics if the payload is empty or longer than `u32::MAX` bytes —
    /// neither is representable on the wire.
    #[must_use]
    pub fn for_payload(payload: &[u8]) -> Self {
        let length = u32::try_from(payload.len()).unwrap_or_else(|_| {
            panic!("payload of {} bytes exceeds the u32 length field", payload.len())
        });
        assert!(length > 0, "the wire format has no zero-length records");
        Self {
            length,
            crc: crc32(payload),
        }
    }

    /// Parse a record header from the first 8 bytes of `buf`.
    ///
    /// # Errors
    ///
    /// - [`WireError::UnexpectedEof`] if `buf` is shorter than 8 bytes.
    /// - [`WireError::ZeroLength`] if the length field decodes to 0.
    pub fn read_from(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < RECORD_HEADER_SIZE {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        }

        let length = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        if length == 0 {
            return Err(WireError::ZeroLength);
        }
        let crc = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]);

        Ok(Self { length, crc })
    }

    /// Write the 8-byte header to the provided writer.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Io`] if the write fails.
    pub fn write_to(&self, w: &mut impl std::io::Write) -> Result<usize, WireError> {
        w.write_all(&self.length.to_be_bytes())?;
        w.write_all(&self.crc.to_be_bytes())?;
        Ok(RECORD_HEADER_SIZE)
    }
}

/// Write a complete record (header + payload) to the provided writer.
///
/// # Returns
///
/// Total number of bytes written.
///
/// # Errors
///
/// Returns [`WireError::Io`] if a write fails.
///
/// # Panics
///
/// Panics if the payload is empty (see [`RecordHeader::for_payload`]).
pub fn write_record(w: &mut impl std::io::Write, payload: &[u8]) -> Result<usize, WireError> {
    let header = RecordHeader::for_payload(payload);
    let mut written = header.write_to(w)?;
    w.write_all(payload)?;
    written += payload.len();
    Ok(written)
}
