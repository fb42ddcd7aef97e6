/// Width in bytes of every fixed field in the wire format (`base_index`,
/// `length`, `crc` are all big-endian u32).
pub const FIELD_SIZE: usize = 4;

/// Incremental accumulator for one big-endian u32 wire field.
///
/// The log is parsed from chunks whose boundaries are arbitrary — a
/// 4-byte field can arrive split across up to four chunks. The
/// accumulator buffers partial field bytes across those boundaries and
/// yields the decoded value once the fourth byte lands.
///
/// # Usage pattern
///
/// ```text
///   let mut accum = U32Accumulator::new();
///   loop per chunk:
///       let (consumed, value) = accum.fill_from(remaining_chunk);
///       advance the chunk cursor by `consumed`;
///       if let Some(v) = value { the field is complete }
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct U32Accumulator {
    bytes: [u8; FIELD_SIZE],
    filled: usize,
}

impl U32Accumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True if no bytes of the field have arrived yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Number of field bytes buffered so far (0–3; the accumulator
    /// resolves and is discarded when the count would reach 4).
    #[must_use]
    pub fn partial_len(&self) -> usize {
        self.filled
    }

    /// Consume bytes from the front of `chunk` until the field is
    /// complete or the chunk is exhausted.
    ///
    /// # Returns
    ///
    /// `(bytes_consumed, value)` — `value` is `Some` exactly when the
    /// fourth field byte was consumed, decoded as big-endian u32.
    pub fn fill_from(&mut self, chunk: &[u8]) -> (usize, Option<u32>) {
        let take = (FIELD_SIZE - self.filled).min(chunk.len());
        self.bytes[self.filled..self.filled + take].copy_from_slice(&chunk[..take]);
        self.filled += take;

        if self.filled == FIELD_SIZE {
            (take, Some(u32::from_be_bytes(self.bytes)))
        } else {
            (take, None)
        }
    }
}
