#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Input ended before a complete fixed-width field could be read.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// A record's length field decoded to zero. The wire format has no
    /// empty records; a zero length is always corruption.
    #[error("record length field is zero")]
    ZeroLength,

    /// I/O error during read or write.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
