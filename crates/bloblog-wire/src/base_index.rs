use crate::error::WireError;

/// Size in bytes of the base index field at the start of every log.
pub const BASE_INDEX_SIZE: usize = 4;

/// Read the base index from the first 4 bytes of a log.
///
/// The base index is the record index assigned to the first record in
/// the stream; record `i` gets `base_index + i`.
///
/// # Errors
///
/// Returns [`WireError::UnexpectedEof`] if `buf` is shorter than 4 bytes.
pub fn read_base_index(buf: &[u8]) -> Result<u32, WireError> {
    let bytes: [u8; BASE_INDEX_SIZE] = buf
        .get(..BASE_INDEX_SIZE)
        .and_then(|b| b.try_into().ok())
        .ok_or(WireError::UnexpectedEof { offset: buf.len() })?;
    Ok(u32::from_be_bytes(bytes))
}

/// Write a base index field to the provided writer.
///
/// # Errors
///
/// Returns [`WireError::Io`] if the write fails.
pub fn write_base_index(w: &mut impl std::io::Write, base_index: u32) -> Result<(), WireError> {
    w.write_all(&base_index.to_be_bytes())?;
    Ok(())
}
