/// Compute the CRC-32 of a record payload.
///
/// The decoder never verifies checksums — it parses the `crc` field
/// verbatim and hands it to the caller. This helper exists for the
/// write side of the format (fixture builders, benches) and for callers
/// that choose to verify, such as `bloblog inspect --verify`.
#[must_use]
pub fn crc32(payload: &[u8]) -> u32 {
    crc32fast::hash(payload)
}
