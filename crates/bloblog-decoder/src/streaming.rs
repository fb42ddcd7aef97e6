use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;

use crate::decoder::{Decoder, DecoderConfig};
use crate::error::DecodeError;
use crate::record::RecordStream;

/// Read size used by [`decode_reader`] when pulling from the source.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Drive a decode session from an async byte source.
///
/// Reads the source in chunks, feeds each chunk to the decoder, and
/// runs the end-of-input check at EOF. The framing makes no assumption
/// about chunk boundaries, so any `AsyncRead` works — a file, a socket,
/// an in-memory cursor.
///
/// Backpressure propagates through this loop: `feed` resolves only once
/// the chunk's descriptors and fragments are queued, so a slow record
/// consumer slows the reads here too.
///
/// # Errors
///
/// - [`DecodeError::Io`] if the source fails.
/// - Any fatal decode error from [`Decoder::feed`] / [`Decoder::finish`].
pub async fn decode_reader<R>(mut reader: R, mut decoder: Decoder) -> Result<(), DecodeError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; DEFAULT_CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return decoder.finish();
        }
        decoder.feed(&buf[..n]).await?;
    }
}

/// Spawn a decode session over an async byte source.
///
/// Convenience wrapper around [`decode_reader`]: creates a session with
/// the default [`DecoderConfig`], spawns the driving loop on the
/// current runtime, and returns the record stream plus the driver's
/// join handle. The handle resolves with the session outcome once the
/// source is exhausted or a fatal error stops the decode.
///
/// ```rust,no_run
/// use bloblog_decoder::spawn_decode_reader;
///
/// async fn count_records(file: tokio::fs::File) -> usize {
///     let (mut records, driver) = spawn_decode_reader(file);
///     let mut count = 0;
///     while let Some(record) = records.next().await {
///         record.payload.read_to_vec().await.unwrap();
///         count += 1;
///     }
///     driver.await.unwrap().unwrap();
///     count
/// }
/// ```
pub fn spawn_decode_reader<R>(reader: R) -> (RecordStream, JoinHandle<Result<(), DecodeError>>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (decoder, records) = Decoder::new(DecoderConfig::default());
    let driver = tokio::spawn(decode_reader(reader, decoder));
    (records, driver)
}
