use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::PayloadError;

/// The readable half of one record's payload.
///
/// The decoder owns the write side: it pushes payload fragments in FIFO
/// order as they are framed and closes the channel once all `length`
/// bytes have been attributed. The consumer reads at its own pace — an
/// unread fragment backlog (up to the channel capacity) stalls the
/// decoder, which is how backpressure propagates from a slow consumer
/// all the way back to the byte source.
///
/// Exactly `length` bytes arrive in total, followed by end-of-stream.
/// If the decode session fails or is dropped first, the stream yields
/// [`PayloadError::Interrupted`] once instead of hanging.
///
/// Dropping a `PayloadStream` early is allowed: the decoder notices the
/// closed channel and discards the rest of that record's payload while
/// continuing to frame subsequent records.
pub struct PayloadStream {
    rx: mpsc::Receiver<Bytes>,
    remaining: u32,
    interrupted: bool,
}

impl PayloadStream {
    pub(crate) fn new(rx: mpsc::Receiver<Bytes>, length: u32) -> Self {
        Self {
            rx,
            remaining: length,
            interrupted: false,
        }
    }

    /// Payload bytes not yet read from this stream.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Receive the next payload fragment.
    ///
    /// Returns `Some(Ok(fragment))` for each fragment in wire order,
    /// `None` once the full payload has been delivered, or
    /// `Some(Err(PayloadError::Interrupted))` exactly once if the
    /// decoder went away mid-payload.
    pub async fn next(&mut self) -> Option<Result<Bytes, PayloadError>> {
        if self.interrupted {
            return None;
        }
        match self.rx.recv().await {
            Some(fragment) => {
                // Fragments never overrun the declared length; the
                // decoder slices them to `remaining` before sending.
                #[allow(clippy::cast_possible_truncation)]
                {
                    self.remaining -= fragment.len() as u32;
                }
                Some(Ok(fragment))
            }
            None if self.remaining > 0 => {
                self.interrupted = true;
                Some(Err(PayloadError::Interrupted {
                    missing_bytes: self.remaining,
                }))
            }
            None => None,
        }
    }

    /// Drain the stream into a single buffer.
    ///
    /// Convenience for consumers that want the whole payload in memory
    /// anyway — tests, the CLI, small records.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Interrupted`] if the decoder went away
    /// before the full payload arrived.
    pub async fn read_to_vec(mut self) -> Result<Vec<u8>, PayloadError> {
        let mut out = Vec::with_capacity(self.remaining as usize);
        while let Some(fragment) = self.next().await {
            out.extend_from_slice(&fragment?);
        }
        Ok(out)
    }
}
