//! Buffer-to-buffer byte transforms.

use thiserror::Error;

use crate::PzError;

/// How far a transform got through its source and destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Source bytes consumed.
    pub read: usize,
    /// Destination bytes produced.
    pub written: usize,
}

/// A transform that stopped before consuming its whole source.
///
/// Everything before `read` in the source was fully transformed into the
/// first `written` bytes of the destination, so the call can be resumed
/// from there.
#[derive(Debug, Error)]
#[error("{error} (read {read} bytes, wrote {written} bytes)")]
pub struct TransformError {
    pub read: usize,
    pub written: usize,
    #[source]
    pub error: PzError,
}

impl TransformError {
    pub fn new(progress: Progress, error: PzError) -> Self {
        TransformError {
            read: progress.read,
            written: progress.written,
            error,
        }
    }

    pub fn progress(&self) -> Progress {
        Progress {
            read: self.read,
            written: self.written,
        }
    }
}

/// A reversible byte transform.
pub trait ByteTransform {
    /// Transform `src` into `dst`.
    fn forward(&self, src: &[u8], dst: &mut [u8]) -> Result<Progress, TransformError>;

    /// Undo [`forward`](Self::forward).
    fn inverse(&self, src: &[u8], dst: &mut [u8]) -> Result<Progress, TransformError>;

    /// Upper bound on the forward output size for `len` source bytes.
    fn max_encoded_len(&self, len: usize) -> usize;
}
