//! Error taxonomy for the multi-threaded frame orchestrator.
//!
//! Mirrors the manual `Display` + `Error` style of [`Lz4FError`](crate::frame::types::Lz4FError)
//! rather than deriving via a macro crate, since the rest of this codebase does not
//! depend on one for its own error types.

use core::fmt;

use crate::frame::types::Lz4FError;

/// Error kinds surfaced by the orchestrator.
///
/// `Inner` wraps an error bubbled up unchanged from the single-section
/// compressor (the `SectionCompressor` trait's concrete LZ4 backend).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MtError {
    /// A buffer or compressor-context pool allocation failed.
    MemoryAllocation,
    /// `dstCapacity` was insufficient for a one-shot compression.
    DstSizeTooSmall,
    /// A streaming `continue` call arrived after the frame was already ended.
    StageWrong,
    /// An unrecognised tunable was supplied.
    ParameterUnsupported,
    /// A cdict-only entry point was called with a null dictionary handle.
    DictionaryWrong,
    /// Passed through from the single-section compressor unchanged.
    Inner(Lz4FError),
}

impl MtError {
    /// Short machine-stable name, in the same style as [`Lz4FError::error_name`].
    pub fn error_name(&self) -> &'static str {
        match self {
            MtError::MemoryAllocation => "ERROR_memory_allocation",
            MtError::DstSizeTooSmall => "ERROR_dstSize_tooSmall",
            MtError::StageWrong => "ERROR_stage_wrong",
            MtError::ParameterUnsupported => "ERROR_parameter_unsupported",
            MtError::DictionaryWrong => "ERROR_dictionary_wrong",
            MtError::Inner(e) => e.error_name(),
        }
    }
}

impl fmt::Display for MtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.error_name())
    }
}

impl std::error::Error for MtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MtError::Inner(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Lz4FError> for MtError {
    fn from(e: Lz4FError) -> Self {
        MtError::Inner(e)
    }
}
