//! Audio error taxonomy.

use thiserror::Error;

/// Failures surfaced at the playback boundary.
///
/// All of these are non-fatal to a round: the caller logs and the game
/// proceeds silently. Nothing in this crate panics on audio failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The host offers no usable audio output.
    #[error("no audio output available")]
    Unavailable,
    /// The output pipeline exists but is suspended and could not be resumed.
    #[error("audio output suspended")]
    Suspended,
    /// The backend failed while building or driving the stream.
    #[error("audio stream error: {0}")]
    Stream(String),
}
