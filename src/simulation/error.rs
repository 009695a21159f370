//! Error types for layout construction, decision episodes and configuration.

use std::path::PathBuf;

/// Errors raised while building or editing a [`Surface`](super::layout::Surface).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("element already exists: {0}")]
    DuplicateElement(String),

    #[error("element {name} has degenerate geometry {width}x{height}")]
    DegenerateGeometry { name: String, width: f64, height: f64 },

    #[error("element {name} has fixation frequency {frequency} (must be in (0, 1])")]
    InvalidFrequency { name: String, frequency: f64 },

    #[error("unknown element: {0}")]
    UnknownElement(String),

    #[error("layout has no elements")]
    EmptyLayout,

    #[error("nothing learned about element: {0}")]
    NotLearned(String),
}

/// Errors raised by the decision agent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecisionError {
    #[error("cannot split {0} elements into a guaranteed majority (need at least 3)")]
    TooFewElements(usize),

    #[error("episode already finished; reset before stepping")]
    EpisodeFinished,

    #[error("action is not available in this task")]
    UnknownAction,

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
