use thiserror::Error;

/// Failure taxonomy for one relay cycle.
///
/// An image rejected by the quality gate is not represented here: that is a
/// graceful refusal, not an error.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    Input(String),
    #[error("image processing failed: {0}")]
    Image(String),
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("{0}")]
    Decode(String),
    #[error("response contained no assistant content")]
    EmptyCompletion,
}

impl RelayError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Short machine-readable label used in the event trail.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Input(_) => "input",
            Self::Image(_) => "image",
            Self::Http { .. } | Self::Transport(_) => "transport",
            Self::Decode(_) | Self::EmptyCompletion => "decode",
        }
    }
}
