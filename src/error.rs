use std::fmt;

use serde::Serialize;

/// Structured error type for the engine, matching the taxonomy in §7:
/// configuration errors surface synchronously at the offending call,
/// transport and render errors propagate out of `Engine::wait`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "code", content = "detail")]
pub enum EngineError {
    /// Addressing overlap, invalid Scene construction, an unsupported
    /// color-strategy or protocol string.
    Configuration { message: String },
    /// Failure to bind, send, or disconnect a transport.
    Transport { message: String },
    /// A clip's `params` function failed while the frame loop was
    /// running. The engine stops rather than emit stale frames.
    Render { message: String },
}

impl EngineError {
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        EngineError::Configuration { message: message.into() }
    }

    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        EngineError::Transport { message: message.into() }
    }

    #[must_use]
    pub fn render(message: impl Into<String>) -> Self {
        EngineError::Render { message: message.into() }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Configuration { message } => write!(f, "configuration error: {message}"),
            EngineError::Transport { message } => write!(f, "transport error: {message}"),
            EngineError::Render { message } => write!(f, "render error: {message}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Transport { message: e.to_string() }
    }
}

impl From<EngineError> for String {
    fn from(e: EngineError) -> String {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_variant_kind() {
        let e = EngineError::configuration("overlap at 1-8");
        assert!(e.to_string().starts_with("configuration error"));
    }

    #[test]
    fn io_error_becomes_transport_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "no route");
        let e: EngineError = io_err.into();
        assert!(matches!(e, EngineError::Transport { .. }));
    }
}
