//! Engine construction options (spec §6's "Configuration options
//! recognized at engine construction").

use std::collections::HashMap;

use crate::error::EngineError;

/// DMX-over-IP protocol selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Protocol {
    Sacn,
    ArtNet,
}

impl Protocol {
    /// Parses `"sacn"`/`"artnet"`, case-insensitive.
    pub fn parse(value: &str) -> Result<Self, EngineError> {
        match value.to_ascii_lowercase().as_str() {
            "sacn" => Ok(Protocol::Sacn),
            "artnet" => Ok(Protocol::ArtNet),
            other => Err(EngineError::configuration(format!("unsupported protocol: {other}"))),
        }
    }
}

/// Construction-time options for [`crate::engine::Engine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub protocol: Protocol,
    pub fps: f64,
    pub universe_ips: HashMap<u32, String>,
    pub artnet_target: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { protocol: Protocol::Sacn, fps: 40.0, universe_ips: HashMap::new(), artnet_target: "255.255.255.255".into() }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn protocol_parses_case_insensitively() {
        assert_eq!(Protocol::parse("ArtNet").unwrap(), Protocol::ArtNet);
        assert_eq!(Protocol::parse("SACN").unwrap(), Protocol::Sacn);
    }

    #[test]
    fn unknown_protocol_is_configuration_error() {
        assert!(matches!(Protocol::parse("dmx512"), Err(EngineError::Configuration { .. })));
    }
}
