//! TOML-based configuration for the endpoint binary.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. Built-in defaults (the `default_*` helpers below),
//! 2. an optional `tapcast.toml` file,
//! 3. `key=value` pairs on the command line, e.g.
//!    `tapcast-endpoint host=10.0.0.5 scid=1a2b3c4d log_level=verbose`.
//!
//! Fields annotated with `#[serde(default = "some_fn")]` fall back to the
//! helper's return value when absent from the TOML file, so a partial file
//! (or none at all) still produces a complete config.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A command-line argument was not of the form `key=value`.
    #[error("malformed argument {0:?}, expected key=value")]
    MalformedArg(String),

    /// A command-line key is not a known setting.
    #[error("unknown setting {0:?}")]
    UnknownKey(String),

    /// A command-line value could not be parsed for its key.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Runtime configuration for one endpoint process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointConfig {
    /// Address the controller listens on.
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port of the control socket.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Session identifier sent by the controller, hex-encoded. Empty
    /// means the controller does not use one.
    #[serde(default)]
    pub scid: String,
    /// Log verbosity: `"verbose"`, `"debug"`, `"info"`, `"warn"`, `"error"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Whether the controller negotiates an audio stream. Carried for
    /// handshake compatibility; this process ignores the stream itself.
    #[serde(default)]
    pub audio: bool,
    /// Whether the controller negotiates a video stream. Same caveat as
    /// `audio`.
    #[serde(default)]
    pub video: bool,
    /// Width in pixels of the display events are mapped onto.
    #[serde(default = "default_screen_width")]
    pub screen_width: u16,
    /// Height in pixels of the display events are mapped onto.
    #[serde(default = "default_screen_height")]
    pub screen_height: u16,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    10721
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_screen_width() -> u16 {
    1080
}
fn default_screen_height() -> u16 {
    1920
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            scid: String::new(),
            log_level: default_log_level(),
            audio: false,
            video: false,
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
        }
    }
}

impl EndpointConfig {
    /// Loads the config from a TOML file, returning defaults if the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for file-system errors other than
    /// "not found" and [`ConfigError::Parse`] for invalid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };
        Ok(toml::from_str(&text)?)
    }

    /// Applies `key=value` command-line overrides on top of the loaded
    /// config.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a malformed pair, an unknown key, or
    /// a value that does not parse for its key.
    pub fn apply_args<I, A>(&mut self, args: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<str>,
    {
        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| ConfigError::MalformedArg(arg.to_string()))?;
            self.apply_one(key, value)?;
        }
        Ok(())
    }

    fn apply_one(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "host" => self.host = value.to_string(),
            "port" => self.port = parse_value(key, value)?,
            "scid" => self.scid = value.to_string(),
            "log_level" => {
                if !matches!(value, "verbose" | "debug" | "info" | "warn" | "error") {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                        reason: "expected verbose, debug, info, warn or error".to_string(),
                    });
                }
                self.log_level = value.to_string();
            }
            "audio" => self.audio = parse_value(key, value)?,
            "video" => self.video = parse_value(key, value)?,
            "screen_width" => self.screen_width = parse_value(key, value)?,
            "screen_height" => self.screen_height = parse_value(key, value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Maps the configured level to a `tracing` filter directive.
    /// `"verbose"` is the controller-side name for what `tracing` calls
    /// `trace`.
    pub fn tracing_filter(&self) -> &'static str {
        match self.log_level.as_str() {
            "verbose" => "trace",
            "debug" => "debug",
            "warn" => "warn",
            "error" => "error",
            _ => "info",
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EndpointConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 10721);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.screen_width, 1080);
        assert_eq!(config.screen_height, 1920);
        assert!(!config.audio);
        assert!(!config.video);
    }

    #[test]
    fn test_partial_toml_fills_missing_fields() {
        let config: EndpointConfig =
            toml::from_str("port = 27183\nlog_level = \"debug\"").unwrap();
        assert_eq!(config.port, 27183);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.screen_height, 1920);
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = EndpointConfig::default();
        config
            .apply_args(["port=9999", "scid=1a2b3c4d", "video=true"])
            .unwrap();
        assert_eq!(config.port, 9999);
        assert_eq!(config.scid, "1a2b3c4d");
        assert!(config.video);
    }

    #[test]
    fn test_malformed_arg_is_rejected() {
        let mut config = EndpointConfig::default();
        let err = config.apply_args(["port"]).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedArg(_)));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut config = EndpointConfig::default();
        let err = config.apply_args(["bitrate=8000000"]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn test_bad_port_value_is_rejected() {
        let mut config = EndpointConfig::default();
        let err = config.apply_args(["port=not-a-port"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_bad_log_level_is_rejected() {
        let mut config = EndpointConfig::default();
        let err = config.apply_args(["log_level=loud"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_verbose_maps_to_trace_filter() {
        let mut config = EndpointConfig::default();
        config.apply_args(["log_level=verbose"]).unwrap();
        assert_eq!(config.tracing_filter(), "trace");
        config.apply_args(["log_level=warn"]).unwrap();
        assert_eq!(config.tracing_filter(), "warn");
    }
}
