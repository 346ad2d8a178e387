use serde::{
  Deserialize,
  Serialize
};
use thiserror::Error;

/// A trigger control that is missing
/// data the action needs.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Error,
  Serialize,
  Deserialize,
)]
pub enum AttrError {
  #[error(
    "task control is missing the \
     `{0}` attribute"
  )]
  Missing(String),

  #[error(
    "task control has a blank task id"
  )]
  BlankTaskId
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to parse config: {0}")]
  Parse(#[from] toml::de::Error),

  #[error("unknown config key `{0}`")]
  UnknownKey(String),

  #[error(
    "invalid value `{value}` for \
     `{key}`: {reason}"
  )]
  InvalidValue {
    key:    String,
    value:  String,
    reason: &'static str
  }
}
