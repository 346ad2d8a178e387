use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::Context;
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  info,
  warn
};

use crate::error::ConfigError;

pub const DEFAULT_TOAST_DURATION_MS: u32 =
  5_000;

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Default,
)]
#[serde(default)]
pub struct Config {
  pub toast:     ToastConfig,
  pub endpoints: Endpoints,
  pub overlays:  OverlayConfig,
  pub toggle:    RetryPolicy
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct ToastConfig {
  pub duration_ms: u32
}

impl Default for ToastConfig {
  fn default() -> Self {
    Self {
      duration_ms:
        DEFAULT_TOAST_DURATION_MS
    }
  }
}

/// Path prefixes of the server routes;
/// the task id is appended as the last
/// segment.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct Endpoints {
  pub update: String,
  pub delete: String,
  pub toggle: String
}

impl Default for Endpoints {
  fn default() -> Self {
    Self {
      update: "/update_task"
        .to_string(),
      delete: "/delete_task"
        .to_string(),
      toggle: "/toggle_task"
        .to_string()
    }
  }
}

impl Endpoints {
  pub fn update_url(
    &self,
    task_id: &str
  ) -> String {
    join_segment(&self.update, task_id)
  }

  pub fn delete_url(
    &self,
    task_id: &str
  ) -> String {
    join_segment(&self.delete, task_id)
  }

  pub fn toggle_url(
    &self,
    task_id: &str
  ) -> String {
    join_segment(&self.toggle, task_id)
  }
}

fn join_segment(
  prefix: &str,
  task_id: &str
) -> String {
  format!(
    "{}/{task_id}",
    prefix.trim_end_matches('/')
  )
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Default,
)]
#[serde(default)]
pub struct OverlayConfig {
  /// Opening one task-editing overlay
  /// closes the other two.
  pub exclusive: bool
}

/// Delivery policy for toggle requests.
/// One attempt with no retry is the
/// stock behaviour.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct RetryPolicy {
  pub max_attempts: u32,
  pub backoff_ms:   u32
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 1,
      backoff_ms:   250
    }
  }
}

impl RetryPolicy {
  pub fn attempts(&self) -> u32 {
    self.max_attempts.max(1)
  }

  /// Delay before the given retry
  /// (1-based), doubling each time.
  pub fn delay_before(
    &self,
    retry: u32
  ) -> u32 {
    let shift =
      retry.saturating_sub(1).min(16);
    self
      .backoff_ms
      .saturating_mul(1_u32 << shift)
  }
}

impl Config {
  pub fn from_toml_str(
    text: &str
  ) -> Result<Self, ConfigError> {
    let cfg: Config =
      toml::from_str(text)?;
    cfg.validate()?;
    Ok(cfg)
  }

  #[tracing::instrument(skip(
    override_path
  ))]
  pub fn load(
    override_path: Option<&Path>
  ) -> anyhow::Result<Self> {
    let Some(path) =
      resolve_config_path(override_path)
    else {
      warn!(
        "no taskdeck config found; \
         using defaults"
      );
      return Ok(Self::default());
    };

    info!(config = %path.display(), "loading config");
    let text = fs::read_to_string(&path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;

    Self::from_toml_str(&text)
      .with_context(|| {
        format!(
          "invalid config {}",
          path.display()
        )
      })
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> Result<(), ConfigError>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k.trim();
      let value = v.trim();
      debug!(key = %key, value = %value, "applying override");
      match key {
        | "toast.duration_ms" => {
          self.toast.duration_ms =
            parse_u32(key, value)?;
        }
        | "endpoints.update" => {
          self.endpoints.update =
            value.to_string();
        }
        | "endpoints.delete" => {
          self.endpoints.delete =
            value.to_string();
        }
        | "endpoints.toggle" => {
          self.endpoints.toggle =
            value.to_string();
        }
        | "overlays.exclusive" => {
          self.overlays.exclusive =
            parse_bool(value);
        }
        | "toggle.max_attempts" => {
          self.toggle.max_attempts =
            parse_u32(key, value)?;
        }
        | "toggle.backoff_ms" => {
          self.toggle.backoff_ms =
            parse_u32(key, value)?;
        }
        | _ => {
          return Err(
            ConfigError::UnknownKey(
              key.to_string()
            )
          );
        }
      }
    }

    self.validate()
  }

  fn validate(
    &self
  ) -> Result<(), ConfigError> {
    for (key, prefix) in [
      (
        "endpoints.update",
        &self.endpoints.update
      ),
      (
        "endpoints.delete",
        &self.endpoints.delete
      ),
      (
        "endpoints.toggle",
        &self.endpoints.toggle
      )
    ] {
      if !prefix.starts_with('/') {
        return Err(
          ConfigError::InvalidValue {
            key:    key.to_string(),
            value:  prefix.clone(),
            reason: "endpoint must be an \
                     absolute path"
          }
        );
      }
    }
    Ok(())
  }
}

fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  match std::env::var("TASKDECK_CONFIG")
  {
    | Ok(value)
      if !value.trim().is_empty() =>
    {
      Some(PathBuf::from(value))
    }
    | _ => None
  }
}

fn parse_u32(
  key: &str,
  value: &str
) -> Result<u32, ConfigError> {
  value.parse::<u32>().map_err(|_| {
    ConfigError::InvalidValue {
      key:    key.to_string(),
      value:  value.to_string(),
      reason: "expected a non-negative \
               integer"
    }
  })
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}
