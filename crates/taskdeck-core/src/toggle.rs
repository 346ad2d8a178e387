use serde::{
  Deserialize,
  Serialize
};

use crate::config::Endpoints;

pub const FORM_CONTENT_TYPE: &str =
  "application/x-www-form-urlencoded";

/// Completion change for one task, as
/// posted to the server.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct ToggleRequest {
  pub path: String,
  pub body: String
}

impl ToggleRequest {
  pub fn new(
    task_id: &str,
    checked: bool,
    endpoints: &Endpoints
  ) -> Self {
    let flag = u8::from(checked);
    Self {
      path: endpoints.toggle_url(task_id),
      body: format!("isChecked={flag}")
    }
  }

  pub fn content_type(
    &self
  ) -> &'static str {
    FORM_CONTENT_TYPE
  }
}

/// Outbound channel for toggle requests.
///
/// Implementations must not block and
/// must not report the outcome back:
/// the page keeps whatever state the
/// user set.
pub trait Transport {
  fn send(&self, request: ToggleRequest);
}
