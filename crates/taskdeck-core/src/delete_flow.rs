use serde::{
  Deserialize,
  Serialize
};
use tracing::debug;

/// Pending delete awaiting the user's
/// answer in the confirmation popup.
#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(
  tag = "state",
  rename_all = "snake_case"
)]
pub enum DeleteFlow {
  #[default]
  Idle,
  PendingConfirm {
    target: String
  }
}

impl DeleteFlow {
  pub fn pending_target(
    &self
  ) -> Option<&str> {
    match self {
      | Self::Idle => None,
      | Self::PendingConfirm {
        target
      } => Some(target.as_str())
    }
  }

  /// Stores a new target, replacing any
  /// earlier one. Returns the target
  /// that was abandoned, if any.
  pub fn request(
    &mut self,
    target: String
  ) -> Option<String> {
    let previous = std::mem::replace(
      self,
      Self::PendingConfirm { target }
    );
    match previous {
      | Self::PendingConfirm {
        target
      } => {
        debug!(abandoned = %target, "replacing pending delete");
        Some(target)
      }
      | Self::Idle => None
    }
  }

  /// Consumes the pending target for
  /// navigation.
  pub fn confirm(
    &mut self
  ) -> Option<String> {
    match std::mem::take(self) {
      | Self::PendingConfirm {
        target
      } => Some(target),
      | Self::Idle => None
    }
  }

  pub fn cancel(&mut self) -> bool {
    matches!(
      std::mem::take(self),
      Self::PendingConfirm { .. }
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn confirm_without_request_is_none() {
    let mut flow = DeleteFlow::default();
    assert_eq!(flow.confirm(), None);
    assert_eq!(flow, DeleteFlow::Idle);
  }

  #[test]
  fn last_request_wins() {
    let mut flow = DeleteFlow::default();
    assert_eq!(
      flow.request("/delete_task/1".to_string()),
      None
    );
    assert_eq!(
      flow.request("/delete_task/2".to_string()),
      Some("/delete_task/1".to_string())
    );
    assert_eq!(
      flow.confirm().as_deref(),
      Some("/delete_task/2")
    );
    assert_eq!(flow, DeleteFlow::Idle);
  }

  #[test]
  fn cancel_clears_target() {
    let mut flow = DeleteFlow::default();
    flow.request("/delete_task/9".to_string());
    assert!(flow.cancel());
    assert_eq!(flow.pending_target(), None);
    assert!(!flow.cancel());
  }
}
