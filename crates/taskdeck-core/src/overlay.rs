use std::collections::BTreeMap;

use serde::{
  Deserialize,
  Serialize
};
use tracing::debug;

/// Panels layered above the task page.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OverlayId {
  AddTask,
  EditTask,
  ConfirmDelete,
  Profile,
  Collaborators,
  Toast
}

/// How a click on an overlay's trigger
/// control is interpreted.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Wiring {
  Open,
  Toggle
}

impl OverlayId {
  pub fn all() -> [Self; 6] {
    [
      Self::AddTask,
      Self::EditTask,
      Self::ConfirmDelete,
      Self::Profile,
      Self::Collaborators,
      Self::Toast
    ]
  }

  pub fn as_key(self) -> &'static str {
    match self {
      | Self::AddTask => "add_task",
      | Self::EditTask => "edit_task",
      | Self::ConfirmDelete => {
        "confirm_delete"
      }
      | Self::Profile => "profile",
      | Self::Collaborators => {
        "collaborators"
      }
      | Self::Toast => "toast"
    }
  }

  pub fn wiring(self) -> Wiring {
    match self {
      | Self::Profile
      | Self::Collaborators => {
        Wiring::Toggle
      }
      | _ => Wiring::Open
    }
  }

  /// The popups that edit or remove
  /// a task, as opposed to dropdowns
  /// and the toast.
  pub fn is_task_editor(self) -> bool {
    matches!(
      self,
      Self::AddTask
        | Self::EditTask
        | Self::ConfirmDelete
    )
  }
}

/// Result of a visibility request.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Change {
  Shown,
  Hidden,
  Unchanged,
  Missing
}

#[derive(Debug, Clone, Default)]
pub struct OverlayRegistry {
  visible:   BTreeMap<OverlayId, bool>,
  exclusive: bool
}

impl OverlayRegistry {
  /// Builds a registry for the overlays
  /// the page actually renders, all
  /// hidden.
  pub fn new<I>(
    present: I,
    exclusive: bool
  ) -> Self
  where
    I: IntoIterator<Item = OverlayId>
  {
    Self {
      visible: present
        .into_iter()
        .map(|id| (id, false))
        .collect(),
      exclusive
    }
  }

  pub fn is_present(
    &self,
    id: OverlayId
  ) -> bool {
    self.visible.contains_key(&id)
  }

  pub fn is_visible(
    &self,
    id: OverlayId
  ) -> bool {
    self
      .visible
      .get(&id)
      .copied()
      .unwrap_or(false)
  }

  pub fn visible(
    &self
  ) -> impl Iterator<Item = OverlayId> + '_
  {
    self
      .visible
      .iter()
      .filter(|(_, shown)| **shown)
      .map(|(id, _)| *id)
  }

  pub fn open(
    &mut self,
    id: OverlayId
  ) -> Change {
    self.set(id, true)
  }

  pub fn close(
    &mut self,
    id: OverlayId
  ) -> Change {
    self.set(id, false)
  }

  pub fn toggle(
    &mut self,
    id: OverlayId
  ) -> Change {
    let next = !self.is_visible(id);
    self.set(id, next)
  }

  /// Task editors other than `id` that
  /// must be hidden before `id` is
  /// shown in exclusive mode.
  pub fn displaced_by(
    &self,
    id: OverlayId
  ) -> Vec<OverlayId> {
    if !self.exclusive
      || !id.is_task_editor()
    {
      return Vec::new();
    }

    self
      .visible()
      .filter(|other| {
        *other != id
          && other.is_task_editor()
      })
      .collect()
  }

  fn set(
    &mut self,
    id: OverlayId,
    shown: bool
  ) -> Change {
    let Some(current) =
      self.visible.get_mut(&id)
    else {
      debug!(
        overlay = id.as_key(),
        "overlay not on page"
      );
      return Change::Missing;
    };

    if *current == shown {
      return Change::Unchanged;
    }

    *current = shown;
    if shown {
      Change::Shown
    } else {
      Change::Hidden
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn registry() -> OverlayRegistry {
    OverlayRegistry::new(
      OverlayId::all(),
      false
    )
  }

  #[test]
  fn open_twice_stays_visible() {
    let mut reg = registry();
    assert_eq!(
      reg.open(OverlayId::AddTask),
      Change::Shown
    );
    assert_eq!(
      reg.open(OverlayId::AddTask),
      Change::Unchanged
    );
    assert!(reg.is_visible(OverlayId::AddTask));
  }

  #[test]
  fn toggle_flips() {
    let mut reg = registry();
    assert_eq!(
      OverlayId::Profile.wiring(),
      Wiring::Toggle
    );
    assert_eq!(
      reg.toggle(OverlayId::Profile),
      Change::Shown
    );
    assert_eq!(
      reg.toggle(OverlayId::Profile),
      Change::Hidden
    );
    assert!(!reg.is_visible(OverlayId::Profile));
  }

  #[test]
  fn absent_overlay_is_noop() {
    let mut reg = OverlayRegistry::new(
      [OverlayId::AddTask],
      false
    );
    assert_eq!(
      reg.open(OverlayId::Toast),
      Change::Missing
    );
    assert_eq!(
      reg.toggle(OverlayId::Profile),
      Change::Missing
    );
    assert!(!reg.is_visible(OverlayId::Toast));
  }

  #[test]
  fn close_hidden_overlay_is_unchanged() {
    let mut reg = registry();
    assert_eq!(
      reg.close(OverlayId::EditTask),
      Change::Unchanged
    );
  }

  #[test]
  fn overlays_are_independent_by_default() {
    let mut reg = registry();
    reg.open(OverlayId::AddTask);
    assert!(
      reg.displaced_by(OverlayId::EditTask)
        .is_empty()
    );
  }

  #[test]
  fn exclusive_mode_lists_other_editors() {
    let mut reg = OverlayRegistry::new(
      OverlayId::all(),
      true
    );
    reg.open(OverlayId::AddTask);
    reg.open(OverlayId::Profile);

    assert_eq!(
      reg.displaced_by(OverlayId::EditTask),
      vec![OverlayId::AddTask]
    );
    assert!(
      reg.displaced_by(OverlayId::Profile)
        .is_empty()
    );
  }
}
