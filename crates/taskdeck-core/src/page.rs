use serde::{
  Deserialize,
  Serialize
};

use crate::edit_form::EditBinding;
use crate::overlay::OverlayId;

/// The rendered page as seen by the
/// coordinator. Every method must be
/// safe to call when the underlying
/// element is absent.
pub trait Page {
  /// The overlay itself exists.
  fn has_overlay(
    &self,
    id: OverlayId
  ) -> bool;

  /// Both the control that shows the
  /// overlay and the one that hides it
  /// exist. The toast has no trigger
  /// and only reports its close button.
  fn has_controls(
    &self,
    id: OverlayId
  ) -> bool;

  /// The edit form and its name,
  /// priority and deadline fields all
  /// exist.
  fn has_edit_form(&self) -> bool;

  fn set_overlay_active(
    &mut self,
    id: OverlayId,
    active: bool
  );

  fn fill_edit_form(
    &mut self,
    binding: &EditBinding
  );

  /// Full browser navigation.
  fn navigate(&mut self, url: &str);

  fn show_inline_error(
    &mut self,
    message: &str
  );

  /// Removes an error left by an
  /// earlier rejected action.
  fn clear_inline_error(&mut self);
}

/// Which behaviours could be wired
/// given the elements on the page.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct Features {
  pub add_task:      bool,
  pub edit:          bool,
  pub delete:        bool,
  pub profile:       bool,
  pub collaborators: bool,
  pub toast:         bool,
  pub toast_close:   bool
}

impl Features {
  pub fn detect<P: Page + ?Sized>(
    page: &P
  ) -> Self {
    let wired = |id: OverlayId| {
      page.has_overlay(id)
        && page.has_controls(id)
    };

    Self {
      add_task:      wired(
        OverlayId::AddTask
      ),
      edit:          page.has_overlay(
        OverlayId::EditTask
      ) && page.has_edit_form(),
      delete:        wired(
        OverlayId::ConfirmDelete
      ),
      profile:       wired(
        OverlayId::Profile
      ),
      collaborators: wired(
        OverlayId::Collaborators
      ),
      toast:         page
        .has_overlay(OverlayId::Toast),
      toast_close:   wired(
        OverlayId::Toast
      )
    }
  }

  /// Whether commands on this overlay
  /// reach the registry.
  pub fn covers(
    &self,
    id: OverlayId
  ) -> bool {
    match id {
      | OverlayId::AddTask => {
        self.add_task
      }
      | OverlayId::EditTask => self.edit,
      | OverlayId::ConfirmDelete => {
        self.delete
      }
      | OverlayId::Profile => {
        self.profile
      }
      | OverlayId::Collaborators => {
        self.collaborators
      }
      | OverlayId::Toast => self.toast
    }
  }

  pub fn overlays(
    &self
  ) -> Vec<OverlayId> {
    OverlayId::all()
      .into_iter()
      .filter(|id| self.covers(*id))
      .collect()
  }
}
