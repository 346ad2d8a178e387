use taskdeck_core::OverlayId;

/// Class that makes an overlay visible.
pub const ACTIVE_CLASS: &str = "active";

pub const EDIT_TRIGGER: &str = ".edit-btn";
pub const EDIT_FORM: &str =
  "#edit-task-form";
pub const EDIT_NAME_FIELD: &str =
  "#edit-task";
pub const EDIT_PRIORITY_FIELD: &str =
  "#edit-priority";
pub const EDIT_DEADLINE_FIELD: &str =
  "#edit-deadline";

pub const DELETE_TRIGGER: &str =
  ".delete-btn";
pub const DELETE_CONFIRM: &str =
  ".confirm-delete-btn";
pub const DELETE_CANCEL: &str =
  ".cancel-delete-btn";

pub const TASK_CHECKBOX: &str =
  ".task-checkbox";
/// Global function for inline handlers.
pub const GLOBAL_TOGGLE: &str =
  "toggleTask";
/// Checkboxes carrying this attribute
/// report changes through
/// `GLOBAL_TOGGLE` themselves.
pub const INLINE_TOGGLE_ATTR: &str =
  "onchange";

pub const INLINE_ERROR_ID: &str =
  "action-error";

/// Selectors for one overlay and the
/// controls that show and hide it.
pub struct OverlayMarkup {
  pub overlay: &'static str,
  /// Control that opens or toggles it;
  /// `None` when something other than
  /// a single button shows it.
  pub trigger: Option<&'static str>,
  pub close:   Option<&'static str>
}

pub fn overlay_markup(
  id: OverlayId
) -> OverlayMarkup {
  match id {
    | OverlayId::AddTask => {
      OverlayMarkup {
        overlay: "#add-task-popup",
        trigger: Some("#open-task-btn"),
        close:   Some("#close-add-btn")
      }
    }
    | OverlayId::EditTask => {
      OverlayMarkup {
        overlay: "#edit-task-popup",
        trigger: None,
        close:   Some("#close-edit-btn")
      }
    }
    | OverlayId::ConfirmDelete => {
      OverlayMarkup {
        overlay: "#confirm-delete-popup",
        trigger: None,
        close:   None
      }
    }
    | OverlayId::Profile => {
      OverlayMarkup {
        overlay: ".profile-container",
        trigger: Some(".profileBtn"),
        close:   Some(".close-profile-btn")
      }
    }
    | OverlayId::Collaborators => {
      OverlayMarkup {
        overlay: ".collab-container",
        trigger: Some(".collabBtn"),
        close:   Some(".close-collab-btn")
      }
    }
    | OverlayId::Toast => OverlayMarkup {
      overlay: ".toast",
      trigger: None,
      close:   Some(".close-toast-btn")
    }
  }
}

/// `data-*` attribute name for a task
/// field.
pub fn data_attr(name: &str) -> String {
  format!("data-{name}")
}
