use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  info,
  warn
};

use crate::config::Config;
use crate::delete_flow::DeleteFlow;
use crate::edit_form::{
  EditBinding,
  TaskAttrs,
  TaskRef
};
use crate::error::AttrError;
use crate::overlay::{
  Change,
  OverlayId,
  OverlayRegistry,
  Wiring
};
use crate::page::{
  Features,
  Page
};
use crate::toggle::{
  ToggleRequest,
  Transport
};

/// A user action on the task page.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(
  tag = "command",
  rename_all = "snake_case"
)]
pub enum Command {
  OpenOverlay {
    overlay: OverlayId
  },
  CloseOverlay {
    overlay: OverlayId
  },
  ToggleOverlay {
    overlay: OverlayId
  },
  /// Click on the overlay's trigger;
  /// opens or toggles per its wiring.
  TriggerOverlay {
    overlay: OverlayId
  },
  EditTask {
    #[serde(flatten)]
    attrs: TaskAttrs
  },
  RequestDelete {
    #[serde(flatten)]
    attrs: TaskAttrs
  },
  ConfirmDelete,
  CancelDelete,
  ToggleTask {
    #[serde(flatten)]
    attrs:   TaskAttrs,
    checked: bool
  }
}

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
pub enum Ignored {
  /// The overlay is not rendered.
  OverlayMissing,
  /// The feature's elements are
  /// incomplete, so nothing was wired.
  FeatureUnwired,
  /// Confirm with no delete awaiting
  /// confirmation.
  NothingPending
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(
  tag = "outcome",
  rename_all = "snake_case"
)]
pub enum Outcome {
  Shown {
    overlay: OverlayId
  },
  Hidden {
    overlay: OverlayId
  },
  Unchanged {
    overlay: OverlayId
  },
  EditBound {
    binding: EditBinding
  },
  DeletePending {
    target: String
  },
  Navigated {
    url: String
  },
  DeleteCancelled,
  ToggleSent {
    request: ToggleRequest
  },
  Ignored {
    reason: Ignored
  },
  Rejected {
    error: AttrError
  }
}

impl Outcome {
  /// A task action went through, so any
  /// earlier inline error is stale.
  pub fn completes_task_action(
    &self
  ) -> bool {
    matches!(
      self,
      Outcome::EditBound { .. }
        | Outcome::DeletePending { .. }
        | Outcome::Navigated { .. }
        | Outcome::DeleteCancelled
        | Outcome::ToggleSent { .. }
    )
  }
}

/// A command to run after a delay.
#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct Deferred {
  pub after_ms: u32,
  pub command:  Command
}

pub struct Dispatcher<P, T> {
  page:      P,
  transport: T,
  config:    Config,
  features:  Features,
  overlays:  OverlayRegistry,
  delete:    DeleteFlow
}

impl<P, T> Dispatcher<P, T>
where
  P: Page,
  T: Transport
{
  /// Inspects the page once and wires
  /// only the features whose elements
  /// are all present.
  pub fn new(
    page: P,
    transport: T,
    config: Config
  ) -> Self {
    let features =
      Features::detect(&page);
    let overlays = OverlayRegistry::new(
      features.overlays(),
      config.overlays.exclusive
    );

    info!(?features, "wired task page");

    Self {
      page,
      transport,
      config,
      features,
      overlays,
      delete: DeleteFlow::Idle
    }
  }

  pub fn features(&self) -> Features {
    self.features
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn page(&self) -> &P {
    &self.page
  }

  pub fn transport(&self) -> &T {
    &self.transport
  }

  pub fn delete_flow(
    &self
  ) -> &DeleteFlow {
    &self.delete
  }

  pub fn is_visible(
    &self,
    id: OverlayId
  ) -> bool {
    self.overlays.is_visible(id)
  }

  /// Page-load work: shows the toast if
  /// there is one and hands back its
  /// dismissal for the caller to
  /// schedule.
  #[tracing::instrument(skip_all)]
  pub fn boot(
    &mut self
  ) -> Option<Deferred> {
    if !self.features.toast {
      return None;
    }

    self.show(OverlayId::Toast);
    let after_ms =
      self.config.toast.duration_ms;
    debug!(after_ms, "toast shown");

    Some(Deferred {
      after_ms,
      command: Command::CloseOverlay {
        overlay: OverlayId::Toast
      }
    })
  }

  #[tracing::instrument(skip(self))]
  pub fn dispatch(
    &mut self,
    command: Command
  ) -> Outcome {
    let outcome = match command {
      | Command::OpenOverlay {
        overlay
      } => self.gate(overlay, |me| {
        me.show(overlay)
      }),
      | Command::CloseOverlay {
        overlay
      } => self.gate(overlay, |me| {
        me.hide(overlay)
      }),
      | Command::ToggleOverlay {
        overlay
      } => self.gate(overlay, |me| {
        me.flip(overlay)
      }),
      | Command::TriggerOverlay {
        overlay
      } => self.gate(overlay, |me| {
        match overlay.wiring() {
          | Wiring::Open => me.show(overlay),
          | Wiring::Toggle => me.flip(overlay)
        }
      }),
      | Command::EditTask {
        attrs
      } => self.edit_task(&attrs),
      | Command::RequestDelete {
        attrs
      } => self.request_delete(&attrs),
      | Command::ConfirmDelete => {
        self.confirm_delete()
      }
      | Command::CancelDelete => {
        self.cancel_delete()
      }
      | Command::ToggleTask {
        attrs,
        checked
      } => self.toggle_task(&attrs, checked)
    };

    if outcome.completes_task_action() {
      self.page.clear_inline_error();
    }

    debug!(?outcome, "command handled");
    outcome
  }

  fn gate(
    &mut self,
    overlay: OverlayId,
    apply: impl FnOnce(&mut Self) -> Outcome
  ) -> Outcome {
    if !self.overlays.is_present(overlay)
    {
      return Outcome::Ignored {
        reason: if self
          .page
          .has_overlay(overlay)
        {
          Ignored::FeatureUnwired
        } else {
          Ignored::OverlayMissing
        }
      };
    }
    apply(self)
  }

  fn show(
    &mut self,
    overlay: OverlayId
  ) -> Outcome {
    for other in
      self.overlays.displaced_by(overlay)
    {
      self.hide(other);
    }
    let change = self.overlays.open(overlay);
    self.reflect(overlay, change)
  }

  fn flip(
    &mut self,
    overlay: OverlayId
  ) -> Outcome {
    if !self.overlays.is_visible(overlay)
    {
      for other in
        self.overlays.displaced_by(overlay)
      {
        self.hide(other);
      }
    }
    let change =
      self.overlays.toggle(overlay);
    self.reflect(overlay, change)
  }

  fn hide(
    &mut self,
    overlay: OverlayId
  ) -> Outcome {
    let change =
      self.overlays.close(overlay);
    if overlay == OverlayId::ConfirmDelete
      && change == Change::Hidden
      && self.delete.cancel()
    {
      debug!(
        "confirm overlay closed; pending \
         delete dropped"
      );
    }
    self.reflect(overlay, change)
  }

  fn reflect(
    &mut self,
    overlay: OverlayId,
    change: Change
  ) -> Outcome {
    match change {
      | Change::Shown => {
        self
          .page
          .set_overlay_active(overlay, true);
        Outcome::Shown { overlay }
      }
      | Change::Hidden => {
        self.page.set_overlay_active(
          overlay, false
        );
        Outcome::Hidden { overlay }
      }
      | Change::Unchanged => {
        Outcome::Unchanged { overlay }
      }
      | Change::Missing => {
        Outcome::Ignored {
          reason: Ignored::OverlayMissing
        }
      }
    }
  }

  fn edit_task(
    &mut self,
    attrs: &TaskAttrs
  ) -> Outcome {
    if !self.features.edit {
      return Outcome::Ignored {
        reason: Ignored::FeatureUnwired
      };
    }

    let task = match TaskRef::for_edit(
      attrs
    ) {
      | Ok(task) => task,
      | Err(error) => {
        return self.reject(error);
      }
    };

    let binding = EditBinding::new(
      task,
      &self.config.endpoints
    );
    self.page.fill_edit_form(&binding);
    self.show(OverlayId::EditTask);
    info!(action = %binding.action, "edit form bound");

    Outcome::EditBound { binding }
  }

  fn request_delete(
    &mut self,
    attrs: &TaskAttrs
  ) -> Outcome {
    if !self.features.delete {
      return Outcome::Ignored {
        reason: Ignored::FeatureUnwired
      };
    }

    let task_id = match attrs.require_id()
    {
      | Ok(id) => id.to_string(),
      | Err(error) => {
        return self.reject(error);
      }
    };

    let target = self
      .config
      .endpoints
      .delete_url(&task_id);
    self.delete.request(target.clone());
    self.show(OverlayId::ConfirmDelete);

    Outcome::DeletePending { target }
  }

  fn confirm_delete(
    &mut self
  ) -> Outcome {
    if !self.features.delete {
      return Outcome::Ignored {
        reason: Ignored::FeatureUnwired
      };
    }

    let Some(url) = self.delete.confirm()
    else {
      debug!(
        "confirm clicked with no \
         pending delete"
      );
      return Outcome::Ignored {
        reason: Ignored::NothingPending
      };
    };

    info!(url = %url, "navigating to confirmed delete");
    self.page.navigate(&url);
    Outcome::Navigated { url }
  }

  fn cancel_delete(
    &mut self
  ) -> Outcome {
    if !self.features.delete {
      return Outcome::Ignored {
        reason: Ignored::FeatureUnwired
      };
    }

    if !self.delete.cancel() {
      debug!(
        "cancel clicked with no \
         pending delete"
      );
    }
    self.hide(OverlayId::ConfirmDelete);
    Outcome::DeleteCancelled
  }

  fn toggle_task(
    &mut self,
    attrs: &TaskAttrs,
    checked: bool
  ) -> Outcome {
    let task_id = match attrs.require_id()
    {
      | Ok(id) => id.to_string(),
      | Err(error) => {
        return self.reject(error);
      }
    };

    let request = ToggleRequest::new(
      &task_id,
      checked,
      &self.config.endpoints
    );
    self.transport.send(request.clone());

    Outcome::ToggleSent { request }
  }

  fn reject(
    &mut self,
    error: AttrError
  ) -> Outcome {
    warn!(%error, "rejected task action");
    self
      .page
      .show_inline_error(&error.to_string());
    Outcome::Rejected { error }
  }
}
