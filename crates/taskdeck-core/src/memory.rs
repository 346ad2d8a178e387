//! Headless stand-ins for the browser:
//! a page model, a recording transport
//! and a virtual clock for deferred
//! commands.

use std::cell::RefCell;
use std::collections::BTreeSet;

use serde::{
  Deserialize,
  Serialize
};

use crate::dispatch::{
  Command,
  Deferred
};
use crate::edit_form::EditBinding;
use crate::overlay::OverlayId;
use crate::page::Page;
use crate::toggle::{
  ToggleRequest,
  Transport
};

#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct MemoryPage {
  /// Overlays rendered on the page.
  pub overlays:  BTreeSet<OverlayId>,
  /// Overlays whose open and close
  /// controls are rendered.
  pub controls:  BTreeSet<OverlayId>,
  pub edit_form: bool,

  #[serde(skip)]
  pub active:      BTreeSet<OverlayId>,
  #[serde(skip)]
  pub form:        Option<EditBinding>,
  #[serde(skip)]
  pub navigations: Vec<String>,
  /// Every inline error ever shown.
  #[serde(skip)]
  pub errors:      Vec<String>,
  /// The inline error on screen now.
  #[serde(skip)]
  pub shown_error: Option<String>
}

impl MemoryPage {
  /// A page rendering every overlay,
  /// control and the edit form.
  pub fn complete() -> Self {
    Self {
      overlays: OverlayId::all()
        .into_iter()
        .collect(),
      controls: OverlayId::all()
        .into_iter()
        .collect(),
      edit_form: true,
      ..Self::default()
    }
  }

  pub fn without_overlay(
    mut self,
    id: OverlayId
  ) -> Self {
    self.overlays.remove(&id);
    self.controls.remove(&id);
    self
  }

  pub fn without_edit_form(
    mut self
  ) -> Self {
    self.edit_form = false;
    self
  }

  pub fn is_active(
    &self,
    id: OverlayId
  ) -> bool {
    self.active.contains(&id)
  }
}

impl Page for MemoryPage {
  fn has_overlay(
    &self,
    id: OverlayId
  ) -> bool {
    self.overlays.contains(&id)
  }

  fn has_controls(
    &self,
    id: OverlayId
  ) -> bool {
    self.controls.contains(&id)
  }

  fn has_edit_form(&self) -> bool {
    self.edit_form
  }

  fn set_overlay_active(
    &mut self,
    id: OverlayId,
    active: bool
  ) {
    if !self.overlays.contains(&id) {
      return;
    }
    if active {
      self.active.insert(id);
    } else {
      self.active.remove(&id);
    }
  }

  fn fill_edit_form(
    &mut self,
    binding: &EditBinding
  ) {
    if self.edit_form {
      self.form = Some(binding.clone());
    }
  }

  fn navigate(&mut self, url: &str) {
    self.navigations.push(url.to_string());
  }

  fn show_inline_error(
    &mut self,
    message: &str
  ) {
    self.errors.push(message.to_string());
    self.shown_error =
      Some(message.to_string());
  }

  fn clear_inline_error(&mut self) {
    self.shown_error = None;
  }
}

#[derive(Debug, Default)]
pub struct RecordingTransport {
  sent: RefCell<Vec<ToggleRequest>>
}

impl RecordingTransport {
  pub fn sent(
    &self
  ) -> Vec<ToggleRequest> {
    self.sent.borrow().clone()
  }
}

impl Transport for RecordingTransport {
  fn send(&self, request: ToggleRequest) {
    self.sent.borrow_mut().push(request);
  }
}

/// Virtual clock for deferred commands.
#[derive(Debug, Default)]
pub struct ManualTimers {
  now_ms:  u64,
  pending: Vec<(u64, Command)>
}

impl ManualTimers {
  pub fn now_ms(&self) -> u64 {
    self.now_ms
  }

  pub fn pending(&self) -> usize {
    self.pending.len()
  }

  pub fn schedule(
    &mut self,
    deferred: Deferred
  ) {
    let due = self.now_ms
      + u64::from(deferred.after_ms);
    self
      .pending
      .push((due, deferred.command));
  }

  /// Moves the clock forward and returns
  /// the commands that fell due, oldest
  /// first.
  pub fn advance(
    &mut self,
    ms: u64
  ) -> Vec<Command> {
    self.now_ms += ms;
    let now = self.now_ms;

    let (mut due, waiting): (Vec<_>, Vec<_>) =
      std::mem::take(&mut self.pending)
        .into_iter()
        .partition(|(at, _)| *at <= now);
    self.pending = waiting;

    due.sort_by_key(|(at, _)| *at);
    due
      .into_iter()
      .map(|(_, command)| command)
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timers_fire_only_when_due() {
    let mut timers =
      ManualTimers::default();
    timers.schedule(Deferred {
      after_ms: 5_000,
      command:  Command::CancelDelete
    });

    assert!(timers.advance(4_999).is_empty());
    assert_eq!(timers.pending(), 1);
    assert_eq!(
      timers.advance(1),
      vec![Command::CancelDelete]
    );
    assert_eq!(timers.pending(), 0);
    assert_eq!(timers.now_ms(), 5_000);
  }

  #[test]
  fn absent_overlay_never_activates() {
    let mut page = MemoryPage::complete()
      .without_overlay(OverlayId::Toast);
    page.set_overlay_active(
      OverlayId::Toast,
      true
    );
    assert!(!page.is_active(OverlayId::Toast));
  }
}
