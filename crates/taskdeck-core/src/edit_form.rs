use serde::{
  Deserialize,
  Serialize
};

use crate::config::Endpoints;
use crate::error::AttrError;

pub const ATTR_TASK_ID: &str = "taskid";
pub const ATTR_TASK_NAME: &str =
  "taskname";
pub const ATTR_PRIORITY: &str =
  "priority";
pub const ATTR_DEADLINE: &str =
  "deadline";

/// Data attributes as read from a
/// trigger control, before validation.
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
pub struct TaskAttrs {
  pub task_id:   Option<String>,
  pub task_name: Option<String>,
  pub priority:  Option<String>,
  pub deadline:  Option<String>
}

impl TaskAttrs {
  pub fn with_id(
    task_id: impl Into<String>
  ) -> Self {
    Self {
      task_id: Some(task_id.into()),
      ..Self::default()
    }
  }

  /// Task id as carried by a delete
  /// trigger or a checkbox.
  pub fn require_id(
    &self
  ) -> Result<&str, AttrError> {
    let id =
      self.task_id.as_deref().ok_or_else(
        || {
          AttrError::Missing(
            ATTR_TASK_ID.to_string()
          )
        }
      )?;
    if id.trim().is_empty() {
      return Err(AttrError::BlankTaskId);
    }
    Ok(id)
  }
}

/// A task as shown in the edit popup.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct TaskRef {
  pub task_id:   String,
  pub task_name: String,
  pub priority:  String,
  pub deadline:  String
}

impl TaskRef {
  pub fn for_edit(
    attrs: &TaskAttrs
  ) -> Result<Self, AttrError> {
    let task_id =
      attrs.require_id()?.to_string();
    Ok(Self {
      task_id,
      task_name: required(
        &attrs.task_name,
        ATTR_TASK_NAME
      )?,
      priority: required(
        &attrs.priority,
        ATTR_PRIORITY
      )?,
      deadline: required(
        &attrs.deadline,
        ATTR_DEADLINE
      )?
    })
  }
}

fn required(
  value: &Option<String>,
  name: &str
) -> Result<String, AttrError> {
  value.clone().ok_or_else(|| {
    AttrError::Missing(name.to_string())
  })
}

/// Everything written into the edit
/// form for one task.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct EditBinding {
  pub action:    String,
  pub task_name: String,
  pub priority:  String,
  pub deadline:  String
}

impl EditBinding {
  pub fn new(
    task: TaskRef,
    endpoints: &Endpoints
  ) -> Self {
    Self {
      action:    endpoints
        .update_url(&task.task_id),
      task_name: task.task_name,
      priority:  task.priority,
      deadline:  task.deadline
    }
  }
}
