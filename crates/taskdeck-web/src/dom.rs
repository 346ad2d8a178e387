use std::collections::BTreeMap;

use taskdeck_core::edit_form::{
  ATTR_DEADLINE,
  ATTR_PRIORITY,
  ATTR_TASK_ID,
  ATTR_TASK_NAME,
  EditBinding
};
use taskdeck_core::{
  OverlayId,
  Page,
  TaskAttrs
};
use wasm_bindgen::JsCast;
use web_sys::{
  Document,
  Element,
  HtmlFormElement,
  HtmlInputElement,
  HtmlSelectElement,
  HtmlTextAreaElement
};

use crate::markup::{
  ACTIVE_CLASS,
  DELETE_CANCEL,
  DELETE_CONFIRM,
  EDIT_DEADLINE_FIELD,
  EDIT_FORM,
  EDIT_NAME_FIELD,
  EDIT_PRIORITY_FIELD,
  INLINE_ERROR_ID,
  data_attr,
  overlay_markup
};

struct EditFormElements {
  form:     HtmlFormElement,
  name:     Element,
  priority: Element,
  deadline: Element
}

/// The server-rendered page. Elements
/// are looked up once; anything absent
/// stays `None` and its operations do
/// nothing.
pub struct DomPage {
  document: Document,
  overlays: BTreeMap<OverlayId, Element>,
  edit:     Option<EditFormElements>
}

impl DomPage {
  pub fn new(document: Document) -> Self {
    let overlays = OverlayId::all()
      .into_iter()
      .filter_map(|id| {
        select_one(
          &document,
          overlay_markup(id).overlay
        )
        .map(|el| (id, el))
      })
      .collect();

    let edit = lookup_edit_form(&document);
    if edit.is_none() {
      tracing::debug!(
        "edit form incomplete; edit \
         triggers stay unwired"
      );
    }

    Self {
      document,
      overlays,
      edit
    }
  }
}

impl Page for DomPage {
  fn has_overlay(
    &self,
    id: OverlayId
  ) -> bool {
    self.overlays.contains_key(&id)
  }

  fn has_controls(
    &self,
    id: OverlayId
  ) -> bool {
    if id == OverlayId::ConfirmDelete {
      return exists(
        &self.document,
        DELETE_CONFIRM
      ) && exists(
        &self.document,
        DELETE_CANCEL
      );
    }

    let markup = overlay_markup(id);
    markup
      .trigger
      .iter()
      .chain(markup.close.iter())
      .all(|selector| {
        exists(&self.document, selector)
      })
  }

  fn has_edit_form(&self) -> bool {
    self.edit.is_some()
  }

  fn set_overlay_active(
    &mut self,
    id: OverlayId,
    active: bool
  ) {
    let Some(el) = self.overlays.get(&id)
    else {
      return;
    };

    let classes = el.class_list();
    let result = if active {
      classes.add_1(ACTIVE_CLASS)
    } else {
      classes.remove_1(ACTIVE_CLASS)
    };
    if let Err(error) = result {
      tracing::warn!(overlay = id.as_key(), ?error, "failed to update overlay class");
    }
  }

  fn fill_edit_form(
    &mut self,
    binding: &EditBinding
  ) {
    let Some(edit) = self.edit.as_ref()
    else {
      return;
    };

    set_control_value(
      &edit.name,
      &binding.task_name
    );
    set_control_value(
      &edit.priority,
      &binding.priority
    );
    set_control_value(
      &edit.deadline,
      &binding.deadline
    );
    edit.form.set_action(&binding.action);
  }

  fn navigate(&mut self, url: &str) {
    let Some(window) = web_sys::window()
    else {
      tracing::error!(url, "no window to navigate");
      return;
    };

    if let Err(error) =
      window.location().set_href(url)
    {
      tracing::error!(url, ?error, "navigation failed");
    }
  }

  fn show_inline_error(
    &mut self,
    message: &str
  ) {
    let Some(slot) = self.error_slot()
    else {
      tracing::warn!(
        message,
        "no place to show inline error"
      );
      return;
    };

    slot.set_text_content(Some(message));
    if let Err(error) =
      slot.class_list().add_1(ACTIVE_CLASS)
    {
      tracing::warn!(?error, "failed to show inline error");
    }
  }

  fn clear_inline_error(&mut self) {
    let Some(slot) = self
      .document
      .get_element_by_id(INLINE_ERROR_ID)
    else {
      return;
    };

    slot.set_text_content(None);
    if let Err(error) = slot
      .class_list()
      .remove_1(ACTIVE_CLASS)
    {
      tracing::warn!(?error, "failed to clear inline error");
    }
  }
}

impl DomPage {
  /// The page's error slot, created at
  /// the top of `<body>` when the markup
  /// has none.
  fn error_slot(&self) -> Option<Element> {
    if let Some(slot) = self
      .document
      .get_element_by_id(INLINE_ERROR_ID)
    {
      return Some(slot);
    }

    let body = self.document.body()?;
    let slot = self
      .document
      .create_element("div")
      .ok()?;
    slot.set_id(INLINE_ERROR_ID);
    slot.set_class_name("inline-error");
    let _ = slot
      .set_attribute("role", "alert");
    body
      .insert_before(
        &slot,
        body.first_child().as_ref()
      )
      .ok()?;
    Some(slot)
  }
}

/// Reads the task data attributes off a
/// trigger control.
pub fn task_attrs(el: &Element) -> TaskAttrs {
  let read = |name: &str| {
    el.get_attribute(&data_attr(name))
  };

  TaskAttrs {
    task_id:   read(ATTR_TASK_ID),
    task_name: read(ATTR_TASK_NAME),
    priority:  read(ATTR_PRIORITY),
    deadline:  read(ATTR_DEADLINE)
  }
}

fn select_one(
  document: &Document,
  selector: &str
) -> Option<Element> {
  document
    .query_selector(selector)
    .ok()
    .flatten()
}

pub fn select_all(
  document: &Document,
  selector: &str
) -> Vec<Element> {
  let Ok(list) =
    document.query_selector_all(selector)
  else {
    tracing::warn!(
      selector,
      "invalid selector"
    );
    return Vec::new();
  };

  (0..list.length())
    .filter_map(|index| list.item(index))
    .filter_map(|node| {
      node.dyn_into::<Element>().ok()
    })
    .collect()
}

fn exists(
  document: &Document,
  selector: &str
) -> bool {
  select_one(document, selector)
    .is_some()
}

fn lookup_edit_form(
  document: &Document
) -> Option<EditFormElements> {
  let form = select_one(document, EDIT_FORM)?
    .dyn_into::<HtmlFormElement>()
    .ok()?;

  Some(EditFormElements {
    form,
    name: select_one(
      document,
      EDIT_NAME_FIELD
    )?,
    priority: select_one(
      document,
      EDIT_PRIORITY_FIELD
    )?,
    deadline: select_one(
      document,
      EDIT_DEADLINE_FIELD
    )?
  })
}

fn set_control_value(
  el: &Element,
  value: &str
) {
  if let Some(input) =
    el.dyn_ref::<HtmlInputElement>()
  {
    input.set_value(value);
  } else if let Some(select) =
    el.dyn_ref::<HtmlSelectElement>()
  {
    select.set_value(value);
  } else if let Some(area) =
    el.dyn_ref::<HtmlTextAreaElement>()
  {
    area.set_value(value);
  } else {
    let _ =
      el.set_attribute("value", value);
  }
}

#[cfg(test)]
mod tests {
  use taskdeck_core::Features;
  use taskdeck_core::config::Endpoints;
  use taskdeck_core::edit_form::TaskRef;
  use wasm_bindgen_test::wasm_bindgen_test;

  use super::*;

  const EDIT_PAGE: &str = r#"
    <div id="add-task-popup"></div>
    <button id="open-task-btn"></button>
    <div id="edit-task-popup">
      <form id="edit-task-form" method="post">
        <input id="edit-task">
        <select id="edit-priority">
          <option value="Low">Low</option>
          <option value="High">High</option>
        </select>
        <textarea id="edit-deadline"></textarea>
      </form>
    </div>
    <div class="toast">Saved</div>
    <div id="confirm-delete-popup">
      <button class="confirm-delete-btn"></button>
    </div>
  "#;

  fn mount(html: &str) -> Document {
    let document = web_sys::window()
      .and_then(|w| w.document())
      .expect("test document");
    document
      .body()
      .expect("body")
      .set_inner_html(html);
    document
  }

  fn value_of(document: &Document, selector: &str) -> String {
    let el = select_one(document, selector).expect(selector);
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
      input.value()
    } else if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
      select.value()
    } else {
      el.dyn_ref::<HtmlTextAreaElement>()
        .expect("textarea")
        .value()
    }
  }

  #[wasm_bindgen_test]
  fn features_follow_rendered_markup() {
    let page = DomPage::new(mount(EDIT_PAGE));
    let features = Features::detect(&page);

    // no close button and no cancel button
    assert!(!features.add_task);
    assert!(!features.delete);
    assert!(features.edit);
    assert!(features.toast);
    assert!(!features.toast_close);
    assert!(!features.profile);
    assert!(page.has_overlay(OverlayId::ConfirmDelete));
  }

  #[wasm_bindgen_test]
  fn fill_edit_form_sets_every_control_kind() {
    let document = mount(EDIT_PAGE);
    let mut page = DomPage::new(document.clone());
    let task = TaskRef::for_edit(&TaskAttrs {
      task_id: Some("3".to_string()),
      task_name: Some("Water plants".to_string()),
      priority: Some("High".to_string()),
      deadline: Some("2025-06-01".to_string()),
    })
    .expect("valid attrs");

    page.fill_edit_form(&EditBinding::new(task, &Endpoints::default()));

    assert_eq!(value_of(&document, EDIT_NAME_FIELD), "Water plants");
    assert_eq!(value_of(&document, EDIT_PRIORITY_FIELD), "High");
    assert_eq!(value_of(&document, EDIT_DEADLINE_FIELD), "2025-06-01");
    let form = select_one(&document, EDIT_FORM).expect("form");
    assert_eq!(
      form.get_attribute("action").as_deref(),
      Some("/update_task/3")
    );
  }

  #[wasm_bindgen_test]
  fn inline_error_is_created_then_cleared() {
    let document = mount(EDIT_PAGE);
    let mut page = DomPage::new(document.clone());

    page.show_inline_error("task control has a blank task id");
    let slot = document
      .get_element_by_id(INLINE_ERROR_ID)
      .expect("error slot created");
    assert!(slot.class_list().contains(ACTIVE_CLASS));
    assert_eq!(
      slot.text_content().as_deref(),
      Some("task control has a blank task id")
    );

    page.clear_inline_error();
    assert!(!slot.class_list().contains(ACTIVE_CLASS));
    assert_eq!(slot.text_content().as_deref(), Some(""));
  }

  #[wasm_bindgen_test]
  fn task_attrs_read_data_attributes() {
    let document = mount(
      r#"<button class="edit-btn" data-taskid="8" data-taskname="Read"
                 data-priority="Low"></button>"#,
    );
    let button = select_one(&document, ".edit-btn").expect("button");

    let attrs = task_attrs(&button);
    assert_eq!(attrs.task_id.as_deref(), Some("8"));
    assert_eq!(attrs.task_name.as_deref(), Some("Read"));
    assert_eq!(attrs.priority.as_deref(), Some("Low"));
    assert_eq!(attrs.deadline, None);
  }
}
