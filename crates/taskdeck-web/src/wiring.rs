use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{
  EventListener,
  EventListenerOptions
};
use gloo::timers::callback::Timeout;
use taskdeck_core::{
  Command,
  Config,
  Deferred,
  Dispatcher,
  OverlayId,
  TaskAttrs
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::{
  Closure,
  JsValue
};
use web_sys::{
  Document,
  Element,
  HtmlInputElement
};

use crate::api::FetchTransport;
use crate::dom::{
  DomPage,
  select_all,
  task_attrs
};
use crate::markup::{
  DELETE_CANCEL,
  DELETE_CONFIRM,
  DELETE_TRIGGER,
  EDIT_TRIGGER,
  GLOBAL_TOGGLE,
  INLINE_TOGGLE_ATTR,
  TASK_CHECKBOX,
  overlay_markup
};

const CONFIG_TOML: &str =
  include_str!("../assets/taskdeck.toml");

pub type Shared = Rc<
  RefCell<
    Dispatcher<DomPage, FetchTransport>
  >
>;

fn load_config() -> Config {
  match Config::from_toml_str(CONFIG_TOML)
  {
    | Ok(config) => {
      tracing::info!(
        toast_ms = config.toast.duration_ms,
        exclusive = config.overlays.exclusive,
        "loaded page config"
      );
      config
    }
    | Err(error) => {
      tracing::error!(%error, "failed to parse page config; using defaults");
      Config::default()
    }
  }
}

/// Builds the dispatcher for `document`,
/// shows the toast and attaches every
/// listener whose elements are present.
pub fn start(document: &Document) {
  let config = load_config();
  let transport =
    FetchTransport::new(config.toggle.clone());
  let page = DomPage::new(document.clone());
  let mut dispatcher =
    Dispatcher::new(page, transport, config);

  let deferred = dispatcher.boot();
  let shared: Shared =
    Rc::new(RefCell::new(dispatcher));

  if let Some(deferred) = deferred {
    schedule(&shared, deferred);
  }

  let listeners = attach(&shared, document);
  tracing::info!(
    listeners = listeners.len(),
    "task page wired"
  );
  for listener in listeners {
    listener.forget();
  }

  expose_toggle(&shared);
}

/// Publishes `window.toggleTask(id,
/// checked)` for server markup with
/// inline `onchange` handlers.
fn expose_toggle(shared: &Shared) {
  let Some(window) = web_sys::window()
  else {
    return;
  };

  let shared = shared.clone();
  let toggle = Closure::<
    dyn Fn(JsValue, JsValue)
  >::new(
    move |task_id: JsValue, checked: JsValue| {
      let attrs = match js_task_id(&task_id)
      {
        | Some(id) => TaskAttrs::with_id(id),
        | None => TaskAttrs::default()
      };
      dispatch(&shared, Command::ToggleTask {
        attrs,
        checked: checked.is_truthy()
      });
    }
  );

  let published = js_sys::Reflect::set(
    window.as_ref(),
    &JsValue::from_str(GLOBAL_TOGGLE),
    toggle.as_ref()
  );
  match published {
    | Ok(_) => toggle.forget(),
    | Err(error) => {
      tracing::error!(
        ?error,
        "failed to publish toggleTask"
      );
    }
  }
}

/// Templates pass ids as strings or as
/// bare numbers.
fn js_task_id(
  value: &JsValue
) -> Option<String> {
  value.as_string().or_else(|| {
    value.as_f64().map(|n| n.to_string())
  })
}

fn dispatch(
  shared: &Shared,
  command: Command
) {
  match shared.try_borrow_mut() {
    | Ok(mut dispatcher) => {
      dispatcher.dispatch(command);
    }
    | Err(_) => {
      tracing::warn!(
        ?command,
        "dispatcher busy; dropping \
         command"
      );
    }
  }
}

fn schedule(
  shared: &Shared,
  deferred: Deferred
) {
  let shared = shared.clone();
  let Deferred { after_ms, command } =
    deferred;
  Timeout::new(after_ms, move || {
    dispatch(&shared, command);
  })
  .forget();
}

fn attach(
  shared: &Shared,
  document: &Document
) -> Vec<EventListener> {
  let features =
    shared.borrow().features();
  let mut listeners = Vec::new();

  for id in [
    OverlayId::AddTask,
    OverlayId::Profile,
    OverlayId::Collaborators,
    OverlayId::Toast
  ] {
    let wired = match id {
      | OverlayId::Toast => {
        features.toast_close
      }
      | _ => features.covers(id)
    };
    if !wired {
      continue;
    }
    let markup = overlay_markup(id);
    if let Some(trigger) = markup.trigger
    {
      on_click_all(
        &mut listeners,
        shared,
        document,
        trigger,
        move |_| Command::TriggerOverlay {
          overlay: id
        }
      );
    }
    if let Some(close) = markup.close {
      on_click_all(
        &mut listeners,
        shared,
        document,
        close,
        move |_| Command::CloseOverlay {
          overlay: id
        }
      );
    }
  }

  if features.edit {
    on_click_all(
      &mut listeners,
      shared,
      document,
      EDIT_TRIGGER,
      |button| Command::EditTask {
        attrs: task_attrs(button)
      }
    );
    if let Some(close) =
      overlay_markup(OverlayId::EditTask)
        .close
    {
      on_click_all(
        &mut listeners,
        shared,
        document,
        close,
        |_| Command::CloseOverlay {
          overlay: OverlayId::EditTask
        }
      );
    }
  }

  if features.delete {
    for button in
      select_all(document, DELETE_TRIGGER)
    {
      let shared = shared.clone();
      let target = button.clone();
      listeners.push(
        EventListener::new_with_options(
          &button,
          "click",
          EventListenerOptions::enable_prevent_default(),
          move |event| {
            event.prevent_default();
            dispatch(
              &shared,
              Command::RequestDelete {
                attrs: task_attrs(&target)
              }
            );
          }
        )
      );
    }
    on_click_all(
      &mut listeners,
      shared,
      document,
      DELETE_CONFIRM,
      |_| Command::ConfirmDelete
    );
    on_click_all(
      &mut listeners,
      shared,
      document,
      DELETE_CANCEL,
      |_| Command::CancelDelete
    );
  }

  for checkbox in
    select_all(document, TASK_CHECKBOX)
  {
    // Already calls toggleTask inline; a
    // second listener would post twice.
    if checkbox
      .has_attribute(INLINE_TOGGLE_ATTR)
    {
      continue;
    }
    let Ok(input) =
      checkbox.clone().dyn_into::<HtmlInputElement>()
    else {
      continue;
    };
    let shared = shared.clone();
    listeners.push(EventListener::new(
      &checkbox,
      "change",
      move |_| {
        dispatch(
          &shared,
          Command::ToggleTask {
            attrs:   task_attrs(&input),
            checked: input.checked()
          }
        );
      }
    ));
  }

  listeners
}

fn on_click_all<F>(
  listeners: &mut Vec<EventListener>,
  shared: &Shared,
  document: &Document,
  selector: &str,
  command: F
) where
  F: Fn(&Element) -> Command
    + Clone
    + 'static
{
  for el in select_all(document, selector) {
    let shared = shared.clone();
    let command = command.clone();
    let target = el.clone();
    listeners.push(EventListener::new(
      &el,
      "click",
      move |_| {
        dispatch(&shared, command(&target));
      }
    ));
  }
}

#[cfg(test)]
mod tests {
  use wasm_bindgen_test::wasm_bindgen_test;
  use web_sys::{Event, EventInit};

  use super::*;
  use crate::markup::{ACTIVE_CLASS, INLINE_ERROR_ID};

  const DELETE_PAGE: &str = r#"
    <div id="confirm-delete-popup">
      <button class="confirm-delete-btn">Delete</button>
      <button class="cancel-delete-btn">Keep</button>
    </div>
    <a class="delete-btn" id="with-id" href="/delete_task/7" data-taskid="7">x</a>
    <a class="delete-btn" id="without-id" href="/delete_task/">x</a>
  "#;

  fn wire(html: &str) -> Document {
    let document = web_sys::window()
      .and_then(|w| w.document())
      .expect("test document");
    document.body().expect("body").set_inner_html(html);
    start(&document);
    document
  }

  fn click(document: &Document, selector: &str) -> Event {
    let init = EventInit::new();
    init.set_bubbles(true);
    init.set_cancelable(true);
    let event = Event::new_with_event_init_dict("click", &init).expect("click event");
    document
      .query_selector(selector)
      .ok()
      .flatten()
      .expect(selector)
      .dispatch_event(&event)
      .expect("dispatch click");
    event
  }

  fn is_active(document: &Document, selector: &str) -> bool {
    document
      .query_selector(selector)
      .ok()
      .flatten()
      .is_some_and(|el| el.class_list().contains(ACTIVE_CLASS))
  }

  #[wasm_bindgen_test]
  fn delete_trigger_never_follows_its_link() {
    let document = wire(DELETE_PAGE);

    let event = click(&document, "#with-id");

    assert!(event.default_prevented());
    assert!(is_active(&document, "#confirm-delete-popup"));
  }

  #[wasm_bindgen_test]
  fn delete_trigger_without_id_is_blocked_and_reported() {
    let document = wire(DELETE_PAGE);

    let event = click(&document, "#without-id");

    assert!(event.default_prevented());
    assert!(!is_active(&document, "#confirm-delete-popup"));
    assert!(is_active(&document, &format!("#{INLINE_ERROR_ID}")));
  }

  #[wasm_bindgen_test]
  fn cancel_closes_confirmation() {
    let document = wire(DELETE_PAGE);

    click(&document, "#with-id");
    click(&document, ".cancel-delete-btn");

    assert!(!is_active(&document, "#confirm-delete-popup"));
  }

  #[wasm_bindgen_test]
  fn toggle_task_is_published_on_window() {
    let document = wire(DELETE_PAGE);
    let window = web_sys::window().expect("window");

    let global = js_sys::Reflect::get(window.as_ref(), &JsValue::from_str(GLOBAL_TOGGLE))
      .expect("read toggleTask");
    let toggle: js_sys::Function = global.dyn_into().expect("toggleTask is a function");

    toggle
      .call2(&JsValue::NULL, &JsValue::UNDEFINED, &JsValue::TRUE)
      .expect("call toggleTask");
    assert!(is_active(&document, &format!("#{INLINE_ERROR_ID}")));
  }

  #[wasm_bindgen_test]
  fn numeric_ids_from_templates_are_accepted() {
    assert_eq!(js_task_id(&JsValue::from_f64(12.0)).as_deref(), Some("12"));
    assert_eq!(js_task_id(&JsValue::from_str("ab")).as_deref(), Some("ab"));
    assert_eq!(js_task_id(&JsValue::UNDEFINED), None);
  }
}
