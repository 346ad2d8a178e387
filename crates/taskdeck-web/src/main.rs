mod api;
mod dom;
mod markup;
mod wiring;

use gloo::events::EventListener;

#[cfg(test)]
wasm_bindgen_test::wasm_bindgen_test_configure!(
  run_in_browser
);

fn main() {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  tracing::info!(
    "starting taskdeck page script"
  );

  let Some(document) = web_sys::window()
    .and_then(|window| {
      window.document()
    })
  else {
    tracing::error!(
      "no document; nothing to wire"
    );
    return;
  };

  if document.ready_state() == "loading" {
    let target = document.clone();
    EventListener::once(
      &document,
      "DOMContentLoaded",
      move |_| wiring::start(&target)
    )
    .forget();
  } else {
    wiring::start(&document);
  }
}
