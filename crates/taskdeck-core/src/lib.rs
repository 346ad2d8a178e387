pub mod config;
pub mod delete_flow;
pub mod dispatch;
pub mod edit_form;
pub mod error;
pub mod memory;
pub mod overlay;
pub mod page;
pub mod toggle;

pub use config::Config;
pub use dispatch::{
  Command,
  Deferred,
  Dispatcher,
  Ignored,
  Outcome
};
pub use edit_form::TaskAttrs;
pub use overlay::OverlayId;
pub use page::{
  Features,
  Page
};
pub use toggle::{
  ToggleRequest,
  Transport
};
