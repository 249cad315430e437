//! Control elements generated for the current question and the panel that owns them.

#[allow(clippy::module_inception)]
mod control_elements;
mod element;

pub use control_elements::{ControlElements, ElementSlot};
pub use element::{ControlElement, ControlKind};
