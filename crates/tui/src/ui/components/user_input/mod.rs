//! The user input component and its text-entry surface.

mod input_surface;
mod user_input_component;
mod user_input_view;

pub use input_surface::InputSurface;
pub use user_input_component::{InteractionState, UserInputComponent};
