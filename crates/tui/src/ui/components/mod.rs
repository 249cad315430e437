//! UI components: the user input, its control elements and the transcript.

pub mod common;
pub mod component;
pub mod control_elements;
pub mod transcript;
pub mod user_input;

pub use component::Component;
pub use transcript::TranscriptComponent;
pub use user_input::UserInputComponent;
