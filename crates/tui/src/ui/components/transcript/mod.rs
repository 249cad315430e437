mod transcript_component;

pub use transcript_component::{Speaker, TranscriptComponent, TranscriptEntry};
