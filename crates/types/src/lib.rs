//! Shared type definitions for the chatform crates.
//!
//! The input component, the control-elements panel and the flow engine talk
//! to each other exclusively through the types in this crate: questions
//! ([`FlowTag`]), answers ([`FlowDto`]) and the events that carry them
//! ([`FlowEvent`]).

pub mod events;
pub mod flow;
pub mod tag;

pub use events::{ControlElementRef, FlowEvent, InputKeyChange, ProgressState, Topic};
pub use flow::{ControlSelection, ControlValue, FlowDto, FlowPayload, InputId};
pub use tag::{FlowTag, Tag, TagGroup, TagKind, TagOption};
