//! UI for the conversational form: components, focus bookkeeping, key
//! translation, theming, and the terminal runtime that hosts them.

pub mod components;
pub mod focus;
pub mod keys;
pub mod runtime;
pub mod theme;
