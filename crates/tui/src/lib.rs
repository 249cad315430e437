//! # Chatform TUI Library
//!
//! Terminal front end for conversational forms. Questions arrive one at a
//! time from the flow engine and are answered in a single input area that
//! switches between free text and a panel of control elements (radio
//! buttons, checkboxes, option lists, buttons, file uploads).
//!
//! ## Architecture
//!
//! Components never share state. They talk through an [`bus::EventPort`]:
//! the flow engine publishes questions and rejections, the input component
//! publishes submissions and key changes, and the runtime pumps the queue
//! in emit order. Timers are single-slot deadlines polled on every tick
//! against an injectable [`timer::Clock`].

pub mod bus;
pub mod timer;
pub mod ui;

use anyhow::Result;
use chatform_engine::FlowManager;
use chatform_util::InputConfig;
use serde_json::Value;

/// Runs a form in the terminal until it completes or the user quits.
///
/// Returns the accepted answers as a JSON object keyed by question name.
///
/// # Errors
///
/// Fails when the terminal cannot be set up or drawn to.
pub async fn run(manager: FlowManager, config: InputConfig) -> Result<Value> {
    ui::runtime::run_app(manager, config).await
}
