//! Drives a form: presents questions in order, judges submitted answers and
//! records the accepted ones.
//!
//! The manager only speaks [`FlowEvent`]s. It reacts to `user-input-submit`
//! and answers with either `user-input-invalid` (the input component shows
//! the rejection and recovers on its own) or the next `flow-update`.

use std::collections::HashMap;

use chatform_types::{FlowEvent, FlowTag, Topic};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info};

use crate::definition::{DefinitionError, FormDefinition, compile_pattern};
use crate::validation::validate_answer;

/// Sequencer for a single run through a [`FormDefinition`].
#[derive(Debug)]
pub struct FlowManager {
    definition: FormDefinition,
    patterns: HashMap<String, Regex>,
    position: usize,
    started: bool,
    answers: IndexMap<String, Value>,
}

impl FlowManager {
    /// Builds a manager after validating the definition.
    pub fn new(definition: FormDefinition) -> Result<Self, DefinitionError> {
        definition.validate()?;
        let mut patterns = HashMap::new();
        for entry in &definition.tags {
            for tag in entry.panel_tags() {
                if let Some(pattern) = &tag.pattern {
                    patterns.insert(tag.name.clone(), compile_pattern(&tag.name, pattern)?);
                }
            }
        }
        Ok(Self {
            definition,
            patterns,
            position: 0,
            started: false,
            answers: IndexMap::new(),
        })
    }

    /// Topics the manager consumes.
    pub fn topics() -> &'static [Topic] {
        &[Topic::UserInputSubmit]
    }

    pub fn title(&self) -> Option<&str> {
        self.definition.title.as_deref()
    }

    pub fn question_count(&self) -> usize {
        self.definition.tags.len()
    }

    /// Presents the first question.
    pub fn start(&mut self) -> Vec<FlowEvent> {
        self.started = true;
        self.position = 0;
        self.answers.clear();
        self.current().cloned().map(FlowEvent::FlowUpdate).into_iter().collect()
    }

    /// The question currently awaiting an answer.
    pub fn current(&self) -> Option<&FlowTag> {
        if !self.started {
            return None;
        }
        self.definition.tags.get(self.position)
    }

    pub fn is_complete(&self) -> bool {
        self.started && self.position >= self.definition.tags.len()
    }

    /// Accepted answers keyed by question name, in presentation order.
    pub fn answers(&self) -> &IndexMap<String, Value> {
        &self.answers
    }

    /// Accepted answers as a JSON object.
    pub fn answers_json(&self) -> Value {
        Value::Object(self.answers.iter().map(|(key, value)| (key.clone(), value.clone())).collect())
    }

    /// Reacts to a bus event, returning the events to publish in response.
    pub fn handle_event(&mut self, event: &FlowEvent) -> Vec<FlowEvent> {
        let FlowEvent::UserInputSubmit(dto) = event else {
            return Vec::new();
        };
        let Some(tag) = self.current() else {
            debug!("submit received with no open question; ignoring");
            return Vec::new();
        };

        match validate_answer(tag, &dto.payload, &self.patterns) {
            Ok(value) => {
                let name = tag.name().to_string();
                info!(question = %name, "answer accepted");
                self.answers.insert(name, value);
                self.position += 1;
                self.current().cloned().map(FlowEvent::FlowUpdate).into_iter().collect()
            }
            Err(rejection) => {
                info!(question = %tag.name(), "answer rejected");
                let mut invalid = dto.clone();
                invalid.error_text = rejection.message;
                vec![FlowEvent::UserInputInvalid(invalid)]
            }
        }
    }
}
