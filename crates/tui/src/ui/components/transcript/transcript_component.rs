//! The conversation so far: questions asked and answers given.

use chatform_types::{FlowEvent, FlowPayload};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::bus::EventPort;
use crate::ui::components::component::Component;
use crate::ui::theme::Theme;
use crate::ui::theme::helpers as th;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Form,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
    /// Answer turned down by the flow engine.
    pub rejected: bool,
}

/// Chat-style log fed by the flow events it observes.
#[derive(Debug, Default)]
pub struct TranscriptComponent {
    title: String,
    entries: Vec<TranscriptEntry>,
}

impl TranscriptComponent {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            speaker,
            text: text.into(),
            rejected: false,
        });
    }
}

impl Component for TranscriptComponent {
    fn handle_flow_event(&mut self, event: &FlowEvent, _port: &mut dyn EventPort) {
        match event {
            FlowEvent::FlowUpdate(tag) => {
                let question = if tag.question().is_empty() { tag.name() } else { tag.question() };
                self.push(Speaker::Form, question);
            }
            FlowEvent::UserInputSubmit(dto) => {
                let text = match &dto.payload {
                    FlowPayload::Text(text) => text.clone(),
                    FlowPayload::Controls(value) => value.text.clone(),
                };
                self.push(Speaker::User, text);
            }
            FlowEvent::UserInputInvalid(_) => {
                if let Some(last) = self.entries.last_mut().filter(|entry| entry.speaker == Speaker::User) {
                    last.rejected = true;
                }
            }
            _ => {}
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, theme: &dyn Theme) {
        let block = th::block(theme, Some(self.title.as_str()), false);
        let inner_height = rect.height.saturating_sub(2) as usize;

        let lines: Vec<Line> = self
            .entries
            .iter()
            .map(|entry| match entry.speaker {
                Speaker::Form => Line::from(vec![
                    Span::styled("› ", theme.accent_primary_style()),
                    Span::styled(entry.text.as_str(), theme.text_primary_style()),
                ]),
                Speaker::User if entry.rejected => Line::from(Span::styled(
                    entry.text.as_str(),
                    theme.status_error().add_modifier(Modifier::CROSSED_OUT),
                ))
                .right_aligned(),
                Speaker::User => Line::from(Span::styled(entry.text.as_str(), theme.accent_emphasis_style())).right_aligned(),
            })
            .collect();

        // Keep the latest exchange in view.
        let scroll = lines.len().saturating_sub(inner_height) as u16;
        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false }).scroll((scroll, 0));
        frame.render_widget(paragraph, rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;
    use chatform_types::{FlowDto, Tag, TagKind};

    #[test]
    fn records_questions_answers_and_rejections() {
        let mut transcript = TranscriptComponent::new("Signup");
        let mut bus = EventBus::new();
        let tag = Tag::new("email", TagKind::Text).with_question("Your email?");

        transcript.handle_flow_event(&FlowEvent::FlowUpdate(tag.into()), &mut bus);
        transcript.handle_flow_event(&FlowEvent::UserInputSubmit(FlowDto::text("nope")), &mut bus);
        transcript.handle_flow_event(&FlowEvent::UserInputInvalid(FlowDto::text("nope")), &mut bus);
        transcript.handle_flow_event(&FlowEvent::UserInputSubmit(FlowDto::text("a@b.c")), &mut bus);

        let entries = transcript.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].text, "Your email?");
        assert!(entries[1].rejected);
        assert!(!entries[2].rejected);
        assert!(bus.next_event().is_none());
    }
}
