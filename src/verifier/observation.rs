//! Pure trigger evaluation.
//!
//! Everything the verifier knows about one editing event is gathered into an
//! [`Observation`] first; deciding whether a [`Trigger`] is satisfied is then
//! a plain function with no access to the surface or the session.

use crate::catalog::{Position, Trigger};
use crate::surface::{ActiveEditor, DocumentSnapshot, SAVE_COMMAND};

/// One editing event, as seen by the trigger evaluator.
#[derive(Clone, Copy, Debug)]
pub struct Observation<'a> {
    /// Document the event fired for.
    pub document: &'a DocumentSnapshot,
    /// Host command the event stands for. Only saves are observable.
    pub command_id: Option<&'a str>,
    /// Focused editor at the time of the event.
    pub active: Option<&'a ActiveEditor>,
}

impl<'a> Observation<'a> {
    pub fn new(
        document: &'a DocumentSnapshot,
        command_id: Option<&'a str>,
        active: Option<&'a ActiveEditor>,
    ) -> Self {
        Self {
            document,
            command_id,
            active,
        }
    }

    /// Whether this event satisfies `trigger`.
    ///
    /// `state` triggers are reserved and never satisfied.
    pub fn evaluate(&self, trigger: &Trigger) -> bool {
        match trigger {
            Trigger::Command { command_id } => {
                command_id == SAVE_COMMAND && self.command_id == Some(SAVE_COMMAND)
            }
            Trigger::Content {
                match_content,
                min_events,
            } => {
                if min_events.is_some_and(|min| self.document.version < min) {
                    return false;
                }
                content_matches(&self.document.text, match_content)
            }
            Trigger::Selection { match_selection } => self
                .active
                .filter(|a| a.document == self.document.document)
                .is_some_and(|a| cursor_matches(a.cursor, *match_selection)),
            Trigger::State { .. } => false,
        }
    }
}

/// Substring match with carriage returns stripped from both sides.
pub fn content_matches(text: &str, target: &str) -> bool {
    strip_cr(text).contains(&strip_cr(target))
}

pub fn cursor_matches(cursor: Position, target: Position) -> bool {
    cursor == target
}

/// A command trigger satisfied by an explicitly intercepted command.
pub fn command_matches(trigger: &Trigger, command_id: &str) -> bool {
    matches!(trigger, Trigger::Command { command_id: expected } if expected == command_id)
}

fn strip_cr(s: &str) -> String {
    s.replace('\r', "")
}
