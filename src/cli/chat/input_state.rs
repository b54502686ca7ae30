//! Input control state machine.
//!
//! The prompt is either open for a new message or closed, and when closed
//! it records why. `ConversationEnded` is only left through a reset.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisabledReason {
    /// A message has been sent and the reply has not arrived yet.
    InFlight,
    /// The server closed the conversation; only a reset reopens input.
    ConversationEnded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    Enabled,
    Disabled(DisabledReason),
}

impl InputState {
    pub fn is_enabled(&self) -> bool {
        matches!(self, InputState::Enabled)
    }

    pub fn has_ended(&self) -> bool {
        matches!(self, InputState::Disabled(DisabledReason::ConversationEnded))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Submit,
    Replied { conversation_ended: bool },
    Failed,
    ResetSucceeded,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A message is already being processed")]
    RequestInFlight,
    #[error("The conversation has ended")]
    ConversationEnded,
    #[error("Invalid transition: {event:?} while {state:?}")]
    InvalidTransition { state: InputState, event: InputEvent },
}

/// Pure transition function for the input control.
pub fn transition(state: InputState, event: InputEvent) -> Result<InputState, TransitionError> {
    use DisabledReason::*;
    use InputState::*;

    match (state, event) {
        (_, InputEvent::ResetSucceeded) => Ok(Enabled),

        (Enabled, InputEvent::Submit) => Ok(Disabled(InFlight)),
        (Disabled(InFlight), InputEvent::Submit) => Err(TransitionError::RequestInFlight),
        (Disabled(ConversationEnded), InputEvent::Submit) => Err(TransitionError::ConversationEnded),

        (Disabled(InFlight), InputEvent::Replied { conversation_ended: true }) => {
            Ok(Disabled(ConversationEnded))
        }
        (Disabled(InFlight), InputEvent::Replied { conversation_ended: false })
        | (Disabled(InFlight), InputEvent::Failed) => Ok(Enabled),

        (state, event @ (InputEvent::Replied { .. } | InputEvent::Failed)) => {
            Err(TransitionError::InvalidTransition { state, event })
        }
    }
}
