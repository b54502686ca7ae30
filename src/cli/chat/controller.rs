use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::conversation_state::{ConversationView, Message, Sender};
use super::input_state::{self, InputEvent, InputState};
use super::view::{ChatView, Prompter};
use crate::config::DEFAULT_NOTICE_DELAY;
use crate::hiring_client::ChatTransport;

pub const WELCOME_MESSAGE: &str = "Welcome to TalentScout! 👋 I'm your AI hiring assistant. I'll help guide you through our initial screening process. Let's get started!";
pub const PROCESSING_ERROR_MESSAGE: &str = "Sorry, there was an error processing your message. Please try again.";
pub const RESET_HINT_MESSAGE: &str = "Type /reset to start a new conversation.";
pub const RESET_CONFIRMATION: &str = "Are you sure you want to start a new conversation? All current data will be lost.";
pub const RESET_FAILED_MESSAGE: &str = "Failed to reset chat. Please restart the session.";

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Delay between an ending reply and the reset hint.
    pub end_notice_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            end_notice_delay: DEFAULT_NOTICE_DELAY,
        }
    }
}

/// Conversation plus the surface it is drawn on. Shared with the
/// scheduled end-of-conversation notice.
struct Screen<V> {
    conversation: ConversationView,
    view: V,
}

impl<V: ChatView> Screen<V> {
    fn add_message(&mut self, text: &str, sender: Sender) {
        let message = Message::new(text, sender);
        if let Err(e) = self.view.render_message(&message) {
            warn!("Failed to render {} message: {}", sender.as_str(), e);
        }
        self.conversation.push(message);
    }

    fn show_welcome(&mut self) {
        let greeting = Message::bot(WELCOME_MESSAGE);
        let rendered = self.view.clear_messages()
            .and_then(|_| self.view.render_message(&greeting));
        if let Err(e) = rendered {
            warn!("Failed to redraw conversation: {}", e);
        }
        self.conversation.reset(greeting);
    }

    fn set_loading(&mut self, active: bool) {
        if let Err(e) = self.view.set_loading(active) {
            warn!("Failed to update loading indicator: {}", e);
        }
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        if let Err(e) = self.view.set_input_enabled(enabled) {
            warn!("Failed to update input state: {}", e);
        }
    }

    fn clear_input(&mut self) {
        if let Err(e) = self.view.clear_input() {
            warn!("Failed to clear input: {}", e);
        }
    }

    fn focus_input(&mut self) {
        if let Err(e) = self.view.focus_input() {
            warn!("Failed to focus input: {}", e);
        }
    }
}

/// Owns the input state and orchestrates every exchange with the server.
pub struct ChatController<T, V, P> {
    transport: T,
    prompter: P,
    screen: Arc<Mutex<Screen<V>>>,
    input: InputState,
    config: ControllerConfig,
    pending_notice: Option<JoinHandle<()>>,
}

impl<T, V, P> ChatController<T, V, P>
where
    T: ChatTransport,
    V: ChatView + 'static,
    P: Prompter,
{
    pub fn new(transport: T, view: V, prompter: P, config: ControllerConfig) -> Self {
        Self {
            transport,
            prompter,
            screen: Arc::new(Mutex::new(Screen {
                conversation: ConversationView::seeded(Message::bot(WELCOME_MESSAGE)),
                view,
            })),
            input: InputState::Enabled,
            config,
            pending_notice: None,
        }
    }

    /// Draw the current conversation and hand focus to the input.
    pub async fn start(&mut self) {
        let mut screen = self.screen.lock().await;
        let Screen { conversation, view } = &mut *screen;
        for message in conversation.messages() {
            if let Err(e) = view.render_message(message) {
                warn!("Failed to render message: {}", e);
            }
        }
        screen.set_input_enabled(self.input.is_enabled());
        if self.input.is_enabled() {
            screen.focus_input();
        }
    }

    pub fn input_state(&self) -> InputState {
        self.input
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.screen.lock().await.conversation.messages().to_vec()
    }

    /// Append a message to the conversation and draw it.
    pub async fn add_message(&self, text: &str, sender: Sender) {
        self.screen.lock().await.add_message(text, sender);
    }

    /// Run `f` against the view, serialised with every other render.
    pub async fn with_view<R>(&self, f: impl FnOnce(&mut V) -> R) -> R {
        f(&mut self.screen.lock().await.view)
    }

    /// Send one message and render the reply.
    ///
    /// Blank input is ignored. Failures are reported inside the
    /// conversation; nothing is returned to the caller.
    pub async fn submit_message(&mut self, raw_text: &str) {
        let text = raw_text.trim();
        if text.is_empty() {
            return;
        }

        self.input = match input_state::transition(self.input, InputEvent::Submit) {
            Ok(state) => state,
            Err(e) => {
                debug!("Ignoring submission: {}", e);
                return;
            }
        };

        {
            let mut screen = self.screen.lock().await;
            screen.set_input_enabled(false);
            screen.add_message(text, Sender::User);
            screen.clear_input();
            screen.set_loading(true);
        }

        let result = self.transport.send_message(text).await;

        let mut screen = self.screen.lock().await;
        screen.set_loading(false);

        let event = match result {
            Ok(reply) => {
                screen.add_message(&reply.message, Sender::Bot);
                InputEvent::Replied { conversation_ended: reply.conversation_ended }
            }
            Err(e) => {
                error!("Error sending message: {}", e);
                screen.add_message(PROCESSING_ERROR_MESSAGE, Sender::Bot);
                InputEvent::Failed
            }
        };

        match input_state::transition(self.input, event) {
            Ok(state) => self.input = state,
            Err(e) => warn!("Unexpected input transition: {}", e),
        }

        if self.input.is_enabled() {
            screen.set_input_enabled(true);
            screen.focus_input();
        } else if self.input.has_ended() {
            drop(screen);
            self.schedule_end_notice();
        }
    }

    /// Start over, after the user confirms.
    ///
    /// The conversation is only replaced once the server acknowledges.
    /// The screen stays locked for the whole exchange, so a pending end
    /// notice cannot print over the confirmation question.
    pub async fn reset_conversation(&mut self) {
        let mut screen = self.screen.lock().await;

        if !self.prompter.confirm(RESET_CONFIRMATION) {
            return;
        }

        if let Err(e) = self.transport.reset().await {
            error!("Error resetting chat: {}", e);
            self.prompter.alert(RESET_FAILED_MESSAGE);
            return;
        }

        if let Some(handle) = self.pending_notice.take() {
            handle.abort();
        }

        // Reset is valid from every state.
        self.input = input_state::transition(self.input, InputEvent::ResetSucceeded)
            .unwrap_or(InputState::Enabled);

        screen.show_welcome();
        screen.set_input_enabled(true);
        screen.clear_input();
        screen.focus_input();
    }

    fn schedule_end_notice(&mut self) {
        self.cancel_end_notice();

        let screen = Arc::clone(&self.screen);
        let delay = self.config.end_notice_delay;
        self.pending_notice = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            screen.lock().await.add_message(RESET_HINT_MESSAGE, Sender::Bot);
        }));
    }

    fn cancel_end_notice(&mut self) {
        if let Some(handle) = self.pending_notice.take() {
            handle.abort();
        }
    }
}

impl<T, V, P> Drop for ChatController<T, V, P> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending_notice.take() {
            handle.abort();
        }
    }
}
