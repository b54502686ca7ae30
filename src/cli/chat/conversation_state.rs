use chrono::{DateTime, Local};

/// Who a message is attributed to. Doubles as the display tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    pub sent_at: DateTime<Local>,
}

impl Message {
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            text: text.into(),
            sender,
            sent_at: Local::now(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot)
    }
}

/// The rendered conversation, oldest first.
///
/// Messages are only ever appended; the whole list is replaced on reset.
pub struct ConversationView {
    messages: Vec<Message>,
}

impl ConversationView {
    /// A fresh conversation holding only `greeting`.
    pub fn seeded(greeting: Message) -> Self {
        Self {
            messages: vec![greeting],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn reset(&mut self, greeting: Message) {
        self.messages.clear();
        self.messages.push(greeting);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}
