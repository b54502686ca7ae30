pub mod controller;
pub mod conversation_state;
pub mod input_state;
pub mod prompt;
pub mod view;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use color_print::cstr;
use controller::{ChatController, ControllerConfig, PROCESSING_ERROR_MESSAGE, RESET_HINT_MESSAGE};
use conversation_state::{Message, Sender};
use eyre::{Result, WrapErr};
use prompt::generate_prompt;
use rustyline::error::ReadlineError;
use tracing::{debug, warn};
use view::{PrinterWriter, TerminalPrompter, TerminalView};

use crate::config::Config;
use crate::hiring_client::HiringClient;

const WELCOME_TEXT: &str = cstr!("
<bold>TalentScout</bold> hiring assistant

Answer the assistant's questions to complete your initial screening.

<green>/reset</green>        Start a new conversation
<green>/help</green>         Show the help dialogue
<green>/quit</green>         Quit the application
");

const HELP_TEXT: &str = cstr!("
<bold>TalentScout chat</bold>

<green>/reset</green>        Start a new conversation (alias: /clear)
<green>/help</green>         Show this help dialogue
<green>/quit</green>         Quit the application

Anything else is sent to the hiring assistant.
");

/// One line of user input, as understood by the REPL.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    Reset,
    Quit,
    Message(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Option<Self> {
        match line.trim() {
            "" => None,
            "/help" => Some(Command::Help),
            "/reset" | "/clear" => Some(Command::Reset),
            "/quit" | "/exit" => Some(Command::Quit),
            _ => Some(Command::Message(line)),
        }
    }
}

/// Whether the newest message is the generic processing error.
fn exchange_failed(messages: &[Message]) -> bool {
    messages
        .last()
        .map_or(false, |m| m.sender == Sender::Bot && m.text == PROCESSING_ERROR_MESSAGE)
}

pub struct ChatContext {
    output: Box<dyn Write + Send>,
    input: Option<String>,
    interactive: bool,
    history_path: Option<PathBuf>,
    controller: ChatController<HiringClient, TerminalView, TerminalPrompter>,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write + Send>,
        view_output: Box<dyn Write + Send>,
        config: Config,
        input: Option<String>,
        interactive: bool,
        accept_all: bool,
    ) -> Result<Self> {
        let client = HiringClient::new(config.server_url.clone())
            .wrap_err("Failed to initialize hiring assistant client")?;

        let controller = ChatController::new(
            client,
            TerminalView::new(view_output),
            TerminalPrompter::new(accept_all),
            ControllerConfig {
                end_notice_delay: config.end_notice_delay,
            },
        );

        Ok(Self {
            output,
            input,
            interactive,
            history_path: config.history_path,
            controller,
        })
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        if self.interactive {
            self.print_welcome()?;
        }

        self.controller.start().await;

        // Handle non-interactive mode (single message)
        if let Some(input) = self.input.take() {
            self.handle_input(&input).await?;
            if exchange_failed(&self.controller.messages().await) {
                return Ok(ExitCode::FAILURE);
            }
            return Ok(ExitCode::SUCCESS);
        }

        if self.interactive {
            self.run_interactive().await?;
        }

        Ok(ExitCode::SUCCESS)
    }

    fn print_welcome(&mut self) -> Result<()> {
        writeln!(self.output, "{}", WELCOME_TEXT)?;
        Ok(())
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl(self.history_path.as_deref())?;

        // Output produced while readline is blocked goes above the prompt.
        match rl.create_external_printer() {
            Ok(printer) => {
                self.controller
                    .with_view(|view| view.set_output(Box::new(PrinterWriter::new(printer))))
                    .await;
            }
            Err(e) => debug!("No external printer, writing to stdout: {}", e),
        }

        loop {
            let prompt_text = generate_prompt(self.controller.input_state().has_ended());

            match rl.readline(&prompt_text) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line.as_str());

                    if !self.handle_input(&line).await? {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        if let Some(path) = &self.history_path {
            if let Err(e) = rl.save_history(path) {
                warn!("Failed to save history to {}: {}", path.display(), e);
            }
        }

        Ok(())
    }

    /// Returns `false` once the user asks to quit.
    async fn handle_input(&mut self, input: &str) -> Result<bool> {
        let Some(command) = Command::parse(input) else {
            return Ok(true);
        };
        debug!("Handling {:?}", command);

        match command {
            Command::Help => {
                writeln!(self.output, "{}", HELP_TEXT)?;
            }
            Command::Reset => {
                self.controller.reset_conversation().await;
            }
            Command::Quit => return Ok(false),
            Command::Message(text) => {
                if self.controller.input_state().has_ended() {
                    self.controller.add_message(RESET_HINT_MESSAGE, Sender::Bot).await;
                } else {
                    self.controller.submit_message(text).await;
                }
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognizes_commands() {
        assert_eq!(Command::parse("  /help "), Some(Command::Help));
        assert_eq!(Command::parse("/reset"), Some(Command::Reset));
        assert_eq!(Command::parse("/clear"), Some(Command::Reset));
        assert_eq!(Command::parse("/quit"), Some(Command::Quit));
        assert_eq!(Command::parse("/exit"), Some(Command::Quit));
    }

    #[test]
    fn exchange_failed_checks_last_message() {
        let mut messages = vec![Message::bot("Welcome"), Message::new("hi", Sender::User)];
        assert!(!exchange_failed(&messages));

        messages.push(Message::bot(PROCESSING_ERROR_MESSAGE));
        assert!(exchange_failed(&messages));

        messages.push(Message::bot("Hello again"));
        assert!(!exchange_failed(&messages));

        assert!(!exchange_failed(&[]));
    }

    #[test]
    fn parse_passes_messages_through() {
        assert_eq!(Command::parse("I have 5 years of Rust"), Some(Command::Message("I have 5 years of Rust")));
        assert_eq!(Command::parse("/resetting my career"), Some(Command::Message("/resetting my career")));
        assert_eq!(Command::parse("   "), None);
    }
}
