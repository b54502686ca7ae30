use std::io::{self, BufRead, Write};

use crossterm::cursor::{MoveTo, MoveToColumn};
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;
use eyre::Result;
use rustyline::ExternalPrinter;
use tracing::warn;

use super::conversation_state::{Message, Sender};

const LOADING_TEXT: &str = "TalentScout is typing...";

/// Rendering surface for the conversation and its input control.
pub trait ChatView: Send {
    /// Draw one message below the previous ones and keep it in sight.
    fn render_message(&mut self, message: &Message) -> Result<()>;

    /// Wipe every rendered message.
    fn clear_messages(&mut self) -> Result<()>;

    fn set_loading(&mut self, active: bool) -> Result<()>;

    fn set_input_enabled(&mut self, enabled: bool) -> Result<()>;

    fn clear_input(&mut self) -> Result<()>;

    fn focus_input(&mut self) -> Result<()>;
}

/// Blocking dialogs.
pub trait Prompter: Send {
    fn confirm(&mut self, question: &str) -> bool;

    fn alert(&mut self, message: &str);
}

/// Renders the conversation as plain scrolling terminal output.
pub struct TerminalView {
    output: Box<dyn Write + Send>,
    loading: bool,
    input_enabled: bool,
}

impl TerminalView {
    pub fn new(output: Box<dyn Write + Send>) -> Self {
        Self {
            output,
            loading: false,
            input_enabled: true,
        }
    }

    /// Send all further output through `output`.
    pub fn set_output(&mut self, output: Box<dyn Write + Send>) {
        self.output = output;
    }

    fn erase_loading_line(&mut self) -> Result<()> {
        if self.loading {
            queue!(self.output, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
            self.loading = false;
        }
        Ok(())
    }
}

impl ChatView for TerminalView {
    fn render_message(&mut self, message: &Message) -> Result<()> {
        let was_loading = self.loading;
        self.erase_loading_line()?;

        let time = message.sent_at.format("%H:%M").to_string().dark_grey();
        let label = match message.sender {
            Sender::User => "You".cyan().bold(),
            Sender::Bot => "TalentScout".green().bold(),
        };

        writeln!(self.output, "{} {}", time, label)?;
        for line in literal_text(&message.text).lines() {
            writeln!(self.output, "  {}", line)?;
        }
        writeln!(self.output)?;

        if was_loading {
            self.set_loading(true)?;
        }

        self.output.flush()?;
        Ok(())
    }

    fn clear_messages(&mut self) -> Result<()> {
        self.erase_loading_line()?;
        queue!(self.output, Clear(ClearType::All), MoveTo(0, 0))?;
        self.output.flush()?;
        Ok(())
    }

    fn set_loading(&mut self, active: bool) -> Result<()> {
        if active && !self.loading {
            write!(self.output, "{}", LOADING_TEXT.dark_grey().italic())?;
            self.loading = true;
        } else if !active {
            self.erase_loading_line()?;
        }
        self.output.flush()?;
        Ok(())
    }

    fn set_input_enabled(&mut self, enabled: bool) -> Result<()> {
        self.input_enabled = enabled;
        Ok(())
    }

    fn clear_input(&mut self) -> Result<()> {
        Ok(())
    }

    fn focus_input(&mut self) -> Result<()> {
        if self.input_enabled {
            self.output.flush()?;
        }
        Ok(())
    }
}

/// Writer that hands each flushed chunk to the line editor, which prints
/// it above the prompt and redraws the prompt afterwards.
pub struct PrinterWriter<P> {
    printer: P,
    buffer: Vec<u8>,
}

impl<P: ExternalPrinter> PrinterWriter<P> {
    pub fn new(printer: P) -> Self {
        Self {
            printer,
            buffer: Vec::new(),
        }
    }
}

impl<P: ExternalPrinter> Write for PrinterWriter<P> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let text = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        self.printer
            .print(text)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}

/// Strip terminal control characters so server text is shown as-is
/// instead of being interpreted by the terminal.
pub fn literal_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Yes/no questions and alerts on stdin/stdout.
pub struct TerminalPrompter {
    accept_all: bool,
}

impl TerminalPrompter {
    pub fn new(accept_all: bool) -> Self {
        Self { accept_all }
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, question: &str) -> bool {
        if self.accept_all {
            return true;
        }

        let mut stdout = io::stdout();
        if write!(stdout, "{} [y/N] ", question).and_then(|_| stdout.flush()).is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }

    fn alert(&mut self, message: &str) {
        let mut stderr = io::stderr();
        if let Err(e) = writeln!(stderr, "{}", message.red().bold()) {
            warn!("Failed to show alert: {}", e);
        }
    }
}
