use std::path::Path;

use rustyline::{Config, Editor, Result};

pub fn generate_prompt(conversation_ended: bool) -> String {
    if conversation_ended {
        "(ended) > ".to_string()
    } else {
        "> ".to_string()
    }
}

pub fn rl(history_path: Option<&Path>) -> Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(false)
        .build();
    let mut editor = Editor::with_config(config)?;

    if let Some(path) = history_path {
        // A missing history file just means a first run.
        if let Err(e) = editor.load_history(path) {
            tracing::debug!("No history loaded from {}: {}", path.display(), e);
        }
    }

    Ok(editor)
}
