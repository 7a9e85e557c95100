//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] mutations, and to [`Command`]s for the
//! paging layer when a key asks for more news.
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] or a [`Command`] variant for the action.
//! 2. Add a `KeyCode` match arm in [`handle_key_event`].
//! 3. Update the help text in [`crate::ui`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::App;

/// Requests the main loop forwards to the news repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// The selection reached the last row; page in more.
    LoadMore,
    Refresh,
    Retry,
}

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events so each physical keypress triggers
/// exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => {
            app.select_next();
            return app.at_end().then_some(Command::LoadMore);
        }
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => {
            app.select_last();
            return Some(Command::LoadMore);
        }
        KeyCode::Char('r') => return Some(Command::Refresh),
        KeyCode::Char('R') => return Some(Command::Retry),
        KeyCode::Enter => app.open_selected(),
        _ => {}
    }
    None
}
