use crossterm::event::{KeyCode, KeyEvent};

use crate::engine::board::NoticeLevel;
use crate::tui::app::{App, Mode};

/// Delete dialog: y confirms, n or Esc backs out.
pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            let name = app
                .board
                .delete_dialog()
                .map(|d| d.name.clone())
                .unwrap_or_default();
            let removed = app.board.confirm_delete();
            let rows = app.rows().len();
            app.clamp_cursor(rows);
            app.mode = Mode::Navigate;
            if !removed.is_empty() {
                app.set_status(
                    NoticeLevel::Info,
                    format!("deleted \"{}\" ({} removed)", name, removed.len()),
                );
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.board.cancel_delete();
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::category::CategoryId;
    use crate::tui::input::handle_key;
    use crate::tui::input::test_keys::*;
    use crate::tui::render::test_helpers::sample_app;

    #[test]
    fn confirm_removes_subtree() {
        let mut app = sample_app();
        handle_key(&mut app, ch('d'));
        let dialog = app.board.delete_dialog().unwrap();
        assert_eq!(dialog.child_count, 1);
        handle_key(&mut app, ch('y'));

        assert_eq!(app.mode, Mode::Navigate);
        assert!(!app.board.tree().contains(CategoryId(1)));
        assert!(!app.board.tree().contains(CategoryId(2)));
        assert_eq!(app.cursor_category(), Some(CategoryId(3)));
        assert_eq!(
            app.status.as_ref().unwrap().message,
            "deleted \"Roupas\" (2 removed)"
        );
    }

    #[test]
    fn escape_keeps_everything() {
        let mut app = sample_app();
        handle_key(&mut app, ch('d'));
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.board.delete_dialog().is_none());
        assert_eq!(app.board.tree().len(), 3);
    }

    #[test]
    fn other_keys_leave_dialog_open() {
        let mut app = sample_app();
        handle_key(&mut app, ch('d'));
        handle_key(&mut app, ch('j'));
        assert_eq!(app.mode, Mode::Confirm);
        assert!(app.board.delete_dialog().is_some());
    }
}
