use crossterm::event::{KeyCode, KeyEvent};

use crate::engine::drag::DropOutcome;
use crate::engine::view::RowItem;
use crate::tui::app::{App, Mode};

use super::move_cursor;

/// Move mode: the cursor picks the drop target for the dragged category.
pub(super) fn handle_move(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            move_cursor(app, 1);
            hover_cursor(app);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            move_cursor(app, -1);
            hover_cursor(app);
        }
        // Expanding lets the drag reach deeper targets
        KeyCode::Char('l') | KeyCode::Right => {
            if let Some(RowItem::Category { id, .. }) = app.cursor_row().map(|r| r.item) {
                app.board.tree_mut().expand(id);
            }
        }
        KeyCode::Char('h') | KeyCode::Left => {
            if let Some(RowItem::Category { id, .. }) = app.cursor_row().map(|r| r.item) {
                app.board.tree_mut().collapse(id);
                let rows = app.rows().len();
                app.clamp_cursor(rows);
            }
        }
        KeyCode::Enter => {
            let dragged = app.board.drag().dragged();
            match app.board.drag_end() {
                Ok(DropOutcome::Moved { id, new_parent }) => {
                    app.board.tree_mut().expand(new_parent);
                    app.select_category(id);
                }
                Ok(DropOutcome::Ignored) => {
                    if let Some(id) = dragged {
                        app.select_category(id);
                    }
                }
                // The board already queued a notice
                Err(_) => {}
            }
            app.mode = Mode::Navigate;
        }
        KeyCode::Esc => {
            let dragged = app.board.drag().dragged();
            app.board.cancel_drag();
            if let Some(id) = dragged {
                app.select_category(id);
            }
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}

fn hover_cursor(app: &mut App) {
    if let Some(id) = app.cursor_category() {
        app.board.drag_over(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::board::NoticeLevel;
    use crate::model::category::CategoryId;
    use crate::tui::input::handle_key;
    use crate::tui::input::test_keys::*;
    use crate::tui::render::test_helpers::sample_app;

    #[test]
    fn drop_moves_under_hovered_row() {
        let mut app = sample_app();
        // Acessórios under Roupas
        handle_key(&mut app, ch('j'));
        handle_key(&mut app, ch('m'));
        assert_eq!(app.mode, Mode::Move);
        handle_key(&mut app, ch('k'));
        assert_eq!(app.board.drag().over(), Some(CategoryId(1)));
        handle_key(&mut app, key(KeyCode::Enter));

        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(
            app.board.tree().get(CategoryId(3)).unwrap().parent_id,
            Some(CategoryId(1))
        );
        assert!(app.board.tree().is_expanded(CategoryId(1)));
        assert_eq!(app.cursor_category(), Some(CategoryId(3)));
    }

    #[test]
    fn drop_into_own_subtree_warns() {
        let mut app = sample_app();
        handle_key(&mut app, ch('l'));
        handle_key(&mut app, ch('m'));
        handle_key(&mut app, ch('j'));
        assert_eq!(app.board.drag().over(), Some(CategoryId(2)));
        handle_key(&mut app, key(KeyCode::Enter));

        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.board.tree().get(CategoryId(1)).unwrap().parent_id, None);
        assert_eq!(
            app.status.as_ref().map(|n| n.level),
            Some(NoticeLevel::Warning)
        );
    }

    #[test]
    fn esc_cancels_the_drag() {
        let mut app = sample_app();
        handle_key(&mut app, ch('m'));
        handle_key(&mut app, ch('j'));
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Navigate);
        assert!(!app.board.drag().is_dragging());
        assert_eq!(app.board.tree().roots(), &[CategoryId(1), CategoryId(3)]);
        assert_eq!(app.cursor_category(), Some(CategoryId(1)));
    }
}
