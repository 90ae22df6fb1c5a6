use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, EditTarget};
use crate::util::unicode::{self, word_boundary_left, word_boundary_right};

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    let Some(target) = app.edit_target else {
        app.end_edit();
        return;
    };

    match (key.modifiers, key.code) {
        (_, KeyCode::Enter) => {
            match target {
                EditTarget::Draft(temp_id) => {
                    if let Some(id) = app.board.commit_draft(temp_id) {
                        app.end_edit();
                        app.select_category(id);
                        return;
                    }
                }
                EditTarget::Category(_) => {
                    app.board.commit_edit();
                }
            }
            app.end_edit();
            let rows = app.rows().len();
            app.clamp_cursor(rows);
        }
        (_, KeyCode::Esc) => {
            match target {
                EditTarget::Draft(temp_id) => app.board.cancel_draft(temp_id),
                EditTarget::Category(_) => app.board.cancel_edit(),
            }
            app.end_edit();
            let rows = app.rows().len();
            app.clamp_cursor(rows);
        }
        // Leave the row pending
        (_, KeyCode::Tab) => app.end_edit(),

        // Line movement
        (m, KeyCode::Char('a')) if m.contains(KeyModifiers::CONTROL) => app.edit_cursor = 0,
        (m, KeyCode::Char('e')) if m.contains(KeyModifiers::CONTROL) => {
            app.edit_cursor = app.edit_buffer.len();
        }
        (_, KeyCode::Home) => app.edit_cursor = 0,
        (_, KeyCode::End) => app.edit_cursor = app.edit_buffer.len(),
        (m, KeyCode::Left) if m.contains(KeyModifiers::ALT) => {
            app.edit_cursor = word_boundary_left(&app.edit_buffer, app.edit_cursor);
        }
        (m, KeyCode::Right) if m.contains(KeyModifiers::ALT) => {
            app.edit_cursor = word_boundary_right(&app.edit_buffer, app.edit_cursor);
        }
        (_, KeyCode::Left) => {
            if let Some(prev) = unicode::prev_grapheme_boundary(&app.edit_buffer, app.edit_cursor) {
                app.edit_cursor = prev;
            }
        }
        (_, KeyCode::Right) => {
            if let Some(next) = unicode::next_grapheme_boundary(&app.edit_buffer, app.edit_cursor) {
                app.edit_cursor = next;
            }
        }

        // Deletion
        (m, KeyCode::Char('u')) if m.contains(KeyModifiers::CONTROL) => {
            app.edit_buffer.drain(..app.edit_cursor);
            app.edit_cursor = 0;
            sync(app, target);
        }
        (m, KeyCode::Backspace)
            if m.contains(KeyModifiers::ALT) || m.contains(KeyModifiers::CONTROL) =>
        {
            let new_pos = word_boundary_left(&app.edit_buffer, app.edit_cursor);
            app.edit_buffer.drain(new_pos..app.edit_cursor);
            app.edit_cursor = new_pos;
            sync(app, target);
        }
        (_, KeyCode::Backspace) => {
            if let Some(prev) = unicode::prev_grapheme_boundary(&app.edit_buffer, app.edit_cursor) {
                app.edit_buffer.drain(prev..app.edit_cursor);
                app.edit_cursor = prev;
                sync(app, target);
            }
        }
        (_, KeyCode::Delete) => {
            if let Some(next) = unicode::next_grapheme_boundary(&app.edit_buffer, app.edit_cursor) {
                app.edit_buffer.drain(app.edit_cursor..next);
                sync(app, target);
            }
        }

        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            app.edit_buffer.insert(app.edit_cursor, c);
            app.edit_cursor += c.len_utf8();
            sync(app, target);
        }
        _ => {}
    }
}

/// Push the edit buffer into the session.
fn sync(app: &mut App, target: EditTarget) {
    let name = app.edit_buffer.clone();
    let accepted = match target {
        EditTarget::Draft(temp_id) => app.board.update_draft_name(temp_id, name),
        EditTarget::Category(_) => app.board.update_edit_name(name),
    };
    if !accepted {
        // The row was pruned underneath us (refetch or delete)
        app.end_edit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::category::CategoryId;
    use crate::tui::app::Mode;
    use crate::tui::input::handle_key;
    use crate::tui::input::test_keys::*;
    use crate::tui::render::test_helpers::sample_app;
    use pretty_assertions::assert_eq;

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            handle_key(app, ch(c));
        }
    }

    #[test]
    fn typing_updates_the_draft() {
        let mut app = sample_app();
        let t = app.board.start_add(None).unwrap();
        app.process_events();
        type_str(&mut app, "Calçados");
        assert_eq!(app.board.session().draft(t).unwrap().name, "Calçados");
        handle_key(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.board.session().draft(t).unwrap().name, "Calçado");
    }

    #[test]
    fn enter_commits_draft_and_selects_it() {
        let mut app = sample_app();
        handle_key(&mut app, ch('a'));
        type_str(&mut app, "Bolsos");
        handle_key(&mut app, key(KeyCode::Enter));

        assert_eq!(app.mode, Mode::Navigate);
        assert!(!app.board.has_pending_edits());
        let id = app.cursor_category().unwrap();
        let node = app.board.tree().get(id).unwrap();
        assert_eq!(node.name, "Bolsos");
        assert_eq!(node.slug, "bolsos");
        assert_eq!(node.parent_id, Some(CategoryId(1)));
    }

    #[test]
    fn enter_on_blank_draft_keeps_nothing() {
        let mut app = sample_app();
        handle_key(&mut app, ch('A'));
        type_str(&mut app, "   ");
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.board.tree().len(), 3);
        assert!(!app.board.has_pending_edits());
    }

    #[test]
    fn esc_cancels_rename() {
        let mut app = sample_app();
        handle_key(&mut app, ch('r'));
        assert_eq!(app.edit_buffer, "Roupas");
        handle_key(&mut app, ctrl('u'));
        type_str(&mut app, "Vestuário");
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.board.tree().get(CategoryId(1)).unwrap().name, "Roupas");
        assert!(app.board.session().edit_slot().is_idle());
    }

    #[test]
    fn rename_commit_recomputes_slug() {
        let mut app = sample_app();
        handle_key(&mut app, ch('r'));
        handle_key(&mut app, ctrl('u'));
        type_str(&mut app, "Moda Praia");
        handle_key(&mut app, key(KeyCode::Enter));
        let node = app.board.tree().get(CategoryId(1)).unwrap();
        assert_eq!(node.name, "Moda Praia");
        assert_eq!(node.slug, "moda-praia");
    }

    #[test]
    fn cursor_moves_by_grapheme() {
        let mut app = sample_app();
        handle_key(&mut app, ch('j'));
        handle_key(&mut app, ch('r'));
        assert_eq!(app.edit_buffer, "Acessórios");
        for _ in 0..5 {
            handle_key(&mut app, key(KeyCode::Left));
        }
        // "Acess|órios"
        assert_eq!(&app.edit_buffer[..app.edit_cursor], "Acess");
        handle_key(&mut app, key(KeyCode::Delete));
        assert_eq!(app.edit_buffer, "Acessrios");
        handle_key(&mut app, key(KeyCode::Home));
        assert_eq!(app.edit_cursor, 0);
    }
}
