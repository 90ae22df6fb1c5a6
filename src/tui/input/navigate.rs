use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::engine::board::NoticeLevel;
use crate::engine::view::RowItem;
use crate::tui::app::{App, EditTarget, Mode};

use super::move_cursor;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => commit_all(app),
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => discard_all(app),
        (m, _) if m.contains(KeyModifiers::CONTROL) => {}

        (_, KeyCode::Char('q')) => app.should_quit = true,

        // Cursor
        (_, KeyCode::Char('j') | KeyCode::Down) => move_cursor(app, 1),
        (_, KeyCode::Char('k') | KeyCode::Up) => move_cursor(app, -1),
        (_, KeyCode::Char('g') | KeyCode::Home) => app.cursor = 0,
        (_, KeyCode::Char('G') | KeyCode::End) => {
            app.cursor = app.rows().len().saturating_sub(1);
        }

        // Expand / collapse
        (_, KeyCode::Char('l') | KeyCode::Right) => expand(app),
        (_, KeyCode::Char('h') | KeyCode::Left) => collapse_or_parent(app),
        (_, KeyCode::Char(' ')) => {
            if let Some(id) = app.cursor_category() {
                app.board.toggle_expand(id);
            }
        }
        (_, KeyCode::Char('E')) => app.board.tree_mut().expand_all(),
        (_, KeyCode::Char('C')) => {
            app.board.tree_mut().set_expanded([]);
            let count = app.rows().len();
            app.clamp_cursor(count);
        }

        // Drafts and edits
        (_, KeyCode::Char('a')) => {
            let parent = match app.cursor_row().map(|r| r.item) {
                Some(RowItem::Category { id, .. }) => Some(id),
                Some(RowItem::Draft { parent_id, .. }) => parent_id,
                None => None,
            };
            app.board.start_add(parent);
        }
        (_, KeyCode::Char('A')) => {
            app.board.start_add(None);
        }
        (_, KeyCode::Char('r') | KeyCode::Char('e')) => {
            if let Some(id) = app.cursor_category() {
                app.board.start_edit(id);
            }
        }
        (_, KeyCode::Enter) => reenter_or_toggle(app),

        // Row actions
        (_, KeyCode::Char('x')) => {
            if let Some(id) = app.cursor_category() {
                app.board.toggle_hidden(id);
            }
        }
        (_, KeyCode::Char('d')) => {
            if let Some(id) = app.cursor_category()
                && app.board.open_delete_dialog(id)
            {
                app.mode = Mode::Confirm;
            }
        }
        (_, KeyCode::Char('m')) => {
            if let Some(id) = app.cursor_category() {
                if app.board.drag_start(id) {
                    app.mode = Mode::Move;
                } else {
                    app.set_status(NoticeLevel::Warning, "finish renaming before moving");
                }
            }
        }
        (_, KeyCode::Char('R')) => {
            app.refetch();
            if app.status.is_none() {
                app.set_status(NoticeLevel::Info, "reloaded");
            }
        }
        _ => {}
    }
}

fn expand(app: &mut App) {
    if let Some(RowItem::Category {
        id,
        has_children: true,
        is_expanded: false,
        ..
    }) = app.cursor_row().map(|r| r.item)
    {
        app.board.tree_mut().expand(id);
    }
}

/// Collapse an expanded row, otherwise jump to the parent row.
fn collapse_or_parent(app: &mut App) {
    let Some(row) = app.cursor_row() else {
        return;
    };
    let parent = match row.item {
        RowItem::Category {
            id,
            is_expanded: true,
            ..
        } => {
            app.board.tree_mut().collapse(id);
            return;
        }
        RowItem::Category { id, .. } => app.board.tree().get(id).and_then(|n| n.parent_id),
        RowItem::Draft { parent_id, .. } => parent_id,
    };
    if let Some(pid) = parent {
        app.select_category(pid);
    }
}

/// Enter on a pending row reopens its editor; on a plain category it toggles
/// expansion.
fn reenter_or_toggle(app: &mut App) {
    match app.cursor_row().map(|r| r.item) {
        Some(RowItem::Draft { temp_id, .. }) => app.begin_edit(EditTarget::Draft(temp_id)),
        Some(RowItem::Category {
            id,
            editing: Some(_),
            ..
        }) => app.begin_edit(EditTarget::Category(id)),
        Some(RowItem::Category { id, .. }) => {
            app.board.toggle_expand(id);
        }
        None => {}
    }
}

fn commit_all(app: &mut App) {
    if !app.board.has_pending_edits() {
        return;
    }
    let count = app.board.commit_all();
    let plural = if count == 1 { "" } else { "s" };
    app.set_status(
        NoticeLevel::Info,
        format!("saved {} change{}", count, plural),
    );
}

fn discard_all(app: &mut App) {
    if !app.board.has_pending_edits() {
        return;
    }
    let count = app.board.pending_count();
    app.board.discard_all();
    let rows = app.rows().len();
    app.clamp_cursor(rows);
    let plural = if count == 1 { "" } else { "s" };
    app.set_status(
        NoticeLevel::Info,
        format!("discarded {} change{}", count, plural),
    );
}
