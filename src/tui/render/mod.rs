pub mod action_bar;
pub mod delete_popup;
pub mod header;
mod helpers;
pub mod status_row;
pub mod tree_view;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::{App, Mode};

/// Main render function: dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let action_bar_h = if app.board.has_pending_edits() { 1 } else { 0 };

    // Layout: header (2 rows) | tree | action bar | status row
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(action_bar_h),
            Constraint::Length(1),
        ])
        .split(area);

    header::render_header(frame, app, chunks[0]);
    tree_view::render_tree_view(frame, app, chunks[1]);
    action_bar::render_action_bar(frame, app, chunks[2]);
    status_row::render_status_row(frame, app, chunks[3]);

    // Delete dialog (rendered on top of everything)
    if app.mode == Mode::Confirm {
        delete_popup::render_delete_popup(frame, app, frame.area());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::category::CategoryId;
    use crate::tui::render::test_helpers::*;
    use insta::assert_snapshot;

    #[test]
    fn full_screen_with_pending_rename() {
        let mut app = sample_app();
        app.show_key_hints = false;
        app.board.tree_mut().expand(CategoryId(1));
        app.board.start_edit(CategoryId(2));
        app.board.update_edit_name("Camisas");
        app.board.drain_events();
        let output = render_to_string(TERM_W, 7, |frame, _| render(frame, &mut app));
        assert_snapshot!(output, @r"
         ▶ Loja                                        3 categories
        ────────────────────────────────────────────────────────────
        ▎▼ Roupas #1
            └  Camisas #2 (unsaved)
           Acessórios #3
         1 unsaved change   Ctrl-S save all  Ctrl-D discard all
        ");
    }
}
