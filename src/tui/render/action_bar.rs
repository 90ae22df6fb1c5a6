use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;

/// Batch bar shown while drafts or a rename are pending
pub fn render_action_bar(frame: &mut Frame, app: &App, area: Rect) {
    let count = app.board.pending_count();
    if count == 0 {
        return;
    }
    let bg = app.theme.selection_bg;
    let plural = if count == 1 { "" } else { "s" };
    let line = Line::from(vec![
        Span::styled(
            format!(" {} unsaved change{}", count, plural),
            Style::default()
                .fg(app.theme.yellow)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("   ", Style::default().bg(bg)),
        Span::styled("Ctrl-S", Style::default().fg(app.theme.text_bright).bg(bg)),
        Span::styled(" save all  ", Style::default().fg(app.theme.text).bg(bg)),
        Span::styled("Ctrl-D", Style::default().fg(app.theme.text_bright).bg(bg)),
        Span::styled(" discard all", Style::default().fg(app.theme.text).bg(bg)),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::category::CategoryId;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn counts_drafts_and_rename() {
        let mut app = sample_app();
        app.board.start_add(None);
        app.board.start_edit(CategoryId(3));
        let output = render_to_string(TERM_W, 1, |frame, area| {
            render_action_bar(frame, &app, area)
        });
        assert_eq!(
            output,
            " 2 unsaved changes   Ctrl-S save all  Ctrl-D discard all"
        );
    }

    #[test]
    fn hidden_without_pending_edits() {
        let app = sample_app();
        let output = render_to_string(TERM_W, 1, |frame, area| {
            render_action_bar(frame, &app, area)
        });
        assert_eq!(output, "");
    }
}
