use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};

use super::helpers::spans_width;

const NAVIGATE_HINTS: &str = "a add  r rename  x hide  d delete  m move  q quit";
const EDIT_HINTS: &str = "Enter save  Tab keep  Esc cancel";
const MOVE_HINTS: &str = "j/k target  Enter drop  Esc cancel";
const CONFIRM_HINTS: &str = "y delete  n keep";

/// Render the status row (bottom of screen): last notice or mode label on
/// the left, key hints on the right.
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut spans: Vec<Span> = Vec::new();
    if let Some(notice) = &app.status {
        spans.push(Span::styled(
            format!(" {}", notice.message),
            Style::default()
                .fg(app.theme.notice_color(notice.level))
                .bg(bg),
        ));
    } else if let Some(label) = mode_label(app) {
        spans.push(Span::styled(
            format!(" {}", label),
            Style::default()
                .fg(app.theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ));
    }

    if app.show_key_hints {
        let hint = match app.mode {
            Mode::Navigate => NAVIGATE_HINTS,
            Mode::Edit => EDIT_HINTS,
            Mode::Move => MOVE_HINTS,
            Mode::Confirm => CONFIRM_HINTS,
        };
        let content_width = spans_width(&spans);
        let hint_width = hint.chars().count();
        if content_width + hint_width < width {
            let padding = width - content_width - hint_width;
            spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
            let hint_style = Style::default().fg(app.theme.dim).bg(bg);
            spans.push(Span::styled(hint, hint_style));
        }
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn mode_label(app: &App) -> Option<String> {
    match app.mode {
        Mode::Navigate => None,
        Mode::Edit => Some("EDIT".to_string()),
        Mode::Move => {
            let name = app
                .board
                .drag()
                .dragged()
                .and_then(|id| app.board.tree().get(id))
                .map(|n| n.name.as_str())
                .unwrap_or("");
            Some(format!("MOVE {}", name))
        }
        Mode::Confirm => Some("DELETE".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::board::NoticeLevel;
    use crate::model::category::CategoryId;
    use crate::tui::render::test_helpers::*;
    use pretty_assertions::assert_eq;

    fn draw(app: &App) -> String {
        render_to_string(TERM_W, 1, |frame, area| render_status_row(frame, app, area))
    }

    #[test]
    fn navigate_shows_hints_only() {
        let app = sample_app();
        assert_eq!(draw(&app), format!("{:>60}", NAVIGATE_HINTS));
    }

    #[test]
    fn notice_replaces_label() {
        let mut app = sample_app();
        app.show_key_hints = false;
        app.set_status(
            NoticeLevel::Warning,
            "cannot move a category into its own subtree",
        );
        assert_eq!(draw(&app), " cannot move a category into its own subtree");
    }

    #[test]
    fn move_mode_names_dragged_category() {
        let mut app = sample_app();
        app.show_key_hints = false;
        app.board.drag_start(CategoryId(3));
        app.mode = Mode::Move;
        assert_eq!(draw(&app), " MOVE Acessórios");
    }
}
