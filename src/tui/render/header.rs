use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;

use super::helpers::spans_width;

/// Render the header: store name and category count, with separator line below
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // separator
        ])
        .split(area);

    let bg = app.theme.background;
    let width = chunks[0].width as usize;
    let mut spans: Vec<Span> = vec![
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled("\u{25B6}", Style::default().fg(app.theme.highlight).bg(bg)),
        Span::styled(
            format!(" {}", app.store_name),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    let count = app.board.tree().len();
    let hidden = app
        .board
        .tree()
        .iter_all()
        .filter(|(_, n)| n.hidden())
        .count();
    let summary = if hidden > 0 {
        format!("{} categories, {} hidden ", count, hidden)
    } else {
        format!("{} categories ", count)
    };
    let used = spans_width(&spans);
    if used + summary.len() < width {
        spans.push(Span::styled(
            " ".repeat(width - used - summary.len()),
            Style::default().bg(bg),
        ));
        let summary_style = Style::default().fg(app.theme.dim).bg(bg);
        spans.push(Span::styled(summary, summary_style));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)),
        chunks[0],
    );

    let separator = Line::from(Span::styled(
        "\u{2500}".repeat(chunks[1].width as usize),
        Style::default().fg(app.theme.dim).bg(bg),
    ));
    frame.render_widget(
        Paragraph::new(separator).style(Style::default().bg(bg)),
        chunks[1],
    );
}
