use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;

use super::helpers::{centered_rect_fixed, wrap_text};

/// Render the delete confirmation dialog, if one is open
pub fn render_delete_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(dialog) = app.board.delete_dialog() else {
        return;
    };

    let popup_w: u16 = 44.min(area.width.saturating_sub(2));
    let inner_w = popup_w.saturating_sub(2) as usize;

    let bg = app.theme.background;
    let highlight = app.theme.highlight;
    let header_style = Style::default()
        .fg(highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(app.theme.text).bg(bg);
    let warn_style = Style::default().fg(app.theme.yellow).bg(bg);
    let dim_style = Style::default().fg(app.theme.dim).bg(bg);

    let mut styled_lines: Vec<(String, Style)> = Vec::new();
    styled_lines.push((" Delete category".into(), header_style));
    styled_lines.push(("".into(), text_style));

    let question = format!("Delete \u{201c}{}\u{201d}?", dialog.name);
    for s in wrap_text(" ", &question, inner_w) {
        styled_lines.push((s, text_style));
    }
    if let Some(warning) = &dialog.warning {
        let capitalized = capitalize(warning);
        for s in wrap_text(" ", &format!("{}.", capitalized), inner_w) {
            styled_lines.push((s, warn_style));
        }
    }
    styled_lines.push(("".into(), text_style));
    styled_lines.push((" y delete   n keep".into(), dim_style));

    let popup_h = ((styled_lines.len() as u16) + 2).min(area.height.saturating_sub(2));
    let overlay_area = centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, overlay_area);

    let lines: Vec<Line> = styled_lines
        .into_iter()
        .map(|(text, style)| Line::from(Span::styled(text, style)))
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(highlight).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));

    frame.render_widget(paragraph, overlay_area);
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
