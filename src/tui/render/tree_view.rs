use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::engine::view::{RowItem, ViewRow};
use crate::tui::app::{App, Mode, is_edit_row};
use crate::util::unicode;

use super::helpers::truncate_spans;

/// Render the category tree into the content area
pub fn render_tree_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let rows = app.rows();
    let bg = app.theme.background;

    if rows.is_empty() {
        let empty = Paragraph::new(" No categories. Press A to add one.")
            .style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    let visible_height = (area.height as usize).max(1);
    app.clamp_cursor(rows.len());
    let cursor = app.cursor;
    if cursor < app.scroll_offset {
        app.scroll_offset = cursor;
    } else if cursor >= app.scroll_offset + visible_height {
        app.scroll_offset = cursor.saturating_sub(visible_height - 1);
    }
    let scroll = app.scroll_offset.min(rows.len().saturating_sub(1));

    let end = rows.len().min(scroll + visible_height);
    let width = area.width as usize;
    let lines: Vec<Line> = rows[scroll..end]
        .iter()
        .zip(scroll..end)
        .map(|(row, idx)| render_row(app, row, idx == cursor, width))
        .collect();

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn render_row<'a>(app: &App, row: &ViewRow, is_cursor: bool, width: usize) -> Line<'a> {
    let theme = &app.theme;
    let is_drop_target = match &row.item {
        RowItem::Category { drop_target, .. } => *drop_target,
        RowItem::Draft { .. } => false,
    };
    let row_bg = if is_drop_target {
        theme.drop_target_bg
    } else if is_cursor {
        theme.selection_bg
    } else {
        theme.background
    };
    let dim_style = Style::default().fg(theme.dim).bg(row_bg);
    let mut spans: Vec<Span> = Vec::new();

    // Column 0: cursor bar
    if is_cursor {
        spans.push(Span::styled(
            "\u{258E}",
            Style::default().fg(theme.selection_border).bg(row_bg),
        ));
    } else {
        spans.push(Span::styled(" ", Style::default().bg(row_bg)));
    }

    // Tree lines
    if row.depth > 0 {
        for (d, is_ancestor_last) in row.ancestor_last.iter().enumerate() {
            if d == 0 || *is_ancestor_last {
                spans.push(Span::styled("   ", dim_style));
            } else {
                spans.push(Span::styled("\u{2502}  ", dim_style)); // │
            }
        }
        let tree_char = if row.is_last_sibling {
            "\u{2514}" // └
        } else {
            "\u{251C}" // ├
        };
        spans.push(Span::styled(tree_char, dim_style));
    }

    let editing_here = app.mode == Mode::Edit && is_edit_row(app, row);

    match &row.item {
        RowItem::Category {
            id,
            name,
            hidden,
            has_children,
            is_expanded,
            editing,
            dragging,
            drop_target,
        } => {
            let expand_char = match (*has_children, *is_expanded) {
                (true, true) => "\u{25BC}",  // ▼
                (true, false) => "\u{25B6}", // ▶
                (false, _) => " ",
            };
            spans.push(Span::styled(expand_char, dim_style));
            spans.push(Span::styled(" ", dim_style));

            let name_style = if *hidden {
                Style::default()
                    .fg(theme.dim)
                    .bg(row_bg)
                    .add_modifier(Modifier::ITALIC)
            } else if is_cursor {
                Style::default()
                    .fg(theme.text_bright)
                    .bg(row_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text_bright).bg(row_bg)
            };

            if editing_here {
                push_edit_buffer(app, &mut spans, name_style, row_bg);
            } else if let Some(draft_name) = editing {
                spans.push(Span::styled(draft_name.clone(), name_style));
            } else {
                spans.push(Span::styled(name.clone(), name_style));
            }

            let id_color = if is_cursor {
                theme.selection_id
            } else {
                theme.dim
            };
            spans.push(Span::styled(
                format!(" #{}", id),
                Style::default().fg(id_color).bg(row_bg),
            ));
            if *hidden {
                spans.push(Span::styled(" (hidden)", dim_style));
            }
            if editing.is_some() && !editing_here {
                spans.push(Span::styled(
                    " (unsaved)",
                    Style::default().fg(theme.yellow).bg(row_bg),
                ));
            }
            if *dragging {
                spans.push(Span::styled(
                    " [moving]",
                    Style::default()
                        .fg(theme.highlight)
                        .bg(row_bg)
                        .add_modifier(Modifier::BOLD),
                ));
            }
            if *drop_target {
                spans.push(Span::styled(
                    " \u{2190} drop here",
                    Style::default().fg(theme.cyan).bg(row_bg),
                ));
            }
        }
        RowItem::Draft { name, .. } => {
            spans.push(Span::styled(
                "+",
                Style::default()
                    .fg(theme.green)
                    .bg(row_bg)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(" ", dim_style));
            let text_style = Style::default().fg(theme.text_bright).bg(row_bg);
            if editing_here {
                push_edit_buffer(app, &mut spans, text_style, row_bg);
            } else if name.is_empty() {
                spans.push(Span::styled("new category", dim_style));
            } else {
                spans.push(Span::styled(name.clone(), text_style));
            }
            if !editing_here {
                spans.push(Span::styled(
                    " (unsaved)",
                    Style::default().fg(theme.yellow).bg(row_bg),
                ));
            }
        }
    }

    truncate_spans(&mut spans, width);
    Line::from(spans)
}

/// Render the edit buffer with a block cursor at `edit_cursor`.
fn push_edit_buffer(
    app: &App,
    spans: &mut Vec<Span<'_>>,
    text_style: Style,
    row_bg: ratatui::style::Color,
) {
    let buf = &app.edit_buffer;
    let cursor_pos = app.edit_cursor.min(buf.len());
    let cursor_style = Style::default().fg(row_bg).bg(app.theme.text_bright);

    let before = &buf[..cursor_pos];
    if !before.is_empty() {
        spans.push(Span::styled(before.to_string(), text_style));
    }
    let at = unicode::grapheme_at(buf, cursor_pos);
    if at.is_empty() {
        spans.push(Span::styled(" ".to_string(), cursor_style));
    } else {
        spans.push(Span::styled(at.to_string(), cursor_style));
        let after = &buf[cursor_pos + at.len()..];
        if !after.is_empty() {
            spans.push(Span::styled(after.to_string(), text_style));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::category::{Category, CategoryId};
    use crate::tui::render::test_helpers::*;
    use insta::assert_snapshot;

    fn draw(app: &mut App) -> String {
        render_to_string(TERM_W, TERM_H, |frame, area| {
            render_tree_view(frame, app, area);
        })
    }

    #[test]
    fn collapsed_tree() {
        let mut app = sample_app();
        assert_snapshot!(draw(&mut app), @r"
        ▎▶ Roupas #1
           Acessórios #3
        ");
    }

    #[test]
    fn expanded_with_hidden_and_draft() {
        let mut app = sample_app();
        app.board.tree_mut().expand(CategoryId(1));
        app.board.toggle_hidden(CategoryId(2));
        let t = app.board.start_add(Some(CategoryId(1))).unwrap();
        app.board.update_draft_name(t, "Bolsos");
        app.board.drain_events();
        assert_snapshot!(draw(&mut app), @r"
        ▎▼ Roupas #1
            ├  Camisetas #2 (hidden)
            └+ Bolsos (unsaved)
           Acessórios #3
        ");
    }

    #[test]
    fn editing_row_shows_cursor_block() {
        let mut app = sample_app();
        app.board.start_add(None);
        app.process_events();
        app.edit_buffer = "Calçados".into();
        app.edit_cursor = app.edit_buffer.len();
        assert_snapshot!(draw(&mut app), @r"
         ▶ Roupas #1
           Acessórios #3
        ▎+ Calçados
        ");
    }

    #[test]
    fn drag_marks_source_and_target() {
        let mut app = sample_app();
        app.board.drag_start(CategoryId(3));
        app.board.drag_over(CategoryId(1));
        assert_snapshot!(draw(&mut app), @r"
        ▎▶ Roupas #1 ← drop here
           Acessórios #3 [moving]
        ");
    }

    #[test]
    fn empty_tree_hint() {
        let mut app = app_with_forest(Vec::new());
        assert_eq!(draw(&mut app), " No categories. Press A to add one.");
    }

    #[test]
    fn cursor_scrolls_into_view() {
        let forest = (1..=20)
            .map(|i| Category::new(CategoryId(i), format!("C{}", i), None))
            .collect();
        let mut app = app_with_forest(forest);
        app.cursor = 15;
        render_to_string(TERM_W, 5, |frame, area| {
            render_tree_view(frame, &mut app, area);
        });
        assert_eq!(app.scroll_offset, 11);
    }
}
