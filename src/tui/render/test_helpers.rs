use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::engine::board::CategoryBoard;
use crate::io::backend::{CategoryBackend, MemoryBackend};
use crate::model::UiConfig;
use crate::model::category::{Category, CategoryId};
use crate::tui::app::App;

pub const TERM_W: u16 = 60;
pub const TERM_H: u16 = 12;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Roupas #1 > Camisetas #2, plus Acessórios #3, all collapsed.
pub fn sample_forest() -> Vec<Category> {
    vec![
        Category::new(CategoryId(1), "Roupas", None).with_children(vec![Category::new(
            CategoryId(2),
            "Camisetas",
            Some(CategoryId(1)),
        )]),
        Category::new(CategoryId(3), "Acessórios", None),
    ]
}

/// An App over an in-memory backend holding `forest`.
pub fn app_with_forest(forest: Vec<Category>) -> App {
    let backend: Box<dyn CategoryBackend> = Box::new(MemoryBackend::with_forest(forest).unwrap());
    let board = CategoryBoard::load(backend).unwrap();
    App::new(board, "Loja", &UiConfig::default())
}

pub fn sample_app() -> App {
    app_with_forest(sample_forest())
}
