use ratatui::style::Color;

use crate::engine::board::NoticeLevel;
use crate::model::UiConfig;

/// Colors used by the tree editor. Every slot can be overridden from
/// `[ui.colors]` by field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub cyan: Color,
    pub selection_bg: Color,
    pub selection_border: Color,
    pub selection_id: Color,
    /// Row currently hovered by a drag
    pub drop_target_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x10, 0x14, 0x12),
            text: Color::Rgb(0xC8, 0xD3, 0xC0),
            text_bright: Color::Rgb(0xF4, 0xF7, 0xEE),
            highlight: Color::Rgb(0x8F, 0xD1, 0x4F),
            dim: Color::Rgb(0x6E, 0x7A, 0x68),
            red: Color::Rgb(0xF2, 0x5F, 0x5C),
            yellow: Color::Rgb(0xF2, 0xC1, 0x4E),
            green: Color::Rgb(0x5F, 0xD0, 0x8A),
            cyan: Color::Rgb(0x4E, 0xC5, 0xD4),
            selection_bg: Color::Rgb(0x23, 0x33, 0x24),
            selection_border: Color::Rgb(0x8F, 0xD1, 0x4F),
            selection_id: Color::Rgb(0xB5, 0xC9, 0x9A),
            drop_target_bg: Color::Rgb(0x1B, 0x3A, 0x4A),
        }
    }
}

/// `#RRGGBB` or the `#RGB` shorthand
fn parse_hex_color(value: &str) -> Option<Color> {
    let digits = value.trim().strip_prefix('#')?;
    if !digits.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match digits.len() {
        6 => Some(Color::Rgb(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        3 => {
            let short = |i: usize| channel(&digits[i..i + 1]).map(|c| c * 0x11);
            Some(Color::Rgb(short(0)?, short(1)?, short(2)?))
        }
        _ => None,
    }
}

impl Theme {
    /// Default palette with the workspace's `[ui.colors]` applied on top.
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();
        for (slot, value) in &ui.colors {
            match parse_hex_color(value) {
                Some(color) => {
                    if !theme.set_slot(slot, color) {
                        log::warn!("unknown theme color slot: {}", slot);
                    }
                }
                None => log::warn!("ignoring color {} = {:?}: expected #RRGGBB", slot, value),
            }
        }
        theme
    }

    fn set_slot(&mut self, slot: &str, color: Color) -> bool {
        let field = match slot {
            "background" => &mut self.background,
            "text" => &mut self.text,
            "text_bright" => &mut self.text_bright,
            "highlight" => &mut self.highlight,
            "dim" => &mut self.dim,
            "red" => &mut self.red,
            "yellow" => &mut self.yellow,
            "green" => &mut self.green,
            "cyan" => &mut self.cyan,
            "selection_bg" => &mut self.selection_bg,
            "selection_border" => &mut self.selection_border,
            "selection_id" => &mut self.selection_id,
            "drop_target_bg" => &mut self.drop_target_bg,
            _ => return false,
        };
        *field = color;
        true
    }

    pub fn notice_color(&self, level: NoticeLevel) -> Color {
        match level {
            NoticeLevel::Info => self.green,
            NoticeLevel::Warning => self.yellow,
            NoticeLevel::Error => self.red,
        }
    }
}
