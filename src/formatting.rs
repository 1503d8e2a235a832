use crate::entry::{Entry, format_key};
use crate::shared::table::{Align, display_len, pad_field, truncate_with_ellipsis};
use yansi::Paint;

/// Width of the key column, matching the classic `{:>6}` layout.
pub const KEY_WIDTH: usize = 6;

/// Color palette for consistent theming
pub struct ColorPalette {
    pub muted: (u8, u8, u8),   // positions, keyless markers
    pub header: (u8, u8, u8),  // headers, status line
    pub key: (u8, u8, u8),     // sort values
    pub warning: (u8, u8, u8), // errors, held entry
}

impl ColorPalette {
    pub const CATPPUCCIN: Self = Self {
        muted: (108, 112, 134),   // Gray
        header: (148, 226, 213),  // Teal
        key: (137, 180, 250),     // Blue
        warning: (243, 139, 168), // Pink
    };
}

/// Formatting context passed through rendering pipeline
pub struct FormatContext {
    pub use_color: bool,
    pub palette: ColorPalette,
}

impl FormatContext {
    pub fn new(use_color: bool) -> Self {
        Self { use_color, palette: ColorPalette::CATPPUCCIN }
    }

    fn paint(&self, text: &str, (r, g, b): (u8, u8, u8)) -> String {
        if self.use_color {
            Paint::rgb(text, r, g, b).to_string()
        } else {
            text.to_string()
        }
    }

    /// Key text without padding: the number, or `None` when keyless.
    pub fn key_text(key: Option<f64>) -> String {
        key.map(format_key).unwrap_or_else(|| "None".to_string())
    }

    pub fn format_key(&self, key: Option<f64>) -> String {
        let text = Self::key_text(key);
        match key {
            Some(_) => self.paint(&text, self.palette.key),
            None => self.paint(&text, self.palette.muted),
        }
    }

    pub fn format_position(&self, position: usize) -> String {
        self.paint(&position.to_string(), self.palette.muted)
    }

    pub fn format_header(&self, text: &str) -> String {
        if self.use_color {
            let (r, g, b) = self.palette.header;
            Paint::rgb(text, r, g, b).bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn format_error(&self, text: &str) -> String {
        if self.use_color {
            let (r, g, b) = self.palette.warning;
            Paint::rgb(text, r, g, b).bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// One screen row no wider than `width`: right-aligned key, then the
    /// file name. The selected row is inverted and the held row (moving
    /// mode) gets a `>` marker.
    pub fn entry_line(
        &self,
        entry: &Entry,
        selected: bool,
        held: bool,
        width: usize,
    ) -> String {
        let key = pad_field(&Self::key_text(entry.sort_key), KEY_WIDTH, Align::Right);
        let marker = if held { ">" } else { " " };
        let name = truncate_with_ellipsis(
            &entry.display_name(),
            width.saturating_sub(display_len(&key) + 1),
        );
        let line = format!("{key}{marker}{name}");

        if !self.use_color {
            return line;
        }
        match (selected, held) {
            (true, _) => Paint::new(line).invert().to_string(),
            (false, true) => self.paint(&line, self.palette.warning),
            (false, false) => {
                let color = if entry.is_keyed() {
                    self.palette.key
                } else {
                    self.palette.muted
                };
                format!("{}{marker}{name}", self.paint(&key, color))
            }
        }
    }
}
