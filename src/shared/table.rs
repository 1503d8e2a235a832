//! Column layout helpers for `list` and the interactive screen.
//! Widths are measured on visible characters so colored cells line up.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Render rows under a header and an `=` rule. Column widths come from the
/// widest cell; `aligns` picks the side each column is padded on (missing
/// entries default to left).
pub fn render_table(
    headers: &[String],
    aligns: &[Align],
    rows: &[Vec<String>],
) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| display_len(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(display_len(cell));
        }
    }

    let header_line = format_row(headers, aligns, &widths);
    let mut out = String::new();
    out.push_str(header_line.trim_end());
    out.push('\n');
    out.push_str(&"=".repeat(display_len(&header_line)));
    for row in rows {
        out.push('\n');
        out.push_str(format_row(row, aligns, &widths).trim_end());
    }
    out
}

fn format_row(row: &[String], aligns: &[Align], widths: &[usize]) -> String {
    row.iter()
        .zip(widths.iter())
        .enumerate()
        .map(|(i, (cell, width))| {
            let align = aligns.get(i).copied().unwrap_or(Align::Left);
            pad_field(cell, *width, align)
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Pad to `target` visible columns on the side given by `align`.
pub fn pad_field(display: &str, target: usize, align: Align) -> String {
    let padding = " ".repeat(target.saturating_sub(display_len(display)));
    match align {
        Align::Left => format!("{display}{padding}"),
        Align::Right => format!("{padding}{display}"),
    }
}

/// Truncate text to a width, appending an ellipsis when needed.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_width - 1).collect();
    out.push('…');
    out
}

/// Visible length of a string, skipping ANSI escape sequences.
pub fn display_len(s: &str) -> usize {
    let mut len = 0;
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
            continue;
        }
        len += 1;
    }
    len
}
