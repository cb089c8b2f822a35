//! Terminal output: notices and record tables.

use showroom_core::{Notice, NoticeLevel};
use showroom_logging::NoticeLogger;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Honours `NO_COLOR` and dumb terminals.
fn color_enabled() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::env::var_os("COLORTERM").is_some()
        || std::env::var("TERM").is_ok_and(|term| term != "dumb")
}

/// Characters a cell occupies on screen, skipping SGR escape sequences.
fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in s.chars() {
        match (in_escape, c) {
            (false, '\x1b') => in_escape = true,
            (false, _) => width += 1,
            (true, 'm') => in_escape = false,
            (true, _) => {}
        }
    }
    width
}

enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

impl Tone {
    /// (color, glyph, plain prefix)
    fn marks(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            Tone::Info => ("\x1b[36m", "ℹ", "INFO"),
            Tone::Success => ("\x1b[32m", "✓", "OK"),
            Tone::Warning => ("\x1b[33m", "⚠", "WARN"),
            Tone::Error => ("\x1b[31m", "✗", "ERROR"),
        }
    }
}

fn note(tone: Tone, msg: &str) {
    let (color, glyph, prefix) = tone.marks();
    let line = if color_enabled() {
        format!("{color}{BOLD}{glyph}{RESET} {msg}")
    } else {
        format!("{prefix}: {msg}")
    };
    match tone {
        Tone::Error => eprintln!("{line}"),
        _ => println!("{line}"),
    }
}

pub fn note_info(msg: &str) {
    note(Tone::Info, msg);
}

pub fn note_success(msg: &str) {
    note(Tone::Success, msg);
}

pub fn note_warn(msg: &str) {
    note(Tone::Warning, msg);
}

/// Errors go to stderr.
pub fn note_error(msg: &str) {
    note(Tone::Error, msg);
}

/// Show an editor notice and record it in the log.
pub fn print_notice(notice: &Notice) {
    NoticeLogger::emit(notice);
    let tone = match notice.level {
        NoticeLevel::Success => Tone::Success,
        NoticeLevel::Warning => Tone::Warning,
        NoticeLevel::Error => Tone::Error,
    };
    note(tone, &notice.message);
}

/// Dimmed placeholder for an empty cell.
pub fn blank() -> String {
    if color_enabled() {
        format!("{DIM}-{RESET}")
    } else {
        "-".to_string()
    }
}

/// Cut `s` to at most `max` characters, marking the cut with `…`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

pub struct Column {
    header: String,
    right: bool,
}

impl Column {
    pub fn left(header: impl Into<String>) -> Self {
        Self { header: header.into(), right: false }
    }

    /// For numbers and counts.
    pub fn right(header: impl Into<String>) -> Self {
        Self { header: header.into(), right: true }
    }

    fn pad(&self, cell: &str, width: usize) -> String {
        let fill = " ".repeat(width.saturating_sub(visible_width(cell)));
        if self.right {
            format!("{fill}{cell}")
        } else {
            format!("{cell}{fill}")
        }
    }
}

/// Header, dashed rule, then one line per row. Missing cells render empty.
pub fn render_table(columns: &[Column], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| visible_width(cell))
                .fold(visible_width(&column.header), usize::max)
        })
        .collect();

    let line = |cells: Vec<String>| format!("  {}  \n", cells.join("  "));
    let header = line(
        columns
            .iter()
            .zip(&widths)
            .map(|(column, width)| column.pad(&column.header, *width))
            .collect(),
    );

    let mut out = if color_enabled() {
        format!("{BOLD}{}{RESET}\n", header.trim_end_matches('\n'))
    } else {
        header
    };
    out.push_str(&line(widths.iter().map(|width| "-".repeat(*width)).collect()));
    for row in rows {
        out.push_str(&line(
            columns
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (column, width))| {
                    column.pad(row.get(i).map(String::as_str).unwrap_or(""), *width)
                })
                .collect(),
        ));
    }
    out
}
