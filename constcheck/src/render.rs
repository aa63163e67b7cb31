//! Text rendering for CLI output

use std::fmt::Write as _;

use console::Style;
use constchecklib::{CheckResult, OccurrenceMap};
use serde::Serialize;

/// Width the count column is padded to, pipe included.
const COUNT_WIDTH: usize = 4;

/// How output is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Emit ANSI colors
    pub color: bool,
}

impl DisplayConfig {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, style: &Style) -> String {
        if self.color {
            style.clone().force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Styles for each part of a report
struct Palette {
    count: Style,
    pipe: Style,
    path: Style,
}

impl Palette {
    fn new() -> Self {
        Self {
            count: Style::new().yellow(),
            pipe: Style::new().cyan(),
            path: Style::new().magenta(),
        }
    }
}

/// Render one occurrence map, least repeated first, followed by a blank
/// line.
///
/// ```text
/// 3   | abc
/// 12  | utf-8
/// ```
pub fn render_occurrences(occurrences: &OccurrenceMap, display: &DisplayConfig) -> String {
    let palette = Palette::new();
    let mut out = String::new();
    write_occurrences(&mut out, occurrences, display, &palette);
    out
}

/// Render every path of a check result in sorted order, each as a heading
/// underlined with dashes followed by its occurrences.
pub fn render_paths(result: &CheckResult, display: &DisplayConfig) -> String {
    let palette = Palette::new();
    let mut out = String::new();

    for (path, occurrences) in result.paths.iter() {
        let label = path.display().to_string();
        let underline = "-".repeat(label.chars().count());
        let _ = writeln!(out, "{}", display.paint(&label, &palette.path));
        let _ = writeln!(out, "{underline}");
        write_occurrences(&mut out, occurrences, display, &palette);
    }

    out
}

/// Render any result as pretty-printed JSON.
pub fn render_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

fn write_occurrences(
    out: &mut String,
    occurrences: &OccurrenceMap,
    display: &DisplayConfig,
    palette: &Palette,
) {
    for (literal, count) in occurrences.sorted_by_count() {
        let count = count.to_string();
        let pad = " ".repeat(COUNT_WIDTH.saturating_sub(count.len()));
        let _ = writeln!(
            out,
            "{}{pad}{} {literal}",
            display.paint(&count, &palette.count),
            display.paint("|", &palette.pipe),
        );
    }
    out.push('\n');
}
