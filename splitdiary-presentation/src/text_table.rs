use std::{borrow::Cow, fmt::Write};

const CELL_PADDING: usize = 1;
const COLUMN_SEPARATOR: char = '│';
const RULE: char = '─';
const RULE_CROSSING: char = '┼';

#[derive(Default)]
pub struct TextTableBuilder<'a, Seq> {
    headers: &'a [Cow<'a, str>],
    rows: Vec<Seq>,
    alignments: Cow<'a, [Alignment]>,
}

#[derive(Clone, Copy, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl<'a, Seq> TextTableBuilder<'a, Seq>
where
    Seq: AsRef<[Cow<'a, str>]> + Default,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alignments(mut self, alignments: &'a [Alignment]) -> Self {
        self.alignments = Cow::Borrowed(alignments);
        self
    }

    pub fn headers(mut self, headers: &'a [Cow<'a, str>]) -> Self {
        self.headers = headers;
        if self.alignments.is_empty() {
            self.alignments = Cow::Owned(vec![Alignment::default(); self.headers.len()]);
        }
        self
    }

    pub fn row(mut self, row: Seq) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Seq>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn build(self) -> String {
        let col_count = self.headers.len();
        if col_count == 0 {
            return String::new();
        }

        let mut col_widths: Vec<usize> = self.headers.iter().map(|h| display_width(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.as_ref().iter().enumerate() {
                if i < col_widths.len() {
                    col_widths[i] = col_widths[i].max(display_width(cell));
                }
            }
        }

        let mut table = String::with_capacity(256);
        self.write_line(&mut table, self.headers, &col_widths);

        let rule: Vec<String> = col_widths
            .iter()
            .map(|width| RULE.to_string().repeat(width + CELL_PADDING * 2))
            .collect();
        let _ = writeln!(&mut table, "{}", rule.join(&RULE_CROSSING.to_string()));

        for row in &self.rows {
            self.write_line(&mut table, row.as_ref(), &col_widths);
        }

        table
    }

    fn write_line(&self, out: &mut String, cells: &[Cow<'a, str>], col_widths: &[usize]) {
        let padding = " ".repeat(CELL_PADDING);
        let mut line = String::new();
        for (i, width) in col_widths.iter().enumerate() {
            if i > 0 {
                line.push(COLUMN_SEPARATOR);
            }
            let cell = cells.get(i).map_or("", |cell| &**cell);
            let alignment = self.alignments.get(i).copied().unwrap_or_default();
            line.push_str(&padding);
            line.push_str(&pad(cell, *width, alignment));
            line.push_str(&padding);
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }
}

/// Terminal columns a string occupies. Non-ASCII characters are counted as
/// double width, which holds for the CJK and emoji glyphs seen in names.
fn display_width(text: &str) -> usize {
    text.chars()
        .map(|c| if c.is_ascii() || is_narrow_symbol(c) { 1 } else { 2 })
        .sum()
}

fn is_narrow_symbol(c: char) -> bool {
    matches!(c, '₹' | '€' | '£' | '¥' | '✓' | '⚠' | '−')
}

fn pad(text: &str, width: usize, alignment: Alignment) -> String {
    let fill = width.saturating_sub(display_width(text));
    match alignment {
        Alignment::Left => format!("{text}{}", " ".repeat(fill)),
        Alignment::Right => format!("{}{text}", " ".repeat(fill)),
        Alignment::Center => {
            let left = fill / 2;
            format!("{}{text}{}", " ".repeat(left), " ".repeat(fill - left))
        }
    }
}
