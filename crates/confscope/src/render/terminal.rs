//! ANSI terminal renderer.

use std::env::var_os;
use std::io::{self, Stdout, Write};

use owo_colors::{OwoColorize, Rgb};
use supports_color::Stream;
use unicode_width::UnicodeWidthStr;

use super::{
    Border, Column, Decoration, Justify, Label, Paragraph, Renderer, Style, Table, Tree, TreeItem,
};

/// Width used when the terminal size is unknown.
pub const DEFAULT_WIDTH: usize = 80;

const RULE: char = '─';

/// Draws sections as text with truecolor styling, OSC-8 hyperlinks, rounded
/// table borders and tree guides.
///
/// Layout is identical with and without colour, so plain output is a stable
/// representation of the report.
#[derive(Debug)]
pub struct TerminalRenderer<W: Write> {
    out: W,
    color: bool,
    width: usize,
}

impl TerminalRenderer<Stdout> {
    /// Renders to stdout, with colour if stdout supports it.
    ///
    /// Honours `NO_COLOR`, `FORCE_COLOR` and `COLUMNS`.
    pub fn stdout() -> Self {
        Self::new(io::stdout(), should_use_color()).with_width(terminal_width())
    }
}

impl<W: Write> TerminalRenderer<W> {
    /// Renders to `out`, with or without colour.
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            width: DEFAULT_WIDTH,
        }
    }

    /// Renders to `out` without colour or links.
    pub fn plain(out: W) -> Self {
        Self::new(out, false)
    }

    /// Turns colour and links on or off.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;

        self
    }

    /// Sets the line width used for rules.
    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(1);

        self
    }

    /// Returns the output, consuming the renderer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: &str, style: Style, decoration: Decoration) -> String {
        if !self.color || text.is_empty() {
            return text.to_string();
        }

        let mut ansi = owo_colors::Style::new();
        if let Some(Rgb(r, g, b)) = palette(style) {
            ansi = ansi.truecolor(r, g, b);
        }
        if decoration.dim {
            ansi = ansi.dimmed();
        }
        if decoration.strikethrough {
            ansi = ansi.strikethrough();
        }

        text.style(ansi).to_string()
    }

    fn paragraph(&self, paragraph: &Paragraph) -> String {
        paragraph
            .spans
            .iter()
            .map(|span| {
                let painted = self.paint(&span.text, span.style, span.decoration);
                match (&span.link, self.color) {
                    (Some(target), true) => hyperlink(target, &painted),
                    _ => painted,
                }
            })
            .collect()
    }

    fn guide(&self, text: &str) -> String {
        self.paint(text, Style::Main, Decoration::NONE)
    }

    fn cells<'p>(
        &self,
        row: impl Iterator<Item = &'p Paragraph>,
        widths: &[usize],
        columns: &[Column],
    ) -> Vec<String> {
        row.zip(widths)
            .zip(columns)
            .map(|((cell, &width), column)| {
                let pad = " ".repeat(width.saturating_sub(cell.width()));
                match column.justify {
                    Justify::Left => format!("{}{pad}", self.paragraph(cell)),
                    Justify::Right => format!("{pad}{}", self.paragraph(cell)),
                }
            })
            .collect()
    }

    fn table_lines(&self, table: &Table) -> Vec<String> {
        let columns = &table.columns;
        if columns.is_empty() {
            return Vec::new();
        }

        let mut widths = vec![0; columns.len()];
        if table.show_headers {
            for (width, column) in widths.iter_mut().zip(columns) {
                *width = (*width).max(column.header.width());
            }
        }
        for row in &table.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.width());
            }
        }

        let headers = || columns.iter().map(|column| &column.header);
        let mut lines = Vec::with_capacity(table.rows.len() + 4);

        match table.border {
            Border::None => {
                if table.show_headers {
                    lines.push(self.cells(headers(), &widths, columns).join(" "));
                }
                for row in &table.rows {
                    lines.push(self.cells(row.iter(), &widths, columns).join(" "));
                }
            }
            Border::Rounded => {
                let edge = |left: &str, mid: &str, right: &str| {
                    let inner: Vec<String> = widths
                        .iter()
                        .map(|width| RULE.to_string().repeat(width + 2))
                        .collect();
                    self.guide(&format!("{left}{}{right}", inner.join(mid)))
                };
                let bar = self.guide("│");
                let row_line = |cells: Vec<String>| {
                    let inner: Vec<String> =
                        cells.into_iter().map(|cell| format!(" {cell} ")).collect();
                    format!("{bar}{}{bar}", inner.join(bar.as_str()))
                };

                lines.push(edge("╭", "┬", "╮"));
                if table.show_headers {
                    lines.push(row_line(self.cells(headers(), &widths, columns)));
                    lines.push(edge("├", "┼", "┤"));
                }
                for row in &table.rows {
                    lines.push(row_line(self.cells(row.iter(), &widths, columns)));
                }
                lines.push(edge("╰", "┴", "╯"));
            }
        }

        lines
    }

    fn label_lines(&self, label: &Label) -> Vec<String> {
        match label {
            Label::Text(paragraph) => vec![self.paragraph(paragraph)],
            Label::Table(table) => self.table_lines(table),
        }
    }

    fn tree_lines(&self, items: &[TreeItem], prefix: &str, lines: &mut Vec<String>) {
        for (i, item) in items.iter().enumerate() {
            let last = i + 1 == items.len();
            let (branch, continuation) = if last {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };

            let child_prefix = format!("{prefix}{continuation}");
            for (n, line) in self.label_lines(&item.label).into_iter().enumerate() {
                let guide = if n == 0 {
                    format!("{prefix}{branch}")
                } else {
                    child_prefix.clone()
                };
                lines.push(format!("{}{line}", self.guide(&guide)));
            }

            self.tree_lines(&item.children, &child_prefix, lines);
        }
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn rule(&mut self, title: Option<&str>) -> io::Result<()> {
        let line = match title {
            Some(title) => {
                let lead = format!("{RULE}{RULE} ");
                let used = lead.width() + title.width() + 1;
                let tail = RULE.to_string().repeat(self.width.saturating_sub(used).max(2));
                format!(
                    "{}{}{}",
                    self.paint(&lead, Style::Header, Decoration::NONE),
                    title,
                    self.paint(&format!(" {tail}"), Style::Header, Decoration::NONE)
                )
            }
            None => self.paint(
                &RULE.to_string().repeat(self.width),
                Style::Header,
                Decoration::NONE,
            ),
        };

        writeln!(self.out, "{line}")
    }

    fn table(&mut self, table: &Table) -> io::Result<()> {
        for line in self.table_lines(table) {
            writeln!(self.out, "{line}")?;
        }

        Ok(())
    }

    fn tree(&mut self, tree: &Tree) -> io::Result<()> {
        let pad = " ".repeat(tree.padding);

        let mut lines = vec![self.paragraph(&tree.root)];
        self.tree_lines(&tree.children, "", &mut lines);

        for line in lines {
            writeln!(self.out, "{pad}{}", line.trim_end())?;
        }

        Ok(())
    }
}

/// Truecolor value for a style role.
fn palette(style: Style) -> Option<Rgb> {
    match style {
        Style::Main => Some(Rgb(0x00, 0xaf, 0xd7)),
        Style::Header => Some(Rgb(0xd7, 0xd7, 0x00)),
        Style::Key => Some(Rgb(0xaf, 0xff, 0xff)),
        Style::Value => Some(Rgb(0xff, 0xaf, 0x87)),
        Style::SecondaryValue => Some(Rgb(0xaf, 0xff, 0x5f)),
        Style::Number => Some(Rgb(0xff, 0xd7, 0x00)),
        Style::Boolean => Some(Rgb(0x87, 0x5f, 0xff)),
        Style::Plain => None,
    }
}

/// Wraps `text` in an OSC-8 hyperlink.
fn hyperlink(target: &str, text: &str) -> String {
    format!("\x1b]8;;{target}\x1b\\{text}\x1b]8;;\x1b\\")
}

/// Determine if stdout should be coloured.
///
/// Respects [`NO_COLOR`](https://no-color.org) and `FORCE_COLOR` through
/// `supports-color`.
pub fn should_use_color() -> bool {
    supports_color::on(Stream::Stdout).is_some()
}

fn terminal_width() -> usize {
    var_os("COLUMNS")
        .and_then(|columns| columns.into_string().ok())
        .and_then(|columns| columns.trim().parse().ok())
        .filter(|&width| width > 0)
        .unwrap_or(DEFAULT_WIDTH)
}
