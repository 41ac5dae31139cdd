//! Renderable report model.
//!
//! A report is a list of [`Section`]s built from styled [`Span`]s. The model
//! says *what* to show using semantic [`Style`] roles; a [`Renderer`] decides
//! *how*. [`TerminalRenderer`] draws to an ANSI terminal.

use std::io;

use unicode_width::UnicodeWidthStr;

mod terminal;

pub use terminal::TerminalRenderer;

/// Semantic style roles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Style {
    /// Borders and tree guides.
    Main,
    /// Titles and column headers.
    Header,
    /// Configuration keys and labels.
    Key,
    /// String values.
    Value,
    /// Citations, file paths and links.
    SecondaryValue,
    /// Numbers.
    Number,
    /// Booleans.
    Boolean,
    /// Unstyled text.
    #[default]
    Plain,
}

/// Text decorations layered on a [`Style`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Decoration {
    /// Faint text.
    pub dim: bool,
    /// Struck-through text.
    pub strikethrough: bool,
}

impl Decoration {
    /// No decoration.
    pub const NONE: Self = Self {
        dim: false,
        strikethrough: false,
    };

    /// Faint.
    pub const DIM: Self = Self {
        dim: true,
        strikethrough: false,
    };

    /// Faint and struck through; used for overridden values.
    pub const OVERRIDDEN: Self = Self {
        dim: true,
        strikethrough: true,
    };
}

/// A run of text with one style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    /// The text.
    pub text: String,
    /// Style role.
    pub style: Style,
    /// Decorations.
    pub decoration: Decoration,
    /// Hyperlink target, if any.
    pub link: Option<String>,
}

impl Span {
    /// A styled span.
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
            decoration: Decoration::NONE,
            link: None,
        }
    }

    /// An unstyled span.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Style::Plain)
    }

    /// Sets the decoration.
    #[must_use]
    pub fn decorated(mut self, decoration: Decoration) -> Self {
        self.decoration = decoration;

        self
    }

    /// Sets the hyperlink target.
    #[must_use]
    pub fn linked(mut self, target: impl Into<String>) -> Self {
        self.link = Some(target.into());

        self
    }
}

/// A line of spans.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Paragraph {
    /// The spans, in order.
    pub spans: Vec<Span>,
}

impl Paragraph {
    /// An empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// A paragraph holding one styled span.
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self::from(Span::new(text, style))
    }

    /// Appends a span.
    #[must_use]
    pub fn with(mut self, span: Span) -> Self {
        self.spans.push(span);

        self
    }

    /// Appends a span in place.
    pub fn push(&mut self, span: Span) {
        self.spans.push(span);
    }

    /// Appends spans in place.
    pub fn extend(&mut self, spans: impl IntoIterator<Item = Span>) {
        self.spans.extend(spans);
    }

    /// Concatenated text without styling.
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }

    /// Display width in terminal columns.
    pub fn width(&self) -> usize {
        self.spans.iter().map(|span| span.text.width()).sum()
    }

    /// Returns `true` if the paragraph has no text.
    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|span| span.text.is_empty())
    }
}

impl From<Span> for Paragraph {
    fn from(span: Span) -> Self {
        Self { spans: vec![span] }
    }
}

impl FromIterator<Span> for Paragraph {
    fn from_iter<I: IntoIterator<Item = Span>>(iter: I) -> Self {
        Self {
            spans: iter.into_iter().collect(),
        }
    }
}

/// Horizontal alignment of a column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Justify {
    /// Left-aligned.
    #[default]
    Left,
    /// Right-aligned.
    Right,
}

/// Table border style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Border {
    /// Rounded box-drawing border.
    #[default]
    Rounded,
    /// No border; cells separated by a space.
    None,
}

/// A table column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Column {
    /// Header cell.
    pub header: Paragraph,
    /// Alignment of every cell in the column.
    pub justify: Justify,
}

impl Column {
    /// A left-aligned column.
    pub fn new(header: impl Into<Paragraph>) -> Self {
        Self {
            header: header.into(),
            justify: Justify::Left,
        }
    }

    /// Sets the alignment.
    #[must_use]
    pub fn justify(mut self, justify: Justify) -> Self {
        self.justify = justify;

        self
    }
}

/// A table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    /// Columns.
    pub columns: Vec<Column>,
    /// Rows; each has one cell per column.
    pub rows: Vec<Vec<Paragraph>>,
    /// Whether the header row is drawn.
    pub show_headers: bool,
    /// Border style.
    pub border: Border,
}

impl Table {
    /// A bordered table with headers shown.
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            show_headers: true,
            border: Border::Rounded,
        }
    }

    /// Hides the header row.
    #[must_use]
    pub fn hide_headers(mut self) -> Self {
        self.show_headers = false;

        self
    }

    /// Sets the border style.
    #[must_use]
    pub fn border(mut self, border: Border) -> Self {
        self.border = border;

        self
    }

    /// Appends a row, padding or truncating it to the column count.
    pub fn add_row(&mut self, mut cells: Vec<Paragraph>) {
        cells.resize_with(self.columns.len(), Paragraph::new);
        self.rows.push(cells);
    }
}

/// Label of a tree item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Label {
    /// One line of text.
    Text(Paragraph),
    /// A table drawn in place of the label.
    Table(Table),
}

/// A node in a [`Tree`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeItem {
    /// The node's label.
    pub label: Label,
    /// Child nodes.
    pub children: Vec<TreeItem>,
}

impl TreeItem {
    /// A leaf with the given label.
    pub fn new(label: Label) -> Self {
        Self {
            label,
            children: Vec::new(),
        }
    }
}

/// A tree with a titled root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree {
    /// Root label.
    pub root: Paragraph,
    /// Top-level nodes.
    pub children: Vec<TreeItem>,
    /// Columns of left and right padding.
    pub padding: usize,
}

/// One block of a report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Section {
    /// A horizontal rule, optionally titled.
    Rule(Option<String>),
    /// A table.
    Table(Table),
    /// A tree.
    Tree(Tree),
}

/// Draws report sections to some output.
pub trait Renderer {
    /// Draws a horizontal rule with an optional left-aligned title.
    fn rule(&mut self, title: Option<&str>) -> io::Result<()>;

    /// Draws a table.
    fn table(&mut self, table: &Table) -> io::Result<()>;

    /// Draws a tree.
    fn tree(&mut self, tree: &Tree) -> io::Result<()>;

    /// Draws any section.
    fn section(&mut self, section: &Section) -> io::Result<()> {
        match section {
            Section::Rule(title) => self.rule(title.as_deref()),
            Section::Table(table) => self.table(table),
            Section::Tree(tree) => self.tree(tree),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_width_uses_display_columns() {
        let paragraph = Paragraph::new()
            .with(Span::new("🌳", Style::Header))
            .with(Span::plain(" ab"));

        assert_eq!(paragraph.text(), "🌳 ab");
        assert_eq!(paragraph.width(), 5);
    }

    #[test]
    fn test_add_row_matches_column_count() {
        let mut table = Table::new(vec![Column::new(Span::plain("a")), Column::new(Span::plain("b"))]);
        table.add_row(vec![Paragraph::styled("1", Style::Number)]);
        table.add_row(vec![
            Paragraph::styled("1", Style::Number),
            Paragraph::new(),
            Paragraph::new(),
        ]);

        assert!(table.rows.iter().all(|row| row.len() == 2));
    }

    #[test]
    fn test_section_dispatch() {
        #[derive(Default)]
        struct Calls(Vec<&'static str>);

        impl Renderer for Calls {
            fn rule(&mut self, _: Option<&str>) -> io::Result<()> {
                self.0.push("rule");
                Ok(())
            }

            fn table(&mut self, _: &Table) -> io::Result<()> {
                self.0.push("table");
                Ok(())
            }

            fn tree(&mut self, _: &Tree) -> io::Result<()> {
                self.0.push("tree");
                Ok(())
            }
        }

        let mut calls = Calls::default();
        for section in [
            Section::Rule(None),
            Section::Table(Table::default()),
            Section::Tree(Tree {
                root: Paragraph::new(),
                children: Vec::new(),
                padding: 0,
            }),
        ] {
            calls.section(&section).expect("infallible");
        }

        assert_eq!(calls.0, ["rule", "table", "tree"]);
    }
}
