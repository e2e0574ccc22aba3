//! Fixture table markup.
//!
//! Markup is split into tables, rows and cells while keeping every byte of
//! surrounding text, so serializing an untouched parse gives back the input.
//! Fixtures annotate cells in place (pass/fail/ignore/error) and the
//! annotated markup becomes the result content.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::counters::Counters;
use crate::errors::TableError;
use crate::repository::render::escape_html;

struct TagPattern {
    name: &'static str,
    open: Regex,
    close: Regex,
}

impl TagPattern {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            open: Regex::new(&format!(r"(?i)<{name}\b[^>]*>")).unwrap(),
            close: Regex::new(&format!(r"(?i)</{name}\s*>")).unwrap(),
        }
    }
}

static TABLE: Lazy<TagPattern> = Lazy::new(|| TagPattern::new("table"));
static ROW: Lazy<TagPattern> = Lazy::new(|| TagPattern::new("tr"));
static CELL: Lazy<TagPattern> = Lazy::new(|| TagPattern::new("td"));
static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Returns true when `text` contains at least one table element.
pub fn contains_table(text: &str) -> bool {
    TABLE.open.is_match(text)
}

// ============================================================================
// SPLITTING - Generic element scanner
// ============================================================================

struct Element<'a> {
    leader: &'a str,
    tag: &'a str,
    inner: &'a str,
    end: &'a str,
}

/// Splits `text` into top-level `pattern` elements plus the text after the
/// last one. Nested elements of the same tag stay inside their parent.
fn split<'a>(
    text: &'a str,
    pattern: &TagPattern,
    offset: usize,
) -> Result<(Vec<Element<'a>>, &'a str), TableError> {
    let mut elements = Vec::new();
    let mut pos = 0;
    while let Some(open) = pattern.open.find_at(text, pos) {
        let mut depth = 1;
        let mut cursor = open.end();
        let close = loop {
            let Some(close) = pattern.close.find_at(text, cursor) else {
                return Err(TableError::Unterminated {
                    tag: pattern.name,
                    offset: offset + open.start(),
                });
            };
            match pattern.open.find_at(text, cursor) {
                Some(nested) if nested.start() < close.start() => {
                    depth += 1;
                    cursor = nested.end();
                }
                _ => {
                    depth -= 1;
                    cursor = close.end();
                    if depth == 0 {
                        break close;
                    }
                }
            }
        };
        elements.push(Element {
            leader: &text[pos..open.start()],
            tag: open.as_str(),
            inner: &text[open.end()..close.start()],
            end: close.as_str(),
        });
        pos = close.end();
    }
    Ok((elements, &text[pos..]))
}

// ============================================================================
// MODEL - Tables, rows, cells
// ============================================================================

/// All tables of a document plus the text following the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    pub tables: Vec<Table>,
    pub trailer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub leader: String,
    pub tag: String,
    pub rows: Vec<Row>,
    pub trailer: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub leader: String,
    pub tag: String,
    pub cells: Vec<Cell>,
    pub trailer: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub leader: String,
    pub tag: String,
    pub body: String,
    pub end: String,
}

impl Tables {
    /// Parses every table in `text`.
    pub fn parse(text: &str) -> Result<Self, TableError> {
        let (elements, trailer) = split(text, &TABLE, 0)?;
        let mut offset = 0;
        let mut tables = Vec::with_capacity(elements.len());
        for element in elements {
            offset += element.leader.len() + element.tag.len();
            tables.push(Table::from_element(&element, offset)?);
            offset += element.inner.len() + element.end.len();
        }
        Ok(Self {
            tables,
            trailer: trailer.to_string(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Table {
    fn from_element(element: &Element<'_>, offset: usize) -> Result<Self, TableError> {
        let (elements, trailer) = split(element.inner, &ROW, offset)?;
        if elements.is_empty() {
            return Err(TableError::Missing { tag: "tr" });
        }
        let mut row_offset = offset;
        let mut rows = Vec::with_capacity(elements.len());
        for row in elements {
            row_offset += row.leader.len() + row.tag.len();
            rows.push(Row::from_element(&row, row_offset)?);
            row_offset += row.inner.len() + row.end.len();
        }
        Ok(Self {
            leader: element.leader.to_string(),
            tag: element.tag.to_string(),
            rows,
            trailer: trailer.to_string(),
            end: element.end.to_string(),
        })
    }

    /// The fixture name: text of the first cell of the first row.
    pub fn fixture_name(&self) -> String {
        self.rows
            .first()
            .and_then(|row| row.cells.first())
            .map(Cell::text)
            .unwrap_or_default()
    }

    /// The first cell of the table, where table-level errors are reported.
    pub fn head_mut(&mut self) -> Option<&mut Cell> {
        self.rows.first_mut().and_then(|row| row.cells.first_mut())
    }
}

impl Row {
    fn from_element(element: &Element<'_>, offset: usize) -> Result<Self, TableError> {
        let (elements, trailer) = split(element.inner, &CELL, offset)?;
        if elements.is_empty() {
            return Err(TableError::Missing { tag: "td" });
        }
        Ok(Self {
            leader: element.leader.to_string(),
            tag: element.tag.to_string(),
            cells: elements
                .into_iter()
                .map(|cell| Cell {
                    leader: cell.leader.to_string(),
                    tag: cell.tag.to_string(),
                    body: cell.inner.to_string(),
                    end: cell.end.to_string(),
                })
                .collect(),
            trailer: trailer.to_string(),
            end: element.end.to_string(),
        })
    }

    /// Text of every cell in the row.
    pub fn texts(&self) -> Vec<String> {
        self.cells.iter().map(Cell::text).collect()
    }
}

// ============================================================================
// ANNOTATION - fit cell conventions
// ============================================================================

impl Cell {
    /// A bare cell, mostly useful to fixtures appending cells.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            leader: String::new(),
            tag: "<td>".to_string(),
            body: body.into(),
            end: "</td>".to_string(),
        }
    }

    /// The cell body with markup stripped and common entities decoded.
    pub fn text(&self) -> String {
        let stripped = MARKUP.replace_all(&self.body, "");
        unescape(&stripped).trim().to_string()
    }

    fn add_class(&mut self, class: &str) {
        let insert_at = self.tag.rfind('>').unwrap_or(self.tag.len());
        self.tag.insert_str(insert_at, &format!(" class=\"{class}\""));
    }

    pub fn right(&mut self, counts: &mut Counters) {
        self.add_class("pass");
        counts.right += 1;
    }

    /// Marks the cell wrong, showing the actual value next to the expected
    /// one when given.
    pub fn wrong(&mut self, counts: &mut Counters, actual: Option<&str>) {
        self.add_class("fail");
        if let Some(actual) = actual {
            self.body.push_str(&format!(
                " {}<hr>{} {}",
                label("expected"),
                escape_html(actual),
                label("actual")
            ));
        }
        counts.wrong += 1;
    }

    pub fn ignore(&mut self, counts: &mut Counters) {
        self.add_class("ignore");
        counts.ignored += 1;
    }

    pub fn exception(&mut self, counts: &mut Counters, message: &str) {
        self.add_class("error");
        self.body.push_str(&format!(
            "<hr><pre><div class=\"fit_stacktrace\">{}</div></pre>",
            escape_html(message)
        ));
        counts.exceptions += 1;
    }

    /// Appends an uncounted, grayed note.
    pub fn info(&mut self, text: &str) {
        self.body
            .push_str(&format!(" <span class=\"fit_grey\">{}</span>", escape_html(text)));
    }
}

fn label(text: &str) -> String {
    format!("<span class=\"fit_label\">{text}</span>")
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

// ============================================================================
// SERIALIZATION
// ============================================================================

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}", self.leader, self.tag, self.body, self.end)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.leader, self.tag)?;
        for cell in &self.cells {
            write!(f, "{cell}")?;
        }
        write!(f, "{}{}", self.trailer, self.end)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.leader, self.tag)?;
        for row in &self.rows {
            write!(f, "{row}")?;
        }
        write!(f, "{}{}", self.trailer, self.end)
    }
}

impl fmt::Display for Tables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for table in &self.tables {
            write!(f, "{table}")?;
        }
        write!(f, "{}", self.trailer)
    }
}
