//! Segment-to-column conversion with placeholder substitution.
use std::{
    borrow::{Borrow, Cow},
    collections::HashMap,
    fmt,
    hash::{BuildHasher, Hash},
};

pub const DEFAULT_MISSING: &str = "«{0}»";

/// Outcome of looking up one segment in one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell<'a> {
    Value(Cow<'a, str>),
    /// The segment is not a known grapheme.
    MissingEntry,
    /// The grapheme is known but has no value for the column.
    MissingColumn,
}

/// A table that maps graphemes to per-column values.
pub trait ColumnTable {
    fn cell(&self, grapheme: &str, column: &str) -> Cell<'_>;
}

impl<T: ColumnTable + ?Sized> ColumnTable for &T {
    #[inline]
    fn cell(&self, grapheme: &str, column: &str) -> Cell<'_> {
        (**self).cell(grapheme, column)
    }
}

impl<K, C, V, H1, H2> ColumnTable for HashMap<K, HashMap<C, V, H2>, H1>
where
    K: Borrow<str> + Hash + Eq,
    C: Borrow<str> + Hash + Eq,
    V: AsRef<str>,
    H1: BuildHasher,
    H2: BuildHasher,
{
    fn cell(&self, grapheme: &str, column: &str) -> Cell<'_> {
        match self.get(grapheme) {
            None => Cell::MissingEntry,
            Some(row) => row
                .get(column)
                .map_or(Cell::MissingColumn, |v| Cell::Value(Cow::Borrowed(v.as_ref()))),
        }
    }
}

/// Format template for unmatched segments and absent columns.
///
/// `{0}` (or `{}`) is replaced by the unmatched text, `{{` and `}}` are
/// literal braces. A template without a slot is emitted as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    template: String,
}

impl Default for Placeholder {
    fn default() -> Self {
        Self::new(DEFAULT_MISSING)
    }
}

impl Placeholder {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn fill(&self, text: &str) -> String {
        let mut out = String::with_capacity(self.template.len() + text.len());
        let mut rest = self.template.as_str();
        while let Some(pos) = rest.find(['{', '}']) {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            if let Some(after) = tail.strip_prefix("{{") {
                out.push('{');
                rest = after;
            } else if let Some(after) = tail.strip_prefix("}}") {
                out.push('}');
                rest = after;
            } else if let Some(after) = tail
                .strip_prefix("{0}")
                .or_else(|| tail.strip_prefix("{}"))
            {
                out.push_str(text);
                rest = after;
            } else {
                out.push_str(&tail[..1]);
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        out
    }

    /// Placeholder for a grapheme that lacks `column`.
    pub fn missing_column(&self, column: &str) -> String {
        self.fill(&format!("column--{column}-not-found"))
    }

    /// Turn a lookup outcome into output text.
    #[inline]
    pub fn resolve<'t>(&self, cell: Cell<'t>, segment: &str, column: &str) -> Cow<'t, str> {
        match cell {
            Cell::Value(v) => v,
            Cell::MissingEntry => Cow::Owned(self.fill(segment)),
            Cell::MissingColumn => Cow::Owned(self.missing_column(column)),
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

impl From<&str> for Placeholder {
    fn from(template: &str) -> Self {
        Self::new(template)
    }
}

impl From<String> for Placeholder {
    fn from(template: String) -> Self {
        Self::new(template)
    }
}

/// Map every segment to its value in `column`, one output per segment.
///
/// Unknown segments and absent columns become `missing` placeholders; no
/// output is dropped at this stage.
pub fn convert<'t, T, I, S>(
    segments: I,
    table: &'t T,
    column: &str,
    missing: &Placeholder,
) -> Vec<Cow<'t, str>>
where
    T: ColumnTable + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|s| {
            let s = s.as_ref();
            missing.resolve(table.cell(s, column), s, column)
        })
        .collect()
}
