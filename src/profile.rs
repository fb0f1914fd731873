//! Orthography profiles.
//!
//! A [`Profile`] maps normalized graphemes to one value per declared column.
//! It is built once through a [`ProfileBuilder`] from records, a delimited
//! file, a header-first table, or a word list, and is read-only afterwards:
//!
//! ```
//! use orthoprofile::{NFC, Profile};
//!
//! let profile = Profile::builder()
//!     .normalization(NFC)
//!     .from_table([["Grapheme", "IPA"], ["t", "t"], ["am", "ã"], ["_", "NULL"]])
//!     .unwrap();
//!
//! assert_eq!(profile.invoke("tam_t", "IPA").unwrap(), ["t", "ã", "t"]);
//! assert_eq!(profile.invoke("tum", "IPA").unwrap(), ["t", "«u»", "«m»"]);
//! ```

use std::{borrow::Cow, io, ops::Index, path::Path};

use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, debug_span, trace, warn};

use crate::{
    convert::{Cell, ColumnTable, Placeholder},
    dsv::{self, DEFAULT_DELIMITER, DsvError},
    frequency::{self, DEFAULT_FREQUENCY_COLUMN},
    normalization::{Form, UnknownForm, normalize_value},
    ordered::OrderedMap,
    segment::{GraphemeSet, segment},
    value::{Record, Value},
};

pub const DEFAULT_GRAPHEME_COLUMN: &str = "Grapheme";
pub const DEFAULT_NULL: &str = "NULL";

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("cannot derive columns from an empty record set")]
    EmptyRecords,
    #[error("record {record} has no value for grapheme column `{column}`")]
    MissingGrapheme { record: usize, column: String },
    #[error("table row {row} has {found} cells but the header has {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("the column `{0}` is not available")]
    UnknownColumn(String),
    #[error("grapheme `{0}` not found in profile")]
    NotFound(String),
    #[error(transparent)]
    UnknownForm(#[from] UnknownForm),
    #[error("delimited data error: {0}")]
    Dsv(#[from] DsvError),
}

/// Coarse classification of [`ProfileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    InvalidArgument,
    NotFound,
    Io,
}

impl ProfileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProfileError::EmptyRecords
            | ProfileError::MissingGrapheme { .. }
            | ProfileError::RowLength { .. }
            | ProfileError::UnknownForm(_) => ErrorKind::Configuration,
            ProfileError::UnknownColumn(_) => ErrorKind::InvalidArgument,
            ProfileError::NotFound(_) => ErrorKind::NotFound,
            ProfileError::Dsv(DsvError::Io(_)) => ErrorKind::Io,
            ProfileError::Dsv(_) => ErrorKind::Configuration,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Columns
// ─────────────────────────────────────────────────────────────────────────────

/// Position of a column in a profile's column list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(usize);

impl ColumnId {
    pub const GRAPHEME: ColumnId = ColumnId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Ordered column names, grapheme column first, the rest sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    names: Vec<String>,
}

impl Columns {
    fn derive(first: &Record, grapheme: &str) -> Self {
        let mut names = Vec::with_capacity(first.len() + 1);
        names.push(grapheme.to_owned());
        // BTreeMap keys are already sorted.
        names.extend(first.keys().filter(|k| *k != grapheme).cloned());
        Self { names }
    }

    #[inline]
    pub fn grapheme(&self) -> &str {
        &self.names[0]
    }

    #[inline]
    pub fn id(&self, name: &str) -> Option<ColumnId> {
        self.names.iter().position(|n| n == name).map(ColumnId)
    }

    #[inline]
    pub fn name(&self, id: ColumnId) -> &str {
        &self.names[id.0]
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.id(name).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entries
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    values: SmallVec<[Value; 4]>,
}

/// Borrowed view of one profile entry.
#[derive(Debug, Clone, Copy)]
pub struct EntryRef<'p> {
    columns: &'p Columns,
    entry: &'p Entry,
}

impl<'p> EntryRef<'p> {
    #[inline]
    pub fn get(&self, column: &str) -> Option<&'p Value> {
        let entry = self.entry;
        self.columns.id(column).map(move |id| &entry.values[id.0])
    }

    #[inline]
    pub fn get_by_id(&self, id: ColumnId) -> Option<&'p Value> {
        self.entry.values.get(id.0)
    }

    /// The (normalized) grapheme this entry is stored under.
    pub fn grapheme(&self) -> Cow<'p, str> {
        self.entry.values[0].render()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&'p str, &'p Value)> + use<'p> {
        self.columns.iter().zip(self.entry.values.iter())
    }

    pub fn to_record(&self) -> Record {
        self.iter()
            .map(|(name, value)| (name.to_owned(), value.clone()))
            .collect()
    }
}

impl<'p> Index<&str> for EntryRef<'p> {
    type Output = Value;

    fn index(&self, column: &str) -> &Value {
        self.get(column)
            .unwrap_or_else(|| panic!("column `{column}` not in profile"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Settings a profile is built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileOptions {
    /// Form applied to keys, values and every query.
    pub normalization: Form,
    /// Placeholder for unknown segments and absent columns.
    pub missing: Placeholder,
    /// Cell value that removes a token from `invoke` output.
    pub null: String,
    pub grapheme_column: String,
    /// Field delimiter used when reading files.
    pub delimiter: u8,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            normalization: Form::default(),
            missing: Placeholder::default(),
            null: DEFAULT_NULL.to_owned(),
            grapheme_column: DEFAULT_GRAPHEME_COLUMN.to_owned(),
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileBuilder {
    options: ProfileOptions,
}

impl ProfileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(mut self, options: ProfileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn normalization(mut self, form: Form) -> Self {
        self.options.normalization = form;
        self
    }

    /// Set the normalization form by name (`"NFC"`, `"nfd"`, ...).
    pub fn normalization_name(self, name: &str) -> Result<Self, ProfileError> {
        Ok(self.normalization(name.parse()?))
    }

    pub fn missing(mut self, template: impl Into<Placeholder>) -> Self {
        self.options.missing = template.into();
        self
    }

    pub fn null(mut self, marker: impl Into<String>) -> Self {
        self.options.null = marker.into();
        self
    }

    pub fn grapheme_column(mut self, name: impl Into<String>) -> Self {
        self.options.grapheme_column = name.into();
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.options.delimiter = delimiter;
        self
    }

    /// Build from row-like records.
    ///
    /// Columns are the grapheme column followed by the sorted keys of the
    /// first record. Later records may omit columns (stored as `Null`);
    /// keys they add beyond the first record are ignored.
    pub fn from_records<I>(self, records: I) -> Result<Profile, ProfileError>
    where
        I: IntoIterator<Item = Record>,
    {
        Profile::construct(self.options, records)
    }

    pub fn from_file(self, path: impl AsRef<Path>) -> Result<Profile, ProfileError> {
        let records = dsv::read_file(path, self.options.delimiter)?;
        self.from_records(records)
    }

    pub fn from_reader<R: io::Read>(self, reader: R) -> Result<Profile, ProfileError> {
        let records = dsv::read_records(reader, self.options.delimiter)?;
        self.from_records(records)
    }

    /// Build from a table whose first row is the header.
    pub fn from_table<T, R, V>(self, table: T) -> Result<Profile, ProfileError>
    where
        T: IntoIterator<Item = R>,
        R: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut rows = table.into_iter();
        let Some(header) = rows.next() else {
            return Err(ProfileError::EmptyRecords);
        };
        let header: Vec<String> = header
            .into_iter()
            .map(|cell| cell.into().to_string())
            .collect();

        let mut records: Vec<Record> = Vec::new();
        for (i, row) in rows.enumerate() {
            let row: Vec<Value> = row.into_iter().map(Into::into).collect();
            if row.len() != header.len() {
                return Err(ProfileError::RowLength {
                    row: i + 1,
                    expected: header.len(),
                    found: row.len(),
                });
            }
            records.push(header.iter().cloned().zip(row).collect());
        }
        self.from_records(records)
    }

    /// Build a grapheme/frequency profile from the tokens `mapping`
    /// extracts from each word.
    pub fn from_words<W, F, I, S>(self, words: W, mapping: F) -> Result<Profile, ProfileError>
    where
        W: IntoIterator,
        F: FnMut(W::Item) -> I,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let table = frequency::aggregate(words, mapping);
        let records = table.into_records(&self.options.grapheme_column, DEFAULT_FREQUENCY_COLUMN);
        self.from_records(records)
    }

    /// Like [`ProfileBuilder::from_words`] for words that are already
    /// token sequences.
    pub fn from_tokenized_words<W, T, S>(self, words: W) -> Result<Profile, ProfileError>
    where
        W: IntoIterator<Item = T>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.from_words(words, |word| word)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Profile
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Profile {
    columns: Columns,
    entries: OrderedMap<Entry>,
    options: ProfileOptions,
}

impl Profile {
    pub fn builder() -> ProfileBuilder {
        ProfileBuilder::default()
    }

    /// Build from records with default options.
    pub fn from_records<I>(records: I) -> Result<Self, ProfileError>
    where
        I: IntoIterator<Item = Record>,
    {
        Self::construct(ProfileOptions::default(), records)
    }

    fn construct<I>(options: ProfileOptions, records: I) -> Result<Self, ProfileError>
    where
        I: IntoIterator<Item = Record>,
    {
        let _span = debug_span!("build_profile", form = %options.normalization).entered();
        let mut records = records.into_iter().peekable();
        let Some(first) = records.peek() else {
            return Err(ProfileError::EmptyRecords);
        };
        let columns = Columns::derive(first, &options.grapheme_column);
        let form = options.normalization;

        let mut entries = OrderedMap::with_capacity(records.size_hint().0);
        for (i, mut record) in records.enumerate() {
            let key = match record.get(columns.grapheme()) {
                Some(Value::Text(g)) => form.normalize(g).into_owned(),
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::Null) | None => {
                    return Err(ProfileError::MissingGrapheme {
                        record: i,
                        column: columns.grapheme().to_owned(),
                    });
                }
            };
            let mut values: SmallVec<[Value; 4]> = columns
                .iter()
                .map(|c| normalize_value(form, record.remove(c).unwrap_or_default()))
                .collect();
            values[0] = Value::Text(key.clone());

            if entries.contains_key(&key) {
                warn!(grapheme = %key, record = i, "duplicate grapheme, later record wins");
            }
            entries.insert(key, Entry { values });
        }

        debug!(
            entries = entries.len(),
            columns = ?columns.as_slice(),
            "built profile"
        );
        Ok(Self {
            columns,
            entries,
            options,
        })
    }

    #[inline]
    pub fn options(&self) -> &ProfileOptions {
        &self.options
    }

    #[inline]
    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    #[inline]
    pub fn grapheme_column(&self) -> &str {
        self.columns.grapheme()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored graphemes in insertion order.
    pub fn graphemes(&self) -> impl ExactSizeIterator<Item = &str> {
        self.entries.keys()
    }

    pub fn entries(&self) -> impl ExactSizeIterator<Item = (&str, EntryRef<'_>)> {
        self.entries.iter().map(|(g, entry)| {
            (
                g,
                EntryRef {
                    columns: &self.columns,
                    entry,
                },
            )
        })
    }

    pub fn contains(&self, grapheme: &str) -> bool {
        self.entries
            .contains_key(&self.options.normalization.normalize(grapheme))
    }

    /// Direct lookup; unlike [`Profile::invoke`] a miss is an error.
    pub fn get(&self, grapheme: &str) -> Result<EntryRef<'_>, ProfileError> {
        let key = self.options.normalization.normalize(grapheme);
        self.entries
            .get(&key)
            .map(|entry| EntryRef {
                columns: &self.columns,
                entry,
            })
            .ok_or_else(|| ProfileError::NotFound(key.into_owned()))
    }

    #[inline]
    fn cell_by_id(&self, grapheme: &str, column: ColumnId) -> Cell<'_> {
        match self.entries.get(grapheme) {
            None => Cell::MissingEntry,
            Some(entry) => entry
                .values
                .get(column.0)
                .map_or(Cell::MissingColumn, |v| Cell::Value(v.render())),
        }
    }

    /// Segment `sequence` and convert each segment to `column`.
    ///
    /// Unknown segments become placeholders; values equal to the null
    /// marker are dropped. Fails before doing any work if `column` is not
    /// one of the profile's columns.
    pub fn invoke(&self, sequence: &str, column: &str) -> Result<Vec<Cow<'_, str>>, ProfileError> {
        let id = self
            .columns
            .id(column)
            .ok_or_else(|| ProfileError::UnknownColumn(column.to_owned()))?;

        let normalized = self.options.normalization.normalize(sequence);
        let text: &str = &normalized;
        let segments = segment(text, self).unwrap_or_else(|| {
            warn!(input = sequence, "segmentation exhausted, keeping input whole");
            vec![text]
        });

        let null = self.options.null.as_str();
        let out: Vec<Cow<'_, str>> = segments
            .into_iter()
            .map(|s| self.options.missing.resolve(self.cell_by_id(s, id), s, column))
            .filter(|v| *v != null)
            .collect();
        trace!(input = sequence, column, tokens = out.len(), "invoked profile");
        Ok(out)
    }

    /// [`Profile::invoke`] on the grapheme column.
    pub fn tokenize(&self, sequence: &str) -> Result<Vec<Cow<'_, str>>, ProfileError> {
        self.invoke(sequence, self.columns.grapheme())
    }

    /// Header row followed by one row per entry, in column order.
    pub fn to_table(&self) -> Vec<Vec<Value>> {
        let mut table = Vec::with_capacity(self.entries.len() + 1);
        table.push(
            self.columns
                .iter()
                .map(|name| Value::Text(name.to_owned()))
                .collect(),
        );
        table.extend(self.entries.values().map(|e| e.values.to_vec()));
        table
    }

    pub fn write_to<W: io::Write>(&self, writer: W, delimiter: u8) -> Result<(), ProfileError> {
        dsv::write_rows(writer, delimiter, self.to_table())?;
        Ok(())
    }

    pub fn write(&self, path: impl AsRef<Path>, delimiter: u8) -> Result<(), ProfileError> {
        dsv::write_file(path, delimiter, self.to_table())?;
        debug!(entries = self.entries.len(), "wrote profile");
        Ok(())
    }
}

impl GraphemeSet for Profile {
    #[inline]
    fn contains_grapheme(&self, grapheme: &str) -> bool {
        self.entries.contains_key(grapheme)
    }
}

impl ColumnTable for Profile {
    fn cell(&self, grapheme: &str, column: &str) -> Cell<'_> {
        match self.columns.id(column) {
            Some(id) => self.cell_by_id(grapheme, id),
            None if self.entries.contains_key(grapheme) => Cell::MissingColumn,
            None => Cell::MissingEntry,
        }
    }
}
