pub mod convert;
pub mod dsv;
pub mod frequency;
pub mod normalization;
pub mod ordered;
pub mod profile;
pub mod segment;
pub mod value;

pub use convert::{Cell, ColumnTable, DEFAULT_MISSING, Placeholder, convert};
pub use dsv::{DEFAULT_DELIMITER, DsvError};
pub use frequency::{
    DEFAULT_FREQUENCY_COLUMN, FrequencyRecord, FrequencyTable, aggregate, aggregate_tokens,
};
pub use normalization::{Form, NFC, NFD, NFKC, NFKD, UnknownForm, normalize_value};
pub use profile::{
    ColumnId, Columns, DEFAULT_GRAPHEME_COLUMN, DEFAULT_NULL, EntryRef, ErrorKind, Profile,
    ProfileBuilder, ProfileError, ProfileOptions,
};
pub use segment::{GraphemeSet, segment};
pub use value::{Record, Value};

#[cfg(test)]
mod tests {
    include!("tests/unit.rs");
    include!("tests/integration.rs");
    include!("tests/proptest.rs");
}
