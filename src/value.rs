use std::{borrow::Cow, collections::BTreeMap, fmt};

/// One row-like construction record: column name to raw value.
///
/// Keys iterate in sorted order, which is the order non-grapheme columns
/// take in a profile.
pub type Record = BTreeMap<String, Value>;

/// A single cell of a profile.
///
/// Most cells are text. Frequency columns built from word lists hold
/// numbers, and a record that does not mention a declared column yields
/// `Null`, which renders as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Value {
    Text(String),
    Number(u64),
    #[default]
    Null,
}

impl Value {
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text form of the cell, borrowed for text and owned for numbers.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Value::Text(s) => Cow::Borrowed(s),
            Value::Number(n) => Cow::Owned(n.to_string()),
            Value::Null => Cow::Borrowed(""),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{n}"),
            Value::Null => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<&Value> for Value {
    fn from(v: &Value) -> Self {
        v.clone()
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        self.as_text() == Some(other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_text() == Some(*other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_variant() {
        assert_eq!(Value::from("ã").render(), "ã");
        assert_eq!(Value::Number(12).render(), "12");
        assert_eq!(Value::Null.render(), "");
        assert_eq!(Value::Number(3).to_string(), "3");
    }

    #[test]
    fn compares_against_plain_strings() {
        assert_eq!(Value::from("aa"), "aa");
        assert_ne!(Value::Number(1), "1");
        assert_eq!(Value::from(None::<&str>), Value::Null);
    }
}
