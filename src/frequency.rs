//! Grapheme frequency tables derived from tokenized word lists.
use tracing::debug;

use crate::{
    ordered::OrderedMap,
    value::{Record, Value},
};

pub const DEFAULT_FREQUENCY_COLUMN: &str = "Frequency";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyRecord {
    pub grapheme: String,
    pub frequency: u64,
}

/// Tokens in order of first occurrence with their counts.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    tokens: OrderedMap<FrequencyRecord>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `token`.
    pub fn add(&mut self, token: &str) {
        let record = self.tokens.get_or_insert_default(token);
        if record.grapheme.is_empty() {
            record.grapheme.push_str(token);
        }
        record.frequency += 1;
    }

    pub fn extend<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            self.add(token.as_ref());
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains_key(token)
    }

    pub fn frequency(&self, token: &str) -> Option<u64> {
        self.tokens.get(token).map(|r| r.frequency)
    }

    pub fn get(&self, token: &str) -> Option<&FrequencyRecord> {
        self.tokens.get(token)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &FrequencyRecord> {
        self.tokens.values()
    }

    /// Two-column construction records, one per distinct token.
    pub fn into_records(self, grapheme_column: &str, frequency_column: &str) -> Vec<Record> {
        self.tokens
            .into_iter()
            .map(|(_, r)| {
                Record::from([
                    (grapheme_column.to_owned(), Value::Text(r.grapheme)),
                    (frequency_column.to_owned(), Value::Number(r.frequency)),
                ])
            })
            .collect()
    }
}

/// Tally the tokens that `mapping` extracts from each word.
pub fn aggregate<W, F, I, S>(words: W, mut mapping: F) -> FrequencyTable
where
    W: IntoIterator,
    F: FnMut(W::Item) -> I,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut table = FrequencyTable::new();
    let mut word_count = 0usize;
    for word in words {
        table.extend(mapping(word));
        word_count += 1;
    }
    debug!(words = word_count, graphemes = table.len(), "aggregated frequencies");
    table
}

/// Tally words that are already sequences of tokens.
pub fn aggregate_tokens<W, T, S>(words: W) -> FrequencyTable
where
    W: IntoIterator<Item = T>,
    T: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    aggregate(words, |word| word)
}
