//! Greedy longest-match segmentation over a set of known graphemes.
//!
//! The search keeps an explicit FIFO worklist of small states. Each state
//! holds the graphemes accepted so far plus a candidate span and the
//! unconsumed rest of the word, both as byte offsets into the input:
//!
//! ```text
//!   word:  m a t a m
//!          ^     ^   ^
//!        start split end      current = word[start..split], rest = word[split..]
//! ```
//!
//! An unknown candidate gives up its last character to `rest`; a known one
//! (or an unknown single character) is accepted and the search restarts on
//! `rest`. The first state whose candidate is known and whose rest is empty
//! wins, which yields the longest known prefix at every boundary. This is
//! not a minimum-token segmentation.

use std::{
    borrow::Borrow,
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    hash::{BuildHasher, Hash},
};

/// Anything that can answer "is this a known grapheme?".
pub trait GraphemeSet {
    fn contains_grapheme(&self, grapheme: &str) -> bool;
}

impl<T: GraphemeSet + ?Sized> GraphemeSet for &T {
    #[inline]
    fn contains_grapheme(&self, grapheme: &str) -> bool {
        (**self).contains_grapheme(grapheme)
    }
}

impl<S, H> GraphemeSet for HashSet<S, H>
where
    S: Borrow<str> + Hash + Eq,
    H: BuildHasher,
{
    #[inline]
    fn contains_grapheme(&self, grapheme: &str) -> bool {
        self.contains(grapheme)
    }
}

impl<S: Borrow<str> + Ord> GraphemeSet for BTreeSet<S> {
    #[inline]
    fn contains_grapheme(&self, grapheme: &str) -> bool {
        self.contains(grapheme)
    }
}

impl<K, V, H> GraphemeSet for HashMap<K, V, H>
where
    K: Borrow<str> + Hash + Eq,
    H: BuildHasher,
{
    #[inline]
    fn contains_grapheme(&self, grapheme: &str) -> bool {
        self.contains_key(grapheme)
    }
}

impl<K: Borrow<str> + Ord, V> GraphemeSet for BTreeMap<K, V> {
    #[inline]
    fn contains_grapheme(&self, grapheme: &str) -> bool {
        self.contains_key(grapheme)
    }
}

impl<S: AsRef<str>> GraphemeSet for [S] {
    fn contains_grapheme(&self, grapheme: &str) -> bool {
        self.iter().any(|g| g.as_ref() == grapheme)
    }
}

impl<S: AsRef<str>, const N: usize> GraphemeSet for [S; N] {
    fn contains_grapheme(&self, grapheme: &str) -> bool {
        self.as_slice().contains_grapheme(grapheme)
    }
}

impl<S: AsRef<str>> GraphemeSet for Vec<S> {
    fn contains_grapheme(&self, grapheme: &str) -> bool {
        self.as_slice().contains_grapheme(grapheme)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct State<'a> {
    accepted: Vec<&'a str>,
    start: usize,
    split: usize,
}

impl<'a> State<'a> {
    /// Restart the search on everything after `split`.
    #[inline]
    fn advance(accepted: Vec<&'a str>, split: usize, end: usize) -> Self {
        Self {
            accepted,
            start: split,
            split: end,
        }
    }
}

#[inline]
fn is_single_char(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some() && chars.next().is_none()
}

#[inline]
fn last_char_offset(s: &str) -> usize {
    s.char_indices().next_back().map_or(0, |(i, _)| i)
}

/// Split `word` into the greedy longest sequence of known graphemes.
///
/// Characters that start no known grapheme come out as single-character
/// segments. The concatenation of the result is always `word`; the empty
/// word yields `[""]`. `None` is only returned if the worklist runs dry
/// without reaching the end of the word, which the shrink rule rules out.
pub fn segment<'a, G>(word: &'a str, graphemes: &G) -> Option<Vec<&'a str>>
where
    G: GraphemeSet + ?Sized,
{
    if word.is_empty() {
        return Some(vec![word]);
    }
    let end = word.len();
    let mut queue = VecDeque::with_capacity(1);
    queue.push_back(State {
        accepted: Vec::new(),
        start: 0,
        split: end,
    });

    while let Some(State {
        mut accepted,
        start,
        split,
    }) = queue.pop_front()
    {
        let current = &word[start..split];
        let has_rest = split < end;
        let known = graphemes.contains_grapheme(current);

        if known && !has_rest {
            accepted.push(current);
            return Some(accepted);
        }
        if known || is_single_char(current) {
            accepted.push(current);
            if !has_rest {
                return Some(accepted);
            }
            queue.push_back(State::advance(accepted, split, end));
        } else {
            queue.push_back(State {
                accepted,
                start,
                split: start + last_char_offset(current),
            });
        }
    }
    None
}
