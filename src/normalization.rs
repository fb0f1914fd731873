//! Unicode normalization forms applied to profile keys, values and queries.
//!
//! Every grapheme is normalized before it is stored and every input string
//! before it is segmented, so that precomposed and decomposed spellings of
//! the same text meet in the same table slot. The four canonical and
//! compatibility forms are backed by ICU4X compiled data; normalizers are
//! built once per process and shared.

use std::{borrow::Cow, fmt, str::FromStr, sync::LazyLock};

use icu_normalizer::{
    ComposingNormalizer, ComposingNormalizerBorrowed, DecomposingNormalizer,
    DecomposingNormalizerBorrowed,
};
use phf::phf_map;

use crate::value::Value;

// ── ICU4X ──
static ICU4X_NFC: LazyLock<ComposingNormalizerBorrowed> =
    LazyLock::new(ComposingNormalizer::new_nfc);
static ICU4X_NFKC: LazyLock<ComposingNormalizerBorrowed> =
    LazyLock::new(ComposingNormalizer::new_nfkc);
static ICU4X_NFD: LazyLock<DecomposingNormalizerBorrowed<'static>> =
    LazyLock::new(DecomposingNormalizer::new_nfd);
static ICU4X_NFKD: LazyLock<DecomposingNormalizerBorrowed<'static>> =
    LazyLock::new(DecomposingNormalizerBorrowed::new_nfkd);

/// Accepted spellings of each form name, case-insensitive on the caller side.
static FORM_NAMES: phf::Map<&'static str, Form> = phf_map! {
    "nfc" => Form::Nfc,
    "nfd" => Form::Nfd,
    "nfkc" => Form::Nfkc,
    "nfkd" => Form::Nfkd,
};

/// A Unicode normalization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Form {
    /// Canonical composition.
    Nfc,
    /// Canonical decomposition. Profiles use this unless told otherwise.
    #[default]
    Nfd,
    /// Compatibility composition.
    Nfkc,
    /// Compatibility decomposition.
    Nfkd,
}

pub const NFC: Form = Form::Nfc;
pub const NFD: Form = Form::Nfd;
pub const NFKC: Form = Form::Nfkc;
pub const NFKD: Form = Form::Nfkd;

macro_rules! dispatch_form {
    ($form:expr, $norm:ident => $body:expr) => {
        match $form {
            Form::Nfc => {
                let $norm = &*ICU4X_NFC;
                $body
            }
            Form::Nfd => {
                let $norm = &*ICU4X_NFD;
                $body
            }
            Form::Nfkc => {
                let $norm = &*ICU4X_NFKC;
                $body
            }
            Form::Nfkd => {
                let $norm = &*ICU4X_NFKD;
                $body
            }
        }
    };
}

impl Form {
    pub fn name(self) -> &'static str {
        match self {
            Form::Nfc => "NFC",
            Form::Nfd => "NFD",
            Form::Nfkc => "NFKC",
            Form::Nfkd => "NFKD",
        }
    }

    #[inline]
    pub fn is_normalized(self, text: &str) -> bool {
        dispatch_form!(self, norm => norm.is_normalized(text))
    }

    /// Normalize `text`, borrowing it when it is already in this form.
    #[inline]
    pub fn normalize(self, text: &str) -> Cow<'_, str> {
        if self.is_normalized(text) {
            return Cow::Borrowed(text);
        }
        dispatch_form!(self, norm => Cow::Owned(norm.normalize(text).into_owned()))
    }

    /// Owned variant of [`Form::normalize`] that reuses the allocation when
    /// nothing changes.
    pub fn normalize_owned(self, text: String) -> String {
        match self.normalize(&text) {
            Cow::Borrowed(_) => text,
            Cow::Owned(normalized) => normalized,
        }
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for a form name outside NFC, NFD, NFKC and NFKD.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown normalization form `{0}` (expected NFC, NFD, NFKC or NFKD)")]
pub struct UnknownForm(pub String);

impl FromStr for Form {
    type Err = UnknownForm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FORM_NAMES
            .get(s.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| UnknownForm(s.to_owned()))
    }
}

/// Normalize a cell value. Text is normalized; numbers and nulls are
/// returned unchanged, so this never fails.
pub fn normalize_value(form: Form, value: Value) -> Value {
    match value {
        Value::Text(text) => Value::Text(form.normalize_owned(text)),
        other => other,
    }
}
