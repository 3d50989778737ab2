#![forbid(unsafe_code)]

//! Key spelling variants.
//!
//! An owner may pass the same prop as `modelValue` or `model-value`, and its
//! update listener under either spelling. [`KeyVariants`] precomputes the
//! accepted spellings for one key so wiring checks are plain set lookups.

use crate::instance::RawProps;

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `"foo-bar"` to `"fooBar"`: every `-` followed by a word character is
/// dropped and the character upper-cased.
#[must_use]
pub fn camelize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '-' {
            if let Some(&next) = chars.peek() {
                if is_word(next) {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// `"fooBar"` to `"foo-bar"`: a `-` is inserted before every ASCII upper-case
/// letter that follows a word character, then the result is lower-cased.
#[must_use]
pub fn hyphenate(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev: Option<char> = None;
    for c in s.chars() {
        if c.is_ascii_uppercase() && prev.is_some_and(is_word) {
            out.push('-');
        }
        out.push(c);
        prev = Some(c);
    }
    out.to_lowercase()
}

/// Accepted spellings of a bound key and the matching update event names.
///
/// # Invariants
///
/// 1. The declared spelling is always first.
/// 2. Spellings are unique (1 to 3 entries).
/// 3. `update_events()[i] == format!("update:{}", spellings()[i])`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyVariants {
    spellings: Vec<String>,
    update_events: Vec<String>,
}

impl KeyVariants {
    /// Compute the variants of `key`.
    #[must_use]
    pub fn new(key: &str) -> Self {
        let mut spellings: Vec<String> = Vec::with_capacity(3);
        for candidate in [key.to_owned(), camelize(key), hyphenate(key)] {
            if !spellings.contains(&candidate) {
                spellings.push(candidate);
            }
        }
        let update_events = spellings.iter().map(|s| format!("update:{s}")).collect();
        Self {
            spellings,
            update_events,
        }
    }

    /// The key as declared.
    #[must_use]
    pub fn declared(&self) -> &str {
        &self.spellings[0]
    }

    #[must_use]
    pub fn spellings(&self) -> &[String] {
        &self.spellings
    }

    #[must_use]
    pub fn update_events(&self) -> &[String] {
        &self.update_events
    }

    /// Whether `spelling` is one of the accepted spellings.
    #[must_use]
    pub fn matches(&self, spelling: &str) -> bool {
        self.spellings.iter().any(|s| s == spelling)
    }

    /// Whether the owner passed both the value and an update listener.
    #[must_use]
    pub fn is_wired(&self, raw: &RawProps) -> bool {
        self.spellings.iter().any(|s| raw.has_value(s))
            && self.update_events.iter().any(|e| raw.has_listener(e))
    }
}
