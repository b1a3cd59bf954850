//! Bind variable naming.
//!
//! Oracle bind names follow the unquoted identifier rules with a 30 byte
//! limit and no `$` or `#`. Names are derived from column names and made
//! unique within one statement.

use std::collections::HashSet;

use crate::config::ReservedWords;

/// Longest bind name Oracle accepts.
pub const MAX_BIND_NAME_LENGTH: usize = 30;

const PREFIX: &str = "B_";

/// Hands out unique bind names for one statement.
#[derive(Debug)]
pub(crate) struct BindNames<'a> {
    reserved: &'a ReservedWords,
    used: HashSet<String>,
}

impl<'a> BindNames<'a> {
    pub(crate) fn new(reserved: &'a ReservedWords) -> Self {
        Self {
            reserved,
            used: HashSet::new(),
        }
    }

    /// Allocates a bind name for `base`, appending `suffix` (such as
    /// `_WHERE`) when given.
    pub(crate) fn allocate(&mut self, base: &str, suffix: &str) -> String {
        let mut stem: String = base
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        if !stem.starts_with(|c: char| c.is_ascii_alphabetic()) {
            stem.insert_str(0, PREFIX);
        }
        if self.reserved.contains(&format!("{stem}{suffix}")) {
            stem.insert_str(0, PREFIX);
        }

        let mut candidate = fit(&stem, suffix, "");
        let mut n = 1_u64;
        while self.used.contains(&candidate) {
            n += 1;
            candidate = fit(&stem, suffix, &format!("_{n}"));
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

/// Joins stem, suffix and counter, shortening the stem to stay within
/// [`MAX_BIND_NAME_LENGTH`]. The stem is ASCII so byte slicing is safe.
fn fit(stem: &str, suffix: &str, counter: &str) -> String {
    let room = MAX_BIND_NAME_LENGTH.saturating_sub(suffix.len() + counter.len());
    let stem = &stem[..stem.len().min(room)];
    format!("{stem}{suffix}{counter}")
}
