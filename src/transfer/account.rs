//! Account number input handling
//!
//! Counter accounts are typed by hand, so input is normalized (NFKC folds
//! full-width digits and dashes) and trimmed, then checked against the
//! `2-3 / 2-6 / 2-6` digit-group pattern. Nothing else is rewritten: a stray
//! character rejects the input instead of being dropped.

use std::fmt;

use unicode_normalization::UnicodeNormalization;

use super::error::ValidationError;

/// Allowed (min, max) digit count per dash-separated group
const GROUP_LENGTHS: [(usize, usize); 3] = [(2, 3), (2, 6), (2, 6)];

/// NFKC-fold raw input and trim surrounding whitespace
pub fn sanitize_account_input(raw: &str) -> String {
    raw.nfkc().collect::<String>().trim().to_string()
}

/// Validated counter account number (`110-222-333333`)
///
/// Fields are private to force validation through `parse()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CounterAccount(String);

impl CounterAccount {
    /// Sanitize and validate a user-typed counter account
    ///
    /// # Validation Rules
    /// - Only ASCII digits and `-` after folding and trimming
    /// - Three dash-separated groups of ASCII digits
    /// - Group lengths: 2-3, 2-6, 2-6
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let cleaned = sanitize_account_input(raw);
        if cleaned.is_empty() {
            return Err(ValidationError::MissingCounterAccount);
        }

        let groups: Vec<&str> = cleaned.split('-').collect();
        let well_formed = cleaned.chars().all(|c| c.is_ascii_digit() || c == '-')
            && groups.len() == GROUP_LENGTHS.len()
            && groups
                .iter()
                .zip(GROUP_LENGTHS.iter())
                .all(|(g, (min, max))| (*min..=*max).contains(&g.len()));

        if !well_formed {
            return Err(ValidationError::InvalidAccountFormat(cleaned));
        }

        Ok(Self(cleaned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digits only, for comparisons across formatting styles
    pub fn digits(&self) -> String {
        digits_of(&self.0)
    }
}

impl fmt::Display for CounterAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// True when both account numbers refer to the same digits
pub fn same_account(source: &str, counter: &CounterAccount) -> bool {
    digits_of(source) == counter.digits()
}

/// Mask an account number for logging, keeping the last four digits
pub fn mask(account: &str) -> String {
    let digits = digits_of(account);
    let keep = digits.len().min(4);
    format!("***{}", &digits[digits.len() - keep..])
}

fn digits_of(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
