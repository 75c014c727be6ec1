//! Amount Entry Validation
//!
//! Keypad-driven amount entry. Every keystroke produces either a new
//! candidate string or a typed rejection; the current value is never mutated
//! in place, so a rejected key leaves the caller's state untouched.

use super::error::ValidationError;

/// Maximum number of digits an entered amount may have
pub const MAX_AMOUNT_DIGITS: usize = 12;

/// Validates amount entry against format rules and a balance ceiling
#[derive(Debug, Clone, Copy)]
pub struct AmountEntryValidator {
    max_digits: usize,
}

impl AmountEntryValidator {
    pub fn new(max_digits: usize) -> Self {
        Self { max_digits }
    }

    pub fn max_digits(&self) -> usize {
        self.max_digits
    }

    /// Append a single keypad digit.
    ///
    /// Returns the new candidate amount, or a rejection the caller should
    /// surface (e.g. an insufficient-funds warning) while keeping the
    /// previous value.
    pub fn append_digit(
        &self,
        current: &str,
        digit: char,
        balance_ceiling: u64,
    ) -> Result<String, ValidationError> {
        let mut buf = [0u8; 4];
        self.append_keys(current, digit.encode_utf8(&mut buf), balance_ceiling)
    }

    /// Append a multi-digit key (the keypad's `00`) atomically: either every
    /// digit is accepted or none is.
    pub fn append_keys(
        &self,
        current: &str,
        keys: &str,
        balance_ceiling: u64,
    ) -> Result<String, ValidationError> {
        if keys.is_empty() || !keys.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::NotNumeric(keys.to_string()));
        }
        if !current.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::NotNumeric(current.to_string()));
        }

        let joined = format!("{}{}", current, keys);
        let candidate = collapse_leading_zeros(&joined);

        if candidate.len() > self.max_digits {
            return Err(ValidationError::TooLong {
                max: self.max_digits,
            });
        }

        let value = parse_digits(candidate, self.max_digits)?;
        if value > balance_ceiling {
            return Err(ValidationError::InsufficientFunds {
                ceiling: balance_ceiling,
                attempted: value,
            });
        }

        Ok(candidate.to_string())
    }

    /// Remove exactly one trailing character
    pub fn backspace(current: &str) -> String {
        let mut next = current.to_string();
        next.pop();
        next
    }

    /// Convert an entered amount into minor units for submission.
    ///
    /// Group separators (`,`) are tolerated. Empty and zero amounts are
    /// rejected.
    pub fn parse_amount(&self, entered: &str) -> Result<u64, ValidationError> {
        let digits: String = entered.trim().chars().filter(|c| *c != ',').collect();
        if digits.is_empty() {
            return Err(ValidationError::EmptyAmount);
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::NotNumeric(entered.to_string()));
        }

        let collapsed = collapse_leading_zeros(&digits);
        if collapsed.len() > self.max_digits {
            return Err(ValidationError::TooLong {
                max: self.max_digits,
            });
        }

        match parse_digits(collapsed, self.max_digits)? {
            0 => Err(ValidationError::EmptyAmount),
            value => Ok(value),
        }
    }

    /// Pre-submit re-check against the most recent balance.
    ///
    /// Keystroke checks ran against whatever balance was on screen at the
    /// time; this is the authoritative check before anything leaves the
    /// device.
    pub fn revalidate(&self, entered: &str, latest_balance: u64) -> Result<u64, ValidationError> {
        let amount = self.parse_amount(entered)?;
        if amount > latest_balance {
            return Err(ValidationError::InsufficientFunds {
                ceiling: latest_balance,
                attempted: amount,
            });
        }
        Ok(amount)
    }
}

impl Default for AmountEntryValidator {
    fn default() -> Self {
        Self::new(MAX_AMOUNT_DIGITS)
    }
}

/// Render an amount with thousands separators (`50000` -> `50,000`)
pub fn format_grouped(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn collapse_leading_zeros(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() && !digits.is_empty() {
        "0"
    } else {
        trimmed
    }
}

fn parse_digits(digits: &str, max_digits: usize) -> Result<u64, ValidationError> {
    digits
        .parse::<u64>()
        .map_err(|_| ValidationError::TooLong { max: max_digits })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{TestResult, quickcheck};

    fn validator() -> AmountEntryValidator {
        AmountEntryValidator::default()
    }

    #[test]
    fn test_append_builds_amount() {
        let v = validator();
        let a = v.append_digit("", '5', 100_000).unwrap();
        let a = v.append_digit(&a, '0', 100_000).unwrap();
        let a = v.append_keys(&a, "00", 100_000).unwrap();
        let a = v.append_digit(&a, '0', 100_000).unwrap();
        assert_eq!(a, "50000");
    }

    #[test]
    fn test_leading_zeros_collapse() {
        let v = validator();
        assert_eq!(v.append_digit("", '0', 100).unwrap(), "0");
        assert_eq!(v.append_digit("0", '0', 100).unwrap(), "0");
        assert_eq!(v.append_keys("0", "00", 100).unwrap(), "0");
        assert_eq!(v.append_digit("0", '7', 100).unwrap(), "7");
    }

    #[test]
    fn test_non_numeric_rejected() {
        let v = validator();
        assert_eq!(
            v.append_digit("12", 'a', 1000),
            Err(ValidationError::NotNumeric("a".into()))
        );
        assert_eq!(
            v.append_digit("12", '-', 1000),
            Err(ValidationError::NotNumeric("-".into()))
        );
        assert!(v.append_keys("12", "", 1000).is_err());
    }

    #[test]
    fn test_length_cap() {
        let v = validator();
        let full = "1".repeat(MAX_AMOUNT_DIGITS);
        assert_eq!(
            v.append_digit(&full, '1', u64::MAX),
            Err(ValidationError::TooLong {
                max: MAX_AMOUNT_DIGITS
            })
        );
    }

    #[test]
    fn test_exceeding_ceiling_rejected() {
        let v = validator();
        assert_eq!(
            v.append_digit("1000", '1', 10_000),
            Err(ValidationError::InsufficientFunds {
                ceiling: 10_000,
                attempted: 10_001
            })
        );
        // exactly the balance is fine
        assert_eq!(v.append_digit("1000", '0', 10_000).unwrap(), "10000");
    }

    #[test]
    fn test_double_zero_is_all_or_nothing() {
        let v = validator();
        // "900" would fit but "9000" would not
        assert!(v.append_keys("9", "00", 950).is_err());
    }

    #[test]
    fn test_backspace_removes_one_char() {
        assert_eq!(AmountEntryValidator::backspace("5000"), "500");
        assert_eq!(AmountEntryValidator::backspace("5"), "");
        assert_eq!(AmountEntryValidator::backspace(""), "");
    }

    #[test]
    fn test_parse_amount() {
        let v = validator();
        assert_eq!(v.parse_amount("50000"), Ok(50_000));
        assert_eq!(v.parse_amount("50,000"), Ok(50_000));
        assert_eq!(v.parse_amount(""), Err(ValidationError::EmptyAmount));
        assert_eq!(v.parse_amount("000"), Err(ValidationError::EmptyAmount));
        assert!(matches!(
            v.parse_amount("12a"),
            Err(ValidationError::NotNumeric(_))
        ));
    }

    #[test]
    fn test_revalidate_against_latest_balance() {
        let v = validator();
        assert_eq!(v.revalidate("50000", 100_000), Ok(50_000));
        // balance dropped since the amount was typed
        assert_eq!(
            v.revalidate("50000", 40_000),
            Err(ValidationError::InsufficientFunds {
                ceiling: 40_000,
                attempted: 50_000
            })
        );
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(0), "0");
        assert_eq!(format_grouped(999), "999");
        assert_eq!(format_grouped(1_000), "1,000");
        assert_eq!(format_grouped(50_000), "50,000");
        assert_eq!(format_grouped(1_234_567), "1,234,567");
    }

    quickcheck! {
        fn prop_accepted_amount_never_exceeds_ceiling(keys: Vec<u8>, ceiling: u64) -> TestResult {
            if keys.is_empty() {
                return TestResult::discard();
            }
            let v = validator();
            let mut amount = String::new();
            for k in keys {
                let digit = char::from(b'0' + k % 10);
                if let Ok(next) = v.append_digit(&amount, digit, ceiling) {
                    amount = next;
                }
                let value: u64 = if amount.is_empty() { 0 } else { amount.parse().unwrap() };
                if value > ceiling || amount.len() > MAX_AMOUNT_DIGITS {
                    return TestResult::failed();
                }
            }
            TestResult::passed()
        }
    }
}
