//! ISBN helpers
//!
//! Codes are resolved whether or not they validate; classification is only
//! used for diagnostics.

/// ISBN flavour of a validated code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsbnKind {
    Isbn10,
    Isbn13,
}

/// Remove hyphens and whitespace, e.g. "978-0-441-01359-3" → "9780441013593"
pub fn strip_separators(code: &str) -> String {
    code.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

/// Validate the check digit and report the ISBN kind
///
/// Separators are ignored. Returns `None` for anything that is not a valid
/// ISBN-10 or ISBN-13.
pub fn classify(code: &str) -> Option<IsbnKind> {
    let code = strip_separators(code);
    match code.len() {
        10 if is_valid_isbn10(&code) => Some(IsbnKind::Isbn10),
        13 if is_valid_isbn13(&code) => Some(IsbnKind::Isbn13),
        _ => None,
    }
}

/// Weighted sum 10..1 must be divisible by 11; last digit may be `X` (10)
fn is_valid_isbn10(code: &str) -> bool {
    let mut sum = 0;
    for (i, c) in code.chars().enumerate() {
        let value = match c {
            '0'..='9' => c as u32 - '0' as u32,
            'X' | 'x' if i == 9 => 10,
            _ => return false,
        };
        sum += value * (10 - i as u32);
    }
    sum % 11 == 0
}

/// Alternating weights 1 and 3; sum must be divisible by 10
fn is_valid_isbn13(code: &str) -> bool {
    let mut sum = 0;
    for (i, c) in code.chars().enumerate() {
        let Some(digit) = c.to_digit(10) else {
            return false;
        };
        sum += if i % 2 == 0 { digit } else { digit * 3 };
    }
    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_separators() {
        assert_eq!(strip_separators("978-0-441-01359-3"), "9780441013593");
        assert_eq!(strip_separators(" 0 441 01359 7 "), "0441013597");
        assert_eq!(strip_separators("9780441013593"), "9780441013593");
    }

    #[test]
    fn test_classify_valid_codes() {
        assert_eq!(classify("0441013597"), Some(IsbnKind::Isbn10));
        assert_eq!(classify("978-0-441-01359-3"), Some(IsbnKind::Isbn13));
        assert_eq!(classify("080442957X"), Some(IsbnKind::Isbn10));
        assert_eq!(classify("080442957x"), Some(IsbnKind::Isbn10));
    }

    #[test]
    fn test_classify_invalid_codes() {
        // Wrong check digits
        assert_eq!(classify("0441013598"), None);
        assert_eq!(classify("9780441013594"), None);
        // X only allowed as the ISBN-10 check digit
        assert_eq!(classify("X441013597"), None);
        assert_eq!(classify("978044101359X"), None);
        assert_eq!(classify(""), None);
        assert_eq!(classify("not-an-isbn"), None);
    }
}
