//! CPF (Brazilian individual tax identifier) value type.
//!
//! A CPF is written as 11 digits: a 9-digit base number followed by two
//! check digits. Only the base is stored; the check digits are recomputed
//! whenever a value is parsed or rendered.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated CPF, holding only the canonical 9-digit base number.
///
/// Bases outside `[0, 1_000_000_000)` and repeated-digit bases (multiples
/// of 111,111,111, including zero) are normalized to the degenerate zero
/// value at construction, so an in-range non-degenerate `Cpf` can always
/// be rendered and re-parsed losslessly:
///
/// ```
/// use backoffice::Cpf;
///
/// let cpf = Cpf::new(123_456_789);
/// assert_eq!(cpf.to_string(), "123.456.789-09");
/// assert_eq!(Cpf::parse(&cpf.to_string()), Some(cpf));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cpf(u32);

impl Cpf {
    /// Creates a `Cpf` from a 9-digit base number.
    ///
    /// Out-of-range and repeated-digit bases collapse to the degenerate
    /// zero value.
    pub fn new(base: u32) -> Self {
        if base >= 1_000_000_000 || base % 111_111_111 == 0 {
            return Cpf(0);
        }
        Cpf(base)
    }

    /// Returns the canonical 9-digit base number.
    pub fn base(&self) -> u32 {
        self.0
    }

    /// Returns `true` if this is the degenerate zero value.
    pub fn is_degenerate(&self) -> bool {
        self.0 == 0
    }

    /// Parses a CPF out of free-form text.
    ///
    /// Non-digit characters are ignored, so `"123.456.789-09"` and
    /// `"12345678909"` are both accepted. Returns `None` unless exactly
    /// 11 digits are present, they are not all identical, and both check
    /// digits match the weighted checksum of the base.
    pub fn parse(input: &str) -> Option<Cpf> {
        let digits: Vec<u32> = input.chars().filter_map(|c| c.to_digit(10)).collect();

        if digits.len() != 11 {
            return None;
        }
        if digits.iter().all(|&d| d == digits[0]) {
            return None;
        }

        let mut s1 = 0u32;
        let mut s2 = 0u32;
        for i in 0..9 {
            s1 += (i as u32 + 1) * digits[i];
            s2 += (i as u32 + 1) * digits[i + 1];
        }
        let s1 = s1 % 11 % 10;
        let s2 = s2 % 11 % 10;

        if s1 != digits[9] || s2 != digits[10] {
            return None;
        }

        let base = digits[..9].iter().fold(0u32, |acc, &d| acc * 10 + d);
        Some(Cpf::new(base))
    }

    /// Recomputes the two check digits from the stored base.
    ///
    /// Iterates the base from its least significant digit with weights
    /// 9 down to 1; the second sum is offset by `9 * s1`. Equivalent to
    /// the forward formula used in [`Cpf::parse`].
    fn check_digits(&self) -> (u32, u32) {
        let mut rest = self.0;
        let mut s1 = 0u32;
        let mut s2 = 0u32;
        for i in (1..=9u32).rev() {
            let d = rest % 10;
            s1 += i * d;
            s2 += (i - 1) * d;
            rest /= 10;
        }
        let s1 = s1 % 11 % 10;
        let s2 = (s2 + 9 * s1) % 11 % 10;
        (s1, s2)
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (c1, c2) = self.check_digits();
        write!(
            f,
            "{:03}.{:03}.{:03}-{}{}",
            self.0 / 1_000_000,
            self.0 / 1_000 % 1_000,
            self.0 % 1_000,
            c1,
            c2
        )
    }
}

// Persisted as the bare base number, never the formatted form.

impl Serialize for Cpf {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for Cpf {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let base = u32::deserialize(deserializer)?;
        Ok(Cpf::new(base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_valid_values() {
        assert_eq!(Cpf::parse("123.456.789-09"), Some(Cpf::new(123_456_789)));
        assert_eq!(Cpf::parse("111.444.777-35"), Some(Cpf::new(111_444_777)));
        assert_eq!(Cpf::parse("12345678909"), Some(Cpf::new(123_456_789)));
    }

    #[test]
    fn test_parse_ignores_non_digit_characters() {
        assert_eq!(
            Cpf::parse("cpf: 123 456 789 / 09"),
            Some(Cpf::new(123_456_789))
        );
    }

    #[test]
    fn test_parse_rejects_wrong_digit_count() {
        assert_eq!(Cpf::parse(""), None);
        assert_eq!(Cpf::parse("123.456.789-0"), None);
        assert_eq!(Cpf::parse("123.456.789-091"), None);
    }

    #[test]
    fn test_parse_rejects_repeated_digits() {
        // These satisfy the checksum equations but are degenerate.
        assert_eq!(Cpf::parse("000.000.000-00"), None);
        assert_eq!(Cpf::parse("111.111.111-11"), None);
        assert_eq!(Cpf::parse("999.999.999-99"), None);
    }

    #[test]
    fn test_parse_rejects_bad_check_digits() {
        assert_eq!(Cpf::parse("123.456.789-08"), None);
        assert_eq!(Cpf::parse("123.456.789-19"), None);
        assert_eq!(Cpf::parse("111.444.777-36"), None);
    }

    #[test]
    fn test_display_pads_and_formats() {
        assert_eq!(Cpf::new(123_456_789).to_string(), "123.456.789-09");
        assert_eq!(Cpf::new(111_444_777).to_string(), "111.444.777-35");
        // Small bases keep the full 9-digit rendering.
        assert!(Cpf::new(42).to_string().starts_with("000.000.042-"));
    }

    #[test]
    fn test_round_trip() {
        for base in [
            1u32,
            42,
            123_456_789,
            111_444_777,
            999_999_998,
            500_000_000,
        ] {
            let cpf = Cpf::new(base);
            assert!(!cpf.is_degenerate());
            assert_eq!(Cpf::parse(&cpf.to_string()), Some(cpf), "base {}", base);
        }
    }

    #[test]
    fn test_new_normalizes_degenerate_bases() {
        assert!(Cpf::new(0).is_degenerate());
        assert!(Cpf::new(111_111_111).is_degenerate());
        assert!(Cpf::new(888_888_888).is_degenerate());
        assert!(Cpf::new(1_000_000_000).is_degenerate());
        assert!(Cpf::new(u32::MAX).is_degenerate());
        assert!(!Cpf::new(123_456_789).is_degenerate());
    }
}
