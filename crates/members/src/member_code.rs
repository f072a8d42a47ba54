//! Member identity issuance: the human-readable federation code.
//!
//! Codes are backed by a monotonic sequence that is never reused or
//! decremented; the sequence allocation itself lives behind
//! [`crate::DirectoryStore::next_member_sequence`] as a single atomic
//! increment-and-read.

use serde::{Deserialize, Serialize};

/// An issued member code, e.g. `[BR]-000.001-W`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberCode(String);

impl MemberCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for MemberCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MemberCode {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Format `[CC]-NNN.NNN-W` from a country code and an allocated sequence.
///
/// The country prefix falls back to `XX` when the account has no country.
/// The sequence is zero-padded to six digits and split after the third; a
/// sequence beyond 999 999 simply widens the second group.
pub fn format_member_code(country: Option<&str>, sequence: u64) -> MemberCode {
    let cc: String = match country {
        Some(c) if c.trim().len() >= 2 => c.trim().to_uppercase(),
        _ => "XX".to_string(),
    };
    let digits = format!("{sequence:06}");
    let (head, tail) = digits.split_at(3);
    MemberCode(format!("[{cc}]-{head}.{tail}-W"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn formats_with_country_prefix() {
        assert_eq!(format_member_code(Some("br"), 1).as_str(), "[BR]-000.001-W");
        assert_eq!(
            format_member_code(Some("US"), 123_456).as_str(),
            "[US]-123.456-W"
        );
    }

    #[test]
    fn missing_country_uses_placeholder() {
        assert_eq!(format_member_code(None, 42).as_str(), "[XX]-000.042-W");
        assert_eq!(format_member_code(Some(" "), 42).as_str(), "[XX]-000.042-W");
    }

    #[test]
    fn overflow_widens_second_group() {
        assert_eq!(
            format_member_code(Some("PT"), 1_234_567).as_str(),
            "[PT]-123.4567-W"
        );
    }

    proptest! {
        #[test]
        fn distinct_sequences_give_distinct_codes(a in 0u64..10_000_000, b in 0u64..10_000_000) {
            prop_assume!(a != b);
            prop_assert_ne!(
                format_member_code(Some("BR"), a),
                format_member_code(Some("BR"), b)
            );
        }

        #[test]
        fn code_shape_is_stable(seq in 0u64..1_000_000) {
            let code = format_member_code(Some("BR"), seq);
            let s = code.as_str();
            prop_assert!(s.starts_with("[BR]-"));
            prop_assert!(s.ends_with("-W"));
            prop_assert_eq!(s.len(), "[BR]-000.001-W".len());
        }
    }
}
