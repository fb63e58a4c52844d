//! Verdict tokens in verifier and validator replies.
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `COMPLET` | every requested file was produced |
//! | `INCOMPLET: a, b` | files are missing |
//! | `INVALIDE` | the quality check found problems |

use serde::{Deserialize, Serialize};

pub const COMPLETE_TOKEN: &str = "COMPLET";
pub const INCOMPLETE_TOKEN: &str = "INCOMPLET";
pub const INVALID_TOKEN: &str = "INVALIDE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletenessVerdict {
    Complete,
    /// `missing` is forwarded verbatim to the completion request.
    Incomplete { missing: String },
}

impl CompletenessVerdict {
    /// Parse a verifier reply. Complete iff it says `COMPLET` and never `INCOMPLET`.
    pub fn parse(reply: &str) -> Self {
        if reply.contains(COMPLETE_TOKEN) && !reply.contains(INCOMPLETE_TOKEN) {
            CompletenessVerdict::Complete
        } else {
            CompletenessVerdict::Incomplete {
                missing: reply.to_string(),
            }
        }
    }

    /// Verdict for a locally computed list of missing files.
    pub fn from_missing(missing: &[String]) -> Self {
        if missing.is_empty() {
            CompletenessVerdict::Complete
        } else {
            CompletenessVerdict::Incomplete {
                missing: format!("{}: {}", INCOMPLETE_TOKEN, missing.join(", ")),
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, CompletenessVerdict::Complete)
    }
}

/// Whether a quality report flags the code as invalid.
pub fn is_invalid(report: &str) -> bool {
    report.contains(INVALID_TOKEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_complete() {
        assert!(CompletenessVerdict::parse("Verdict: COMPLET").is_complete());
    }

    #[test]
    fn test_parse_incomplete_contains_complete_substring() {
        let v = CompletenessVerdict::parse("INCOMPLET: api.py");
        assert_eq!(
            v,
            CompletenessVerdict::Incomplete {
                missing: "INCOMPLET: api.py".to_string()
            }
        );
    }

    #[test]
    fn test_parse_without_token_is_incomplete() {
        assert!(!CompletenessVerdict::parse("looks fine to me").is_complete());
        // Case-sensitive tokens
        assert!(!CompletenessVerdict::parse("complet").is_complete());
    }

    #[test]
    fn test_from_missing() {
        assert!(CompletenessVerdict::from_missing(&[]).is_complete());
        let v = CompletenessVerdict::from_missing(&["a.py".to_string(), "b.py".to_string()]);
        assert_eq!(
            v,
            CompletenessVerdict::Incomplete {
                missing: "INCOMPLET: a.py, b.py".to_string()
            }
        );
    }

    #[test]
    fn test_is_invalid() {
        assert!(is_invalid("Status: INVALIDE\n- missing import"));
        assert!(!is_invalid("VALIDE"));
    }
}
