//! Severity classification shared by onboarding errors and operator output.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// How bad an outcome is for the operator reading it.
///
/// Ordered from least to most severe so callers can take the maximum over a
/// set of outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Caller input problem; fix the input and try again.
    Low,
    /// Transient or remote failure; retrying later may succeed.
    Medium,
    /// Data-integrity defect that needs operator attention.
    High,
    /// Persisted state may have been left altered.
    Critical,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::High < Severity::Critical);
        let worst = [Severity::Medium, Severity::Critical, Severity::Low]
            .into_iter()
            .max();
        assert_eq!(worst, Some(Severity::Critical));
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }
}
