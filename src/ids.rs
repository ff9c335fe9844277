//! Validation and cleaning of identifiers used as query parameters
//!
//! Both checks run inside the query builder, so a mistyped identifier is
//! reported before any request is sent.

use std::fmt;

use crate::error::{RegbotError, Result};
use crate::source::Source;

/// A validated ClinicalTrials.gov identifier (`NCT` followed by 8 digits)
///
/// # Examples
///
/// ```
/// use regbot_client::ids::NctId;
///
/// let id = NctId::parse(" nct00769782 ").unwrap();
/// assert_eq!(id.as_str(), "NCT00769782");
///
/// assert!(NctId::parse("NCT123").is_err());
/// assert!(NctId::parse("00769782").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NctId(String);

impl NctId {
    /// Parse an NCT identifier, trimming whitespace and upper-casing the prefix
    pub fn parse(s: &str) -> Result<Self> {
        let cleaned = s.trim().to_ascii_uppercase();
        let digits = cleaned.strip_prefix("NCT").unwrap_or("");

        if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RegbotError::InvalidParameters {
                api: Source::ClinicalTrials,
                reason: format!("'{}' is not an NCT identifier (expected NCT + 8 digits)", s.trim()),
            });
        }

        Ok(Self(cleaned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NctId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated Drugs@FDA application number such as `NDA207145` or `ANDA090721`
///
/// # Examples
///
/// ```
/// use regbot_client::ids::ApplicationNumber;
///
/// let number = ApplicationNumber::parse("anda090721").unwrap();
/// assert_eq!(number.as_str(), "ANDA090721");
/// assert_eq!(number.digits(), "090721");
///
/// assert!(ApplicationNumber::parse("207145").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApplicationNumber {
    value: String,
    prefix_len: usize,
}

impl ApplicationNumber {
    /// Recognized application prefixes, longest first
    pub const PREFIXES: [&'static str; 3] = ["ANDA", "NDA", "BLA"];

    pub fn parse(s: &str) -> Result<Self> {
        let cleaned: String = s.trim().to_ascii_uppercase();

        let prefix = Self::PREFIXES
            .iter()
            .find(|prefix| cleaned.starts_with(**prefix));

        let Some(prefix) = prefix else {
            return Err(Self::invalid(s, "must start with NDA, ANDA or BLA"));
        };

        let digits = &cleaned[prefix.len()..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Self::invalid(s, "prefix must be followed by digits"));
        }

        Ok(Self {
            prefix_len: prefix.len(),
            value: cleaned,
        })
    }

    fn invalid(input: &str, why: &str) -> RegbotError {
        RegbotError::InvalidParameters {
            api: Source::DrugsFda,
            reason: format!("'{}' is not an application number: {}", input.trim(), why),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// `NDA`, `ANDA` or `BLA`
    pub fn prefix(&self) -> &str {
        &self.value[..self.prefix_len]
    }

    pub fn digits(&self) -> &str {
        &self.value[self.prefix_len..]
    }
}

impl fmt::Display for ApplicationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
