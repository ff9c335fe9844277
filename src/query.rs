//! Query construction for the three sources
//!
//! [`QueryBuilder::build_query`] is a pure function: it validates the caller's
//! parameters and resolves them into a [`RequestDescriptor`] that the transport
//! turns into an HTTP request. Nothing here performs I/O.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{RegbotError, Result};
use crate::ids::{ApplicationNumber, NctId};
use crate::source::Source;

/// Search parameters for one query
///
/// Keys are plain strings so that a typo is caught at build time as
/// `UnsupportedParameter` instead of silently widening the search.
///
/// # Example
///
/// ```
/// use regbot_client::QueryParameters;
///
/// let params = QueryParameters::new()
///     .with("brand_name", "XADAGO")
///     .with("sponsor_name", "MDD US");
/// assert_eq!(params.get("brand_name"), Some("XADAGO"));
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    entries: Vec<(String, String)>,
}

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing an earlier value for the same key
    pub fn with<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Position in a paginated result set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageCursor {
    /// Record offset (Drugs@FDA `skip`)
    Offset(u64),
    /// Opaque continuation token (ClinicalTrials.gov `pageToken`)
    Token(String),
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageCursor::Offset(offset) => write!(f, "offset {offset}"),
            PageCursor::Token(token) => write!(f, "token {token}"),
        }
    }
}

/// A fully resolved request: path relative to the source's base URL plus query pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub source: Source,
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl RequestDescriptor {
    /// Value of the first query pair named `key`
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render the full URL against `base_url`, appending `extra` pairs (API keys)
    ///
    /// # Example
    ///
    /// ```
    /// use regbot_client::{QueryBuilder, QueryParameters, Source};
    ///
    /// let request = QueryBuilder::new()
    ///     .build_query(Source::RxClass, &QueryParameters::new().with("rxcui", "282388"), None)
    ///     .unwrap();
    /// assert_eq!(
    ///     request.to_url("https://rxnav.nlm.nih.gov/REST/rxclass", &[]),
    ///     "https://rxnav.nlm.nih.gov/REST/rxclass/class/byRxcui.json?rxcui=282388"
    /// );
    /// ```
    pub fn to_url(&self, base_url: &str, extra: &[(String, String)]) -> String {
        let pairs: Vec<String> = self
            .query
            .iter()
            .chain(extra.iter())
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect();

        let mut url = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        if !pairs.is_empty() {
            url.push('?');
            url.push_str(&pairs.join("&"));
        }
        url
    }
}

/// Builds source-specific requests from [`QueryParameters`]
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    page_sizes: HashMap<Source, usize>,
}

impl QueryBuilder {
    /// Builder with each source's default page size
    pub fn new() -> Self {
        Self::from_config(&ClientConfig::new())
    }

    /// Builder using the page sizes configured in `config`
    pub fn from_config(config: &ClientConfig) -> Self {
        let page_sizes = Source::ALL
            .iter()
            .filter_map(|source| {
                config
                    .effective_page_size(*source)
                    .map(|size| (*source, size))
            })
            .collect();
        Self { page_sizes }
    }

    pub fn page_size(&self, source: Source) -> Option<usize> {
        self.page_sizes.get(&source).copied()
    }

    /// Translate `params` into the request for the page at `cursor`
    ///
    /// # Errors
    ///
    /// * `RegbotError::UnsupportedParameter` - a key the source does not recognize
    /// * `RegbotError::InvalidParameters` - recognized keys that cannot form a valid
    ///   request (no filter at all, malformed identifiers, conflicting keys,
    ///   a cursor of the wrong kind)
    pub fn build_query(
        &self,
        source: Source,
        params: &QueryParameters,
        cursor: Option<&PageCursor>,
    ) -> Result<RequestDescriptor> {
        for (key, value) in params.iter() {
            if !source.recognizes(key) {
                return Err(RegbotError::UnsupportedParameter {
                    api: source,
                    key: key.to_string(),
                });
            }
            if value.trim().is_empty() {
                return Err(RegbotError::InvalidParameters {
                    api: source,
                    reason: format!("parameter '{key}' has an empty value"),
                });
            }
        }

        let request = match source {
            Source::DrugsFda => self.build_drugsfda(params, cursor)?,
            Source::ClinicalTrials => self.build_clinical_trials(params, cursor)?,
            Source::RxClass => build_rxclass(params, cursor)?,
        };

        debug!(source = %source, path = %request.path, "Built request");
        Ok(request)
    }

    fn build_drugsfda(
        &self,
        params: &QueryParameters,
        cursor: Option<&PageCursor>,
    ) -> Result<RequestDescriptor> {
        let source = Source::DrugsFda;
        let mut clauses = Vec::with_capacity(params.len());

        for (key, value) in params.iter() {
            let (field, term) = match key {
                "application_number" => (
                    "application_number",
                    ApplicationNumber::parse(value)?.to_string(),
                ),
                "brand_name" => ("openfda.brand_name", value.trim().to_string()),
                "generic_name" => ("openfda.generic_name", value.trim().to_string()),
                "sponsor_name" => ("sponsor_name", value.trim().to_string()),
                "ndc" => ("openfda.product_ndc", value.trim().to_string()),
                _ => unreachable!("keys are checked against the recognized set"),
            };
            // openFDA has no escape for quotes inside a phrase
            let term = term.replace('"', "");
            let term = term.trim();
            if term.is_empty() {
                return Err(no_usable_value(Source::DrugsFda, key));
            }
            clauses.push(format!("{field}:\"{term}\""));
        }

        if clauses.is_empty() {
            return Err(missing_filter(source));
        }

        let skip = match cursor {
            None => 0,
            Some(PageCursor::Offset(offset)) => *offset,
            Some(PageCursor::Token(_)) => {
                return Err(RegbotError::InvalidParameters {
                    api: source,
                    reason: "Drugs@FDA pages by numeric offset, not by token".to_string(),
                });
            }
        };

        let mut query = vec![("search".to_string(), clauses.join(" AND "))];
        if let Some(limit) = self.page_size(source) {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query.push(("skip".to_string(), skip.to_string()));

        Ok(RequestDescriptor {
            source,
            path: "/drug/drugsfda.json".to_string(),
            query,
        })
    }

    fn build_clinical_trials(
        &self,
        params: &QueryParameters,
        cursor: Option<&PageCursor>,
    ) -> Result<RequestDescriptor> {
        let source = Source::ClinicalTrials;
        let mut query = vec![("format".to_string(), "json".to_string())];

        for (key, value) in params.iter() {
            let pair = match key {
                "condition" => ("query.cond", value.trim().to_string()),
                "intervention" => ("query.intr", value.trim().to_string()),
                "sponsor" => ("query.spons", value.trim().to_string()),
                "nct_id" => {
                    let ids = value
                        .split(',')
                        .map(|id| NctId::parse(id).map(|id| id.to_string()))
                        .collect::<Result<Vec<_>>>()?;
                    ("filter.ids", ids.join(","))
                }
                "status" => {
                    let statuses: Vec<String> = value
                        .split(',')
                        .map(|status| status.trim().to_ascii_uppercase().replace([' ', '-'], "_"))
                        .filter(|status| !status.is_empty())
                        .collect();
                    ("filter.overallStatus", statuses.join(","))
                }
                _ => unreachable!("keys are checked against the recognized set"),
            };
            if pair.1.is_empty() {
                return Err(no_usable_value(source, key));
            }
            query.push((pair.0.to_string(), pair.1));
        }

        if query.len() == 1 {
            return Err(missing_filter(source));
        }

        if let Some(size) = self.page_size(source) {
            query.push(("pageSize".to_string(), size.to_string()));
        }

        match cursor {
            None => {}
            Some(PageCursor::Token(token)) => query.push(("pageToken".to_string(), token.clone())),
            Some(PageCursor::Offset(_)) => {
                return Err(RegbotError::InvalidParameters {
                    api: source,
                    reason: "ClinicalTrials.gov pages by continuation token, not by offset"
                        .to_string(),
                });
            }
        }

        Ok(RequestDescriptor {
            source,
            path: "/studies".to_string(),
            query,
        })
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn no_usable_value(source: Source, key: &str) -> RegbotError {
    RegbotError::InvalidParameters {
        api: source,
        reason: format!("parameter '{key}' has no usable value"),
    }
}

fn build_rxclass(params: &QueryParameters, cursor: Option<&PageCursor>) -> Result<RequestDescriptor> {
    let source = Source::RxClass;

    if let Some(cursor) = cursor {
        debug!(%cursor, "RxClass is unpaginated; ignoring cursor");
    }

    let lookups: Vec<(&str, &str)> = ["class_id", "rxcui", "drug_name"]
        .into_iter()
        .filter_map(|key| params.get(key).map(|value| (key, value.trim())))
        .collect();

    let (lookup_key, lookup_value) = match lookups.as_slice() {
        [] => return Err(missing_filter(source)),
        [single] => *single,
        _ => {
            return Err(RegbotError::InvalidParameters {
                api: source,
                reason: "use only one of class_id, rxcui or drug_name".to_string(),
            });
        }
    };

    let relation_source = params
        .get("relation_source")
        .map(|value| value.trim().to_ascii_uppercase());
    let relation = params.get("relation").map(|value| value.trim().to_string());

    let (path, mut query) = match lookup_key {
        "class_id" => {
            let Some(relation_source) = relation_source.clone() else {
                return Err(RegbotError::InvalidParameters {
                    api: source,
                    reason: "class_id lookups require relation_source".to_string(),
                });
            };
            (
                "/classMembers.json",
                vec![
                    ("classId".to_string(), lookup_value.to_string()),
                    ("relaSource".to_string(), relation_source),
                ],
            )
        }
        "rxcui" => (
            "/class/byRxcui.json",
            vec![("rxcui".to_string(), lookup_value.to_string())],
        ),
        _ => (
            "/class/byDrugName.json",
            vec![("drugName".to_string(), lookup_value.to_string())],
        ),
    };

    if lookup_key != "class_id" {
        if let Some(relation_source) = relation_source {
            query.push(("relaSource".to_string(), relation_source));
        }
    }
    if let Some(relation) = relation {
        query.push(("rela".to_string(), relation));
    }

    Ok(RequestDescriptor {
        source,
        path: path.to_string(),
        query,
    })
}

fn missing_filter(source: Source) -> RegbotError {
    RegbotError::InvalidParameters {
        api: source,
        reason: format!(
            "at least one filtering parameter is required (one of: {})",
            source.recognized_parameters().join(", ")
        ),
    }
}
