use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

use super::{send_request, unexpected_envelope, Page, SourceAdapter};
use crate::assembler::lenient::one_or_many;
use crate::error::Result;
use crate::query::{PageCursor, QueryBuilder, QueryParameters};
use crate::source::Source;
use crate::transport::Transport;

/// Relation source whose content may only be returned when asked for explicitly
const RESTRICTED_RELATION_SOURCE: &str = "SNOMEDCT";

/// NLM RxClass, unpaginated
///
/// The API returns one `rxclassDrugInfo` entry per (drug concept, class)
/// pair. Entries are regrouped so that each class becomes one raw record
/// with all related concepts under `minConcept`. Class member lookups
/// (`class_id`) return `drugMemberGroup` instead, which becomes a single
/// record for the requested class.
#[derive(Debug, Clone)]
pub struct RxClassAdapter<T> {
    transport: T,
    builder: QueryBuilder,
}

impl<T: Transport> RxClassAdapter<T> {
    pub fn new(transport: T) -> Self {
        Self::with_builder(transport, QueryBuilder::new())
    }

    pub fn with_builder(transport: T, builder: QueryBuilder) -> Self {
        Self { transport, builder }
    }
}

impl<T: Transport> SourceAdapter for RxClassAdapter<T> {
    fn source(&self) -> Source {
        Source::RxClass
    }

    fn query_builder(&self) -> &QueryBuilder {
        &self.builder
    }

    #[instrument(skip(self, params))]
    fn fetch_page(&self, params: &QueryParameters, cursor: Option<&PageCursor>) -> Result<Page> {
        let request = self.builder.build_query(Source::RxClass, params, cursor)?;
        let response = send_request(&self.transport, &request)?;

        if !response.is_object() {
            return Err(unexpected_envelope(Source::RxClass, &response));
        }

        let requested_source = params
            .get("relation_source")
            .map(|value| value.trim().to_ascii_uppercase());

        let records = if let Some(members) = response.pointer("/drugMemberGroup/drugMember") {
            class_members_record(params, requested_source.as_deref(), members.clone())
                .into_iter()
                .collect()
        } else {
            let entries = response
                .pointer("/rxclassDrugInfoList/rxclassDrugInfo")
                .cloned()
                .unwrap_or(Value::Null);
            group_by_class(one_or_many(entries), requested_source.as_deref())
        };

        debug!(records = records.len(), "Fetched RxClass classes");
        Ok(Page::last(records))
    }
}

/// Regroup drug-info entries per (classId, rela, relaSource), in first-seen order
fn group_by_class(entries: Vec<Value>, requested_source: Option<&str>) -> Vec<Value> {
    let mut groups: Vec<(GroupKey, Map<String, Value>, Vec<Value>)> = Vec::new();

    for entry in entries {
        let Value::Object(mut entry) = entry else {
            // Left for the assembler to reject
            groups.push((GroupKey::default(), Map::new(), Vec::new()));
            continue;
        };

        let key = GroupKey::of(&entry);
        if !is_visible(key.rela_source.as_deref(), requested_source) {
            continue;
        }

        let concepts = one_or_many(entry.remove("minConcept").unwrap_or(Value::Null));
        match groups.iter_mut().find(|(existing, _, _)| key.class_id.is_some() && *existing == key) {
            Some((_, _, merged)) => {
                for concept in concepts {
                    if !merged.contains(&concept) {
                        merged.push(concept);
                    }
                }
            }
            None => groups.push((key, entry, concepts)),
        }
    }

    groups
        .into_iter()
        .map(|(_, mut entry, concepts)| {
            entry.insert("minConcept".to_string(), Value::Array(concepts));
            Value::Object(entry)
        })
        .collect()
}

/// One record holding every member of the requested class
fn class_members_record(
    params: &QueryParameters,
    requested_source: Option<&str>,
    members: Value,
) -> Option<Value> {
    let class_id = params.get("class_id")?.trim();
    let concepts: Vec<Value> = one_or_many(members)
        .into_iter()
        .filter_map(|member| member.get("minConcept").cloned())
        .collect();

    let mut record = json!({
        "minConcept": concepts,
        "rxclassMinConceptItem": {"classId": class_id},
    });
    if let Value::Object(map) = &mut record {
        if let Some(source) = requested_source {
            map.insert("relaSource".to_string(), Value::String(source.to_string()));
        }
        if let Some(relation) = params.get("relation") {
            map.insert("rela".to_string(), Value::String(relation.trim().to_string()));
        }
    }
    Some(record)
}

fn is_visible(rela_source: Option<&str>, requested_source: Option<&str>) -> bool {
    match rela_source {
        Some(source) if source.eq_ignore_ascii_case(RESTRICTED_RELATION_SOURCE) => {
            requested_source == Some(RESTRICTED_RELATION_SOURCE)
        }
        _ => true,
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct GroupKey {
    class_id: Option<String>,
    rela: Option<String>,
    rela_source: Option<String>,
}

impl GroupKey {
    fn of(entry: &Map<String, Value>) -> Self {
        let text = |value: Option<&Value>| value.and_then(Value::as_str).map(str::to_string);
        Self {
            class_id: text(entry.get("rxclassMinConceptItem").and_then(|item| item.get("classId"))),
            rela: text(entry.get("rela")),
            rela_source: text(entry.get("relaSource")),
        }
    }
}
