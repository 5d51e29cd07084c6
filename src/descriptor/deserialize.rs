// ABOUTME: Custom serde deserializers for descriptor fields.
// ABOUTME: Validates workload names and tolerates null lists.

use serde::Deserialize;

use crate::types::WorkloadName;

pub fn deserialize_workload_name<'de, D>(deserializer: D) -> Result<WorkloadName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    WorkloadName::new(&s).map_err(serde::de::Error::custom)
}

/// A key present with no value (`cmd:`) reads as an empty list.
pub fn deserialize_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}
