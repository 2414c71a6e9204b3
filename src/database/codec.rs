//! Text encoding for structured columns.
//!
//! A user's technical skills are a map of skill name to level, persisted as a
//! single TEXT column holding a JSON object.

use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Skill name -> level. Key order carries no meaning.
pub type SkillMap = HashMap<String, String>;

/// A stored value could not be turned back into its in-memory form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot decode column '{field}': {reason}")]
pub struct DecodeError {
    pub field: &'static str,
    pub reason: String,
}

impl DecodeError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Encode a skills map as JSON object text. Never fails; the empty map
/// encodes as `{}`.
pub fn encode(skills: &SkillMap) -> String {
    let object: Map<String, Value> = skills
        .iter()
        .map(|(name, level)| (name.clone(), Value::String(level.clone())))
        .collect();
    Value::Object(object).to_string()
}

/// Decode text produced by [`encode`]. A missing value is an error, not an
/// empty map.
pub fn decode(text: Option<&str>) -> Result<SkillMap, DecodeError> {
    let text = text.ok_or_else(|| DecodeError::new("technical_skills", "value is null"))?;
    serde_json::from_str::<SkillMap>(text)
        .map_err(|e| DecodeError::new("technical_skills", e.to_string()))
}
