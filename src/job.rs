//! Job postings as extracted by the model.
//!
//! A [`JobPosting`] keeps the model's JSON object verbatim. The recognized
//! keys (`role`, `experience`, `skills`, `description`) are read through
//! accessors that default when a key is missing or has an unexpected shape,
//! so a partial extraction is still usable.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ChainError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobPosting(Map<String, Value>);

impl JobPosting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts only JSON objects.
    pub fn from_value(value: Value) -> Result<Self, ChainError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ChainError::Parse(format!(
                "expected a job posting object, got {}",
                kind_of(&other)
            ))),
        }
    }

    pub fn role(&self) -> String {
        self.text_field("role")
    }

    pub fn experience(&self) -> String {
        self.text_field("experience")
    }

    pub fn description(&self) -> String {
        self.text_field("description")
    }

    /// Skills as a clean list.
    ///
    /// Models return either a list or a comma-separated string; both are
    /// split and trimmed, and empty entries dropped.
    pub fn skills(&self) -> Vec<String> {
        match self.0.get("skills") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(s)) => split_skills(s),
            Some(Value::Array(items)) => items
                .iter()
                .map(scalar_text)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Some(other) => vec![scalar_text(other)],
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    fn text_field(&self, key: &str) -> String {
        match self.0.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(v) => scalar_text(v),
        }
    }
}

fn split_skills(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// Strings without their JSON quotes; everything else as compact JSON.
fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(v: Value) -> JobPosting {
        JobPosting::from_value(v).unwrap()
    }

    #[test]
    fn missing_fields_default() {
        let j = JobPosting::new();
        assert_eq!(j.role(), "");
        assert_eq!(j.experience(), "");
        assert_eq!(j.description(), "");
        assert!(j.skills().is_empty());
    }

    #[test]
    fn comma_separated_skills_are_split() {
        let j = job(json!({"skills": "Python,  SQL , ,AWS"}));
        assert_eq!(j.skills(), vec!["Python", "SQL", "AWS"]);
    }

    #[test]
    fn list_skills_are_trimmed() {
        let j = job(json!({"skills": [" Rust ", "", "Kubernetes", 3]}));
        assert_eq!(j.skills(), vec!["Rust", "Kubernetes", "3"]);
    }

    #[test]
    fn scalar_skills_become_single_entry() {
        let j = job(json!({"skills": 42}));
        assert_eq!(j.skills(), vec!["42"]);
    }

    #[test]
    fn numeric_experience_is_rendered() {
        let j = job(json!({"experience": 3}));
        assert_eq!(j.experience(), "3");
    }

    #[test]
    fn record_survives_serialization_unmodified() {
        let raw = json!({"role": "X", "skills": "a, b, c", "extra": {"k": true}});
        let j = job(raw.clone());
        assert_eq!(serde_json::to_value(&j).unwrap(), raw);
    }

    #[test]
    fn non_object_is_a_parse_error() {
        let err = JobPosting::from_value(json!("just text")).unwrap_err();
        assert!(matches!(err, ChainError::Parse(_)));
        assert!(err.to_string().contains("a string"));
    }

    #[test]
    fn set_overwrites_field() {
        let mut j = job(json!({"role": "A", "tone": "Formal"}));
        j.set("tone", "Friendly");
        assert_eq!(j.get("tone"), Some(&json!("Friendly")));
    }
}
