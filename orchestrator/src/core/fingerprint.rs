//! Request fingerprinting
//!
//! Turns a parsed admission request into a deterministic cache key. Two
//! requests that ask the same question must produce the same key no matter
//! how their attribute lists were nested or ordered.

use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

use shared::{AlgorithmFamily, AnalysisRequest, AttributeDescriptor, Classifier, Filters};

/// Canonical cache key for one logical request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the key for `request` as admitted on the `family` endpoint.
    ///
    /// The classifier is passed resolved (defaults applied) so an explicit
    /// `"ID3"` and an omitted classifier share a key.
    pub fn compute(family: AlgorithmFamily, request: &AnalysisRequest, classifier: Option<Classifier>) -> Self {
        let mut key = Map::new();
        key.insert("algorithm".to_string(), json!(family.to_string()));
        key.insert("attributes".to_string(), Value::Array(key_attributes(request)));
        key.insert("datasources".to_string(), key_datasources(request.datasources.as_deref()));
        key.insert("plot".to_string(), Value::Bool(request.plot));

        if let Some(filters) = &request.filters {
            key.insert("filters".to_string(), key_filters(filters));
        }
        if let Some(classifier) = classifier {
            key.insert("classifier".to_string(), json!(classifier.to_string()));
        }
        if let Some(class_attribute) = &request.class_attribute {
            key.insert("class_attribute".to_string(), descriptor_value(class_attribute));
        }

        // serde_json's default map is ordered by key, so serialization is canonical
        Fingerprint(Value::Object(key).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase hex SHA-256 of the key, used to name cache entries on disk
    pub fn digest(&self) -> String {
        format!("{:x}", Sha256::digest(self.0.as_bytes()))
    }

    #[cfg(test)]
    pub(crate) fn from_raw(raw: impl Into<String>) -> Self {
        Fingerprint(raw.into())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attribute set that must be imported for `request`: requested
/// descriptors first, then attributes only referenced by filters, then the
/// class attribute. Names appear once, in that order.
pub fn import_attributes(request: &AnalysisRequest) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    };

    for descriptor in request.attributes.descriptors() {
        push(&descriptor.name);
    }
    if let Some(filters) = &request.filters {
        for condition in &filters.conditions {
            push(&condition.attribute);
        }
    }
    if let Some(class_attribute) = &request.class_attribute {
        push(&class_attribute.name);
    }
    names
}

fn key_attributes(request: &AnalysisRequest) -> Vec<Value> {
    let mut descriptors = request.attributes.descriptors();

    if let Some(filters) = &request.filters {
        for condition in &filters.conditions {
            if !descriptors.iter().any(|d| d.name == condition.attribute) {
                descriptors.push(AttributeDescriptor::named(condition.attribute.clone()));
            }
        }
    }

    descriptors.sort_by(|a, b| a.name.cmp(&b.name));
    descriptors.iter().map(descriptor_value).collect()
}

fn key_datasources(datasources: Option<&[String]>) -> Value {
    match datasources {
        Some(list) => {
            let mut sorted: Vec<&String> = list.iter().collect();
            sorted.sort();
            sorted.dedup();
            json!(sorted)
        }
        None => json!("all"),
    }
}

fn key_filters(filters: &Filters) -> Value {
    let mut conditions: Vec<Value> = filters
        .conditions
        .iter()
        .map(|condition| serde_json::to_value(condition).unwrap_or(Value::Null))
        .collect();
    conditions.sort_by_key(|condition| condition.to_string());

    let mut object: Map<String, Value> = filters.extra.clone().into_iter().collect();
    object.insert("conditions".to_string(), Value::Array(conditions));
    Value::Object(object)
}

fn descriptor_value(descriptor: &AttributeDescriptor) -> Value {
    let mut object: Map<String, Value> = descriptor.extra.clone().into_iter().collect();
    object.insert("name".to_string(), json!(descriptor.name));
    Value::Object(object)
}
