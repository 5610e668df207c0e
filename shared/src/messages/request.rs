//! Admission request body
//!
//! The same body shape is accepted by every admission endpoint. Attribute
//! lists arrive either flat or grouped per datasource; both shapes are
//! resolved here into one explicit sum type so nothing downstream has to
//! inspect raw JSON again.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::{SharedError, SharedResult};

/// One requested attribute. Accepts either a bare name or an object with a
/// `name` plus arbitrary algorithm-specific fields (e.g. histogram `cells`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(from = "DescriptorRepr")]
pub struct AttributeDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DescriptorRepr {
    Name(String),
    Full {
        name: String,
        #[serde(flatten)]
        extra: BTreeMap<String, Value>,
    },
}

impl From<DescriptorRepr> for AttributeDescriptor {
    fn from(repr: DescriptorRepr) -> Self {
        match repr {
            DescriptorRepr::Name(name) => AttributeDescriptor::named(name),
            DescriptorRepr::Full { name, extra } => AttributeDescriptor { name, extra },
        }
    }
}

impl AttributeDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// Requested attributes in either of the two accepted shapes
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum AttributeSpec {
    /// One descriptor list per datasource
    PerSource(Vec<Vec<AttributeDescriptor>>),
    Flat(Vec<AttributeDescriptor>),
}

impl AttributeSpec {
    /// Flatten and deduplicate by name. The first occurrence of a name wins
    /// and keeps its extra fields; request order is preserved.
    pub fn descriptors(&self) -> Vec<AttributeDescriptor> {
        let mut seen: Vec<AttributeDescriptor> = Vec::new();
        let all: Box<dyn Iterator<Item = &AttributeDescriptor>> = match self {
            AttributeSpec::PerSource(groups) => Box::new(groups.iter().flatten()),
            AttributeSpec::Flat(list) => Box::new(list.iter()),
        };
        for descriptor in all {
            if !seen.iter().any(|d| d.name == descriptor.name) {
                seen.push(descriptor.clone());
            }
        }
        seen
    }
}

/// One filter condition; only `attribute` is interpreted by the gateway
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FilterCondition {
    pub attribute: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Filters {
    #[serde(default)]
    pub conditions: Vec<FilterCondition>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Parsed admission body
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct AnalysisRequest {
    pub attributes: AttributeSpec,
    #[serde(default)]
    pub datasources: Option<Vec<String>>,
    #[serde(default)]
    pub filters: Option<Filters>,
    #[serde(default)]
    pub cache: Option<String>,
    #[serde(default)]
    pub classifier: Option<String>,
    #[serde(default)]
    pub dataset: Option<String>,
    #[serde(default)]
    pub class_attribute: Option<AttributeDescriptor>,

    /// Presence of the `plot` key, whatever its value
    #[serde(skip)]
    pub plot: bool,
}

impl AnalysisRequest {
    /// Parse a raw JSON body
    pub fn from_json(raw: &Value) -> SharedResult<Self> {
        let object = raw
            .as_object()
            .ok_or_else(|| SharedError::invalid_request("request body must be a JSON object"))?;

        let mut request: AnalysisRequest = serde_json::from_value(raw.clone())
            .map_err(|e| SharedError::invalid_request(e.to_string()))?;
        request.plot = object.contains_key("plot");
        Ok(request)
    }

    /// A `cache` value equal to "NO" in any case disables cache lookup
    pub fn cache_disabled(&self) -> bool {
        self.cache
            .as_deref()
            .map(|value| value.eq_ignore_ascii_case("NO"))
            .unwrap_or(false)
    }
}
