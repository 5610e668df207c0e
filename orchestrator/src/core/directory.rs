//! Datasource directory: which data holders exist and where to reach them

use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{OrchestratorError, OrchestratorResult};
use shared::DatasetKind;

/// One resolved import destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTarget {
    pub datasource: String,
    /// Network address in SMPC mode, file path in simulation mode
    pub location: String,
}

/// Mapping from datasource name to location for one dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasourceDirectory {
    dataset: DatasetKind,
    entries: BTreeMap<String, String>,
}

impl DatasourceDirectory {
    pub fn new(dataset: DatasetKind, entries: BTreeMap<String, String>) -> Self {
        Self { dataset, entries }
    }

    /// Build from a directory document.
    ///
    /// Values are either a location string or an object keyed by dataset
    /// (`{"cvi": "...", "mesh": "..."}`). Entries without a location for
    /// `dataset` are not listed.
    pub fn from_document(dataset: DatasetKind, document: &Value) -> OrchestratorResult<Self> {
        let object = document.as_object().ok_or_else(|| OrchestratorError::DirectoryUnavailable {
            path: dataset.key().to_string(),
            message: "directory document must be a JSON object".to_string(),
        })?;

        let mut entries = BTreeMap::new();
        for (name, value) in object {
            let location = match value {
                Value::String(location) => Some(location.clone()),
                Value::Object(per_dataset) => per_dataset
                    .get(dataset.key())
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            };
            if let Some(location) = location {
                entries.insert(name.clone(), location);
            }
        }

        Ok(Self { dataset, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn location(&self, datasource: &str) -> Option<&str> {
        self.entries.get(datasource).map(String::as_str)
    }

    /// Resolve requested datasources to import targets.
    ///
    /// All or nothing: the first unknown name fails the whole resolution.
    /// `None` selects every listed datasource in name order.
    pub fn resolve(&self, requested: Option<&[String]>) -> OrchestratorResult<Vec<ImportTarget>> {
        let names: Vec<&String> = match requested {
            Some(list) => {
                let mut unique: Vec<&String> = Vec::with_capacity(list.len());
                for name in list {
                    if !unique.contains(&name) {
                        unique.push(name);
                    }
                }
                unique
            }
            None => self.entries.keys().collect(),
        };

        names
            .into_iter()
            .map(|name| {
                self.location(name)
                    .map(|location| ImportTarget {
                        datasource: name.clone(),
                        location: location.to_string(),
                    })
                    .ok_or_else(|| OrchestratorError::UnknownDatasource {
                        datasource: name.clone(),
                        dataset: self.dataset,
                    })
            })
            .collect()
    }
}
