//! Admission planning: everything the gateway derives from a request body
//! before touching the cache, the directory or any external stage

use serde_json::Value;

use crate::core::fingerprint::{import_attributes, Fingerprint};
use crate::error::{OrchestratorError, OrchestratorResult};
use shared::{AlgorithmFamily, AnalysisRequest, Classifier, DatasetKind};

/// Validated, normalized view of one admitted request
#[derive(Debug, Clone, PartialEq)]
pub struct JobPlan {
    pub family: AlgorithmFamily,
    pub dataset: DatasetKind,
    /// Only set for decision trees
    pub classifier: Option<Classifier>,
    /// Attribute names to import, deduplicated
    pub import_attributes: Vec<String>,
    /// `None` means every datasource in the directory
    pub datasources: Option<Vec<String>>,
    pub plot: bool,
    pub use_cache: bool,
    pub fingerprint: Fingerprint,
    /// Raw request body, persisted as the per-job configuration artifact
    pub content: String,
}

impl JobPlan {
    /// Parse and validate a raw body admitted on the `family` endpoint
    pub fn resolve(family: AlgorithmFamily, raw: &Value) -> OrchestratorResult<Self> {
        let request = AnalysisRequest::from_json(raw)?;

        let dataset = match family {
            AlgorithmFamily::Histogram => DatasetKind::Cvi,
            AlgorithmFamily::Count => DatasetKind::Mesh,
            AlgorithmFamily::DecisionTree => request
                .dataset
                .as_deref()
                .ok_or_else(|| OrchestratorError::validation("decision tree requests require a dataset"))?
                .parse()?,
        };

        let classifier = match family {
            AlgorithmFamily::DecisionTree => {
                if request.class_attribute.is_none() {
                    return Err(OrchestratorError::validation(
                        "decision tree requests require a class_attribute",
                    ));
                }
                Some(match request.classifier.as_deref() {
                    Some(name) => name.parse()?,
                    None => Classifier::default(),
                })
            }
            _ => None,
        };

        let import_attributes = import_attributes(&request);
        if import_attributes.is_empty() {
            return Err(OrchestratorError::validation("at least one attribute is required"));
        }

        if matches!(request.datasources.as_deref(), Some([])) {
            return Err(OrchestratorError::validation("datasources must not be empty when given"));
        }

        let fingerprint = Fingerprint::compute(family, &request, classifier);

        Ok(JobPlan {
            family,
            dataset,
            classifier,
            import_attributes,
            datasources: request.datasources.clone(),
            plot: request.plot,
            use_cache: !request.cache_disabled(),
            fingerprint,
            content: raw.to_string(),
        })
    }
}
