//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::errors::SharedError;

/// Global node role singleton - set once at startup
static NODE_ROLE: OnceLock<NodeRole> = OnceLock::new();

/// Identity of this gateway process in log output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    /// Gateway driving a real multi-party deployment
    Node,
    /// Gateway running every data holder locally
    Simulation,
}

impl NodeRole {
    /// Initialize the global role from the deployment flag
    pub fn init(simulation: bool) -> &'static NodeRole {
        NODE_ROLE.get_or_init(|| if simulation { NodeRole::Simulation } else { NodeRole::Node })
    }

    /// Get the global role, defaulting to `Node` when `init` was never called
    pub fn current() -> &'static NodeRole {
        NODE_ROLE.get_or_init(|| NodeRole::Node)
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Node => write!(f, "node"),
            NodeRole::Simulation => write!(f, "node_simulation"),
        }
    }
}

/// Unique identifier for an admitted computation request
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, SharedError> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| SharedError::InvalidJobId { input: s.to_string() })
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Analytical computation offered by the gateway, one admission endpoint each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmFamily {
    Histogram,
    Count,
    DecisionTree,
}

impl AlgorithmFamily {
    /// Directory holding generated sources for this family
    pub fn source_dir(&self) -> &'static str {
        match self {
            // counts reuse the histogram toolchain
            AlgorithmFamily::Histogram | AlgorithmFamily::Count => "histogram",
            AlgorithmFamily::DecisionTree => "decision-tree",
        }
    }

    /// Extension of the per-job output artifact
    pub fn output_extension(&self) -> &'static str {
        match self {
            AlgorithmFamily::DecisionTree => "json",
            _ => "txt",
        }
    }
}

impl fmt::Display for AlgorithmFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmFamily::Histogram => write!(f, "histogram"),
            AlgorithmFamily::Count => write!(f, "count"),
            AlgorithmFamily::DecisionTree => write!(f, "decision_tree"),
        }
    }
}

/// Dataset family held by the data-holding nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Relational dataset
    Cvi,
    /// Hierarchical, domain-coded patient records
    Mesh,
}

impl DatasetKind {
    /// Key used for this dataset inside nested directory documents
    pub fn key(&self) -> &'static str {
        match self {
            DatasetKind::Cvi => "cvi",
            DatasetKind::Mesh => "mesh",
        }
    }

    /// Path of the import endpoint exposed by peer nodes
    pub fn import_action(&self) -> &'static str {
        match self {
            DatasetKind::Cvi => "/smpc/import/cvi",
            DatasetKind::Mesh => "/smpc/import",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DatasetKind {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cvi" => Ok(DatasetKind::Cvi),
            "mesh" => Ok(DatasetKind::Mesh),
            _ => Err(SharedError::invalid_request(format!("unknown dataset '{s}'"))),
        }
    }
}

/// Decision-tree learner variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Classifier {
    #[default]
    #[serde(rename = "ID3")]
    Id3,
    #[serde(rename = "C45")]
    C45,
}

impl Classifier {
    /// Prefix shared by this classifier's generator and response scripts
    pub fn script_prefix(&self) -> &'static str {
        match self {
            Classifier::Id3 => "id3",
            Classifier::C45 => "c45",
        }
    }
}

impl fmt::Display for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classifier::Id3 => write!(f, "ID3"),
            Classifier::C45 => write!(f, "C45"),
        }
    }
}

impl FromStr for Classifier {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ID3" => Ok(Classifier::Id3),
            "C45" => Ok(Classifier::C45),
            _ => Err(SharedError::invalid_request(format!("unknown classifier '{s}'"))),
        }
    }
}
