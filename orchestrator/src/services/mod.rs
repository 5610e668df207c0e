//! Service implementations
//!
//! This module contains real implementations of all service traits.
//! These are the production implementations that handle actual I/O operations.

pub mod artifact_store;
pub mod command_runner;
pub mod directory;
pub mod job_ledger;
pub mod local_importer;
pub mod remote_importer;
pub mod result_cache;

#[cfg(test)]
mod tests;

// Re-export all service implementations
pub use artifact_store::RealArtifactStore;
pub use command_runner::ShellCommandRunner;
pub use directory::FileDirectoryProvider;
pub use job_ledger::MemoryJobLedger;
pub use local_importer::LocalImporter;
pub use remote_importer::RemoteImporter;
pub use result_cache::FileResultCache;
