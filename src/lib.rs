//! README credibility and repository sustainability scoring.
//!
//! [`DocsEffectiveComposer`] turns README text plus live repository state into
//! a bounded documentation score; [`SustainabilityGate`] grades commit, issue
//! and pull request activity. Both read an immutable [`ConfigSnapshot`].

pub mod analyze;
pub mod config;
pub mod consilience;
pub mod error;
pub mod report;
pub mod scan;
pub mod types;

pub use analyze::{DocsEffectiveComposer, SustainabilityGate};
pub use config::{load_config, ConfigSnapshot, ConfigStore, LoadedConfig};
pub use consilience::{LinkChecker, RepoSource};
pub use error::{CredenceError, FetchError, Result};
