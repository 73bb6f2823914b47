//! README signal extraction and local collaborator adapters.

pub mod filesystem;
pub mod git_meta;
pub mod links;
pub mod markdown;
pub mod marketing;
pub mod patterns;
pub mod tech;

pub use filesystem::LocalRepoSource;
pub use git_meta::activity_from_git;
pub use marketing::MarketingExtractor;
pub use patterns::PatternSet;
pub use tech::TechExtractor;
