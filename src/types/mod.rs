pub mod config;
pub mod consilience;
pub mod scoring;
pub mod signals;
pub mod snapshot;
