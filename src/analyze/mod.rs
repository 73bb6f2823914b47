pub mod docs;
pub mod sustainability;

pub use docs::{consilience_score, marketing_penalty, tech_score, DocsEffectiveComposer};
pub use sustainability::SustainabilityGate;
