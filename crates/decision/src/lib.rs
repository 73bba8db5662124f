pub mod config;
pub mod detection;
pub mod engine;
pub mod verdict;

pub use config::DecisionConfig;
pub use detection::Detection;
pub use engine::decide;
pub use verdict::{Category, Verdict};
