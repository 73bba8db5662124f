use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Paper,
    Plastic,
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paper => "paper",
            Self::Plastic => "plastic",
            Self::General => "general",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "paper" => Ok(Self::Paper),
            "plastic" => Ok(Self::Plastic),
            "general" => Ok(Self::General),
            _ => Err(format!("unknown category: {value}")),
        }
    }
}

/// The outcome of a single decision pass.
///
/// `confidence` is always the best aggregated class confidence, even when the
/// final category is `general`. `notes` keeps one entry per rule that fired,
/// in evaluation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub category: Category,
    pub confidence: f64,
    pub uncertain: bool,
    pub notes: Vec<String>,
}

impl Verdict {
    /// Notes flattened into the single string shape the HTTP layer exposes.
    pub fn notes_joined(&self) -> String {
        self.notes.join("; ")
    }
}
