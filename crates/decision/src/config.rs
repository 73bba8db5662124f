use serde::{Deserialize, Serialize};

/// Thresholds driving the category decision.
///
/// `paper_threshold` / `plastic_threshold` gate the direct assignment of a
/// top-ranked class; `global_min` is the weaker floor for the salvage path;
/// `confidence_margin` is the minimum lead the top class must hold over the
/// runner-up to be accepted without an uncertainty flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    pub paper_threshold: f64,
    pub plastic_threshold: f64,
    pub global_min: f64,
    pub confidence_margin: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            paper_threshold: 0.30,
            plastic_threshold: 0.30,
            global_min: 0.25,
            confidence_margin: 0.08,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_coherent() {
        let cfg = DecisionConfig::default();
        assert!(cfg.global_min < cfg.paper_threshold);
        assert!(cfg.global_min < cfg.plastic_threshold);
        assert!(cfg.confidence_margin > 0.0 && cfg.confidence_margin < 1.0);
    }
}
