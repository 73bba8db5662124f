use ecosort_common::error::{EcosortError, EcosortResult};
use serde::Deserialize;
use std::env;

/// Process-wide service configuration.
///
/// Mirrors the knobs the classifier service reads at startup. The decision
/// thresholds live here so operators tune them per deployment, but they are
/// always handed to the decision engine as an explicit argument — the engine
/// itself never touches the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Optional shared secret for `POST /predict`. `None` disables the guard.
    pub model_api_key: Option<String>,

    pub paper_threshold: f64,
    pub plastic_threshold: f64,
    pub global_min: f64,
    pub confidence_margin: f64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present, then reads vars with defaults.
    pub fn from_env() -> EcosortResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        Ok(Self {
            host: get_var_or("HOST", "0.0.0.0"),
            port: get_var_or("PORT", "8080")
                .parse()
                .map_err(|e| EcosortError::Config(format!("invalid PORT: {e}")))?,
            log_level: get_var_or("LOG_LEVEL", "info"),
            model_api_key: env::var("MODEL_API_KEY").ok().filter(|k| !k.is_empty()),
            paper_threshold: get_f64_or("PAPER_THRESHOLD", 0.30)?,
            plastic_threshold: get_f64_or("PLASTIC_THRESHOLD", 0.30)?,
            global_min: get_f64_or("GLOBAL_MIN", 0.25)?,
            confidence_margin: get_f64_or("CONFIDENCE_MARGIN", 0.08)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Read an f64 knob. Missing is fine (default applies); present-but-garbage
/// is a hard configuration error rather than a silent fallback.
fn get_f64_or(key: &str, default: f64) -> EcosortResult<f64> {
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| EcosortError::Config(format!("invalid {key}: {e}"))),
    }
}
