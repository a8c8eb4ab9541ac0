use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::eligibility::ScoringConfig;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub eligibility: EligibilityConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let persist_results = match env::var("ELIGIBILITY_PERSIST_RESULTS") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                name: "ELIGIBILITY_PERSIST_RESULTS",
                value: raw,
            })?,
            Err(_) => true,
        };

        let approve_threshold = match env::var("ELIGIBILITY_APPROVE_THRESHOLD") {
            Ok(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|threshold| *threshold <= 100)
                .ok_or(ConfigError::InvalidThreshold)?,
            Err(_) => ScoringConfig::default().approve_threshold,
        };

        let audit_log = env::var("ELIGIBILITY_AUDIT_LOG")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            eligibility: EligibilityConfig {
                persist_results,
                approve_threshold,
                audit_log,
            },
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Knobs for the eligibility workflow that surround the scoring model.
#[derive(Debug, Clone)]
pub struct EligibilityConfig {
    pub persist_results: bool,
    pub approve_threshold: u8,
    pub audit_log: Option<PathBuf>,
}

impl EligibilityConfig {
    /// Default model constants with the configured decision threshold applied.
    pub fn scoring_config(&self) -> ScoringConfig {
        ScoringConfig {
            approve_threshold: self.approve_threshold,
            ..ScoringConfig::default()
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidThreshold,
    InvalidFlag { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidThreshold => {
                write!(f, "ELIGIBILITY_APPROVE_THRESHOLD must be an integer in 0..=100")
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be a boolean flag, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
