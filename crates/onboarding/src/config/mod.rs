use std::env;
use std::fmt;
use std::time::Duration;

use crate::workflows::onboarding::{
    OnboardingPolicy, RequestContext, ResubmissionPolicy, RoleDefaults, RoleId, SigningKey,
    TransitionPolicy,
};

const DEVELOPMENT_SIGNING_KEY: &str = "onboarding-development-key";

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
    pub auth: AuthConfig,
    pub onboarding: OnboardingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let signing_key = match env::var("ONBOARDING_SIGNING_KEY") {
            Ok(key) if !key.trim().is_empty() => SigningKey::new(key.trim()),
            _ if environment == AppEnvironment::Production => {
                return Err(ConfigError::MissingSigningKey)
            }
            _ => SigningKey::new(DEVELOPMENT_SIGNING_KEY),
        };

        let defaults = RoleDefaults::default();
        let roles = RoleDefaults {
            applicant: role_var("ONBOARDING_APPLICANT_ROLE_ID", defaults.applicant)?,
            volunteer: role_var("ONBOARDING_VOLUNTEER_ROLE_ID", defaults.volunteer)?,
        };

        let transitions = match env::var("ONBOARDING_REVIEW_POLICY") {
            Ok(raw) => parse_transition_policy(&raw)?,
            Err(_) => TransitionPolicy::default(),
        };

        let resubmission = match env::var("ONBOARDING_RESUBMISSION") {
            Ok(raw) => parse_resubmission_policy(&raw)?,
            Err(_) => ResubmissionPolicy::default(),
        };

        let deadline = match env::var("ONBOARDING_DEADLINE_MS") {
            Ok(raw) => Some(Duration::from_millis(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidDeadline)?,
            )),
            Err(_) => None,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            auth: AuthConfig { signing_key },
            onboarding: OnboardingConfig {
                policy: OnboardingPolicy {
                    roles,
                    transitions,
                    resubmission,
                },
                deadline,
            },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Key material handed to the access guard at construction.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub signing_key: SigningKey,
}

/// Engine policy dials and the per-operation deadline.
#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    pub policy: OnboardingPolicy,
    pub deadline: Option<Duration>,
}

impl OnboardingConfig {
    /// Fresh context for one inbound operation.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::from_timeout(self.deadline)
    }
}

fn role_var(name: &'static str, default: RoleId) -> Result<RoleId, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<i64>()
            .map(RoleId)
            .map_err(|_| ConfigError::InvalidRoleId { var: name }),
        Err(_) => Ok(default),
    }
}

fn parse_transition_policy(raw: &str) -> Result<TransitionPolicy, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "strict" => Ok(TransitionPolicy::Strict),
        "permissive" => Ok(TransitionPolicy::Permissive),
        _ => Err(ConfigError::InvalidReviewPolicy(raw.to_string())),
    }
}

fn parse_resubmission_policy(raw: &str) -> Result<ResubmissionPolicy, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "never" => Ok(ResubmissionPolicy::Never),
        "after_rejection" | "after-rejection" => Ok(ResubmissionPolicy::AfterRejection),
        _ => Err(ConfigError::InvalidResubmission(raw.to_string())),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSigningKey,
    InvalidRoleId { var: &'static str },
    InvalidReviewPolicy(String),
    InvalidResubmission(String),
    InvalidDeadline,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingSigningKey => {
                write!(f, "ONBOARDING_SIGNING_KEY must be set in production")
            }
            ConfigError::InvalidRoleId { var } => write!(f, "{var} must be a valid integer"),
            ConfigError::InvalidReviewPolicy(value) => write!(
                f,
                "ONBOARDING_REVIEW_POLICY must be 'strict' or 'permissive' (found '{value}')"
            ),
            ConfigError::InvalidResubmission(value) => write!(
                f,
                "ONBOARDING_RESUBMISSION must be 'never' or 'after_rejection' (found '{value}')"
            ),
            ConfigError::InvalidDeadline => {
                write!(f, "ONBOARDING_DEADLINE_MS must be a whole number of milliseconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
