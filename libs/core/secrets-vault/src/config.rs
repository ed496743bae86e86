// [libs/core/secrets-vault/src/config.rs]
//! `NovaConfig`: the single validated snapshot of everything the gateway and
//! scheduler worker need at startup. Assembled once from the environment;
//! never mutated in place (see [`crate::ConfigHandle`]).

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("environment variable {name} could not be parsed as {expected}: {value}")]
    Invalid { name: &'static str, expected: &'static str, value: String },
    #[error("at least one ack-token secret must be configured")]
    NoAckSecrets,
}

/// Per-gate timeout budget (spec S5: "per-gate timeouts").
#[derive(Debug, Clone)]
pub struct GateTimeouts {
    pub intent_ms: u64,
    pub shield_ms: u64,
    pub lens_ms: u64,
    pub stance_ms: u64,
    pub capability_ms: u64,
    pub model_ms: u64,
    pub constitutional_ms: u64,
    pub memory_ms: u64,
}

impl GateTimeouts {
    pub fn total_ceiling(&self) -> Duration {
        Duration::from_millis(
            self.intent_ms
                + self.shield_ms
                + self.lens_ms
                + self.stance_ms
                + self.capability_ms
                + self.model_ms
                + self.constitutional_ms
                + self.memory_ms,
        )
    }
}

impl Default for GateTimeouts {
    fn default() -> Self {
        Self {
            intent_ms: 800,
            shield_ms: 1_500,
            lens_ms: 4_000,
            stance_ms: 800,
            capability_ms: 500,
            model_ms: 20_000,
            constitutional_ms: 3_000,
            memory_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub bucket_capacity: u32,
    pub refill_per_second: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { bucket_capacity: 30, refill_per_second: 1 }
    }
}

#[derive(Debug, Clone)]
pub struct SsrfConfig {
    pub hostname_allowlist: Vec<String>,
    pub hostname_blocklist: Vec<String>,
    pub max_redirects: u8,
    pub max_response_bytes: usize,
}

impl Default for SsrfConfig {
    fn default() -> Self {
        Self {
            hostname_allowlist: Vec::new(),
            hostname_blocklist: Vec::new(),
            max_redirects: 3,
            max_response_bytes: 2 * 1024 * 1024,
        }
    }
}

/// One enumerated retention rule (spec S4.10 `retention_enforcement`, S6
/// "retention (days per category)"): every KVS key matching `pattern`
/// older than `retention_days` is swept, optionally archived first.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    pub pattern: String,
    pub retention_days: u32,
    pub archive: bool,
}

#[derive(Debug, Clone)]
pub struct RetentionConfig {
    pub policies: Vec<RetentionPolicy>,
}

impl Default for RetentionConfig {
    /// Mirrors the TTLs already assigned at write time by `sword` (goals
    /// 365d, quests/steps 180d, sparks 7d) and the audit trail's default
    /// snapshot TTL (90d) — this policy list is what makes those numbers
    /// enforceable even against an entry some caller wrote with no TTL at
    /// all, and it is the one place an operator can retune them without
    /// touching any of those crates.
    fn default() -> Self {
        Self {
            policies: vec![
                RetentionPolicy { pattern: "sword:goal:*".to_string(), retention_days: 365, archive: false },
                RetentionPolicy { pattern: "sword:quest:*".to_string(), retention_days: 180, archive: false },
                RetentionPolicy { pattern: "sword:step:*".to_string(), retention_days: 180, archive: false },
                RetentionPolicy { pattern: "sword:spark:*".to_string(), retention_days: 7, archive: false },
                RetentionPolicy { pattern: "audit:response:*".to_string(), retention_days: 90, archive: true },
                RetentionPolicy { pattern: "audit:snapshot:*".to_string(), retention_days: 90, archive: true },
                RetentionPolicy { pattern: "notifications:queue:*".to_string(), retention_days: 7, archive: false },
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct NovaConfig {
    pub service_name: String,
    pub is_production: bool,
    pub gate_timeouts: GateTimeouts,
    /// Regeneration loop cap (spec S4.6: capped at 2).
    pub max_regeneration_attempts: u8,
    /// Newest-first; index 0 signs new ack tokens, all are tried on verify.
    pub ack_token_secrets: Vec<Vec<u8>>,
    /// Newest-first envelope-encryption key versions for the audit trail.
    pub audit_encryption_keys: Vec<(u32, Vec<u8>)>,
    pub rate_limit: RateLimitConfig,
    pub ssrf: SsrfConfig,
    /// Ordered provider fallback chain for the Model gate (spec S4.5).
    pub llm_provider_chain: Vec<String>,
    pub retention: RetentionConfig,
}

impl NovaConfig {
    /// Reads and validates every field from the process environment.
    /// Deployments load a `.env` file (via `dotenvy`) before calling this,
    /// same as the teacher's bootstrap does for the orchestrator.
    pub fn from_env() -> Result<Self, ConfigError> {
        let service_name = std::env::var("NOVA_SERVICE_NAME").unwrap_or_else(|_| "novaos-gateway".to_string());
        let is_production = std::env::var("NOVA_ENV").map(|v| v == "production").unwrap_or(false);

        let ack_token_secrets = parse_secret_list("NOVA_ACK_TOKEN_SECRETS")?;
        if ack_token_secrets.is_empty() {
            return Err(ConfigError::NoAckSecrets);
        }

        let audit_encryption_keys = parse_versioned_keys("NOVA_AUDIT_ENCRYPTION_KEYS")?;

        let llm_provider_chain = std::env::var("NOVA_LLM_PROVIDER_CHAIN")
            .unwrap_or_else(|_| "primary,secondary,tertiary".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_regeneration_attempts = std::env::var("NOVA_MAX_REGENERATION_ATTEMPTS")
            .ok()
            .map(|raw| parse_u8("NOVA_MAX_REGENERATION_ATTEMPTS", &raw))
            .transpose()?
            .unwrap_or(2)
            .min(2);

        Ok(Self {
            service_name,
            is_production,
            gate_timeouts: GateTimeouts::default(),
            max_regeneration_attempts,
            ack_token_secrets,
            audit_encryption_keys,
            rate_limit: RateLimitConfig::default(),
            ssrf: SsrfConfig::default(),
            llm_provider_chain,
            retention: RetentionConfig::default(),
        })
    }
}

fn parse_secret_list(var_name: &'static str) -> Result<Vec<Vec<u8>>, ConfigError> {
    match std::env::var(var_name) {
        Ok(raw) => Ok(raw.split(',').filter(|s| !s.is_empty()).map(|s| s.as_bytes().to_vec()).collect()),
        Err(_) => Ok(Vec::new()),
    }
}

fn parse_versioned_keys(var_name: &'static str) -> Result<Vec<(u32, Vec<u8>)>, ConfigError> {
    let raw = match std::env::var(var_name) {
        Ok(raw) => raw,
        Err(_) => return Ok(Vec::new()),
    };
    raw.split(',')
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (version_str, secret) = entry.split_once(':').ok_or_else(|| ConfigError::Invalid {
                name: var_name,
                expected: "version:secret pairs",
                value: entry.to_string(),
            })?;
            let version: u32 = version_str.parse().map_err(|_| ConfigError::Invalid {
                name: var_name,
                expected: "u32 version prefix",
                value: entry.to_string(),
            })?;
            Ok((version, secret.as_bytes().to_vec()))
        })
        .collect()
}

fn parse_u8(name: &'static str, raw: &str) -> Result<u8, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid { name, expected: "u8", value: raw.to_string() })
}
