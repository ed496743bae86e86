// [apps/gateway/src/bootstrap.rs]
/*!
 * =================================================================
 * APARATO: COMPOSITION ROOT (V1.0 - GATE PIPELINE GOLD)
 * CLASIFICACIÓN: APPLICATION WIRING (ESTRATO L1-APP)
 * RESPONSABILIDAD: ENSAMBLAJE DE TODO APARATO CORE/DOMINIO/INFRA EN UN
 * UNICO `AppState`
 *
 * VISION HIPER-HOLÍSTICA:
 * Este modulo es el unico lugar del Gateway que conoce todos los tipos
 * concretos (`MemoryStore`, `ReqwestTransportExecutor`, los seis fetchers
 * de `live-data`...). Todo lo que vive rio abajo de aqui -- los ocho
 * gates, el pipeline, el estado -- solo conoce traits. Si un backend
 * concreto cambia, este es el unico archivo que se entera.
 * =================================================================
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use novaos_audit_trail::AuditAssembler;
use novaos_cognition::{CompletionRequest, CompletionResponse, ConstitutionalValidator, DeterministicStubProvider, LlmProvider, ProviderChain};
use novaos_crypto_engine::{sha256_hex, EnvelopeEncryption, KeyRing};
use novaos_evidence::{CapabilityProvider, EvidenceBuilder, FreshnessPolicy};
use novaos_gate_strategy::{GateHandler, GatePipeline};
use novaos_kvs::{KeyValueStore, MemoryStore};
use novaos_live_data::{CryptoFetcher, FxFetcher, StockFetcher, TimeFetcher, WeatherFetcher, WebSearcher};
use novaos_models::GateId;
use novaos_rate_limit::{RateLimitKey, TokenBucketConfig, TokenBucketLimiter};
use novaos_secrets_vault::{ConfigHandle, NovaConfig};
use novaos_secure_transport::{ReqwestTransportExecutor, SecureTransport};
use novaos_ssrf_guard::{RateLimitGate as SsrfRateLimitGate, SsrfGuard, SsrfGuardConfig, TokioDnsResolver};
use novaos_token_forge::{NonceStore, TokenForge};

use crate::gates::{CapabilityGate, ConstitutionalGate, IntentGate, LensGate, MemoryGate, ModelGate, ShieldGate, StanceGate};
use crate::state::AppState;

/// Rolling window for the egress/API token bucket (spec S4.8). Only the
/// window width is fixed here; capacity and refill rate come from
/// `NovaConfig` so an operator can retune them without a redeploy of this
/// constant.
const RATE_LIMIT_WINDOW_MS: u64 = 60_000;

/// Wires every aparato into a running `AppState`. Nothing downstream of
/// this function ever constructs a `MemoryStore`, a `reqwest::Client`, or
/// a live-data fetcher directly — they only ever see the traits those
/// concrete types implement.
pub async fn bootstrap() -> anyhow::Result<AppState> {
    let config_handle = ConfigHandle::load()?;
    let config = config_handle.current();

    let kvs: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

    let nonce_store: Arc<dyn NonceStore> = Arc::new(KvsNonceStore { kvs: kvs.clone() });
    let token_forge = Arc::new(TokenForge::new(config.ack_token_secrets.clone(), nonce_store));

    let key_ring = build_key_ring(&config);
    let encryption = EnvelopeEncryption::new(key_ring);
    let snapshot_store = novaos_audit_trail::SnapshotStore::new(encryption, kvs.clone());
    let audit_assembler = Arc::new(AuditAssembler::new(snapshot_store));

    let rate_limiter = Arc::new(TokenBucketLimiter::new(kvs.clone()));
    let ssrf_rate_limiter: Arc<dyn SsrfRateLimitGate> =
        Arc::new(EgressRateLimitGate { limiter: rate_limiter.clone(), config: config.rate_limit.clone() });

    let ssrf_guard_config = SsrfGuardConfig {
        hostname_allowlist: config.ssrf.hostname_allowlist.iter().cloned().collect(),
        hostname_blocklist: config.ssrf.hostname_blocklist.iter().cloned().collect(),
        max_redirects: config.ssrf.max_redirects,
        max_response_bytes: config.ssrf.max_response_bytes,
        ..SsrfGuardConfig::default()
    };
    let ssrf_guard = Arc::new(SsrfGuard::new(ssrf_guard_config, Arc::new(TokioDnsResolver), ssrf_rate_limiter));
    let transport = Arc::new(
        SecureTransport::new(ssrf_guard, Arc::new(ReqwestTransportExecutor::new())).with_source_health(kvs.clone()),
    );

    let capability_providers: Vec<Arc<dyn CapabilityProvider>> = vec![
        Arc::new(StockFetcher::new(transport.clone())),
        Arc::new(CryptoFetcher::new(transport.clone())),
        Arc::new(FxFetcher::new(transport.clone())),
        Arc::new(WeatherFetcher::new(transport.clone())),
        Arc::new(TimeFetcher::new(transport.clone())),
        Arc::new(WebSearcher::new(transport.clone())),
    ];

    let llm_chain = build_provider_chain(&config);
    let chain = Arc::new(ProviderChain::new(llm_chain.clone()));
    let classifier: Arc<dyn LlmProvider> = llm_chain.into_iter().next().unwrap_or_else(|| Arc::new(DeterministicStubProvider));
    let constitutional_validator = ConstitutionalValidator::new(classifier.clone());

    let mut handlers: HashMap<GateId, Arc<dyn GateHandler>> = HashMap::new();
    handlers.insert(GateId::Intent, Arc::new(IntentGate::new(classifier.clone())));
    handlers.insert(GateId::Shield, Arc::new(ShieldGate::new(classifier.clone(), token_forge.clone())));
    handlers.insert(GateId::Lens, Arc::new(LensGate::new()));
    handlers.insert(GateId::Stance, Arc::new(StanceGate::new()));
    handlers.insert(
        GateId::Capability,
        Arc::new(CapabilityGate::new(capability_providers, EvidenceBuilder::new(FreshnessPolicy::default()), Duration::from_millis(2_000))),
    );
    handlers.insert(GateId::Model, Arc::new(ModelGate::new(chain)));
    handlers.insert(GateId::Constitutional, Arc::new(ConstitutionalGate::new(constitutional_validator)));
    handlers.insert(GateId::Memory, Arc::new(MemoryGate::new()));

    let pipeline = Arc::new(GatePipeline::new(handlers, config.gate_timeouts.clone(), config.max_regeneration_attempts));

    Ok(AppState::new(config_handle, kvs, pipeline, audit_assembler))
}

/// Derives a 256-bit key per configured version via `sha256_hex` — the
/// vault hands the app arbitrary-length secret bytes, `KeyRing` requires
/// exactly 32. No secret is ever used as raw key material.
fn build_key_ring(config: &NovaConfig) -> KeyRing {
    if config.audit_encryption_keys.is_empty() {
        tracing::warn!(
            "🔓 [EPHEMERAL_AUDIT_KEY]: NOVA_AUDIT_ENCRYPTION_KEYS is unset; generating a process-lifetime key. \
             Audit snapshots written this run will be unreadable after restart."
        );
        let mut ephemeral = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut ephemeral);
        return KeyRing::new(0, ephemeral);
    }

    let mut versions = config.audit_encryption_keys.clone();
    versions.sort_by_key(|(version, _)| *version);
    let (current_version, current_secret) = versions.last().expect("checked non-empty above").clone();
    let mut ring = KeyRing::new(current_version, derive_key(&current_secret));
    for (version, secret) in &versions {
        ring = ring.with_key(*version, derive_key(secret));
    }
    ring
}

fn derive_key(secret: &[u8]) -> [u8; 32] {
    let digest_hex = sha256_hex(&String::from_utf8_lossy(secret));
    let bytes = hex::decode(digest_hex).expect("sha256_hex always yields valid hex");
    bytes.try_into().expect("a sha256 digest is always 32 bytes")
}

/// Builds the ordered fallback chain named by `NOVA_LLM_PROVIDER_CHAIN`
/// plus the mandatory deterministic tail (spec S4.6: "pipeline completion
/// is guaranteed"). Each named provider reads its own endpoint/key from
/// the environment, so an unconfigured entry is simply unavailable rather
/// than a startup error.
fn build_provider_chain(config: &NovaConfig) -> Vec<Arc<dyn LlmProvider>> {
    let client = reqwest::Client::new();
    let mut providers: Vec<Arc<dyn LlmProvider>> = config
        .llm_provider_chain
        .iter()
        .map(|name| Arc::new(HttpLlmProvider::from_env(name.clone(), client.clone())) as Arc<dyn LlmProvider>)
        .collect();
    providers.push(Arc::new(DeterministicStubProvider));
    providers
}

/// Nonce reservation over the shared KVS (spec S4.3, S6 `ack:nonce:{nonce}`).
/// `set_if_absent` is the one primitive this needs: a nonce is either
/// unseen (reservation succeeds) or already spent (replay, rejected).
struct KvsNonceStore {
    kvs: Arc<dyn KeyValueStore>,
}

#[async_trait]
impl NonceStore for KvsNonceStore {
    async fn reserve(&self, nonce: &str, ttl_ms: u64) -> bool {
        let key = format!("ack:nonce:{nonce}");
        self.kvs.set_if_absent(&key, Vec::new(), Duration::from_millis(ttl_ms)).await
    }
}

/// Adapts the domain-level token bucket to the Guard's minimal rate-limit
/// seam (spec S4.4 step 1). Kept in the app layer per `ssrf-guard`'s own
/// design: the Guard carries no domain-crate dependency, so whoever
/// composes it wires the real limiter in.
struct EgressRateLimitGate {
    limiter: Arc<TokenBucketLimiter>,
    config: novaos_secrets_vault::RateLimitConfig,
}

#[async_trait]
impl SsrfRateLimitGate for EgressRateLimitGate {
    async fn check_and_consume(&self, composite_key: &str) -> bool {
        let bucket_config = TokenBucketConfig {
            max_tokens: self.config.bucket_capacity,
            refill_rate_per_sec: self.config.refill_per_second as f64,
            window_ms: RATE_LIMIT_WINDOW_MS,
        };
        match self.limiter.check_and_consume(&RateLimitKey::ip(composite_key), &bucket_config).await {
            Ok(decision) => decision.allowed,
            Err(error) => {
                tracing::warn!(error = %error, "egress rate limiter store error, failing open");
                true
            }
        }
    }
}

/// Generic HTTP-backed model provider. Speaks a minimal JSON contract
/// (`{system, prompt, temperature, maxTokens}` in, `{content}` out) rather
/// than any one vendor's wire format, since no concrete vendor integration
/// is named anywhere upstream of this crate — a real deployment swaps the
/// endpoint, not the provider type.
struct HttpLlmProvider {
    name: String,
    endpoint: Option<String>,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpLlmProvider {
    fn from_env(name: String, client: reqwest::Client) -> Self {
        let upper = name.to_uppercase();
        let endpoint = std::env::var(format!("NOVA_LLM_ENDPOINT_{upper}")).ok();
        let api_key = std::env::var(format!("NOVA_LLM_API_KEY_{upper}")).ok();
        Self { name, endpoint, api_key, client }
    }
}

#[async_trait]
impl LlmProvider for HttpLlmProvider {
    fn name(&self) -> &str {
        &self.name
    }

    /// Cheap readiness check: a provider with no configured endpoint is
    /// never dialed and never counted as a failure by the chain.
    async fn is_available(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, novaos_cognition::CognitionError> {
        use novaos_cognition::CognitionError;

        let endpoint = self
            .endpoint
            .as_ref()
            .ok_or_else(|| CognitionError::NonSuccessStatus(self.name.clone(), "no endpoint configured".to_string()))?;

        let body = serde_json::json!({
            "system": request.system_prompt,
            "prompt": request.user_prompt,
            "temperature": request.temperature,
            "maxTokens": request.max_tokens,
        });

        let mut http_request = self.client.post(endpoint).json(&body);
        if let Some(api_key) = &self.api_key {
            http_request = http_request.bearer_auth(api_key);
        }

        let response = http_request.send().await.map_err(|error| CognitionError::NonSuccessStatus(self.name.clone(), error.to_string()))?;

        if !response.status().is_success() {
            return Err(CognitionError::NonSuccessStatus(self.name.clone(), response.status().to_string()));
        }

        let parsed: serde_json::Value =
            response.json().await.map_err(|error| CognitionError::NonSuccessStatus(self.name.clone(), error.to_string()))?;

        let content = parsed.get("content").and_then(|v| v.as_str()).unwrap_or_default().to_string();
        if content.trim().is_empty() {
            return Err(CognitionError::EmptyContent(self.name.clone()));
        }

        Ok(CompletionResponse { content, provider_name: self.name.clone() })
    }
}
