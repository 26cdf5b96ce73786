// ============================================================================
// Tenant API - Webhook Signature Verification
// File: crates/tenant-api/src/security/webhook_signature.rs
// ============================================================================

use std::collections::HashMap;

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

use tenant_core::domain::BillingProvider;
use tenant_core::error::DomainError;
use tenant_shared::config::BillingSettings;

type HmacSha256 = Hmac<Sha256>;

const DEFAULT_SIGNATURE_HEADER: &str = "x-webhook-signature";

#[derive(Debug, Clone)]
struct ProviderKey {
    secret: Option<String>,
    header: String,
}

/// HMAC-SHA256 over the raw request body, hex encoded in a per-provider
/// header. Providers without a secret are rejected unless unsigned
/// webhooks are explicitly allowed.
#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    providers: HashMap<BillingProvider, ProviderKey>,
    allow_unsigned: bool,
}

impl WebhookVerifier {
    pub fn from_settings(settings: &BillingSettings) -> Self {
        let mut providers = HashMap::new();
        for (name, provider_settings) in &settings.providers {
            match name.parse::<BillingProvider>() {
                Ok(BillingProvider::None) | Err(_) => {
                    warn!("Ignoring webhook settings for unknown provider: {}", name);
                }
                Ok(provider) => {
                    let header = if provider_settings.signature_header.trim().is_empty() {
                        DEFAULT_SIGNATURE_HEADER.to_string()
                    } else {
                        provider_settings.signature_header.to_ascii_lowercase()
                    };
                    let secret = provider_settings
                        .secret
                        .clone()
                        .filter(|secret| !secret.is_empty());
                    providers.insert(provider, ProviderKey { secret, header });
                }
            }
        }

        if settings.allow_unsigned_webhooks {
            warn!("Unsigned webhooks are accepted for providers without a secret. Do not use in production.");
        }

        Self {
            providers,
            allow_unsigned: settings.allow_unsigned_webhooks,
        }
    }

    pub fn verify(&self, provider: BillingProvider, headers: &HeaderMap, body: &[u8]) -> Result<(), DomainError> {
        let key = self.providers.get(&provider);

        let Some(secret) = key.and_then(|k| k.secret.as_deref()) else {
            if self.allow_unsigned {
                warn!(provider = provider.as_str(), "Processing unsigned webhook (no secret configured)");
                return Ok(());
            }
            return Err(DomainError::WebhookVerificationFailed(format!(
                "No webhook secret configured for {}",
                provider
            )));
        };

        let header = key.map_or(DEFAULT_SIGNATURE_HEADER, |k| k.header.as_str());
        let signature = headers
            .get(header)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| DomainError::WebhookVerificationFailed(format!("Missing {} header", header)))?;

        let signature = hex::decode(signature.trim())
            .map_err(|_| DomainError::WebhookVerificationFailed("Signature is not valid hex".to_string()))?;

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| DomainError::InternalError(format!("HMAC error: {}", e)))?;
        mac.update(body);

        mac.verify_slice(&signature).map_err(|_| {
            warn!(provider = provider.as_str(), "Invalid webhook signature");
            DomainError::WebhookVerificationFailed("Invalid signature".to_string())
        })?;

        debug!(provider = provider.as_str(), "Webhook signature verified");
        Ok(())
    }

    /// Hex signature a provider would send for `body`.
    pub fn sign(secret: &str, body: &[u8]) -> Result<String, DomainError> {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| DomainError::InternalError(format!("HMAC error: {}", e)))?;
        mac.update(body);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use tenant_shared::config::WebhookProviderSettings;

    const BODY: &[u8] = br#"{"type":"payment.failed","data":{}}"#;

    fn settings(secret: Option<&str>, allow_unsigned: bool) -> BillingSettings {
        BillingSettings {
            allow_unsigned_webhooks: allow_unsigned,
            providers: HashMap::from([(
                "paddle".to_string(),
                WebhookProviderSettings {
                    secret: secret.map(str::to_string),
                    signature_header: "Paddle-Signature".to_string(),
                },
            )]),
            product_plans: HashMap::new(),
        }
    }

    fn signed(signature: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("paddle-signature", HeaderValue::from_str(signature).unwrap());
        headers
    }

    #[test]
    fn valid_signature_passes() {
        let verifier = WebhookVerifier::from_settings(&settings(Some("whsec"), false));
        let signature = WebhookVerifier::sign("whsec", BODY).unwrap();
        assert!(verifier.verify(BillingProvider::Paddle, &signed(&signature), BODY).is_ok());
    }

    #[test]
    fn tampered_body_fails() {
        let verifier = WebhookVerifier::from_settings(&settings(Some("whsec"), false));
        let signature = WebhookVerifier::sign("whsec", BODY).unwrap();
        let err = verifier
            .verify(BillingProvider::Paddle, &signed(&signature), b"{}")
            .unwrap_err();
        assert!(matches!(err, DomainError::WebhookVerificationFailed(_)));
    }

    #[test]
    fn missing_header_fails() {
        let verifier = WebhookVerifier::from_settings(&settings(Some("whsec"), false));
        assert!(verifier.verify(BillingProvider::Paddle, &HeaderMap::new(), BODY).is_err());
    }

    #[test]
    fn missing_secret_fails_closed() {
        let verifier = WebhookVerifier::from_settings(&settings(None, false));
        assert!(verifier.verify(BillingProvider::Paddle, &HeaderMap::new(), BODY).is_err());
        assert!(verifier
            .verify(BillingProvider::LemonSqueezy, &HeaderMap::new(), BODY)
            .is_err());
    }

    #[test]
    fn unsigned_mode_is_opt_in() {
        let verifier = WebhookVerifier::from_settings(&settings(None, true));
        assert!(verifier.verify(BillingProvider::Paddle, &HeaderMap::new(), BODY).is_ok());
    }

    #[test]
    fn configured_secret_is_enforced_even_in_unsigned_mode() {
        let verifier = WebhookVerifier::from_settings(&settings(Some("whsec"), true));
        assert!(verifier.verify(BillingProvider::Paddle, &signed("deadbeef"), BODY).is_err());
    }
}
