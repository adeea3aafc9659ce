//! OAuth 1.0a signer
//!
//! Builds per-request OAuth parameters from credentials and computes the
//! HMAC-SHA1 `Authorization` header for a method + URL.

use super::types::{Credentials, OAuthParameter, SignedRequestParameters};
use crate::error::{Error, Result};
use crate::types::Method;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::RngCore;
use sha1::Sha1;
use std::fmt;
use std::sync::Arc;
use url::{Position, Url};

/// RFC 3986 unreserved characters stay as-is, everything else is encoded
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// Percent-encode a string according to RFC 3986
pub fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

// ============================================================================
// Nonce / Timestamp Sources
// ============================================================================

/// Supplies the timestamp and nonce stamped on each signature
pub trait NonceSource: Send + Sync + fmt::Debug {
    /// Seconds since the Unix epoch
    fn timestamp(&self) -> i64;

    /// Single-use random token
    fn nonce(&self) -> String;
}

/// Wall clock timestamp and random 128-bit hex nonce
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNonceSource;

impl NonceSource for SystemNonceSource {
    fn timestamp(&self) -> i64 {
        Utc::now().timestamp()
    }

    fn nonce(&self) -> String {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Constant timestamp and nonce, for reproducible signatures
#[derive(Debug, Clone)]
pub struct FixedNonceSource {
    timestamp: i64,
    nonce: String,
}

impl FixedNonceSource {
    /// Create a fixed source
    pub fn new(timestamp: i64, nonce: impl Into<String>) -> Self {
        Self {
            timestamp,
            nonce: nonce.into(),
        }
    }
}

impl NonceSource for FixedNonceSource {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn nonce(&self) -> String {
        self.nonce.clone()
    }
}

// ============================================================================
// Signer
// ============================================================================

/// Signs requests with the credentials it references
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Arc<Credentials>,
    nonce_source: Arc<dyn NonceSource>,
}

impl Signer {
    /// Create a signer using the system clock and random nonces
    pub fn new(credentials: Arc<Credentials>) -> Self {
        Self::with_nonce_source(credentials, Arc::new(SystemNonceSource))
    }

    /// Create a signer with a custom timestamp/nonce source
    pub fn with_nonce_source(
        credentials: Arc<Credentials>,
        nonce_source: Arc<dyn NonceSource>,
    ) -> Self {
        Self {
            credentials,
            nonce_source,
        }
    }

    /// Credentials this signer refers to
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Build the OAuth parameters for one request.
    ///
    /// Consumer and access entries are only emitted when both halves of the
    /// pair are set. Without an access token an empty, secret-flagged
    /// `oauth_token` is still added so the parameter shape stays the same.
    pub fn generate_parameters(&self) -> SignedRequestParameters {
        let creds = &self.credentials;
        let mut params = SignedRequestParameters::new();

        if creds.has_consumer() {
            params.push(OAuthParameter::public(
                "oauth_consumer_key",
                &creds.consumer_key,
            ));
            params.push(OAuthParameter::secret(
                "oauth_consumer_secret",
                &creds.consumer_secret,
            ));
        }

        if creds.has_access_token() {
            params.push(OAuthParameter::public("oauth_token", &creds.access_token));
            params.push(OAuthParameter::secret(
                "oauth_token_secret",
                &creds.access_token_secret,
            ));
        } else {
            params.push(OAuthParameter::secret("oauth_token", ""));
        }

        if let Some(verifier) = creds.verifier.as_deref().filter(|v| !v.is_empty()) {
            params.push(OAuthParameter::public("oauth_verifier", verifier));
        }

        params
    }

    /// Compute the `Authorization` header value for a request
    pub fn authorization_header(
        &self,
        method: Method,
        url: &str,
        params: &SignedRequestParameters,
    ) -> Result<String> {
        let parsed = Url::parse(url)?;
        let timestamp = self.nonce_source.timestamp().to_string();
        let nonce = self.nonce_source.nonce();

        let protocol = [
            ("oauth_nonce", nonce.as_str()),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_version", OAUTH_VERSION),
        ];

        let mut signed: Vec<(String, String)> = params
            .signed()
            .map(|p| (p.name.clone(), p.value.clone()))
            .collect();
        signed.extend(protocol.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())));
        signed.extend(parsed.query_pairs().into_owned());

        let base_string = signature_base_string(method, &parsed, &signed);
        let signing_key = format!(
            "{}&{}",
            percent_encode(params.secret_value("oauth_consumer_secret")),
            percent_encode(params.secret_value("oauth_token_secret"))
        );
        let signature = hmac_sha1(&signing_key, &base_string)?;

        let mut header: Vec<(String, String)> = params
            .transmitted()
            .map(|p| (p.name.clone(), p.value.clone()))
            .collect();
        header.extend(protocol.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())));
        header.push(("oauth_signature".to_string(), signature));
        header.sort();

        let header = header
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {header}"))
    }
}

/// Build the signature base string: `METHOD&base_url&normalized_params`
pub(crate) fn signature_base_string(
    method: Method,
    url: &Url,
    params: &[(String, String)],
) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.as_str(),
        percent_encode(&url[..Position::AfterPath]),
        percent_encode(&param_string)
    )
}

/// Compute HMAC-SHA1 and return the base64-encoded digest
fn hmac_sha1(key: &str, data: &str) -> Result<String> {
    type HmacSha1 = Hmac<Sha1>;

    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).map_err(|e| Error::signing(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}
