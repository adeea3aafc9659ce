//! Auth types
//!
//! Credentials held by the caller and the per-request OAuth parameter set
//! derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// OAuth 1.0a credentials
///
/// Consumer key/secret identify the application; access token/secret
/// identify the user. Any pair may be left empty.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Consumer (application) key
    #[serde(default)]
    pub consumer_key: String,
    /// Consumer (application) secret
    #[serde(default)]
    pub consumer_secret: String,
    /// User access token
    #[serde(default)]
    pub access_token: String,
    /// User access token secret
    #[serde(default)]
    pub access_token_secret: String,
    /// PIN / verifier obtained during the authorization dance
    #[serde(default)]
    pub verifier: Option<String>,
    /// Request token key awaiting authorization
    #[serde(default)]
    pub authorization_key: Option<String>,
    /// Request token secret awaiting authorization
    #[serde(default)]
    pub authorization_secret: Option<String>,
}

impl Credentials {
    /// Create credentials for both the consumer and the user
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            access_token: access_token.into(),
            access_token_secret: access_token_secret.into(),
            ..Default::default()
        }
    }

    /// Create application-only credentials (no user token)
    pub fn consumer_only(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            ..Default::default()
        }
    }

    /// Set the verifier
    #[must_use]
    pub fn with_verifier(mut self, verifier: impl Into<String>) -> Self {
        self.verifier = Some(verifier.into());
        self
    }

    /// Both consumer key and secret are populated
    pub fn has_consumer(&self) -> bool {
        !self.consumer_key.is_empty() && !self.consumer_secret.is_empty()
    }

    /// Both access token and secret are populated
    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty() && !self.access_token_secret.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .field("access_token_secret", &"<redacted>")
            .field("has_verifier", &self.verifier.is_some())
            .finish_non_exhaustive()
    }
}

/// One OAuth parameter and where it may appear
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthParameter {
    /// Parameter name (e.g. `oauth_consumer_key`)
    pub name: String,
    /// Raw, unencoded value
    pub value: String,
    /// Part of the signature base string
    pub in_signature: bool,
    /// Sent in the `Authorization` header
    pub in_request: bool,
    /// Only ever used to build the signing key
    pub secret: bool,
}

impl OAuthParameter {
    /// Create a parameter with explicit flags
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        in_signature: bool,
        in_request: bool,
        secret: bool,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            in_signature,
            in_request,
            secret,
        }
    }

    /// Signed and transmitted
    pub fn public(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, value, true, true, false)
    }

    /// Signing-key material, never transmitted
    pub fn secret(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, value, false, false, true)
    }
}

/// Ordered parameter set built fresh for each request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignedRequestParameters {
    params: Vec<OAuthParameter>,
}

impl SignedRequestParameters {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter
    pub fn push(&mut self, param: OAuthParameter) {
        self.params.push(param);
    }

    /// All parameters in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &OAuthParameter> {
        self.params.iter()
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if no parameters are present
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Look up a parameter by name
    pub fn get(&self, name: &str) -> Option<&OAuthParameter> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Parameters that contribute to the signature base string
    pub fn signed(&self) -> impl Iterator<Item = &OAuthParameter> {
        self.params.iter().filter(|p| p.in_signature && !p.secret)
    }

    /// Parameters that may be sent with the request
    pub fn transmitted(&self) -> impl Iterator<Item = &OAuthParameter> {
        self.params.iter().filter(|p| p.in_request && !p.secret)
    }

    /// Value of a secret-flagged parameter, empty when absent
    pub fn secret_value(&self, name: &str) -> &str {
        self.params
            .iter()
            .find(|p| p.secret && p.name == name)
            .map_or("", |p| p.value.as_str())
    }
}
