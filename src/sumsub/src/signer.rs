use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use sha2::Sha256;

use crate::SumsubError;

type HmacSha256 = Hmac<Sha256>;

pub const APP_TOKEN_HEADER: &str = "X-App-Token";
pub const ACCESS_TS_HEADER: &str = "X-App-Access-Ts";
pub const ACCESS_SIG_HEADER: &str = "X-App-Access-Sig";

/// A request descriptor bound to the signature computed over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    method: String,
    body: Vec<u8>,
    timestamp: u64,
    signature: String,
}

impl SignedRequest {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }
}

/// Signs provider requests with the account's app token and secret.
///
/// The provider recomputes the signature over
/// `timestamp || METHOD || path_and_query || body`, so the byte layout here
/// must not change.
#[derive(Clone)]
pub struct RequestSigner {
    app_token: String,
    secret: String,
}

impl RequestSigner {
    pub fn new(
        app_token: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, SumsubError> {
        let app_token = app_token.into();
        let secret = secret.into();
        if app_token.trim().is_empty() {
            return Err(SumsubError::MissingCredential("provider_key"));
        }
        if secret.trim().is_empty() {
            return Err(SumsubError::MissingCredential("provider_secret"));
        }
        Ok(Self { app_token, secret })
    }

    pub fn sign(
        &self,
        method: &str,
        path_and_query: &str,
        body: Option<&[u8]>,
        timestamp: u64,
    ) -> Result<SignedRequest, SumsubError> {
        let method = method.to_ascii_uppercase();
        let body = body.unwrap_or_default().to_vec();

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| SumsubError::MissingCredential("provider_secret"))?;
        mac.update(&canonical_bytes(timestamp, &method, path_and_query, &body));
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(SignedRequest {
            method,
            body,
            timestamp,
            signature,
        })
    }

    pub fn sign_now(
        &self,
        method: &str,
        path_and_query: &str,
        body: Option<&[u8]>,
    ) -> Result<SignedRequest, SumsubError> {
        let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        self.sign(method, path_and_query, body, timestamp)
    }

    pub fn headers(&self, request: &SignedRequest) -> Result<HeaderMap, SumsubError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if !request.body.is_empty() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        headers.insert(APP_TOKEN_HEADER, HeaderValue::from_str(&self.app_token)?);
        headers.insert(
            ACCESS_TS_HEADER,
            HeaderValue::from_str(&request.timestamp.to_string())?,
        );
        headers.insert(ACCESS_SIG_HEADER, HeaderValue::from_str(&request.signature)?);
        Ok(headers)
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner").finish_non_exhaustive()
    }
}

fn canonical_bytes(timestamp: u64, method: &str, path_and_query: &str, body: &[u8]) -> Vec<u8> {
    let timestamp = timestamp.to_string();
    let mut bytes =
        Vec::with_capacity(timestamp.len() + method.len() + path_and_query.len() + body.len());
    bytes.extend_from_slice(timestamp.as_bytes());
    bytes.extend_from_slice(method.as_bytes());
    bytes.extend_from_slice(path_and_query.as_bytes());
    bytes.extend_from_slice(body);
    bytes
}
