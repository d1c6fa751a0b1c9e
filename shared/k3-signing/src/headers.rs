//! Signed Header Assembly
//!
//! Produces the complete header set for one K3 Cloud web API call: static
//! client headers, the API-gateway block (`X-Api-*`) and the platform block
//! (`X-KD-*`).

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::Zeroizing;

use crate::error::Result;
use crate::secret::GatewayCredentials;
use crate::signature;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const USER_AGENT: &str = "User-Agent";
pub const ACCEPT_CHARSET: &str = "Accept-Charset";
pub const X_API_CLIENT_ID: &str = "X-Api-ClientID";
pub const X_API_AUTH_VERSION: &str = "X-Api-Auth-Version";
pub const X_API_TIMESTAMP: &str = "X-Api-Timestamp";
pub const X_API_NONCE: &str = "X-Api-Nonce";
pub const X_API_SIGN_HEADERS: &str = "X-Api-SignHeaders";
pub const X_API_SIGNATURE: &str = "X-Api-Signature";
pub const X_KD_APP_KEY: &str = "X-KD-AppKey";
pub const X_KD_APP_DATA: &str = "X-KD-AppData";
pub const X_KD_SIGNATURE: &str = "X-KD-Signature";

/// Gateway auth scheme version.
pub const AUTH_VERSION: &str = "2.0";

/// Headers covered by the gateway signature, in the order the gateway expects.
pub const SIGN_HEADERS: &str = "x-api-timestamp,x-api-nonce";

/// User agent of the vendor's Python SDK.
pub const DEFAULT_USER_AGENT: &str =
    "Kingdee/Python WebApi SDK 7.3 (compatible; MSIE 6.0; Windows NT 5.1;SV1)";

/// Account and user an app acts as.
#[derive(Clone)]
pub struct AppIdentity {
    /// Application id, `<client_id>_<encoded_secret>`.
    pub app_id: String,
    /// Application secret, the HMAC key for `X-KD-Signature`.
    pub app_secret: Zeroizing<String>,
    /// Data center (account set) id.
    pub acct_id: String,
    /// Integration user name.
    pub user_name: String,
    /// Locale id (2052 = zh-CN).
    pub lcid: u32,
    /// Organisation number (0 = default).
    pub org_num: u64,
}

impl AppIdentity {
    /// Comma-joined identity string carried in `X-KD-AppData`.
    pub fn app_data(&self) -> String {
        format!(
            "{},{},{},{}",
            self.acct_id, self.user_name, self.lcid, self.org_num
        )
    }
}

impl fmt::Debug for AppIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppIdentity")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("acct_id", &self.acct_id)
            .field("user_name", &self.user_name)
            .field("lcid", &self.lcid)
            .field("org_num", &self.org_num)
            .finish()
    }
}

/// Ordered list of header name/value pairs for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    entries: Vec<(&'static str, String)>,
}

impl SignedHeaders {
    /// Look up a header value, ignoring name case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Signs requests on behalf of one app identity.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    identity: AppIdentity,
    gateway: GatewayCredentials,
    user_agent: String,
}

impl RequestSigner {
    /// Create a signer, decoding the gateway credentials from the app id.
    pub fn new(identity: AppIdentity, user_agent: impl Into<String>) -> Result<Self> {
        let gateway = GatewayCredentials::from_app_id(&identity.app_id)?;
        Ok(Self {
            identity,
            gateway,
            user_agent: user_agent.into(),
        })
    }

    pub const fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    pub const fn gateway(&self) -> &GatewayCredentials {
        &self.gateway
    }

    /// Sign a call to `url` at Unix time `timestamp` (seconds).
    ///
    /// The nonce is the timestamp itself, as in the vendor SDK.
    pub fn sign(&self, url: &str, timestamp: i64) -> SignedHeaders {
        let ts = timestamp.to_string();
        self.sign_with_nonce(url, &ts, &ts)
    }

    /// Sign a call with an explicit timestamp and nonce.
    pub fn sign_with_nonce(&self, url: &str, timestamp: &str, nonce: &str) -> SignedHeaders {
        let app_data = self.identity.app_data();

        let api_signature =
            signature::api_signature(&self.gateway.client_secret, url, nonce, timestamp);
        let kd_signature =
            signature::kd_signature(&self.identity.app_secret, &self.identity.app_id, &app_data);

        let entries = vec![
            (CONTENT_TYPE, "application/json".to_string()),
            (USER_AGENT, self.user_agent.clone()),
            (ACCEPT_CHARSET, "utf-8".to_string()),
            // API gateway
            (X_API_CLIENT_ID, self.gateway.client_id.clone()),
            (X_API_AUTH_VERSION, AUTH_VERSION.to_string()),
            (X_API_TIMESTAMP, timestamp.to_string()),
            (X_API_NONCE, nonce.to_string()),
            (X_API_SIGN_HEADERS, SIGN_HEADERS.to_string()),
            (X_API_SIGNATURE, api_signature),
            // K3 platform
            (X_KD_APP_KEY, self.identity.app_id.clone()),
            (X_KD_APP_DATA, STANDARD.encode(app_data.as_bytes())),
            (X_KD_SIGNATURE, kd_signature),
        ];

        SignedHeaders { entries }
    }
}
