//! HMAC-SHA256 Request Signatures
//!
//! The vendor hex-encodes the HMAC digest and then base64-encodes the hex
//! string, so a signature is always 88 characters of base64.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Bytes left unescaped in the signed path. `/` is escaped.
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Offset at which the path search starts, past `http://` or `https://` and
/// the first characters of the host.
const PATH_SEARCH_OFFSET: usize = 10;

/// Sign `content` with `key` and return base64(hex(HMAC-SHA256)).
pub fn hmac_sha256_hex_base64(key: &str, content: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(content.as_bytes());
    let hex_digest = hex::encode(mac.finalize().into_bytes());
    STANDARD.encode(hex_digest)
}

/// Verify a signature produced by [`hmac_sha256_hex_base64`].
pub fn verify_signature(key: &str, content: &str, signature: &str) -> bool {
    let expected = hmac_sha256_hex_base64(key, content);
    // Constant-time comparison
    expected.len() == signature.len()
        && expected
            .as_bytes()
            .iter()
            .zip(signature.as_bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Path portion of a service URL as the gateway sees it.
///
/// For `http`/`https` URLs this is everything from the first `/` at or after
/// byte 10; other inputs are returned unchanged.
pub fn service_path(url: &str) -> &str {
    if !url.starts_with("http") {
        return url;
    }
    url.as_bytes()
        .iter()
        .skip(PATH_SEARCH_OFFSET)
        .position(|&b| b == b'/')
        .map_or(url, |pos| &url[PATH_SEARCH_OFFSET + pos..])
}

/// Percent-encode a path for signing, including its slashes.
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ENCODE_SET).to_string()
}

/// Canonical string signed for `X-Api-Signature`.
pub fn api_sign_string(url: &str, nonce: &str, timestamp: &str) -> String {
    let path = encode_path(service_path(url));
    format!("POST\n{path}\n\nx-api-nonce:{nonce}\nx-api-timestamp:{timestamp}\n")
}

/// Sign a request for the API gateway.
pub fn api_signature(client_secret: &str, url: &str, nonce: &str, timestamp: &str) -> String {
    hmac_sha256_hex_base64(client_secret, &api_sign_string(url, nonce, timestamp))
}

/// Sign the app identity for the K3 platform.
pub fn kd_signature(app_secret: &str, app_id: &str, app_data: &str) -> String {
    hmac_sha256_hex_base64(app_secret, &format!("{app_id}{app_data}"))
}
