//! Gateway Secret Decoding
//!
//! An app id of the form `<client_id>_<encoded_secret>` carries the API-gateway
//! credentials. The encoded half is base64-decoded, XORed against a keystream
//! derived from a fixed code pattern, then base64-encoded again. The resulting
//! string is the HMAC key for `X-Api-Signature`.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::Rng;
use zeroize::Zeroizing;

use crate::error::{Result, SigningError};

/// Length of an encoded client secret, in characters.
pub const ENCODED_SECRET_LEN: usize = 32;

/// Literal segments of the keystream code. A random digit follows each one.
const CODE_SEGMENTS: [&str; 4] = ["0054s397", "p6234378", "o09pn7q3", "r5qropr7"];

/// Segment length plus its trailing digit.
const SEGMENT_STRIDE: usize = 9;

/// Characters taken from each stride when deriving the keystream.
const SEGMENT_TAKE: usize = 8;

/// Rotate ASCII letters by 13 places, leaving everything else untouched.
pub fn rot13(input: &str) -> String {
    input
        .chars()
        .map(|ch| match ch {
            'a'..='z' => rotate(ch, b'a'),
            'A'..='Z' => rotate(ch, b'A'),
            _ => ch,
        })
        .collect()
}

fn rotate(ch: char, base: u8) -> char {
    let offset = (ch as u8 - base + 13) % 26;
    char::from(base + offset)
}

/// Build the keystream code: each fixed segment followed by one digit of a
/// random number in `1000..=9999`.
pub fn generate_code() -> String {
    let digits = rand::thread_rng().gen_range(1000..=9999).to_string();
    CODE_SEGMENTS
        .iter()
        .zip(digits.chars())
        .map(|(segment, digit)| format!("{segment}{digit}"))
        .collect()
}

/// Derive keystream bytes from a generated code.
///
/// Takes the first eight characters of each nine-character stride and rotates
/// the result. Input shorter than a full code yields a shorter keystream.
pub fn keystream_from_code(code: &str) -> Vec<u8> {
    let chars: Vec<char> = code.chars().collect();
    let gene: String = (0..CODE_SEGMENTS.len())
        .filter_map(|i| {
            let start = i * SEGMENT_STRIDE;
            let end = (start + SEGMENT_TAKE).min(chars.len());
            chars.get(start..end)
        })
        .flatten()
        .collect();
    rot13(&gene).into_bytes()
}

/// Keystream for the current call.
pub fn keystream() -> Vec<u8> {
    keystream_from_code(&generate_code())
}

/// XOR `data` byte-by-byte against the keystream.
pub fn xor_keystream(data: &[u8]) -> Result<Vec<u8>> {
    let key = keystream();
    if data.len() > key.len() {
        return Err(SigningError::KeystreamTooShort {
            keystream: key.len(),
            data: data.len(),
        });
    }
    Ok(data.iter().zip(&key).map(|(d, k)| d ^ k).collect())
}

/// Decode the encoded half of an app id into the gateway HMAC key.
pub fn decode_app_secret(encoded: &str) -> Result<Zeroizing<String>> {
    let len = encoded.chars().count();
    if len != ENCODED_SECRET_LEN {
        return Err(SigningError::InvalidSecretLength(len));
    }

    let raw = Zeroizing::new(STANDARD.decode(encoded)?);
    let mixed = Zeroizing::new(xor_keystream(&raw)?);
    Ok(Zeroizing::new(STANDARD.encode(mixed.as_slice())))
}

/// API-gateway credentials recovered from an app id.
#[derive(Clone, Default)]
pub struct GatewayCredentials {
    /// Value of `X-Api-ClientID`.
    pub client_id: String,
    /// HMAC key for `X-Api-Signature`.
    pub client_secret: Zeroizing<String>,
}

impl GatewayCredentials {
    /// Split `app_id` on `_` and decode the secret half.
    ///
    /// An app id that does not split into exactly two parts yields empty
    /// credentials, and so does a secret of the wrong length; the gateway then
    /// receives a signature keyed by the empty string. Malformed base64 in a
    /// correctly sized secret is an error.
    pub fn from_app_id(app_id: &str) -> Result<Self> {
        let parts: Vec<&str> = app_id.split('_').collect();
        let [client_id, encoded] = parts.as_slice() else {
            return Ok(Self::default());
        };

        let client_secret = match decode_app_secret(encoded) {
            Ok(secret) => secret,
            Err(SigningError::InvalidSecretLength(_)) => Zeroizing::new(String::new()),
            Err(e) => return Err(e),
        };

        Ok(Self {
            client_id: (*client_id).to_string(),
            client_secret,
        })
    }

    /// Whether a gateway secret was recovered.
    pub fn has_secret(&self) -> bool {
        !self.client_secret.is_empty()
    }
}

impl fmt::Debug for GatewayCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
