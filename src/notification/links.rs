//! Verification link parameters.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Encodes a single named value for use as a link query parameter.
///
/// The verification endpoint decodes the same format, so both sides must
/// agree on the encoder. Deployments that need confidentiality plug in an
/// encrypting implementation.
pub trait LinkEncoder: Send + Sync {
    fn encode(&self, field: &str, value: &str) -> String;
}

/// URL-safe base64 of the JSON object `{"<field>": "<value>"}`
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64LinkEncoder;

impl LinkEncoder for Base64LinkEncoder {
    fn encode(&self, field: &str, value: &str) -> String {
        let mut object = serde_json::Map::new();
        object.insert(field.to_string(), serde_json::Value::String(value.to_string()));
        URL_SAFE_NO_PAD.encode(serde_json::Value::Object(object).to_string())
    }
}

/// Join a site root and a relative path with exactly one slash
pub fn site_url(root: &str, path: &str) -> String {
    format!(
        "{}/{}",
        root.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// `{root}Verification/verify?e=…&i=…`
pub fn verification_link(
    encoder: &dyn LinkEncoder,
    root_url: &str,
    email: &str,
    verification_id: &str,
) -> String {
    format!(
        "{}?e={}&i={}",
        site_url(root_url, "Verification/verify"),
        encoder.encode("email", email),
        encoder.encode("vid", verification_id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_encoder_round_trips_through_json() {
        let encoded = Base64LinkEncoder.encode("email", "ada@example.com");
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));

        let decoded = URL_SAFE_NO_PAD.decode(&encoded).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(value["email"], "ada@example.com");
    }

    #[test]
    fn test_site_url() {
        assert_eq!(site_url("https://example.com/", "dashboard"), "https://example.com/dashboard");
        assert_eq!(site_url("https://example.com", "/dashboard"), "https://example.com/dashboard");
    }

    #[test]
    fn test_verification_link_shape() {
        let link = verification_link(&Base64LinkEncoder, "https://example.com/", "a@b.co", "v1");
        assert!(link.starts_with("https://example.com/Verification/verify?e="));
        assert!(link.contains("&i="));
    }
}
