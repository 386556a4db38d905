use chrono::Utc;
use hmac::{ Hmac, Mac };
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "X-Slack-Request-Timestamp";
pub const SIGNATURE_HEADER: &str = "X-Slack-Signature";

/// Requests whose timestamp differs from the local clock by more than this are replays.
pub const MAX_TIMESTAMP_SKEW_SECS: i64 = 60 * 5;

const VERSION: &str = "v0";

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("invalid signing secret: {0}")]
    InvalidSecret(String),
}

/// Outcome of checking one inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Valid,
    MissingTimestamp,
    MissingSignature,
    MalformedTimestamp,
    Stale { skew: i64 },
    SignatureMismatch,
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid)
    }
}

/// Checks Slack's `v0` request signatures.
#[derive(Clone)]
pub struct SignatureVerifier {
    mac: HmacSha256,
}

impl SignatureVerifier {
    pub fn new(signing_secret: &str) -> Result<Self, SignatureError> {
        if signing_secret.is_empty() {
            return Err(SignatureError::InvalidSecret("must not be empty".to_string()));
        }
        let mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
            .map_err(|e| SignatureError::InvalidSecret(e.to_string()))?;
        Ok(Self { mac })
    }

    fn base_mac(&self, timestamp: &str, body: &[u8]) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(body);
        mac
    }

    /// Header value Slack would send for this body, e.g. `v0=a2114d57...`.
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> String {
        let digest = self.base_mac(timestamp, body).finalize().into_bytes();
        format!("{}={}", VERSION, hex::encode(digest))
    }

    pub fn verify(
        &self,
        body: &[u8],
        timestamp: Option<&str>,
        signature: Option<&str>
    ) -> Verification {
        self.verify_at(body, timestamp, signature, Utc::now().timestamp())
    }

    pub fn verify_at(
        &self,
        body: &[u8],
        timestamp: Option<&str>,
        signature: Option<&str>,
        now: i64
    ) -> Verification {
        let Some(timestamp) = timestamp else {
            return Verification::MissingTimestamp;
        };
        let Some(signature) = signature else {
            return Verification::MissingSignature;
        };
        let Ok(ts) = timestamp.trim().parse::<i64>() else {
            return Verification::MalformedTimestamp;
        };

        let skew = now.saturating_sub(ts).saturating_abs();
        if skew > MAX_TIMESTAMP_SKEW_SECS {
            return Verification::Stale { skew };
        }

        let provided = match signature
            .strip_prefix(VERSION)
            .and_then(|s| s.strip_prefix('='))
            .map(hex::decode)
        {
            Some(Ok(bytes)) => bytes,
            _ => return Verification::SignatureMismatch,
        };

        match self.base_mac(timestamp, body).verify_slice(&provided) {
            Ok(()) => Verification::Valid,
            Err(_) => Verification::SignatureMismatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const BODY: &[u8] = br#"{"type":"event_callback","event":{"type":"app_mention","user":"U1","text":"hello"}}"#;
    const NOW: i64 = 1_531_420_618;

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(SECRET).unwrap()
    }

    #[test]
    fn matches_slack_documented_example() {
        let body = b"token=xyzz0WbapA4vBCDEFasx0q6G&team_id=T1DC2JH3J&team_domain=testteamnow&channel_id=G8PSS9T3V&channel_name=foobar&user_id=U2CERLKJA&user_name=roadrunner&command=%2Fwebhook-collect&text=&response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2FT1DC2JH3J%2F397700885554%2F96rGlfmibIGlgcZRskXaIFfN&trigger_id=398738663015.47445629121.803a0bc887a14d10d2c447fce8b6703c";
        let signature = "v0=a2114d57b48eac39b9ad189dd8316235a7b4a8d21a10bd27519666489c69b503";
        let verifier = verifier();
        assert_eq!(verifier.sign("1531420618", body), signature);
        assert_eq!(
            verifier.verify_at(body, Some("1531420618"), Some(signature), NOW),
            Verification::Valid
        );
    }

    #[test]
    fn fresh_and_correct_is_valid() {
        let verifier = verifier();
        let ts = NOW.to_string();
        let sig = verifier.sign(&ts, BODY);
        assert!(verifier.verify_at(BODY, Some(&ts), Some(&sig), NOW).is_valid());
        assert!(verifier.verify_at(BODY, Some(&ts), Some(&sig), NOW + 300).is_valid());
        assert!(verifier.verify_at(BODY, Some(&ts), Some(&sig), NOW - 300).is_valid());
    }

    #[test]
    fn stale_timestamp_fails_even_with_correct_signature() {
        let verifier = verifier();
        let ts = (NOW - 301).to_string();
        let sig = verifier.sign(&ts, BODY);
        assert_eq!(
            verifier.verify_at(BODY, Some(&ts), Some(&sig), NOW),
            Verification::Stale { skew: 301 }
        );

        let ts = (NOW - 3600).to_string();
        let sig = verifier.sign(&ts, BODY);
        assert!(!verifier.verify_at(BODY, Some(&ts), Some(&sig), NOW).is_valid());
    }

    #[test]
    fn future_timestamp_beyond_skew_fails() {
        let verifier = verifier();
        let ts = (NOW + 301).to_string();
        let sig = verifier.sign(&ts, BODY);
        assert!(matches!(
            verifier.verify_at(BODY, Some(&ts), Some(&sig), NOW),
            Verification::Stale { .. }
        ));
    }

    #[test]
    fn any_single_byte_mutation_fails() {
        let verifier = verifier();
        let ts = NOW.to_string();
        let sig = verifier.sign(&ts, BODY);
        for i in 0..BODY.len() {
            let mut tampered = BODY.to_vec();
            tampered[i] ^= 0x01;
            assert_eq!(
                verifier.verify_at(&tampered, Some(&ts), Some(&sig), NOW),
                Verification::SignatureMismatch,
                "mutation at byte {} was accepted",
                i
            );
        }
    }

    #[test]
    fn signature_from_other_secret_fails() {
        let other = SignatureVerifier::new("another-secret").unwrap();
        let ts = NOW.to_string();
        let sig = other.sign(&ts, BODY);
        assert_eq!(
            verifier().verify_at(BODY, Some(&ts), Some(&sig), NOW),
            Verification::SignatureMismatch
        );
    }

    #[test]
    fn missing_or_malformed_headers_fail() {
        let verifier = verifier();
        let ts = NOW.to_string();
        let sig = verifier.sign(&ts, BODY);
        let hex_only = sig.trim_start_matches("v0=").to_string();

        assert_eq!(verifier.verify_at(BODY, None, Some(&sig), NOW), Verification::MissingTimestamp);
        assert_eq!(verifier.verify_at(BODY, Some(&ts), None, NOW), Verification::MissingSignature);
        assert_eq!(
            verifier.verify_at(BODY, Some("yesterday"), Some(&sig), NOW),
            Verification::MalformedTimestamp
        );
        assert_eq!(verifier.verify_at(BODY, Some(""), Some(&sig), NOW), Verification::MalformedTimestamp);
        assert_eq!(
            verifier.verify_at(BODY, Some(&ts), Some(&hex_only), NOW),
            Verification::SignatureMismatch
        );
        assert_eq!(
            verifier.verify_at(BODY, Some(&ts), Some("v0=not-hex"), NOW),
            Verification::SignatureMismatch
        );
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(SignatureVerifier::new(""), Err(SignatureError::InvalidSecret(_))));
    }
}
