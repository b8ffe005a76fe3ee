//! Stateless password reset tokens.
//!
//! A token is `{issued_at_base36}-{mac}` where `mac` is the first 20 hex
//! characters of HMAC-SHA256 over the user id, the current password hash
//! and the timestamp. Changing the password changes the hash, which
//! invalidates every outstanding token for that user.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const MAC_HEX_LEN: usize = 20;

#[derive(Clone)]
pub struct ResetTokenGenerator {
    secret: String,
    timeout_secs: i64,
}

impl ResetTokenGenerator {
    pub fn new(secret: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            timeout_secs: i64::try_from(timeout_secs).unwrap_or(i64::MAX),
        }
    }

    pub fn make_token(&self, user_id: Uuid, password_hash: Option<&str>) -> String {
        self.make_token_at(user_id, password_hash, Utc::now())
    }

    fn make_token_at(&self, user_id: Uuid, password_hash: Option<&str>, now: DateTime<Utc>) -> String {
        let ts = now.timestamp().max(0) as u64;
        let mac_hex = hex::encode(self.mac(user_id, password_hash, ts));
        let truncated = mac_hex.get(..MAC_HEX_LEN).unwrap_or(&mac_hex);
        format!("{}-{}", to_base36(ts), truncated)
    }

    pub fn check_token(&self, user_id: Uuid, password_hash: Option<&str>, token: &str) -> bool {
        self.check_token_at(user_id, password_hash, token, Utc::now())
    }

    fn check_token_at(
        &self,
        user_id: Uuid,
        password_hash: Option<&str>,
        token: &str,
        now: DateTime<Utc>,
    ) -> bool {
        let Some((ts_part, mac_part)) = token.split_once('-') else {
            return false;
        };
        let Some(ts) = from_base36(ts_part) else {
            return false;
        };
        if mac_part.len() != MAC_HEX_LEN {
            return false;
        }
        let Ok(expected) = hex::decode(mac_part) else {
            return false;
        };

        let Ok(mut mac) = HmacSha256::new_from_slice(self.secret.as_bytes()) else {
            return false;
        };
        mac.update(&Self::message(user_id, password_hash, ts));
        if mac.verify_truncated_left(&expected).is_err() {
            return false;
        }

        let age = now.timestamp() - ts as i64;
        (0..=self.timeout_secs).contains(&age)
    }

    fn mac(&self, user_id: Uuid, password_hash: Option<&str>, ts: u64) -> Vec<u8> {
        match HmacSha256::new_from_slice(self.secret.as_bytes()) {
            Ok(mut mac) => {
                mac.update(&Self::message(user_id, password_hash, ts));
                mac.finalize().into_bytes().to_vec()
            }
            // HMAC accepts keys of any length
            Err(_) => Vec::new(),
        }
    }

    fn message(user_id: Uuid, password_hash: Option<&str>, ts: u64) -> Vec<u8> {
        format!("{}{}{}", user_id, password_hash.unwrap_or_default(), ts).into_bytes()
    }
}

/// URL-safe, unpadded base64 of the user id
pub fn encode_uid(user_id: Uuid) -> String {
    URL_SAFE_NO_PAD.encode(user_id.to_string())
}

pub fn decode_uid(uid: &str) -> Option<Uuid> {
    let bytes = URL_SAFE_NO_PAD.decode(uid.trim_end_matches('=')).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    Uuid::parse_str(&text).ok()
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn from_base36(text: &str) -> Option<u64> {
    if text.is_empty() || text.len() > 13 {
        return None;
    }
    u64::from_str_radix(text, 36).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const SECRET: &str = "reset-secret";

    #[test]
    fn token_is_valid_for_same_password_hash() {
        let generator = ResetTokenGenerator::new(SECRET, 3600);
        let user_id = Uuid::new_v4();
        let token = generator.make_token(user_id, Some("$argon2id$v=19$old"));

        let (ts, mac) = token.split_once('-').unwrap();
        assert!(from_base36(ts).is_some());
        assert_eq!(mac.len(), 20);
        assert!(generator.check_token(user_id, Some("$argon2id$v=19$old"), &token));
    }

    #[test]
    fn password_change_invalidates_token() {
        let generator = ResetTokenGenerator::new(SECRET, 3600);
        let user_id = Uuid::new_v4();
        let token = generator.make_token(user_id, Some("$argon2id$v=19$old"));
        assert!(!generator.check_token(user_id, Some("$argon2id$v=19$new"), &token));
        assert!(!generator.check_token(Uuid::new_v4(), Some("$argon2id$v=19$old"), &token));
    }

    #[test]
    fn token_expires_after_timeout() {
        let generator = ResetTokenGenerator::new(SECRET, 60);
        let user_id = Uuid::new_v4();
        let issued = Utc::now() - Duration::seconds(120);
        let token = generator.make_token_at(user_id, None, issued);

        assert!(generator.check_token_at(user_id, None, &token, issued + Duration::seconds(30)));
        assert!(!generator.check_token(user_id, None, &token));
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        let generator = ResetTokenGenerator::new(SECRET, 60);
        let user_id = Uuid::new_v4();
        for token in ["", "abc", "zz-", "-0123456789abcdef0123", "1-nothex!!nothex!!nothex"] {
            assert!(!generator.check_token(user_id, None, token));
        }
    }

    #[test]
    fn uid_round_trips_and_rejects_noise() {
        let user_id = Uuid::new_v4();
        let uid = encode_uid(user_id);
        assert!(!uid.contains('='));
        assert_eq!(decode_uid(&uid), Some(user_id));
        assert_eq!(decode_uid("not base64!"), None);
    }

    #[test]
    fn base36_matches_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(from_base36("10"), Some(36));
    }
}
