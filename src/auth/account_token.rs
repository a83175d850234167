//! One-time account tokens for email verification and password reset.
//!
//! A token is `{timestamp_base36}-{mac}`. The MAC covers the user id, the
//! current password hash and the email, so the token stops working as soon as
//! either of them changes. Tokens also expire after a configured lifetime.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use time::{macros::datetime, OffsetDateTime};
use uuid::Uuid;

use crate::auth::repo_types::User;

type HmacSha256 = Hmac<Sha256>;

/// Token timestamps count seconds from this instant to keep them short.
const TOKEN_EPOCH: OffsetDateTime = datetime!(2001-01-01 0:00 UTC);
/// Hex characters of the MAC kept in the token.
const MAC_HEX_LEN: usize = 40;

#[derive(Clone)]
pub struct AccountTokens {
    secret: Vec<u8>,
    ttl_secs: i64,
}

impl AccountTokens {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            secret: format!("investo.account-token:{secret}").into_bytes(),
            ttl_secs,
        }
    }

    pub fn make_token(&self, user: &User) -> anyhow::Result<String> {
        self.make_token_at(user, OffsetDateTime::now_utc())
    }

    pub fn check_token(&self, user: &User, token: &str) -> bool {
        self.check_token_at(user, token, OffsetDateTime::now_utc())
    }

    fn make_token_at(&self, user: &User, now: OffsetDateTime) -> anyhow::Result<String> {
        let ts = (now - TOKEN_EPOCH).whole_seconds().max(0) as u64;
        let mac = self.mac(user, ts)?.finalize().into_bytes();
        let hex_mac = hex::encode(mac);
        Ok(format!("{}-{}", to_base36(ts), &hex_mac[..MAC_HEX_LEN]))
    }

    fn check_token_at(&self, user: &User, token: &str, now: OffsetDateTime) -> bool {
        let Some((ts_b36, mac_hex)) = token.split_once('-') else {
            return false;
        };
        let Ok(ts) = u64::from_str_radix(ts_b36, 36) else {
            return false;
        };
        if mac_hex.len() != MAC_HEX_LEN {
            return false;
        }
        let Ok(tag) = hex::decode(mac_hex) else {
            return false;
        };
        let Ok(mac) = self.mac(user, ts) else {
            return false;
        };
        if mac.verify_truncated_left(&tag).is_err() {
            return false;
        }

        let age = (now - TOKEN_EPOCH).whole_seconds() - ts as i64;
        age <= self.ttl_secs
    }

    fn mac(&self, user: &User, ts: u64) -> anyhow::Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| anyhow::anyhow!("account token key: {e}"))?;
        mac.update(user.id.as_bytes());
        mac.update(user.password_hash.as_deref().unwrap_or_default().as_bytes());
        mac.update(user.email.as_bytes());
        mac.update(ts.to_string().as_bytes());
        Ok(mac)
    }
}

/// URL-safe reference to a user id as it appears in emailed links.
pub fn encode_uid(id: Uuid) -> String {
    URL_SAFE_NO_PAD.encode(id.to_string())
}

pub fn decode_uid(encoded: &str) -> Option<Uuid> {
    let bytes = URL_SAFE_NO_PAD.decode(encoded.trim_end_matches('=')).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    Uuid::parse_str(&text).ok()
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".into();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
