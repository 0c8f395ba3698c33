//! Telegram WebApp init payloads.
//!
//! The payload is a query string (`query_id`, `user`, `auth_date`, `hash`).
//! `hash` is the hex HMAC-SHA256 of the remaining pairs, sorted by key and
//! joined as `key=value` lines, keyed with `HMAC_SHA256("WebAppData", token)`.

use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::Sha256;

use crate::{data_types::profile_data_types::TelegramUser, errors::InitDataError};

type HmacSha256 = Hmac<Sha256>;

const WEB_APP_KEY: &[u8] = b"WebAppData";

#[derive(Debug, Clone, PartialEq)]
pub struct InitData {
    pub query_id: Option<String>,
    pub user: Option<TelegramUser>,
    pub auth_date: i64,
    pub hash: String,
}

/// Builds a signed payload the way the Telegram client would hand it over.
pub fn sign(
    bot_token: &str,
    user: &TelegramUser,
    auth_date: i64,
    query_id: Option<&str>,
) -> Result<String, InitDataError> {
    let user_json = serde_json::to_string(user).map_err(|_| InitDataError::Malformed("user"))?;
    let auth_date = auth_date.to_string();

    let mut pairs: Vec<(&str, &str)> = vec![("auth_date", &auth_date), ("user", &user_json)];
    if let Some(query_id) = query_id {
        pairs.push(("query_id", query_id));
    }
    let hash = signature(bot_token, &pairs)?;
    pairs.push(("hash", &hash));

    encode(&pairs)
}

/// Reads the payload without checking the signature.
pub fn parse(raw: &str) -> Result<InitData, InitDataError> {
    let pairs = decode(raw)?;
    let field = |name: &str| {
        pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    };

    let hash = field("hash").ok_or(InitDataError::MissingHash)?.to_string();
    let auth_date = match field("auth_date") {
        Some(v) => v
            .parse::<i64>()
            .map_err(|_| InitDataError::Malformed("auth_date"))?,
        None => 0,
    };
    let user = field("user")
        .map(serde_json::from_str::<TelegramUser>)
        .transpose()
        .map_err(|_| InitDataError::Malformed("user"))?;

    Ok(InitData {
        query_id: field("query_id").map(str::to_string),
        user,
        auth_date,
        hash,
    })
}

/// Checks the signature against the bot token, then parses.
#[cfg(test)]
pub(crate) fn verify(raw: &str, bot_token: &str) -> Result<InitData, InitDataError> {
    let pairs = decode(raw)?;
    let hash = pairs
        .iter()
        .find(|(key, _)| key == "hash")
        .map(|(_, value)| value.as_str())
        .ok_or(InitDataError::MissingHash)?;
    let expected = hex::decode(hash).map_err(|_| InitDataError::Malformed("hash"))?;

    let signed: Vec<(&str, &str)> = pairs
        .iter()
        .filter(|(key, _)| key != "hash")
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    let mut mac = HmacSha256::new_from_slice(&secret_key(bot_token)?)
        .map_err(|_| InitDataError::Malformed("key"))?;
    mac.update(data_check_string(&signed).as_bytes());
    mac.verify_slice(&expected)
        .map_err(|_| InitDataError::BadSignature)?;

    parse(raw)
}

fn secret_key(bot_token: &str) -> Result<Vec<u8>, InitDataError> {
    let mut mac =
        HmacSha256::new_from_slice(WEB_APP_KEY).map_err(|_| InitDataError::Malformed("key"))?;
    mac.update(bot_token.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn signature(bot_token: &str, pairs: &[(&str, &str)]) -> Result<String, InitDataError> {
    let mut mac = HmacSha256::new_from_slice(&secret_key(bot_token)?)
        .map_err(|_| InitDataError::Malformed("key"))?;
    mac.update(data_check_string(pairs).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn data_check_string(pairs: &[(&str, &str)]) -> String {
    let mut lines: Vec<String> = pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    lines.sort();
    lines.join("\n")
}

fn encode(pairs: &[(&str, &str)]) -> Result<String, InitDataError> {
    let mut url = scratch_url()?;
    url.query_pairs_mut().extend_pairs(pairs.iter().copied());
    Ok(url.query().unwrap_or_default().to_string())
}

fn decode(raw: &str) -> Result<Vec<(String, String)>, InitDataError> {
    let mut url = scratch_url()?;
    url.set_query(Some(raw.trim_start_matches('?')));
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    if pairs.is_empty() {
        return Err(InitDataError::Malformed("query"));
    }
    Ok(pairs)
}

// only used for its query string codec
fn scratch_url() -> Result<Url, InitDataError> {
    Url::parse("http://localhost/").map_err(|_| InitDataError::Malformed("query"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "123456:TEST-TOKEN";

    fn user() -> TelegramUser {
        TelegramUser {
            id: 42,
            first_name: Some("Анна".into()),
            last_name: None,
            username: Some("anna".into()),
            language_code: Some("ru".into()),
            photo_url: None,
        }
    }

    #[test]
    fn signed_payload_verifies() {
        let raw = sign(TOKEN, &user(), 1_716_000_000, Some("AAE1")).unwrap();
        let data = verify(&raw, TOKEN).unwrap();

        assert_eq!(data.user, Some(user()));
        assert_eq!(data.auth_date, 1_716_000_000);
        assert_eq!(data.query_id.as_deref(), Some("AAE1"));
        assert_eq!(data.hash.len(), 64);
    }

    #[test]
    fn other_token_is_rejected() {
        let raw = sign(TOKEN, &user(), 1_716_000_000, None).unwrap();
        assert_eq!(verify(&raw, "654321:OTHER"), Err(InitDataError::BadSignature));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let raw = sign(TOKEN, &user(), 1_716_000_000, None).unwrap();
        let tampered = raw.replace("auth_date=1716000000", "auth_date=1716000001");
        assert_ne!(raw, tampered);
        assert_eq!(verify(&tampered, TOKEN), Err(InitDataError::BadSignature));
    }

    #[test]
    fn unsigned_payload_is_rejected() {
        assert_eq!(parse("auth_date=1"), Err(InitDataError::MissingHash));
        assert_eq!(verify("", TOKEN), Err(InitDataError::Malformed("query")));
    }

    #[test]
    fn check_string_is_sorted() {
        assert_eq!(
            data_check_string(&[("user", "{}"), ("auth_date", "1"), ("query_id", "q")]),
            "auth_date=1\nquery_id=q\nuser={}"
        );
    }
}
