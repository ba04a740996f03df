use super::{AuthError, TokenPair};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Claims carried by a provider-issued access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expiry, unix seconds.
    pub exp: i64,
}

fn mac_for(secret: &str, payload: &[u8]) -> Result<HmacSha256, AuthError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AuthError::Provider(format!("hmac key: {e}")))?;
    mac.update(payload);
    Ok(mac)
}

/// Verifies `<base64url claims>.<base64url hmac>` and returns the claims.
pub(crate) fn verify_access_token(token: &str, secret: &str, now: i64) -> Result<AccessClaims, AuthError> {
    let (payload, signature) = token
        .split_once('.')
        .ok_or_else(|| AuthError::InvalidToken("expected <claims>.<signature>".into()))?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|e| AuthError::InvalidToken(format!("signature encoding: {e}")))?;
    mac_for(secret, payload.as_bytes())?
        .verify_slice(&signature)
        .map_err(|_| AuthError::InvalidToken("signature mismatch".into()))?;

    let raw = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| AuthError::InvalidToken(format!("claims encoding: {e}")))?;
    let claims: AccessClaims = serde_json::from_slice(&raw)
        .map_err(|e| AuthError::InvalidToken(format!("claims: {e}")))?;
    if claims.exp <= now {
        return Err(AuthError::Expired);
    }
    Ok(claims)
}

#[cfg(test)]
pub(crate) fn sign_access_token(claims: &AccessClaims, secret: &str) -> String {
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).expect("claims json"));
    let signature = mac_for(secret, payload.as_bytes())
        .expect("hmac key")
        .finalize()
        .into_bytes();
    format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(signature))
}

fn decode_param(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|v| v.into_owned())
}

/// Extracts the token pair an OAuth redirect leaves in the URL fragment
/// (`#access_token=...&refresh_token=...`). Both must be present.
pub fn parse_token_fragment(url: &str) -> Option<TokenPair> {
    let (_, fragment) = url.split_once('#')?;
    if !fragment.contains("access_token") {
        return None;
    }

    let mut access_token = None;
    let mut refresh_token = None;
    for pair in fragment.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match key {
            "access_token" => access_token = decode_param(value),
            "refresh_token" => refresh_token = decode_param(value),
            _ => {}
        }
    }

    match (access_token, refresh_token) {
        (Some(access_token), Some(refresh_token))
            if !access_token.is_empty() && !refresh_token.is_empty() =>
        {
            Some(TokenPair {
                access_token,
                refresh_token,
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(exp: i64) -> AccessClaims {
        AccessClaims {
            sub: "u-42".into(),
            email: Some("prof@example.test".into()),
            name: None,
            exp,
        }
    }

    #[test]
    fn signed_tokens_verify() {
        let token = sign_access_token(&claims(2_000), "s3cret");
        let verified = verify_access_token(&token, "s3cret", 1_000).expect("valid token");
        assert_eq!(verified, claims(2_000));
    }

    #[test]
    fn wrong_secret_tampering_and_expiry_fail() {
        let token = sign_access_token(&claims(2_000), "s3cret");
        assert!(matches!(
            verify_access_token(&token, "other", 1_000),
            Err(AuthError::InvalidToken(_))
        ));

        let (_, sig) = token.split_once('.').expect("two parts");
        let forged_payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&AccessClaims {
                sub: "admin".into(),
                ..claims(2_000)
            })
            .expect("json"),
        );
        let forged = format!("{}.{}", forged_payload, sig);
        assert!(matches!(
            verify_access_token(&forged, "s3cret", 1_000),
            Err(AuthError::InvalidToken(_))
        ));

        assert!(matches!(
            verify_access_token(&token, "s3cret", 2_000),
            Err(AuthError::Expired)
        ));
        assert!(matches!(
            verify_access_token("no-dot", "s3cret", 0),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn fragment_parsing() {
        let pair = parse_token_fragment(
            "http://localhost:5173/#access_token=abc.def&expires_in=3600&refresh_token=r%2F1",
        )
        .expect("pair");
        assert_eq!(pair.access_token, "abc.def");
        assert_eq!(pair.refresh_token, "r/1");

        assert_eq!(parse_token_fragment("http://localhost:5173/sessions"), None);
        assert_eq!(
            parse_token_fragment("http://localhost:5173/#access_token=abc"),
            None
        );
        assert_eq!(
            parse_token_fragment("http://localhost:5173/#state=xyz"),
            None
        );
    }
}
