//! Best-effort JWT inspection for the proactive refresh check.
//!
//! The backend issues JWTs, but nothing here depends on that: opaque
//! tokens simply report no expiry and the scheduler leaves them alone.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};

/// Decodes the `exp` claim from a JWT without verifying the signature.
/// Returns `None` for anything that is not a decodable three-part JWT.
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.get("exp")?.as_i64()?, 0)
}

/// True when the token has a readable expiry inside the lead window
/// (or already behind us). Opaque tokens are never "expiring".
pub fn expires_within(token: &str, lead: Duration) -> bool {
    match expires_at(token) {
        Some(exp) => exp - Utc::now() <= lead,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#));
        format!("{header}.{payload}.sig")
    }

    #[test]
    fn reads_exp_claim() {
        let exp = (Utc::now() + Duration::hours(2)).timestamp();
        let token = jwt_with_exp(exp);
        assert_eq!(expires_at(&token).unwrap().timestamp(), exp);
    }

    #[test]
    fn lead_window() {
        let soon = jwt_with_exp((Utc::now() + Duration::minutes(10)).timestamp());
        let later = jwt_with_exp((Utc::now() + Duration::hours(6)).timestamp());
        assert!(expires_within(&soon, Duration::minutes(30)));
        assert!(!expires_within(&later, Duration::minutes(30)));
    }

    #[test]
    fn opaque_tokens_never_expire() {
        assert!(expires_at("not-a-jwt").is_none());
        assert!(!expires_within("not-a-jwt", Duration::hours(9999)));
    }
}
