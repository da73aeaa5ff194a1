use std::time::Duration;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;

/// Issues and validates bearer tokens carrying a subject id.
pub trait TokenProvider: Send + Sync {
    fn issue(&self, subject: &str) -> anyhow::Result<String>;
    fn validate(&self, token: &str) -> anyhow::Result<String>;
}

/// HS256 JWT provider. Tokens expire a fixed duration after issuance;
/// there is no revocation list, expiry is the only mitigation.
pub struct JwtProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtProvider {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }
}

impl TokenProvider for JwtProvider {
    fn issue(&self, subject: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(subject = %subject, "jwt signed");
        Ok(token)
    }

    fn validate(&self, token: &str) -> anyhow::Result<String> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(subject = %data.claims.sub, "jwt verified");
        Ok(data.claims.sub)
    }
}

/// Canned provider for service tests; `issue` returns a predictable
/// token and `validate` echoes back the subject baked into it.
#[cfg(test)]
pub(crate) struct FakeTokenProvider;

#[cfg(test)]
impl TokenProvider for FakeTokenProvider {
    fn issue(&self, subject: &str) -> anyhow::Result<String> {
        Ok(format!("token-{subject}"))
    }

    fn validate(&self, token: &str) -> anyhow::Result<String> {
        token
            .strip_prefix("token-")
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("unknown token"))
    }
}
