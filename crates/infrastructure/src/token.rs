//! RS256 JWT 令牌
//!
//! 私钥签发、公钥校验。过期判断不使用 jsonwebtoken 内置的系统时间校验，
//! 而是在每次校验时读取注入的 [`Clock`]，便于测试过期边界。

use std::{path::Path, sync::Arc};

use application::{Clock, TokenError, TokenService};
use domain::AccountId;
use jsonwebtoken::{
    decode, encode, errors::Error as JwtError, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
    iss: String,
    jti: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("failed to read key file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid RSA key: {0}")]
    Invalid(#[from] JwtError),
}

pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: time::Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    pub fn new(
        encoding_key: EncodingKey,
        decoding_key: DecodingKey,
        issuer: impl Into<String>,
        ttl: time::Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let issuer = issuer.into();
        let mut validation = Validation::new(Algorithm::RS256);
        // 过期由 verify 基于注入时钟判断
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding_key,
            decoding_key,
            validation,
            issuer,
            ttl,
            clock,
        }
    }

    /// 从 PEM 内容构建：私钥为 PKCS#1 或 PKCS#8，公钥为 SPKI。
    pub fn from_rsa_pem(
        private_pem: &[u8],
        public_pem: &[u8],
        issuer: impl Into<String>,
        ttl: time::Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, KeyError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_pem)?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem)?;
        Ok(Self::new(encoding_key, decoding_key, issuer, ttl, clock))
    }

    pub fn from_rsa_pem_files(
        private_key_path: impl AsRef<Path>,
        public_key_path: impl AsRef<Path>,
        issuer: impl Into<String>,
        ttl: time::Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, KeyError> {
        let private_pem = read_key(private_key_path.as_ref())?;
        let public_pem = read_key(public_key_path.as_ref())?;
        Self::from_rsa_pem(&private_pem, &public_pem, issuer, ttl, clock)
    }
}

fn read_key(path: &Path) -> Result<Vec<u8>, KeyError> {
    std::fs::read(path).map_err(|source| KeyError::Read {
        path: path.display().to_string(),
        source,
    })
}

impl TokenService for JwtTokenService {
    fn issue(&self, account_id: &AccountId) -> Result<String, TokenError> {
        let now = self.clock.now();
        let claims = Claims {
            sub: account_id.as_str().to_owned(),
            iat: now.unix_timestamp(),
            exp: expiry_seconds(now + self.ttl),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4(),
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|err| TokenError::Signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<AccountId, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!(error = %err, "token rejected");
                TokenError::InvalidToken
            })?;

        let expires_at =
            OffsetDateTime::from_unix_timestamp(claims.exp).map_err(|_| TokenError::InvalidToken)?;
        if self.clock.now() >= expires_at {
            return Err(TokenError::Expired);
        }
        Ok(AccountId::from(claims.sub))
    }
}

// exp 只有秒精度，向上取整，令牌不会早于签发时承诺的期限失效
fn expiry_seconds(expires_at: OffsetDateTime) -> i64 {
    let seconds = expires_at.unix_timestamp();
    if expires_at.nanosecond() > 0 {
        seconds + 1
    } else {
        seconds
    }
}
