use application::{PasswordHasher, PasswordHasherError};
use async_trait::async_trait;
use bcrypt::{hash, verify};
use domain::{Password, PasswordHash};

/// bcrypt 密码哈希。计算放在阻塞线程池中执行，避免占用异步工作线程。
#[derive(Debug, Clone)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError> {
        let cost = self.cost;
        let plaintext = password.expose().to_owned();
        let hashed = tokio::task::spawn_blocking(move || hash(plaintext, cost))
            .await
            .map_err(|err| PasswordHasherError::hash_error(err.to_string()))
            .and_then(|res| res.map_err(|err| PasswordHasherError::hash_error(err.to_string())))?;

        Ok(PasswordHash::new(hashed))
    }

    async fn verify(
        &self,
        password: &Password,
        hashed: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        let plaintext = password.expose().to_owned();
        let hashed = hashed.as_str().to_owned();
        tokio::task::spawn_blocking(move || verify(plaintext, &hashed))
            .await
            .map_err(|err| PasswordHasherError::verify_error(err.to_string()))
            .and_then(|res| res.map_err(|err| PasswordHasherError::verify_error(err.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn password(value: &str) -> Password {
        Password::parse(value).unwrap()
    }

    #[tokio::test]
    async fn hash_is_salted_and_verifiable() {
        let hasher = BcryptPasswordHasher::new(4);
        let plaintext = password("correct horse battery");

        let first = hasher.hash(&plaintext).await.unwrap();
        let second = hasher.hash(&plaintext).await.unwrap();

        assert_ne!(first, second);
        assert!(!first.as_str().contains("horse"));
        assert!(hasher.verify(&plaintext, &first).await.unwrap());
        assert!(hasher.verify(&plaintext, &second).await.unwrap());
    }

    #[tokio::test]
    async fn configured_cost_is_recorded_in_hash() {
        let hashed = BcryptPasswordHasher::new(5)
            .hash(&password("correct horse battery"))
            .await
            .unwrap();
        assert!(hashed.as_str().starts_with("$2b$05$"));
    }

    #[tokio::test]
    async fn wrong_password_does_not_verify() {
        let hasher = BcryptPasswordHasher::new(4);
        let hashed = hasher.hash(&password("correct horse battery")).await.unwrap();

        let verified = hasher
            .verify(&password("wrong horse battery"), &hashed)
            .await
            .unwrap();
        assert!(!verified);
    }

    #[tokio::test]
    async fn malformed_hash_is_a_verify_error() {
        let hasher = BcryptPasswordHasher::new(4);
        let err = hasher
            .verify(&password("correct horse battery"), &PasswordHash::new("plain"))
            .await
            .unwrap_err();
        assert!(matches!(err, PasswordHasherError::Verify(_)));
    }
}
