//! Session tokens and password hashing.

use anyhow::{bail, Result};
use rand::Rng;
use rand_distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

const AUTH_TOKEN_LENGTH: usize = 64;

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct AuthTokenValue(pub String);

impl AuthTokenValue {
    pub fn generate() -> AuthTokenValue {
        let rng = rand::rng();
        let random_string: String = rng
            .sample_iter(&Alphanumeric)
            .take(AUTH_TOKEN_LENGTH)
            .map(char::from)
            .collect();
        AuthTokenValue(random_string)
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AuthToken {
    pub user_id: usize,
    pub created: SystemTime,
    pub last_used: Option<SystemTime>,
    pub value: AuthTokenValue,
}

impl AuthToken {
    pub fn new_for_user(user_id: usize) -> AuthToken {
        AuthToken {
            user_id,
            created: SystemTime::now(),
            last_used: None,
            value: AuthTokenValue::generate(),
        }
    }
}

mod youraoke_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    pub fn generate_b64_salt() -> String {
        SaltString::generate(&mut OsRng).to_string()
    }

    pub fn hash<T: AsRef<str>>(plain: &[u8], b64_salt: T) -> Result<String> {
        let argon2 = Argon2::default();
        let salt = SaltString::from_b64(b64_salt.as_ref()).map_err(|err| anyhow!("{}", err))?;
        Ok(argon2
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string())
    }

    pub fn verify<T: AsRef<str>>(plain_pw: &[u8], target_hash: T) -> Result<bool> {
        let argon2 = Argon2::default();
        let password_hash =
            PasswordHash::new(target_hash.as_ref()).map_err(|err| anyhow!("{}", err))?;
        Ok(argon2.verify_password(plain_pw, &password_hash).is_ok())
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug)]
pub enum PasswordHasherKind {
    Argon2,
}

impl FromStr for PasswordHasherKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "argon2" => Ok(PasswordHasherKind::Argon2),
            _ => bail!("Unknown hasher {}", s),
        }
    }
}

impl fmt::Display for PasswordHasherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordHasherKind::Argon2 => write!(f, "argon2"),
        }
    }
}

impl PasswordHasherKind {
    pub fn generate_b64_salt(&self) -> String {
        match self {
            PasswordHasherKind::Argon2 => youraoke_argon2::generate_b64_salt(),
        }
    }

    pub fn hash<T: AsRef<str>>(&self, plain: &[u8], b64_salt: T) -> Result<String> {
        match self {
            PasswordHasherKind::Argon2 => youraoke_argon2::hash(plain, b64_salt),
        }
    }

    pub fn verify<T: AsRef<str>>(&self, plain_pw: &[u8], target_hash: T) -> Result<bool> {
        match self {
            PasswordHasherKind::Argon2 => youraoke_argon2::verify(plain_pw, target_hash),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PasswordCredentials {
    pub user_id: usize,
    pub salt: String,
    pub hash: String,
    pub hasher: PasswordHasherKind,
    pub created: SystemTime,
}

impl PasswordCredentials {
    pub fn from_plain(user_id: usize, password: &str) -> Result<PasswordCredentials> {
        let hasher = PasswordHasherKind::Argon2;
        let salt = hasher.generate_b64_salt();
        let hash = hasher.hash(password.as_bytes(), &salt)?;
        Ok(PasswordCredentials {
            user_id,
            salt,
            hash,
            hasher,
            created: SystemTime::now(),
        })
    }

    pub fn verify(&self, password: &str) -> Result<bool> {
        self.hasher.verify(password.as_bytes(), &self.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_long_alphanumeric_and_distinct() {
        let a = AuthTokenValue::generate();
        let b = AuthTokenValue::generate();
        assert_eq!(a.0.len(), AUTH_TOKEN_LENGTH);
        assert!(a.0.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn password_verification_accepts_the_right_password_only() {
        let credentials = PasswordCredentials::from_plain(1, "s3cret!").unwrap();
        assert!(credentials.verify("s3cret!").unwrap());
        assert!(!credentials.verify("not-it").unwrap());
    }

    #[test]
    fn hasher_kind_round_trips_through_str() {
        let kind: PasswordHasherKind = "argon2".parse().unwrap();
        assert_eq!(kind.to_string(), "argon2");
        assert!("md5".parse::<PasswordHasherKind>().is_err());
    }
}
