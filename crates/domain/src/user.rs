use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use chrono::{DateTime, Duration, Utc};
use derive_more::{Deref, Display};
use uuid::Uuid;

use crate::{AuthError, CreateError, DeleteError, Name, ReadError};

pub const MIN_PASSWORD_LEN: usize = 8;

const SESSION_DURATION_HOURS: i64 = 24;
const REMEMBERED_SESSION_DURATION_DAYS: i64 = 30;

#[allow(async_fn_in_trait)]
pub trait AuthService {
    async fn register(&self, registration: Registration) -> Result<User, AuthError>;
    async fn login(&self, credentials: Credentials) -> Result<(User, Session), AuthError>;
    async fn get_current_user(&self, token: &SessionToken) -> Result<User, AuthError>;
    async fn logout(&self, token: SessionToken) -> Result<(), AuthError>;
}

#[allow(async_fn_in_trait)]
pub trait UserRepository {
    async fn read_user(&self, email: &Email) -> Result<User, ReadError>;
    async fn create_user(&self, user: User) -> Result<User, CreateError>;
}

#[allow(async_fn_in_trait)]
pub trait SessionRepository {
    async fn read_session(&self, token: &SessionToken) -> Result<Session, ReadError>;
    async fn create_session(&self, session: Session) -> Result<Session, CreateError>;
    async fn delete_session(&self, token: SessionToken) -> Result<SessionToken, DeleteError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub email: Email,
    pub id: UserID,
    pub name: Name,
    /// Argon2 hash in PHC string format.
    pub password_hash: String,
}

#[derive(Deref, Display, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Email(String);

impl Email {
    #[must_use]
    pub fn new(email: &str) -> Self {
        Self(email.trim().to_string())
    }
}

#[derive(Deref, Display, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserID(Uuid);

impl UserID {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for UserID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: SessionToken,
    pub email: Email,
    /// Expiry time in milliseconds since the Unix epoch.
    pub expires_at: i64,
}

impl Session {
    #[must_use]
    pub fn new(email: Email, remember: bool, now: DateTime<Utc>) -> Self {
        let duration = if remember {
            Duration::days(REMEMBERED_SESSION_DURATION_DAYS)
        } else {
            Duration::hours(SESSION_DURATION_HOURS)
        };
        Self {
            token: SessionToken::random(),
            email,
            expires_at: (now + duration).timestamp_millis(),
        }
    }

    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() >= self.expires_at
    }
}

#[derive(Deref, Display, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionToken(Uuid);

impl SessionToken {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for SessionToken {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub remember: bool,
}

#[must_use]
pub fn validate_registration(registration: &Registration) -> Vec<String> {
    if [
        &registration.email,
        &registration.name,
        &registration.password,
        &registration.confirm_password,
    ]
    .iter()
    .any(|field| field.trim().is_empty())
    {
        return vec!["All fields are required".to_string()];
    }

    let mut errors = vec![];
    let password = &registration.password;

    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        ));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one number".to_string());
    }

    if *password != registration.confirm_password {
        errors.push("Passwords do not match".to_string());
    }

    errors
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|err| AuthError::Other(err.to_string().into()))?;
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AuthError::Other(err.to_string().into()))?
        .to_string())
}

#[must_use]
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash).is_ok_and(|hash| {
        Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok()
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn registration() -> Registration {
        Registration {
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            password: "Secret123".to_string(),
            confirm_password: "Secret123".to_string(),
        }
    }

    #[rstest]
    #[case(registration(), vec![])]
    #[case(Registration { name: " ".to_string(), ..registration() }, vec!["All fields are required"])]
    #[case(
        Registration { password: "Ab1".to_string(), confirm_password: "Ab1".to_string(), ..registration() },
        vec!["Password must be at least 8 characters long"]
    )]
    #[case(
        Registration { password: "secret123".to_string(), confirm_password: "secret123".to_string(), ..registration() },
        vec!["Password must contain at least one uppercase letter"]
    )]
    #[case(
        Registration { password: "SecretABC".to_string(), confirm_password: "SecretABC".to_string(), ..registration() },
        vec!["Password must contain at least one number"]
    )]
    #[case(
        Registration { confirm_password: "Secret124".to_string(), ..registration() },
        vec!["Passwords do not match"]
    )]
    fn test_validate_registration(#[case] registration: Registration, #[case] expected: Vec<&str>) {
        assert_eq!(validate_registration(&registration), expected);
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("Secret123").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Secret123", &hash));
        assert!(!verify_password("Secret124", &hash));
        assert!(!verify_password("Secret123", "not a hash"));
    }

    #[rstest]
    #[case(false, 24 * 60 * 60 * 1000)]
    #[case(true, 30 * 24 * 60 * 60 * 1000)]
    fn test_session_expiry(#[case] remember: bool, #[case] duration_ms: i64) {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let session = Session::new(Email::new(" alice@example.com "), remember, now);

        assert_eq!(session.email, Email::new("alice@example.com"));
        assert_eq!(session.expires_at, now.timestamp_millis() + duration_ms);
        assert!(!session.is_expired_at(now));
        assert!(session.is_expired_at(now + Duration::milliseconds(duration_ms)));
    }

    #[test]
    fn test_session_tokens_differ() {
        assert_ne!(SessionToken::random(), SessionToken::random());
    }
}
