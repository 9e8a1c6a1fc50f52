//! crates/studio_booking_core/src/accounts.rs
//!
//! Registration and credential checks against the `users` collection.
//!
//! Login reads every user and scans them in order. That is fine for a studio
//! sized user base and keeps the store layout free of any email index.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::User;
use crate::ports::{DocumentStore, PortError};
use crate::records::{decode_users, encode_user, format_created_at};

pub const USERS_PATH: &str = "users";

/// A problem with one input field, shown next to that field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{}", .0.first().map(|e| e.message.as_str()).unwrap_or("Invalid input"))]
    Validation(Vec<FieldError>),
    #[error("No users found")]
    NoUsers,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Failed to hash password: {0}")]
    Hashing(String),
    #[error(transparent)]
    Port(#[from] PortError),
}

/// What the sign-up form submits.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    pub fn validate(&self) -> Result<(), AccountError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }
        if self.email.trim().is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        } else if !self.email.contains('@') {
            errors.push(FieldError::new("email", "Email is invalid"));
        }
        if self.password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        }
        if self.password != self.confirm_password {
            errors.push(FieldError::new("confirmPassword", "Passwords don't match"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AccountError::Validation(errors))
        }
    }
}

/// Creates a user under a freshly generated key and returns it.
pub async fn register(store: &dyn DocumentStore, form: Registration) -> Result<User, AccountError> {
    form.validate()?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(form.password.as_bytes(), &salt)
        .map_err(|e| AccountError::Hashing(e.to_string()))?
        .to_string();

    let id = store.generate_key(USERS_PATH).await?;
    let user = User {
        id,
        email: form.email.trim().to_string(),
        name: form.name.trim().to_string(),
        password: password_hash,
        created_at: format_created_at(Utc::now()),
    };
    store
        .write(&format!("{}/{}", USERS_PATH, user.id), encode_user(&user)?)
        .await?;

    info!("Registered user {}", user.id);
    Ok(user)
}

/// Finds the user whose email and password both match.
pub async fn login(store: &dyn DocumentStore, email: &str, password: &str) -> Result<User, AccountError> {
    let mut errors = Vec::new();
    if email.trim().is_empty() {
        errors.push(FieldError::new("email", "Please fill in all fields"));
    }
    if password.is_empty() {
        errors.push(FieldError::new("password", "Please fill in all fields"));
    }
    if !errors.is_empty() {
        return Err(AccountError::Validation(errors));
    }

    let users = match store.read(USERS_PATH).await? {
        Some(value) => decode_users(value)?,
        None => return Err(AccountError::NoUsers),
    };
    debug!("Checking credentials against {} users", users.len());

    let email = email.trim();
    users
        .into_iter()
        .find(|u| u.email == email && password_matches(&u.password, password))
        .ok_or(AccountError::InvalidCredentials)
}

/// Hashed passwords are verified with argon2. Records written before hashing
/// was introduced still hold the plain password and are compared directly.
fn password_matches(stored: &str, given: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(hash) => Argon2::default()
            .verify_password(given.as_bytes(), &hash)
            .is_ok(),
        Err(_) => stored == given,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockDocumentStore;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    fn form(name: &str, email: &str, password: &str, confirm: &str) -> Registration {
        Registration {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    fn users_store(users: Value) -> MockDocumentStore {
        let mut store = MockDocumentStore::new();
        store
            .expect_read()
            .withf(|path| path == USERS_PATH)
            .returning(move |_| Ok(Some(users.clone())));
        store
    }

    #[test]
    fn validation_reports_each_field() {
        let err = form(" ", "nope", "", "x").validate().unwrap_err();
        match err {
            AccountError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
                assert_eq!(fields, vec!["name", "email", "password", "confirmPassword"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_writes_hashed_user_under_generated_key() {
        let written: Arc<Mutex<Vec<(String, Value)>>> = Arc::default();
        let sink = written.clone();
        let mut store = MockDocumentStore::new();
        store
            .expect_generate_key()
            .withf(|parent| parent == USERS_PATH)
            .returning(|_| Ok("-Nnew".to_string()));
        store.expect_write().returning(move |path, value| {
            sink.lock().unwrap().push((path.to_string(), value));
            Ok(())
        });

        let user = register(&store, form("Mia", "mia@example.com", "pw123", "pw123"))
            .await
            .unwrap();

        assert_eq!(user.id, "-Nnew");
        let written = written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, "users/-Nnew");
        let stored_password = written[0].1["password"].as_str().unwrap();
        assert_ne!(stored_password, "pw123");
        assert!(password_matches(stored_password, "pw123"));
        assert_eq!(written[0].1["email"], "mia@example.com");
    }

    #[tokio::test]
    async fn register_rejects_mismatched_passwords_without_writing() {
        let store = MockDocumentStore::new();
        let result = register(&store, form("Mia", "mia@example.com", "a", "b")).await;
        assert!(matches!(result, Err(AccountError::Validation(_))));
    }

    #[tokio::test]
    async fn login_returns_the_store_key_for_matching_credentials() {
        let store = users_store(json!({
            "-Na": { "email": "a@x.y", "name": "A", "password": "pa", "createdAt": "t" },
            "-Nb": { "email": "b@x.y", "name": "B", "password": "pb", "createdAt": "t" },
        }));

        let user = login(&store, "b@x.y", "pb").await.unwrap();
        assert_eq!(user.id, "-Nb");
        assert_eq!(user.name, "B");
    }

    #[tokio::test]
    async fn login_rejects_any_other_pair() {
        let store = users_store(json!({
            "-Na": { "email": "a@x.y", "name": "A", "password": "pa", "createdAt": "t" },
            "-Nb": { "email": "b@x.y", "name": "B", "password": "pb", "createdAt": "t" },
        }));

        for (email, password) in [("a@x.y", "pb"), ("b@x.y", "pa"), ("c@x.y", "pa")] {
            let result = login(&store, email, password).await;
            assert!(matches!(result, Err(AccountError::InvalidCredentials)));
        }
    }

    #[tokio::test]
    async fn login_verifies_hashed_passwords() {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"s3cret", &salt)
            .unwrap()
            .to_string();
        let store = users_store(json!({
            "-Nh": { "email": "h@x.y", "name": "H", "password": hash, "createdAt": "t" }
        }));

        assert_eq!(login(&store, "h@x.y", "s3cret").await.unwrap().id, "-Nh");
        assert!(matches!(
            login(&store, "h@x.y", "wrong").await,
            Err(AccountError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn login_without_users_collection() {
        let mut store = MockDocumentStore::new();
        store.expect_read().returning(|_| Ok(None));
        assert!(matches!(
            login(&store, "a@x.y", "pa").await,
            Err(AccountError::NoUsers)
        ));
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let store = MockDocumentStore::new();
        assert!(matches!(
            login(&store, "", "pa").await,
            Err(AccountError::Validation(_))
        ));
    }
}
