//! Credentials: salted PIN/password hashes, employee login, admin sessions.

use crate::db::employees;
use crate::errors::{AppError, AppResult};
use crate::models::Employee;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, NaiveDateTime};
use rand::RngCore;
use rusqlite::Connection;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;

fn digest(secret: &str, salt: &[u8], iterations: u32) -> Vec<u8> {
    let mut out = Sha256::new()
        .chain_update(salt)
        .chain_update(secret.as_bytes())
        .finalize();
    for _ in 1..iterations.max(1) {
        out = Sha256::new().chain_update(out).chain_update(salt).finalize();
    }
    out.to_vec()
}

/// `sha256$<iterations>$<salt hex>$<digest hex>`
pub fn hash_secret(secret: &str, iterations: u32) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    format!(
        "{SCHEME}${}${}${}",
        iterations.max(1),
        hex::encode(salt),
        hex::encode(digest(secret, &salt, iterations))
    )
}

/// Check a secret against a stored hash. Unknown formats never verify.
pub fn verify_secret(secret: &str, stored: &str) -> bool {
    let parts: Vec<&str> = stored.split('$').collect();
    let [scheme, iter, salt_hex, digest_hex] = parts.as_slice() else {
        return false;
    };
    if *scheme != SCHEME {
        return false;
    }
    let (Ok(iterations), Ok(salt), Ok(expected)) = (
        iter.parse::<u32>(),
        hex::decode(salt_hex),
        hex::decode(digest_hex),
    ) else {
        return false;
    };

    let actual = digest(secret, &salt, iterations);
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(expected.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// PINs are 4 to 6 ASCII digits.
pub fn validate_pin(pin: &str) -> AppResult<()> {
    let ok = (4..=6).contains(&pin.len()) && pin.bytes().all(|b| b.is_ascii_digit());
    if ok { Ok(()) } else { Err(AppError::InvalidPin) }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LoginResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub message: String,
}

pub struct AuthLogic;

impl AuthLogic {
    fn pin_matches(conn: &Connection, employee_id: &str, pin: &str) -> AppResult<bool> {
        Ok(employees::pin_hash(conn, employee_id)?
            .map(|h| verify_secret(pin, &h))
            .unwrap_or(false))
    }

    /// Employee whose PIN verifies against `pin`.
    pub fn employee_by_pin(conn: &Connection, pin: &str) -> AppResult<Option<Employee>> {
        if pin.trim().is_empty() {
            return Ok(None);
        }
        Ok(employees::employees_with_pin(conn)?
            .into_iter()
            .find(|(_, hash)| verify_secret(pin, hash))
            .map(|(e, _)| e))
    }

    /// Mobile login: id + PIN, or the PIN typed in both fields.
    pub fn login(conn: &Connection, employee_id: &str, pin: &str) -> AppResult<LoginResult> {
        let employee_id = employee_id.trim();
        let pin = pin.trim();

        if let Some(emp) = employees::find_employee(conn, employee_id)?
            && Self::pin_matches(conn, employee_id, pin)?
        {
            return Ok(LoginResult {
                success: true,
                employee_id: Some(emp.id.clone()),
                name: Some(emp.display_name()),
                message: "Logowanie udane".into(),
            });
        }

        if let Some(emp) = Self::employee_by_pin(conn, employee_id)?
            && Self::pin_matches(conn, &emp.id, pin)?
        {
            return Ok(LoginResult {
                success: true,
                employee_id: Some(emp.id.clone()),
                name: Some(emp.display_name()),
                message: "Logowanie udane (PIN)".into(),
            });
        }

        Ok(LoginResult {
            success: false,
            employee_id: None,
            name: None,
            message: "Nieprawidłowe ID lub PIN".into(),
        })
    }

    /// Returns the employee when the PIN is correct.
    pub fn verify_pin(conn: &Connection, employee_id: &str, pin: &str) -> AppResult<Option<Employee>> {
        match employees::find_employee(conn, employee_id.trim())? {
            Some(emp) if Self::pin_matches(conn, &emp.id, pin.trim())? => Ok(Some(emp)),
            _ => Ok(None),
        }
    }

    /// Administrator id when the password is correct.
    pub fn verify_admin(conn: &Connection, username: &str, password: &str) -> AppResult<bool> {
        if password.is_empty() {
            return Ok(false);
        }
        Ok(employees::admin_password_hash(conn, username.trim())?
            .map(|h| verify_secret(password, &h))
            .unwrap_or(false))
    }
}

// ---------------------------
// Admin sessions
// ---------------------------

#[derive(Debug, Clone)]
pub struct AdminSession {
    pub admin_id: String,
    pub expires_at: NaiveDateTime,
}

/// In-memory admin sessions keyed by random token.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, AdminSession>>,
}

impl SessionStore {
    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, HashMap<String, AdminSession>>> {
        self.sessions
            .lock()
            .map_err(|_| AppError::Other("session store lock poisoned".into()))
    }

    /// New session token for `admin_id`, valid for `hours`.
    pub fn create(
        &self,
        admin_id: &str,
        now: NaiveDateTime,
        hours: i64,
    ) -> AppResult<(String, AdminSession)> {
        let mut raw = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut raw);
        let token = URL_SAFE_NO_PAD.encode(raw);

        let session = AdminSession {
            admin_id: admin_id.to_string(),
            expires_at: now + Duration::hours(hours),
        };
        self.lock()?.insert(token.clone(), session.clone());

        Ok((token, session))
    }

    /// Session for `token`, dropping every expired one on the way.
    pub fn validate(&self, token: &str, now: NaiveDateTime) -> AppResult<Option<AdminSession>> {
        let mut map = self.lock()?;
        map.retain(|_, s| s.expires_at > now);
        Ok(map.get(token).cloned())
    }

    pub fn remove(&self, token: &str) -> AppResult<bool> {
        Ok(self.lock()?.remove(token).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_secret() {
        let h = hash_secret("1234", 50);
        assert!(h.starts_with("sha256$50$"));
        assert!(verify_secret("1234", &h));
        assert!(!verify_secret("1235", &h));
        assert!(!verify_secret("1234", "$2b$12$legacybcrypthash"));
    }

    #[test]
    fn same_secret_hashes_differently() {
        assert_ne!(hash_secret("0000", 1), hash_secret("0000", 1));
    }

    #[test]
    fn pin_format() {
        assert!(validate_pin("1234").is_ok());
        assert!(validate_pin("123456").is_ok());
        assert!(validate_pin("123").is_err());
        assert!(validate_pin("12a4").is_err());
        assert!(validate_pin("1234567").is_err());
    }

    #[test]
    fn sessions_expire() {
        let store = SessionStore::default();
        let now = crate::utils::date::parse_datetime("2025-05-05 10:00:00").unwrap();
        let (token, _) = store.create("admin", now, 8).unwrap();

        assert_eq!(
            store.validate(&token, now).unwrap().unwrap().admin_id,
            "admin"
        );
        assert!(
            store
                .validate(&token, now + Duration::hours(9))
                .unwrap()
                .is_none()
        );
    }
}
