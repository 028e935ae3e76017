use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{Duration, NaiveDateTime};
use uuid::Uuid;

pub const ADMIN_COOKIE: &str = "admin_token";
pub const SESSION_COOKIE: &str = "rsvp_session";

/// Admin tokens expire server-side after this long; the cookie Max-Age
/// matches so both sides agree.
pub const ADMIN_TOKEN_TTL_SECONDS: i64 = 86_400;

/// Password gate for the admin pages. Successful logins are issued a UUID
/// token held in memory; restarting the process logs every admin out.
#[derive(Debug)]
pub struct AdminAuth {
    password: String,
    tokens: Mutex<HashMap<Uuid, NaiveDateTime>>,
}

impl AdminAuth {
    pub fn new(password: String) -> Self {
        Self {
            password,
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Compares the submitted password and issues a session token on match.
    pub fn login(&self, attempt: &str, now: NaiveDateTime) -> Option<String> {
        if attempt != self.password {
            return None;
        }
        let token = Uuid::new_v4();
        self.lock().insert(token, now);
        Some(token.to_string())
    }

    /// True when the token was issued here and has not expired. Strings
    /// that do not parse as a UUID are rejected before the lookup.
    pub fn validate(&self, token: &str, now: NaiveDateTime) -> bool {
        let Ok(token) = Uuid::parse_str(token) else {
            return false;
        };
        match self.lock().get(&token) {
            Some(issued) => now - *issued <= Duration::seconds(ADMIN_TOKEN_TTL_SECONDS),
            None => false,
        }
    }

    pub fn logout(&self, token: &str) {
        if let Ok(token) = Uuid::parse_str(token) {
            self.lock().remove(&token);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, NaiveDateTime>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pulls one cookie's value out of a `Cookie` request header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    for cookie in header.split(';') {
        let cookie = cookie.trim();
        if let Some(rest) = cookie.strip_prefix(name) {
            if let Some(value) = rest.strip_prefix('=') {
                return Some(value);
            }
        }
    }
    None
}

pub fn admin_cookie(token: &str) -> String {
    format!(
        "{ADMIN_COOKIE}={token}; Max-Age={ADMIN_TOKEN_TTL_SECONDS}; Path=/; HttpOnly; SameSite=Strict"
    )
}

pub fn clear_admin_cookie() -> String {
    format!("{ADMIN_COOKIE}=; Max-Age=0; Path=/; HttpOnly; SameSite=Strict")
}

/// Visitor session cookie. No Max-Age: the draft lives only as long as the
/// browser session.
pub fn session_cookie(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Strict")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at_noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn wrong_password_issues_no_token() {
        let auth = AdminAuth::new("sekrit".to_string());
        assert_eq!(auth.login("guess", at_noon()), None);
        assert_eq!(auth.login("", at_noon()), None);
    }

    #[test]
    fn login_issues_a_uuid_that_validates() {
        let auth = AdminAuth::new("sekrit".to_string());
        let token = auth.login("sekrit", at_noon()).unwrap();
        assert!(Uuid::parse_str(&token).is_ok());
        assert!(auth.validate(&token, at_noon()));
    }

    #[test]
    fn unknown_and_malformed_tokens_are_rejected() {
        let auth = AdminAuth::new("sekrit".to_string());
        assert!(!auth.validate("not-a-uuid", at_noon()));
        assert!(!auth.validate(&Uuid::new_v4().to_string(), at_noon()));
    }

    #[test]
    fn tokens_expire_after_the_ttl() {
        let auth = AdminAuth::new("sekrit".to_string());
        let issued = at_noon();
        let token = auth.login("sekrit", issued).unwrap();

        let within = issued + Duration::hours(23);
        assert!(auth.validate(&token, within));

        let expired = issued + Duration::seconds(ADMIN_TOKEN_TTL_SECONDS + 1);
        assert!(!auth.validate(&token, expired));
    }

    #[test]
    fn logout_revokes_the_token() {
        let auth = AdminAuth::new("sekrit".to_string());
        let token = auth.login("sekrit", at_noon()).unwrap();
        auth.logout(&token);
        assert!(!auth.validate(&token, at_noon()));
    }

    #[test]
    fn cookie_value_finds_the_named_cookie() {
        let header = "theme=dark; admin_token=abc123; rsvp_session=xyz";
        assert_eq!(cookie_value(header, "admin_token"), Some("abc123"));
        assert_eq!(cookie_value(header, "rsvp_session"), Some("xyz"));
        assert_eq!(cookie_value(header, "missing"), None);
    }

    #[test]
    fn cookie_value_ignores_longer_names_sharing_a_prefix() {
        let header = "admin_token_backup=nope; admin_token=real";
        assert_eq!(cookie_value(header, "admin_token"), Some("real"));
    }

    #[test]
    fn cookie_strings_carry_the_expected_attributes() {
        let set = admin_cookie("abc");
        assert!(set.starts_with("admin_token=abc; Max-Age=86400"));
        assert!(set.contains("HttpOnly"));
        assert!(clear_admin_cookie().contains("Max-Age=0"));
    }
}
