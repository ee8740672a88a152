//! The configured admin credential.
//!
//! The plaintext pair is never kept. At construction both values are tagged
//! with HMAC-SHA256 under a random per-process key, and login attempts are
//! checked with `Mac::verify_slice`, which compares in constant time. Tagging
//! first also hides the configured lengths from timing.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Static admin username/password pair.
#[derive(Clone)]
pub struct AdminCredential {
    key: [u8; 32],
    username_tag: Vec<u8>,
    password_tag: Vec<u8>,
}

impl AdminCredential {
    /// Build the credential from configured values.
    pub fn new(username: &str, password: &str) -> Self {
        let key: [u8; 32] = rand::random();

        Self {
            username_tag: tag(&key, username.as_bytes()),
            password_tag: tag(&key, password.as_bytes()),
            key,
        }
    }

    /// Check a login attempt.
    ///
    /// Both fields are always checked so a wrong username costs the same as
    /// a wrong password.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let username_ok = verify(&self.key, username.as_bytes(), &self.username_tag);
        let password_ok = verify(&self.key, password.as_bytes(), &self.password_tag);
        username_ok & password_ok
    }
}

impl fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredential").finish_non_exhaustive()
    }
}

fn mac(key: &[u8], value: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key size");
    mac.update(value);
    mac
}

fn tag(key: &[u8], value: &[u8]) -> Vec<u8> {
    mac(key, value).finalize().into_bytes().to_vec()
}

fn verify(key: &[u8], supplied: &[u8], expected_tag: &[u8]) -> bool {
    mac(key, supplied).verify_slice(expected_tag).is_ok()
}
