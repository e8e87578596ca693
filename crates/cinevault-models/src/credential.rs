use serde::{Deserialize, Serialize};

/// The single local account record
///
/// Registration overwrites it; there is never more than one.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub email: String,
    pub password: String,
}

impl Credential {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Exact, case-sensitive comparison of both fields
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"********")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_is_exact() {
        let cred = Credential::new("a@b.com", "pw1");
        assert!(cred.matches("a@b.com", "pw1"));
        assert!(!cred.matches("A@b.com", "pw1"));
        assert!(!cred.matches("a@b.com", "pw2"));
    }

    #[test]
    fn test_debug_masks_password() {
        let cred = Credential::new("a@b.com", "hunter2");
        let debug = format!("{:?}", cred);
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("hunter2"));
    }
}
