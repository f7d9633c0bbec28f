//! In-memory bearer credential for the completion endpoint.
//!
//! The value read from the environment at startup acts as a fallback: a
//! runtime override that is blank does not hide it.

use crate::core::constants::API_KEY_ENV;

#[derive(Clone, Default)]
pub struct Credential {
    stored: String,
    env_default: Option<String>,
}

impl Credential {
    pub fn new(env_default: Option<String>) -> Self {
        let env_default = env_default.filter(|key| !key.trim().is_empty());
        Self {
            stored: env_default.clone().unwrap_or_default(),
            env_default,
        }
    }

    /// Reads the default from `OPENROUTER_API_KEY`.
    pub fn from_env() -> Self {
        Self::new(std::env::var(API_KEY_ENV).ok())
    }

    pub fn set(&mut self, key: impl Into<String>) {
        self.stored = key.into();
    }

    pub fn stored(&self) -> &str {
        &self.stored
    }

    pub fn resolve(&self) -> Option<&str> {
        if !self.stored.trim().is_empty() {
            Some(self.stored.as_str())
        } else {
            self.env_default.as_deref()
        }
    }

    /// Short form safe to print.
    pub fn masked(&self) -> String {
        match self.resolve() {
            Some(key) => mask_key(key),
            None => "(unset)".to_string(),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("resolved", &self.masked())
            .finish()
    }
}

pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_from_env_default() {
        let credential = Credential::new(Some("sk-env".into()));
        assert_eq!(credential.stored(), "sk-env");
        assert_eq!(credential.resolve(), Some("sk-env"));
    }

    #[test]
    fn override_wins_over_env_default() {
        let mut credential = Credential::new(Some("sk-env".into()));
        credential.set("sk-user");
        assert_eq!(credential.resolve(), Some("sk-user"));
    }

    #[test]
    fn blank_override_falls_back_to_env_default() {
        let mut credential = Credential::new(Some("sk-env".into()));
        credential.set("   ");
        assert_eq!(credential.resolve(), Some("sk-env"));
    }

    #[test]
    fn nothing_resolves_without_any_source() {
        let mut credential = Credential::new(None);
        credential.set("");
        assert_eq!(credential.resolve(), None);
        assert_eq!(credential.masked(), "(unset)");
    }

    #[test]
    fn blank_env_default_is_ignored() {
        let credential = Credential::new(Some("".into()));
        assert_eq!(credential.resolve(), None);
    }

    #[test]
    fn masking_hides_the_middle() {
        assert_eq!(mask_key("sk-or-v1-abcdef123456"), "sk-o…3456");
        assert_eq!(mask_key("short"), "*****");
        let debug = format!("{:?}", Credential::new(Some("sk-or-v1-abcdef123456".into())));
        assert!(!debug.contains("abcdef"));
    }
}
