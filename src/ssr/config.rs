//! Server settings read from the environment at startup.
use lettre::message::Mailbox;

const DEFAULT_MAIL_FROM: &str = "Math Mentor <noreply@example.com>";
const DEFAULT_SITE_URL: &str = "http://localhost:3000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} should be set")]
    Missing(&'static str),
    #[error("MAIL_FROM is not a valid mailbox: {0}")]
    MailFrom(#[from] lettre::address::AddressError),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub valkey_url: String,
    pub smtp_url: String,
    pub mail_from: Mailbox,
    /// Public origin used to build links in emails, without a trailing slash.
    pub site_url: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let mail_from = lookup("MAIL_FROM")
            .unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string())
            .parse::<Mailbox>()?;
        let site_url = lookup("SITE_URL")
            .unwrap_or_else(|| DEFAULT_SITE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            valkey_url: required("VALKEY_URL")?,
            smtp_url: required("SMTP_URL")?,
            mail_from,
            site_url,
        })
    }

    /// Where password reset emails send people.
    pub fn reset_password_url(&self) -> String {
        format!("{}/reset-password", self.site_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("DATABASE_URL", "postgres://localhost/mathmentor"),
        ("VALKEY_URL", "redis://localhost:6379"),
        ("SMTP_URL", "smtp://localhost:1025"),
    ];

    #[test]
    fn defaults_apply() {
        let config = ServerConfig::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.site_url, "http://localhost:3000");
        assert_eq!(config.mail_from.email.to_string(), "noreply@example.com");
        assert_eq!(config.reset_password_url(), "http://localhost:3000/reset-password");
    }

    #[test]
    fn site_url_loses_trailing_slash() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("SITE_URL", "https://mathmentor.example/"));
        let config = ServerConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(
            config.reset_password_url(),
            "https://mathmentor.example/reset-password"
        );
    }

    #[test]
    fn missing_variable_is_named() {
        let err = ServerConfig::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert_eq!(err.to_string(), "SMTP_URL should be set");
    }

    #[test]
    fn bad_sender_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("MAIL_FROM", "not an address"));
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::MailFrom(_))
        ));
    }
}
