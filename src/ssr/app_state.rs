use crate::ssr::backend::BackendError;
use crate::ssr::config::ServerConfig;
use crate::ssr::cookie::{SESSION_COOKIE, remove_cookie, session_cookie, set_cookie};
use crate::ssr::key;

use actix_web::HttpRequest;
use fred::prelude::KeysInterface;
use fred::types::Expiration;
use leptos::prelude::*;
use leptos_actix::ResponseOptions;
use lettre::{AsyncSmtpTransport, Tokio1Executor};
use rand::{
    distributions::{Alphanumeric, DistString},
    thread_rng,
};
use std::sync::Arc;
use uuid::Uuid;

// See https://owasp.org/www-community/vulnerabilities/Insufficient_Session-ID_Length for
// considerations for secret lengths.
const SESSION_ID_LEN: usize = 32;
const SESSION_TTL_DAYS: i64 = 180;
const SESSION_TTL_SEC: i64 = SESSION_TTL_DAYS * 24 * 60 * 60;

/// Shared handles for server functions. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: sqlx::postgres::PgPool,
    pub valkey_pool: fred::clients::Pool,
    pub mailer: AsyncSmtpTransport<Tokio1Executor>,
    pub config: Arc<ServerConfig>,
}

/// Data associated with a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub account_id: Uuid,
    pub session_id: String,
}

impl AppState {
    /// The session named by the request's cookie, if it is still live.
    pub async fn get_session(
        &self,
        request: &HttpRequest,
    ) -> Result<Option<SessionInfo>, BackendError> {
        match request.cookie(SESSION_COOKIE) {
            Some(session_cookie) => self.get_session_for(session_cookie.value()).await,
            None => Ok(None),
        }
    }

    /// Like get_session, but a missing session is an error.
    pub async fn require_session(
        &self,
        request: &HttpRequest,
    ) -> Result<SessionInfo, BackendError> {
        self.get_session(request).await?.ok_or(BackendError::NotSignedIn)
    }

    /// Start a session for an account and hand the cookie to the browser.
    pub async fn create_session(
        &self,
        response_options: &ResponseOptions,
        account_id: Uuid,
    ) -> Result<SessionInfo, BackendError> {
        let session_id = Alphanumeric.sample_string(&mut thread_rng(), SESSION_ID_LEN);

        let _: () = self
            .valkey_pool
            .set(
                key::session(&session_id),
                account_id.simple().to_string(),
                Some(Expiration::EX(SESSION_TTL_SEC)),
                None,
                false,
            )
            .await?;

        set_cookie(
            response_options,
            &session_cookie(session_id.clone(), SESSION_TTL_DAYS),
        )
        .map_err(|err| BackendError::Cookie(err.to_string()))?;

        log::debug!("Created session for account {}", account_id.simple());
        Ok(SessionInfo {
            account_id,
            session_id,
        })
    }

    /// End a session on both sides.
    pub async fn destroy_session(
        &self,
        response_options: &ResponseOptions,
        session: &SessionInfo,
    ) -> Result<(), BackendError> {
        let _: () = self
            .valkey_pool
            .del(key::session(&session.session_id))
            .await?;
        remove_cookie(response_options, SESSION_COOKIE)
            .map_err(|err| BackendError::Cookie(err.to_string()))?;
        log::debug!("Ended session for account {}", session.account_id.simple());
        Ok(())
    }

    /// Helper function for clearing the server's session record. This has to be
    /// done if we notice it's corrupted in some way.
    fn background_clear_session(&self, session_id: &str) {
        let session_id = session_id.to_string();
        let valkey_pool = self.valkey_pool.clone();
        tokio::spawn(async move {
            if let Err(err) = valkey_pool.del::<(), _>(key::session(&session_id)).await {
                log::warn!("Ignored error clearing invalid session entry: {err}");
            }
        });
    }

    async fn get_session_for(&self, session_id: &str) -> Result<Option<SessionInfo>, BackendError> {
        if !valid_session_id(session_id) {
            return Err(BackendError::SessionCorrupted);
        }

        let account_id: Option<String> = self.valkey_pool.get(key::session(session_id)).await?;
        let Some(account_id) = account_id else {
            // Expired.
            return Ok(None);
        };

        match Uuid::try_parse(&account_id) {
            Ok(account_id) => Ok(Some(SessionInfo {
                account_id,
                session_id: session_id.to_string(),
            })),
            Err(err) => {
                log::error!("Unparseable account_id \"{account_id}\": {err}");
                self.background_clear_session(session_id);
                Err(BackendError::SessionCorrupted)
            }
        }
    }
}

/// Check that a session ID is in the right format before looking it up.
fn valid_session_id(session_id: &str) -> bool {
    session_id.len() == SESSION_ID_LEN && session_id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Wrapper to get AppState that's easily usable with the ? operator, for use in
/// server functions.
pub fn use_app_state() -> Result<AppState, ServerFnError> {
    use_context::<AppState>()
        .ok_or_else(|| ServerFnError::new("Couldn't get AppState from context"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_format() {
        let good = Alphanumeric.sample_string(&mut thread_rng(), SESSION_ID_LEN);
        assert!(valid_session_id(&good));
        assert!(!valid_session_id("short"));
        assert!(!valid_session_id(&"a".repeat(SESSION_ID_LEN - 1)));
        assert!(!valid_session_id(&format!("{}!", "a".repeat(SESSION_ID_LEN - 1))));
    }
}
