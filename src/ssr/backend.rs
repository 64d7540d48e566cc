//! Account store behind the server functions: credentials, profiles and password resets.
use crate::model::{Grade, Institution, Profile, ProfileDetails, RESET_LINK_EXPIRATION_MIN, Role};
use crate::ssr::app_state::AppState;
use crate::ssr::key;
use crate::ssr::mail;
use crate::validation::{FormKind, FormState, validate};

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use fred::prelude::KeysInterface;
use fred::types::Expiration;
use leptos::prelude::ServerFnError;
use lettre::AsyncTransport;
use rand::{
    distributions::{Alphanumeric, DistString},
    thread_rng,
};
use uuid::Uuid;

pub const RESET_TOKEN_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Invalid login credentials")]
    InvalidCredentials,
    #[error("An account with this email already exists")]
    DuplicateAccount,
    #[error("This password reset link is invalid or has expired")]
    InvalidResetToken,
    #[error("You need to sign in first")]
    NotSignedIn,
    #[error("We couldn't find your account. Try signing in again.")]
    AccountMissing,
    #[error("Your session was corrupted. Try logging in again.")]
    SessionCorrupted,
    /// Input the form should have caught.
    #[error("{0}")]
    Rejected(String),
    #[error("Something went wrong on our side. Please try again.")]
    Database(#[from] sqlx::Error),
    #[error("Something went wrong on our side. Please try again.")]
    Valkey(#[from] fred::error::Error),
    #[error("Something went wrong on our side. Please try again.")]
    Internal(String),
    #[error("Something went wrong on our side. Please try again.")]
    Cookie(String),
    #[error("Something went wrong on our side. Please try again.")]
    PasswordHash(argon2::password_hash::Error),
    #[error("Couldn't send email. Please try again later.")]
    Mail(String),
}

impl BackendError {
    /// Failures of our own infrastructure, as opposed to requests we turned down.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            BackendError::Database(_)
                | BackendError::Valkey(_)
                | BackendError::Internal(_)
                | BackendError::Cookie(_)
                | BackendError::PasswordHash(_)
                | BackendError::Mail(_)
        )
    }

    /// Log with full detail, and keep only the user-facing message for the browser.
    pub fn into_server_error(self) -> ServerFnError {
        if self.is_internal() {
            log::error!("Backend failure: {self:?}");
        } else {
            log::info!("Request rejected: {self}");
        }
        ServerFnError::new(self)
    }
}

impl From<argon2::password_hash::Error> for BackendError {
    fn from(value: argon2::password_hash::Error) -> Self {
        BackendError::PasswordHash(value)
    }
}

/// Run the form rules again on the server. The browser's check is only a courtesy.
pub fn check_form(form: &FormState, kind: FormKind) -> Result<(), BackendError> {
    let errors = validate(form, kind);
    let Some(message) = errors.first_message() else {
        return Ok(());
    };
    let fields = errors
        .iter()
        .map(|(field, _)| field.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    log::info!("Rejected {kind:?} form with bad fields: {fields}");
    Err(BackendError::Rejected(message.to_string()))
}

/// Emails are compared and stored without case or surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String, BackendError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn verify_password(password: &str, password_hash: &str) -> Result<bool, BackendError> {
    let parsed_hash = PasswordHash::new(password_hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn valid_reset_token(token: &str) -> bool {
    token.len() == RESET_TOKEN_LEN && token.chars().all(|c| c.is_ascii_alphanumeric())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

impl AppState {
    /// Check credentials and return the account they belong to.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Uuid, BackendError> {
        let account = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            select id, password_hash
            from account
            where email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.db_pool)
        .await?;

        let Some((id, password_hash)) = account else {
            return Err(BackendError::InvalidCredentials);
        };
        if verify_password(password, &password_hash)? {
            Ok(id)
        } else {
            Err(BackendError::InvalidCredentials)
        }
    }

    /// Create an account together with its profile.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        details: &ProfileDetails,
    ) -> Result<Uuid, BackendError> {
        let password_hash = hash_password(password)?;

        // Create a transaction for both creating the account and the profile.
        let mut transaction = self.db_pool.begin().await?;

        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            insert into account (email, password_hash)
            values ($1, $2)
            returning id
            "#,
        )
        .bind(normalize_email(email))
        .bind(&password_hash)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                BackendError::DuplicateAccount
            } else {
                err.into()
            }
        })?;

        let (grade, institution) = details.membership.columns();
        sqlx::query(
            r#"
            insert into profile (id, name, role, grade, institution, profile_completed)
            values ($1, $2, $3, $4, $5, true)
            "#,
        )
        .bind(id)
        .bind(&details.name)
        .bind(details.membership.role().as_str())
        .bind(grade.map(Grade::code))
        .bind(institution.map(Institution::name))
        .execute(&mut *transaction)
        .await?;

        transaction.commit().await?;

        log::info!("Created account {}", id.simple());
        Ok(id)
    }

    /// Mail a one-time reset link if the email belongs to an account. Unknown emails succeed
    /// without sending anything, so the form can't be used to probe for accounts.
    pub async fn request_password_reset(
        &self,
        email: &str,
        redirect_url: &str,
    ) -> Result<(), BackendError> {
        let email = normalize_email(email);
        let address = email
            .parse::<lettre::Address>()
            .map_err(|_| BackendError::Rejected("Invalid email format".to_string()))?;

        let account = sqlx::query_as::<_, (Uuid,)>("select id from account where email = $1")
            .bind(&email)
            .fetch_optional(&self.db_pool)
            .await?;
        let Some((account_id,)) = account else {
            log::info!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = {
            let mut token = String::new();
            for i in 0..=10 {
                if i >= 10 {
                    // This may happen in a very severe DDoS if there are no rate limiting
                    // countermeasures at all. Otherwise, it should never happen.
                    return Err(BackendError::Internal(
                        "couldn't generate a unique password reset token".to_string(),
                    ));
                }
                token = Alphanumeric.sample_string(&mut thread_rng(), RESET_TOKEN_LEN);
                let stored: bool = self
                    .valkey_pool
                    .set(
                        key::password_reset(&token),
                        account_id.simple().to_string(),
                        Some(Expiration::EX(RESET_LINK_EXPIRATION_MIN * 60)),
                        Some(fred::prelude::SetOptions::NX),
                        false,
                    )
                    .await?;
                if stored {
                    break;
                }
            }
            token
        };

        let link = format!("{redirect_url}?token={token}");
        let message = mail::password_reset(
            self.config.mail_from.clone(),
            address,
            &link,
            RESET_LINK_EXPIRATION_MIN,
        )
        .map_err(|err| BackendError::Mail(err.to_string()))?;
        self.mailer
            .send(message)
            .await
            .map_err(|err| BackendError::Mail(err.to_string()))?;

        log::info!("Sent password reset link to account {}", account_id.simple());
        Ok(())
    }

    /// Set a new password through a mailed reset token, returning the account it was issued for.
    /// The token is only used up once the password is saved, so a failed update leaves the link
    /// working.
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<Uuid, BackendError> {
        if !valid_reset_token(token) {
            return Err(BackendError::InvalidResetToken);
        }

        let key = key::password_reset(token);
        let account_id: Option<String> = self.valkey_pool.get(&key).await?;
        let account_id = account_id.ok_or(BackendError::InvalidResetToken)?;
        let account_id = Uuid::try_parse(&account_id).map_err(|err| {
            BackendError::Internal(format!("reset token account id {account_id:?}: {err}"))
        })?;

        self.update_password(account_id, new_password).await?;

        let removed: i64 = self.valkey_pool.del(&key).await?;
        if removed == 0 {
            log::warn!("Reset token for account {} was used twice", account_id.simple());
        }
        Ok(account_id)
    }

    pub async fn update_password(
        &self,
        account_id: Uuid,
        new_password: &str,
    ) -> Result<(), BackendError> {
        let password_hash = hash_password(new_password)?;
        let result = sqlx::query(
            r#"
            update account
            set password_hash = $1
            where id = $2
            "#,
        )
        .bind(&password_hash)
        .bind(account_id)
        .execute(&self.db_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(BackendError::AccountMissing);
        }
        log::info!("Updated password of account {}", account_id.simple());
        Ok(())
    }

    /// Save the profile form and mark the profile completed.
    pub async fn update_profile(
        &self,
        account_id: Uuid,
        details: &ProfileDetails,
    ) -> Result<(), BackendError> {
        let (grade, institution) = details.membership.columns();
        sqlx::query(
            r#"
            insert into profile (id, name, role, grade, institution, profile_completed)
            values ($1, $2, $3, $4, $5, true)
            on conflict (id) do update
            set
              name = excluded.name,
              role = excluded.role,
              grade = excluded.grade,
              institution = excluded.institution,
              profile_completed = true
            "#,
        )
        .bind(account_id)
        .bind(&details.name)
        .bind(details.membership.role().as_str())
        .bind(grade.map(Grade::code))
        .bind(institution.map(Institution::name))
        .execute(&self.db_pool)
        .await
        .map_err(|err| {
            // The account was deleted while the session lived on.
            if matches!(&err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation()) {
                BackendError::AccountMissing
            } else {
                err.into()
            }
        })?;

        log::info!("Completed profile of account {}", account_id.simple());
        Ok(())
    }

    pub async fn get_profile(&self, account_id: Uuid) -> Result<Option<Profile>, BackendError> {
        let row = sqlx::query_as::<
            _,
            (Uuid, String, String, Option<String>, Option<String>, bool),
        >(
            r#"
            select id, name, role, grade, institution, profile_completed
            from profile
            where id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.db_pool)
        .await?;

        row.map(profile_from_row).transpose()
    }
}

fn profile_from_row(
    (id, name, role, grade, institution, profile_completed): (
        Uuid,
        String,
        String,
        Option<String>,
        Option<String>,
        bool,
    ),
) -> Result<Profile, BackendError> {
    let corrupt = |err: crate::model::UnknownValue| {
        BackendError::Internal(format!("profile {}: {err}", id.simple()))
    };
    Ok(Profile {
        id: id.simple().to_string(),
        name,
        role: role.parse::<Role>().map_err(corrupt)?,
        grade: grade.map(|g| g.parse::<Grade>()).transpose().map_err(corrupt)?,
        institution: institution
            .map(|i| i.parse::<Institution>())
            .transpose()
            .map_err(corrupt)?,
        profile_completed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Siti@Example.COM "), "siti@example.com");
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("Aa123456").unwrap();
        assert!(verify_password("Aa123456", &hash).unwrap());
        assert!(!verify_password("Aa123457", &hash).unwrap());
    }

    #[test]
    fn reset_token_format() {
        assert!(valid_reset_token(&"a1".repeat(RESET_TOKEN_LEN / 2)));
        assert!(!valid_reset_token("abc"));
        assert!(!valid_reset_token(&"-".repeat(RESET_TOKEN_LEN)));
    }

    #[test]
    fn profile_rows_parse() {
        let id = Uuid::nil();
        let profile = profile_from_row((
            id,
            "Nurul".into(),
            "student".into(),
            Some("G3".into()),
            None,
            true,
        ))
        .unwrap();
        assert_eq!(profile.role, Role::Student);
        assert_eq!(profile.grade, Some(Grade::G3));
        assert_eq!(profile.id, id.simple().to_string());

        let err = profile_from_row((id, "X".into(), "admin".into(), None, None, false));
        assert!(matches!(err, Err(BackendError::Internal(_))));
    }

    #[test]
    fn server_rechecks_forms() {
        let form = FormState {
            email: "nope".into(),
            password: "Aa123456".into(),
            ..Default::default()
        };
        match check_form(&form, FormKind::SignIn) {
            Err(BackendError::Rejected(message)) => assert_eq!(message, "Invalid email format"),
            other => panic!("unexpected {other:?}"),
        }
        let form = FormState {
            email: "siti@example.com".into(),
            ..form
        };
        assert!(check_form(&form, FormKind::SignIn).is_ok());
    }

    #[test]
    fn internal_errors_hide_detail() {
        let err = BackendError::Internal("profile 123: unknown role".into());
        assert!(err.is_internal());
        assert_eq!(
            err.to_string(),
            "Something went wrong on our side. Please try again."
        );
        assert!(!BackendError::InvalidCredentials.is_internal());
    }

    mod live {
        //! Run against real services with
        //! `DATABASE_URL=... VALKEY_URL=... cargo test --features ssr -- --ignored`.
        use super::*;
        use crate::model::Membership;
        use crate::ssr::config::ServerConfig;
        use fred::prelude::ClientLike;
        use lettre::{AsyncSmtpTransport, Tokio1Executor};
        use std::sync::Arc;

        async fn app_state() -> AppState {
            let database_url = std::env::var("DATABASE_URL").unwrap();
            let valkey_url = std::env::var("VALKEY_URL").unwrap();

            let db_pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(2)
                .connect(&database_url)
                .await
                .unwrap();
            sqlx::migrate!().run(&db_pool).await.unwrap();

            let valkey_config = fred::prelude::Config::from_url(&valkey_url).unwrap();
            let valkey_pool =
                fred::prelude::Pool::new(valkey_config, None, None, None, 1).unwrap();
            valkey_pool.init().await.unwrap();

            AppState {
                db_pool,
                valkey_pool,
                mailer: AsyncSmtpTransport::<Tokio1Executor>::unencrypted_localhost(),
                config: Arc::new(ServerConfig {
                    database_url,
                    valkey_url,
                    smtp_url: "smtp://localhost:25".into(),
                    mail_from: "Math Mentor <noreply@example.com>".parse().unwrap(),
                    site_url: "http://localhost:3000".into(),
                }),
            }
        }

        async fn issue_token(app_state: &AppState, account_id: Uuid) -> String {
            let token = Alphanumeric.sample_string(&mut thread_rng(), RESET_TOKEN_LEN);
            let _: () = app_state
                .valkey_pool
                .set(
                    key::password_reset(&token),
                    account_id.simple().to_string(),
                    Some(Expiration::EX(60)),
                    None,
                    false,
                )
                .await
                .unwrap();
            token
        }

        async fn token_account(app_state: &AppState, token: &str) -> Option<String> {
            app_state
                .valkey_pool
                .get(key::password_reset(token))
                .await
                .unwrap()
        }

        #[actix_web::test]
        #[ignore = "needs DATABASE_URL and VALKEY_URL"]
        async fn failed_reset_leaves_link_usable() {
            let app_state = app_state().await;
            // No account row exists, so saving the password fails.
            let ghost = Uuid::now_v7();
            let token = issue_token(&app_state, ghost).await;

            let err = app_state.reset_password(&token, "Maths2025").await;
            assert!(matches!(err, Err(BackendError::AccountMissing)), "{err:?}");
            assert_eq!(
                token_account(&app_state, &token).await,
                Some(ghost.simple().to_string())
            );
        }

        #[actix_web::test]
        #[ignore = "needs DATABASE_URL and VALKEY_URL"]
        async fn reset_link_works_once() {
            let app_state = app_state().await;
            let email = format!("reset-{}@example.com", Uuid::now_v7().simple());
            let details = ProfileDetails {
                name: "Nurul".into(),
                membership: Membership::Student { grade: Grade::G2 },
            };
            let account_id = app_state.sign_up(&email, "Maths2025", &details).await.unwrap();
            let token = issue_token(&app_state, account_id).await;

            assert_eq!(
                app_state.reset_password(&token, "Algebra99").await.unwrap(),
                account_id
            );
            assert_eq!(token_account(&app_state, &token).await, None);
            assert_eq!(app_state.sign_in(&email, "Algebra99").await.unwrap(), account_id);
            assert!(matches!(
                app_state.reset_password(&token, "Geometry7X").await,
                Err(BackendError::InvalidResetToken)
            ));
        }
    }
}
