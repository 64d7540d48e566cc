//! Who is signed in, as the browser sees it, and the guard that gates routes on it.
use crate::components::ui::Loading;
use crate::gate::{GateInput, GatePolicy, GateState, ProfileLoad, decide};
use crate::model::{Profile, Session};

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::components::Redirect;
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "ssr")]
mod ssr {
    pub use crate::ssr::app_state::*;
    pub use crate::ssr::backend::*;
    pub use crate::ssr::cookie::*;
    pub use actix_web::HttpRequest;
    pub use leptos_actix::extract;
}

/// Session and profile fetched together, so they always agree with each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSnapshot {
    pub session: Option<Session>,
    pub profile: ProfileLoad,
}

impl AuthSnapshot {
    pub fn signed_out() -> Self {
        Self {
            session: None,
            profile: ProfileLoad::Loaded(None),
        }
    }
}

/// Something that changes who is signed in or what their profile holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedUp,
    SignedOut,
    PasswordUpdated,
    ProfileUpdated,
}

impl fmt::Display for AuthEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuthEvent::SignedIn => "signed in",
            AuthEvent::SignedUp => "signed up",
            AuthEvent::SignedOut => "signed out",
            AuthEvent::PasswordUpdated => "password updated",
            AuthEvent::ProfileUpdated => "profile updated",
        })
    }
}

/// Current session and profile of the visitor.
///
/// A session cookie that is corrupt is cleared and reported as signed out. A profile that can't be
/// read is reported as [`ProfileLoad::Failed`] rather than failing the whole call.
#[server]
pub async fn get_auth_state() -> Result<AuthSnapshot, ServerFnError> {
    use self::ssr::*;

    let request: HttpRequest = extract().await?;
    let app_state = use_app_state()?;

    let session = match app_state.get_session(&request).await {
        Ok(session) => session,
        Err(BackendError::SessionCorrupted) => {
            remove_cookie(&use_response_options()?, SESSION_COOKIE)?;
            None
        }
        Err(err) => return Err(err.into_server_error()),
    };
    let Some(session) = session else {
        return Ok(AuthSnapshot::signed_out());
    };

    let profile = match app_state.get_profile(session.account_id).await {
        Ok(profile) => ProfileLoad::Loaded(profile),
        Err(err) => {
            log::error!(
                "Couldn't load profile of account {}: {err:?}",
                session.account_id.simple()
            );
            ProfileLoad::Failed
        }
    };

    Ok(AuthSnapshot {
        session: Some(Session::new(session.account_id.simple().to_string())),
        profile,
    })
}

/// End the current session. Signing out without a session is not an error.
#[server]
pub async fn sign_out() -> Result<(), ServerFnError> {
    use self::ssr::*;

    let request: HttpRequest = extract().await?;
    let app_state = use_app_state()?;
    let response_options = use_response_options()?;

    match app_state.get_session(&request).await {
        Ok(Some(session)) => app_state
            .destroy_session(&response_options, &session)
            .await
            .map_err(BackendError::into_server_error),
        Ok(None) => Ok(()),
        Err(BackendError::SessionCorrupted) => {
            remove_cookie(&response_options, SESSION_COOKIE)?;
            Ok(())
        }
        Err(err) => Err(err.into_server_error()),
    }
}

/// Session store for the whole app. Copy it freely; it only holds signal handles.
#[derive(Clone, Copy)]
pub struct AuthContext {
    version: RwSignal<u64>,
    snapshot: Resource<Result<AuthSnapshot, ServerFnError>>,
}

impl AuthContext {
    fn new() -> Self {
        let version = RwSignal::new(0);
        let snapshot = Resource::new(move || version.get(), |_| get_auth_state());
        Self { version, snapshot }
    }

    /// Refetch session and profile after something changed them.
    pub fn notify(&self, event: AuthEvent) {
        leptos::logging::log!("Auth event: {event}");
        self.version.update(|version| *version += 1);
    }

    /// Latest snapshot, or `None` while the first fetch is in flight. A failed fetch reads as
    /// signed out.
    pub fn snapshot(&self) -> Option<AuthSnapshot> {
        self.snapshot.get().map(|result| {
            result.unwrap_or_else(|err| {
                leptos::logging::warn!("Couldn't fetch session: {err}");
                AuthSnapshot::signed_out()
            })
        })
    }

    /// Read inside a `<Transition>`, so server rendering waits for the snapshot.
    pub fn gate(&self, policy: GatePolicy) -> GateState {
        gate_snapshot(self.snapshot().as_ref(), policy)
    }

    pub fn is_signed_in(&self) -> bool {
        self.snapshot().is_some_and(|snapshot| {
            snapshot
                .session
                .is_some_and(|session| session.is_authenticated)
        })
    }

    pub fn profile(&self) -> Option<Profile> {
        match self.snapshot()?.profile {
            ProfileLoad::Loaded(profile) => profile,
            ProfileLoad::Pending | ProfileLoad::Failed => None,
        }
    }
}

/// Gate decision for a snapshot, where `None` means the first fetch hasn't landed yet.
pub fn gate_snapshot(snapshot: Option<&AuthSnapshot>, policy: GatePolicy) -> GateState {
    match snapshot {
        None => decide(
            &GateInput {
                session_loading: true,
                session: None,
                profile: &ProfileLoad::Pending,
            },
            policy,
        ),
        Some(snapshot) => decide(
            &GateInput {
                session_loading: false,
                session: snapshot.session.as_ref(),
                profile: &snapshot.profile,
            },
            policy,
        ),
    }
}

pub fn provide_auth_context() -> AuthContext {
    let auth = AuthContext::new();
    provide_context(auth);
    auth
}

pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}

/// Navigation options for redirects that shouldn't leave a history entry behind.
pub fn replace() -> NavigateOptions {
    NavigateOptions {
        replace: true,
        ..Default::default()
    }
}

/// Renders its children only when the visitor passes `policy`, and redirects otherwise.
#[component]
pub fn Guard(policy: GatePolicy, children: ChildrenFn) -> impl IntoView {
    view! {
        <Transition fallback=|| view! { <Loading /> }>
            <GateOutcome policy=policy content=children.clone() />
        </Transition>
    }
}

/// Body of [`Guard`]. Created inside the transition so the snapshot read is awaited during server
/// rendering. The memo keeps the content mounted across refetches that don't change the outcome.
#[component]
fn GateOutcome(policy: GatePolicy, content: ChildrenFn) -> impl IntoView {
    let auth = use_auth();
    let state = Memo::new(move |_| auth.gate(policy));

    move || {
        let state = state.get();
        match state.redirect() {
            Some(path) => view! { <Redirect path=path options=replace() /> }.into_any(),
            None if state == GateState::Loading => view! { <Loading /> }.into_any(),
            None => content().into_any(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Grade, Role};

    fn signed_in(profile: ProfileLoad) -> AuthSnapshot {
        AuthSnapshot {
            session: Some(Session::new("acc1")),
            profile,
        }
    }

    #[test]
    fn unresolved_snapshot_is_loading() {
        for policy in [GatePolicy::PROTECTED, GatePolicy::SIGNED_IN] {
            assert_eq!(gate_snapshot(None, policy), GateState::Loading);
        }
    }

    #[test]
    fn resolved_snapshot_decides_without_loading() {
        let signed_out = AuthSnapshot::signed_out();
        assert_eq!(
            gate_snapshot(Some(&signed_out), GatePolicy::PROTECTED),
            GateState::Unauthenticated
        );

        let failed = signed_in(ProfileLoad::Failed);
        assert_eq!(
            gate_snapshot(Some(&failed), GatePolicy::PROTECTED),
            GateState::AuthenticatedIncompleteProfile
        );
        assert_eq!(
            gate_snapshot(Some(&failed), GatePolicy::SIGNED_IN),
            GateState::AuthenticatedComplete
        );

        let student = signed_in(ProfileLoad::Loaded(Some(Profile {
            id: "acc1".into(),
            name: "Aisyah".into(),
            role: Role::Student,
            grade: Some(Grade::K1),
            institution: None,
            profile_completed: true,
        })));
        assert_eq!(
            gate_snapshot(Some(&student), GatePolicy::with_role(Role::Mentor)),
            GateState::Unauthorized
        );
    }
}
