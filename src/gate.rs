//! Decides which screen a guarded route shows, from session and profile state.
use crate::model::{Profile, Role, Session};
use serde::{Deserialize, Serialize};

pub const AUTH_PATH: &str = "/auth";
pub const PROFILE_SETUP_PATH: &str = "/profile-setup";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Outcome of fetching the signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileLoad {
    Pending,
    /// `None` when the account has no profile row.
    Loaded(Option<Profile>),
    Failed,
}

/// What a route asks of the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatePolicy {
    pub required_role: Option<Role>,
    pub require_completed_profile: bool,
}

impl GatePolicy {
    /// Signed in with a finished profile.
    pub const PROTECTED: GatePolicy = GatePolicy {
        required_role: None,
        require_completed_profile: true,
    };

    /// Signed in, profile in any state. Used by the profile setup screen itself.
    pub const SIGNED_IN: GatePolicy = GatePolicy {
        required_role: None,
        require_completed_profile: false,
    };

    pub const fn with_role(role: Role) -> GatePolicy {
        GatePolicy {
            required_role: Some(role),
            require_completed_profile: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateInput<'a> {
    pub session_loading: bool,
    pub session: Option<&'a Session>,
    pub profile: &'a ProfileLoad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Loading,
    Unauthenticated,
    Unauthorized,
    AuthenticatedIncompleteProfile,
    AuthenticatedComplete,
}

impl GateState {
    /// Where to send the visitor, if anywhere. Redirects replace the current history entry.
    pub fn redirect(self) -> Option<&'static str> {
        match self {
            GateState::Loading | GateState::AuthenticatedComplete => None,
            GateState::Unauthenticated => Some(AUTH_PATH),
            GateState::Unauthorized => Some(UNAUTHORIZED_PATH),
            GateState::AuthenticatedIncompleteProfile => Some(PROFILE_SETUP_PATH),
        }
    }
}

/// First matching rule wins:
///
/// 1. session still loading: `Loading`
/// 2. no authenticated session: `Unauthenticated`
/// 3. profile still loading: `Loading`
/// 4. loaded profile has the wrong role: `Unauthorized`
/// 5. profile not completed, when the route needs it: `AuthenticatedIncompleteProfile`
/// 6. otherwise `AuthenticatedComplete`
///
/// A profile that failed to load or doesn't exist counts as not completed.
pub fn decide(input: &GateInput, policy: GatePolicy) -> GateState {
    if input.session_loading {
        return GateState::Loading;
    }
    if !input.session.is_some_and(|session| session.is_authenticated) {
        return GateState::Unauthenticated;
    }

    let profile = match input.profile {
        ProfileLoad::Pending => return GateState::Loading,
        ProfileLoad::Loaded(profile) => profile.as_ref(),
        ProfileLoad::Failed => None,
    };

    if let (Some(required), Some(profile)) = (policy.required_role, profile) {
        if profile.role != required {
            return GateState::Unauthorized;
        }
    }

    let completed = profile.is_some_and(|profile| profile.profile_completed);
    if policy.require_completed_profile && !completed {
        return GateState::AuthenticatedIncompleteProfile;
    }

    GateState::AuthenticatedComplete
}
