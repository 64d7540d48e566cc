/// Cookie helpers for server functions.
use actix_web::cookie::{self, Cookie};
use actix_web::http::header::{HeaderValue, SET_COOKIE};
use leptos::prelude::*;
use leptos_actix::ResponseOptions;

/// Name of the HTTP-only session cookie.
pub const SESSION_COOKIE: &str = "sess";

/// Get the ResponseOptions object from leptos_actix.
pub fn use_response_options() -> Result<ResponseOptions, ServerFnError> {
    use_context::<ResponseOptions>().ok_or_else(|| ServerFnError::new("No response options object"))
}

/// Session cookie. Not readable from scripts.
pub fn session_cookie(session_id: String, max_age_days: i64) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, session_id)
        .max_age(cookie::time::Duration::days(max_age_days))
        .same_site(cookie::SameSite::Lax)
        .path("/")
        .http_only(true)
        // .secure(true) // No dev https setup.
        .finish()
}

/// Set headers to set a cookie on the given ResponseOptions object.
pub fn set_cookie(
    response_options: &ResponseOptions,
    cookie: &Cookie,
) -> Result<(), ServerFnError> {
    response_options.append_header(
        SET_COOKIE,
        HeaderValue::from_str(&cookie.to_string())
            .map_err(|err| ServerFnError::new(format!("Failed to encode cookie: {err}")))?,
    );

    Ok(())
}

/// Set headers to delete a cookie on the given ResponseOptions object.
pub fn remove_cookie(response_options: &ResponseOptions, name: &str) -> Result<(), ServerFnError> {
    let mut removal_cookie = Cookie::named(name.to_string());
    removal_cookie.set_path("/"); // Otherwise they won't affect most cookies we set.
    removal_cookie.make_removal();

    set_cookie(response_options, &removal_cookie)
}
