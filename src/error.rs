//! Errors from submitting a form, as the browser sees them.
use leptos::prelude::ServerFnError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The server ran and said no: wrong credentials, duplicate account, expired link.
    #[error("{0}")]
    Auth(String),
    /// The server couldn't be reached or answered with something unreadable.
    #[error("Couldn't reach the server: {0}")]
    Network(String),
}

impl SubmitError {
    pub fn is_network(&self) -> bool {
        matches!(self, SubmitError::Network(_))
    }

    /// Log and turn into notification text.
    pub fn report(&self, context: &str) -> String {
        if self.is_network() {
            leptos::logging::warn!("{context} failed in transit: {self}");
        } else {
            leptos::logging::log!("{context} rejected: {self}");
        }
        self.to_string()
    }
}

impl From<ServerFnError> for SubmitError {
    fn from(err: ServerFnError) -> Self {
        match err {
            ServerFnError::ServerError(message) => SubmitError::Auth(message),
            ServerFnError::WrappedServerError(inner) => SubmitError::Auth(inner.to_string()),
            ServerFnError::Request(message) | ServerFnError::Response(message) => {
                SubmitError::Network(message)
            }
            other => SubmitError::Network(other.to_string()),
        }
    }
}
