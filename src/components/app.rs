use leptos::prelude::*;
use leptos_meta::{Body, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment, WildcardSegment,
    components::{Redirect, Route, Router, Routes},
};

use crate::components::auth::AuthRoutes;
use crate::components::home::{ClassesPage, HomePage};
use crate::components::profile_setup::ProfileSetupPage;
use crate::components::reset::ResetPassword;
use crate::components::session::{provide_auth_context, replace};
use crate::components::ui::*;
use crate::gate::AUTH_PATH;

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();
    provide_auth_context();

    view! {
        // injects a stylesheet into the document <head>
        // id=leptos means cargo-leptos will hot-reload this stylesheet
        <Stylesheet id="leptos" href="/pkg/mathmentor.css" />

        <Title text="Math Mentor" />

        <Toaster>
            <Router>
                <main>
                    <Routes fallback=move || "Not found.">
                        <Route path=StaticSegment("") view=HomePage />
                        <AuthRoutes />
                        <Route path=StaticSegment("reset-password") view=ResetPassword />
                        <Route path=StaticSegment("profile-setup") view=ProfileSetupPage />
                        <Route path=StaticSegment("classes") view=ClassesPage />
                        <Route path=StaticSegment("unauthorized") view=Unauthorized />
                        <Route path=WildcardSegment("any") view=UnknownPath />
                    </Routes>
                    <Body {..} class="min-h-screen bg-slate-50" />
                </main>
            </Router>
        </Toaster>
    }
}

/// Shown when the signed-in user's role doesn't fit the page.
#[component]
fn Unauthorized() -> impl IntoView {
    view! {
        <div class="p-6 mx-auto mt-8 max-w-md text-center bg-white rounded shadow">
            <h1 class="mb-2 text-2xl font-bold">"Access denied"</h1>
            <p class="mb-4 text-slate-600">"You don't have permission to view this page."</p>
            <ANorm href="/">"Back to home"</ANorm>
        </div>
    }
}

/// Unknown paths go to the sign-in screen.
#[component]
fn UnknownPath() -> impl IntoView {
    view! { <Redirect path=AUTH_PATH options=replace() /> }
}
