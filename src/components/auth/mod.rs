/// Sign-in, sign-up and forgotten password screens, with their server functions.
use crate::components::session::{replace, use_auth};

use leptos::prelude::*;
use leptos_router::components::*;
use leptos_router::*;

mod forgot;
mod sign_in;
mod sign_up;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    SignIn,
    SignUp,
}

/// Visual wrapper around all auth views. Visitors who are already signed in go home.
#[component]
fn AuthWrapper() -> impl IntoView {
    let auth = use_auth();

    view! {
        <Transition fallback=|| ()>
            <Show when=move || auth.is_signed_in()>
                <Redirect path="/" options=replace() />
            </Show>
        </Transition>
        <div class="mx-auto mt-8 max-w-md">
            <h1 class="mb-1 text-4xl font-bold text-center">"Math Mentor"</h1>
            <p class="mb-6 text-center text-slate-600">"Learn maths with a mentor by your side."</p>
            <Outlet />
        </div>
    }
}

/// Sign-in and sign-up forms behind two tabs.
#[component]
fn AuthTabs() -> impl IntoView {
    let tab = RwSignal::new(Tab::SignIn);
    let tab_class = move |this: Tab| {
        if tab.get() == this {
            "flex-1 py-2 font-bold border-b-2 border-violet-600"
        } else {
            "flex-1 py-2 border-b-2 border-transparent text-slate-500"
        }
    };

    view! {
        <div class="p-6 bg-white rounded shadow">
            <div class="flex mb-4" role="tablist">
                <button
                    type="button"
                    role="tab"
                    class=move || tab_class(Tab::SignIn)
                    on:click=move |_| tab.set(Tab::SignIn)
                >
                    "Sign in"
                </button>
                <button
                    type="button"
                    role="tab"
                    class=move || tab_class(Tab::SignUp)
                    on:click=move |_| tab.set(Tab::SignUp)
                >
                    "Sign up"
                </button>
            </div>
            {move || match tab.get() {
                Tab::SignIn => view! { <sign_in::SignInForm /> }.into_any(),
                Tab::SignUp => view! { <sign_up::SignUpForm /> }.into_any(),
            }}
        </div>
    }
}

/// Route definitions for /auth subtree.
#[component(transparent)]
pub fn AuthRoutes() -> impl MatchNestedRoutes + Clone {
    view! {
        <ParentRoute path=path!("auth") view=AuthWrapper>
            <Route path=path!("") view=AuthTabs />
            <Route path=path!("forgot") view=forgot::ForgotPassword />
        </ParentRoute>
    }
    .into_inner()
}
