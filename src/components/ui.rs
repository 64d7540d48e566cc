/// Common UI building blocks.
use crate::strength::{strength, strength_color};
use crate::validation::{Field, FieldErrors};

use leptos::prelude::*;
use leptos_router::components::*;
use leptos_use::{UseTimeoutFnReturn, use_timeout_fn};

const TOAST_DISMISS_MS: f64 = 5000.0;

/// Normal link.
#[component]
pub fn ANorm<H>(href: H, children: Children) -> impl IntoView
where
    H: ToHref + Send + Sync + 'static,
{
    view! {
        <A href=href>
            <span class="text-violet-700 hover:text-violet-500 hover:underline">{children()}</span>
        </A>
    }
}

#[component]
pub fn Spinner() -> impl IntoView {
    view! {
        <span
            class="inline-block w-4 h-4 rounded-full border-2 animate-spin border-slate-400 border-t-transparent"
            role="status"
        ></span>
    }
}

/// Placeholder while the session is being worked out.
#[component]
pub fn Loading() -> impl IntoView {
    view! {
        <div class="flex gap-2 justify-center items-center p-8 text-slate-600">
            <Spinner />
            "Loading..."
        </div>
    }
}

/// Message under a form field, if the field has an error.
#[component]
pub fn FieldError(errors: RwSignal<FieldErrors>, field: Field) -> impl IntoView {
    move || {
        errors
            .with(|errors| errors.get(field).map(str::to_string))
            .map(|message| {
                view! {
                    <p class="mt-1 text-sm text-red-600" id=format!("{field}-error")>
                        {message}
                    </p>
                }
            })
    }
}

/// Submit button that locks while its request is in flight.
#[component]
pub fn SubmitButton(
    #[prop(into)] pending: Signal<bool>,
    label: &'static str,
    busy_label: &'static str,
) -> impl IntoView {
    view! {
        <button
            type="submit"
            class="flex gap-2 justify-center items-center py-2 px-4 w-full font-bold text-white bg-violet-600 rounded hover:bg-violet-700 disabled:opacity-50"
            disabled=move || pending.get()
        >
            <Show when=move || pending.get()>
                <Spinner />
            </Show>
            {move || if pending.get() { busy_label } else { label }}
        </button>
    }
}

/// Four-step bar under a new password. Advisory only; the form rules decide.
#[component]
pub fn StrengthMeter(#[prop(into)] password: Signal<String>) -> impl IntoView {
    let score = Memo::new(move |_| password.with(|password| strength(password)));

    view! {
        <Show when=move || password.with(|password| !password.is_empty())>
            <div class="mt-2">
                <div class="w-full h-2 rounded bg-slate-200">
                    <div
                        class=move || format!("h-2 rounded {}", strength_color(score.get()))
                        style=move || format!("width: {}%", score.get())
                    ></div>
                </div>
                <p class="mt-1 text-xs text-slate-600">
                    "Use 8 or more characters with a mix of letters, numbers and symbols."
                </p>
            </div>
        </Show>
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    id: u64,
    kind: ToastKind,
    title: String,
    description: String,
}

/// Transient notifications. Provided by [`Toaster`].
#[derive(Clone, Copy)]
pub struct Toasts {
    list: RwSignal<Vec<Toast>>,
    next_id: StoredValue<u64>,
}

impl Toasts {
    fn new() -> Self {
        Self {
            list: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
        }
    }

    pub fn success(&self, title: impl Into<String>, description: impl Into<String>) {
        self.push(ToastKind::Success, title.into(), description.into());
    }

    pub fn error(&self, title: impl Into<String>, description: impl Into<String>) {
        self.push(ToastKind::Error, title.into(), description.into());
    }

    fn push(&self, kind: ToastKind, title: String, description: String) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        self.list.update(|list| {
            list.push(Toast {
                id,
                kind,
                title,
                description,
            })
        });
    }

    pub fn dismiss(&self, id: u64) {
        self.list.update(|list| list.retain(|toast| toast.id != id));
    }

    fn clear(&self) {
        self.list.update(Vec::clear);
    }
}

pub fn use_toasts() -> Toasts {
    expect_context::<Toasts>()
}

/// Provides [`Toasts`] to its children and shows them in a corner. Toasts go away a few seconds
/// after the last one appeared.
#[component]
pub fn Toaster(children: Children) -> impl IntoView {
    let toasts = Toasts::new();
    provide_context(toasts);

    let UseTimeoutFnReturn { start, .. } =
        use_timeout_fn(move |_: ()| toasts.clear(), TOAST_DISMISS_MS);
    Effect::new(move |_| {
        if !toasts.list.read().is_empty() {
            start(());
        }
    });

    view! {
        {children()}
        <div class="flex fixed right-4 bottom-4 z-50 flex-col gap-2 w-80">
            <For each=move || toasts.list.get() key=|toast| toast.id let:toast>
                <div
                    class=match toast.kind {
                        ToastKind::Success => "p-3 rounded border shadow bg-green-50 border-green-400",
                        ToastKind::Error => "p-3 rounded border shadow bg-red-50 border-red-400",
                    }
                    role="alert"
                    on:click=move |_| toasts.dismiss(toast.id)
                >
                    <p class="font-bold">{toast.title}</p>
                    <p class="text-sm">{toast.description}</p>
                </div>
            </For>
        </div>
    }
}
