//! Form inputs shared by the sign-up, profile setup and password screens.
use crate::components::ui::FieldError;
use crate::model::{Grade, Institution, Role};
use crate::validation::{Field, FieldErrors};

use leptos::prelude::*;

const INPUT_CLASS: &str =
    "py-2 px-3 w-full rounded border border-slate-300 focus:outline-violet-500";

/// Labelled text input. Editing it clears the field's error.
#[component]
pub fn TextField(
    field: Field,
    label: &'static str,
    value: RwSignal<String>,
    errors: RwSignal<FieldErrors>,
    #[prop(default = "text")] input_type: &'static str,
    #[prop(optional)] placeholder: &'static str,
    #[prop(optional)] autocomplete: &'static str,
) -> impl IntoView {
    let id = field.as_str();
    view! {
        <div>
            <label class="block mb-1 text-sm font-medium" for=id>
                {label}
            </label>
            <input
                id=id
                name=id
                type=input_type
                class=INPUT_CLASS
                placeholder=placeholder
                autocomplete=autocomplete
                aria-invalid=move || errors.with(|errors| errors.contains(field)).to_string()
                prop:value=move || value.get()
                on:input=move |ev| {
                    value.set(event_target_value(&ev));
                    errors.update(|errors| errors.clear(field));
                }
            />
            <FieldError errors=errors field=field />
        </div>
    }
}

/// Student or mentor. Switching role drops errors for the field that stops being relevant.
#[component]
pub fn RoleSelector(role: RwSignal<Role>, errors: RwSignal<FieldErrors>) -> impl IntoView {
    view! {
        <fieldset>
            <legend class="mb-1 text-sm font-medium">"I am a"</legend>
            <div class="flex gap-4">
                {Role::ALL
                    .into_iter()
                    .map(|option| {
                        view! {
                            <label class="flex gap-2 items-center">
                                <input
                                    type="radio"
                                    name="role"
                                    value=option.as_str()
                                    prop:checked=move || role.get() == option
                                    on:change=move |_| {
                                        role.set(option);
                                        errors
                                            .update(|errors| {
                                                errors.clear(Field::Grade);
                                                errors.clear(Field::Institution);
                                            });
                                    }
                                />
                                {option.label()}
                            </label>
                        }
                    })
                    .collect_view()}
            </div>
        </fieldset>
    }
}

#[component]
fn Choice(
    field: Field,
    label: &'static str,
    prompt: &'static str,
    options: Vec<(&'static str, &'static str)>,
    value: RwSignal<Option<String>>,
    errors: RwSignal<FieldErrors>,
) -> impl IntoView {
    let id = field.as_str();
    view! {
        <div>
            <label class="block mb-1 text-sm font-medium" for=id>
                {label}
            </label>
            <select
                id=id
                name=id
                class=INPUT_CLASS
                prop:value=move || value.get().unwrap_or_default()
                on:change=move |ev| {
                    let selected = event_target_value(&ev);
                    value.set((!selected.is_empty()).then_some(selected));
                    errors.update(|errors| errors.clear(field));
                }
            >
                <option value="">{prompt}</option>
                {options
                    .into_iter()
                    .map(|(option_value, option_label)| {
                        view! {
                            <option
                                value=option_value
                                selected=move || value.get().as_deref() == Some(option_value)
                            >
                                {option_label}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
            <FieldError errors=errors field=field />
        </div>
    }
}

#[component]
pub fn GradeSelector(
    grade: RwSignal<Option<String>>,
    errors: RwSignal<FieldErrors>,
) -> impl IntoView {
    view! {
        <Choice
            field=Field::Grade
            label="Grade"
            prompt="Select your grade"
            options=Grade::ALL.into_iter().map(|grade| (grade.code(), grade.label())).collect()
            value=grade
            errors=errors
        />
    }
}

#[component]
pub fn InstitutionSelector(
    institution: RwSignal<Option<String>>,
    errors: RwSignal<FieldErrors>,
) -> impl IntoView {
    view! {
        <Choice
            field=Field::Institution
            label="Institution"
            prompt="Select your institution"
            options=Institution::ALL
                .into_iter()
                .map(|institution| (institution.name(), institution.name()))
                .collect()
            value=institution
            errors=errors
        />
    }
}

/// The grade or institution selector, whichever the chosen role needs.
#[component]
pub fn MembershipFields(
    role: RwSignal<Role>,
    grade: RwSignal<Option<String>>,
    institution: RwSignal<Option<String>>,
    errors: RwSignal<FieldErrors>,
) -> impl IntoView {
    move || match role.get() {
        Role::Student => view! { <GradeSelector grade=grade errors=errors /> }.into_any(),
        Role::Mentor => {
            view! { <InstitutionSelector institution=institution errors=errors /> }.into_any()
        }
    }
}
