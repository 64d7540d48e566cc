#![recursion_limit = "256"]
pub mod components;
pub mod error;
pub mod gate;
pub mod model;
#[cfg(feature = "ssr")]
pub mod ssr;
pub mod strength;
pub mod validation;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::components::app::*;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
