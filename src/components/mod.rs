pub mod app;
pub mod auth;
pub mod fields;
pub mod home;
pub mod profile_setup;
pub mod reset;
pub mod session;
pub mod ui;
