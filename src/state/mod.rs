pub mod app_settings;
pub mod app_state;
pub mod cache;
pub mod fetchers;
pub mod league;
pub mod messages;
pub mod overlay;
pub mod views;
