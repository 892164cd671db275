pub mod config;
pub mod fs;
pub mod opener;
pub mod prefs;
pub mod ui;
