//! CLI commands: wire configuration into the library and print results.

pub mod config;
mod info;
mod mods;
mod request_access;
mod status;

pub use config::{Config, Settings};
pub use info::{InfoOptions, info};
pub use mods::{ModsOptions, mods};
pub use request_access::request_access;
pub use status::status;
