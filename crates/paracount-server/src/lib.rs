//! Paracount server: configuration and background maintenance scheduling
//! around the [`paracount_api`] router.

pub mod config;
pub mod scheduler;

pub use config::ServerConfig;
