//! copyrouter - marketing-copy gateway over multiple AI text providers
//!
//! This library provides the core functionality for the copyrouter server,
//! including configuration, prompt templating, provider adapters, and the
//! ordered-fallback router.

pub mod config;
pub mod content;
pub mod error;
pub mod images;
pub mod providers;
pub mod proxy;
pub mod router;

pub use config::Config;
pub use error::{Error, Result};
