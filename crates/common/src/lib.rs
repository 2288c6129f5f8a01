//! Ambient plumbing shared by every crate: startup configuration, the
//! injected application context, and the logging bootstrap.

pub mod config;
pub mod context;
pub mod logging;

pub use config::Config;
pub use context::{AppContext, UserSession};
