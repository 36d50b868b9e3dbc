pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod render;
pub mod server;
pub mod validation;

pub use dashboard::Dashboard;
pub use error::{Error, Result};
