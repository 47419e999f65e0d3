pub mod config;
pub mod core;
pub mod error;
pub mod generation;
pub mod logging;
pub mod runtime;
pub mod state;
pub mod templates;
pub mod terminal;
pub mod ui;
pub mod widgets;

pub use config::AppConfig;
pub use error::AppError;
pub use runtime::{Runtime, Session};
