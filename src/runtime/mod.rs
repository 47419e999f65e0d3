pub mod app;
pub mod command;
pub mod event;
pub mod key_bindings;
pub mod runner;

pub use app::Session;
pub use runner::Runtime;
