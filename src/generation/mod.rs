pub mod client;
pub mod prompt;
pub mod runner;

pub use client::{
    ChatRequest, ChatTransport, Generated, GenerationClient, GenerationSettings, HttpTransport,
};
pub use runner::{GenerationOutcome, GenerationRunner};
