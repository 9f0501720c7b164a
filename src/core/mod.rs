pub mod backend;
pub mod chat_stream;
pub mod config;
pub mod message;
pub mod orchestrator;
pub mod segment;
pub mod session;
pub mod transcript;
