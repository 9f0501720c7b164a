//! Quill is a terminal chat client for Gemini with prompt enhancement.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the transcript, the turn orchestrator, session settings,
//!   the Gemini client and the content segmenter.
//! - [`commands`] implements slash-command parsing used by the chat loop.
//! - [`ui`] renders transcript entries and segmented replies for output.
//! - [`api`] defines the Gemini request and response payloads.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
