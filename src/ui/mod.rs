//! Presentation for the command-line front-ends.
//!
//! [`render`] turns transcript entries and segmented model text into
//! terminal output or an HTML fragment. It never touches orchestration
//! state; [`crate::core`] owns that.

pub mod render;
