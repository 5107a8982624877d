//! Streams a Gemini analysis of a remote video to the terminal.
//!
//! A single `streamGenerateContent` request carries a video reference and a
//! prompt; each streamed chunk is either printed or, when it carries inline
//! binary data, saved to a sequentially numbered file.

pub mod ai;
pub mod app;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod prompts;

pub use error::{Error, Result};
