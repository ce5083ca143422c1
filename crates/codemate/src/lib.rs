//! An out-of-the-box coding assistant that chats with a local Ollama server.
//!
//! The crate includes a CLI tool for using in the terminal. And you can also
//! use it as a library, or through the C APIs, to bring the chat into your
//! own host apps.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

pub mod config;
#[cfg(feature = "ffi")]
pub mod ffi;
mod session;

pub use session::{Session, SessionBuilder, SessionError};

/// Re-exports of [`codemate_core`] crate.
pub mod core {
    pub use codemate_core::*;
}
