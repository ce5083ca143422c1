//! An abstraction layer for local text-generation servers.
//!
//! This crate establishes a small protocol between the conversation logic
//! and the inference backends, so that the conversation can be driven by a
//! real HTTP server, a scripted fake in tests, or anything else that can
//! turn a flat prompt into a reply.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
