//! Core logic including the transcript, prompt assembly and the
//! conversation controller.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod controller;
pub mod conversation;
mod model_client;
pub mod prompt;

pub use controller::{Controller, ControllerBuilder};
