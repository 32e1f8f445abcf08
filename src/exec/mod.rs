// src/exec/mod.rs

//! External process helpers.
//!
//! - [`command::run_shell`] runs a callback step's `cmd`.
//! - [`command::pipe_through`] filters a bundle through a configured compiler.

pub mod command;

pub use command::{pipe_through, run_shell};
