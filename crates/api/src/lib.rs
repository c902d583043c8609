//! Graph API - the command interface between the canvas and the document.
//!
//! This crate defines the typed command language the canvas emits.
//! Commands represent user intent and are:
//! - Serializable (for recording, scripting and replay)
//! - Intent-based (what to do, not how to do it)
//! - Fire-and-forget (the canvas only sees their effect in the next snapshot)
//!
//! # Example
//! ```ignore
//! use api::{Command, execute_command};
//!
//! let cmd = Command::connect(source, 0, target, 0);
//! let result = execute_command(&mut snapshot, cmd);
//! ```

mod command;
mod executor;

pub use command::*;
pub use executor::{execute_command, execute_commands, ExecuteError};
