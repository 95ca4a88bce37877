//! lyricdb command-line front end
//!
//! Argument parsing lives in [`cli`], use-case dispatch and JSON output in
//! [`commands`], subscriber setup in [`logging`]. The binary only wires them to configuration, logging and
//! the runtime.

pub mod cli;
pub mod commands;
pub mod logging;
