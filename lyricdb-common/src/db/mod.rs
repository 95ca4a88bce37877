//! Database connection and schema setup

pub mod init;

pub use init::*;
