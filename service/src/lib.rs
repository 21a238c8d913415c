//! Process-level infrastructure shared by the server binary: configuration loading
//! and logger initialization.

pub mod config;
pub mod logging;
