//! Library side of the `colmatch` command-line tool.

pub mod export;
pub mod inputs;
pub mod logging;
pub mod script;
