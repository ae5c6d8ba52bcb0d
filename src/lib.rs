pub mod arguments;
pub mod cli;
pub mod config;
pub mod consts;
pub mod core;
pub mod error;
pub mod executor;
pub mod flags;
pub mod interface;
pub mod protocol;
pub mod resources;
pub mod sample;

pub use error::{LooperError, Result, SkipReason};
