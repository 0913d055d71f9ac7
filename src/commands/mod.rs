//! @acp:module "Commands"
//! @acp:summary "CLI command implementations"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Provides implementations for all CLI commands.
//! Each command is in its own submodule for maintainability.

pub mod index;
pub mod init;
pub mod render;
pub mod replay;
pub mod resolve;
pub mod scan;

pub use index::{execute_index, IndexOptions};
pub use init::{execute_init, InitOptions};
pub use render::{execute_render, RenderOptions};
pub use replay::{
    execute_replay, load_script, run_script, ReplayOptions, ReplaySnapshot, ScriptEvent,
    ScriptStep,
};
pub use resolve::{execute_resolve, ResolveOptions};
pub use scan::{execute_scan, ScanOptions};
