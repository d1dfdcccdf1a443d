//! Crate entry point for **branchguard**.
//!
//! This library provides the internal implementation for the `branchguard`
//! CLI. Each submodule encapsulates one responsibility (VCS adapter, config
//! store, hook lifecycle, divergence checking, branch sync). The `pub use`
//! re-exports make the command entry points and core types accessible
//! directly from the crate root.

mod check;
mod config;
mod git;
mod hook;
mod init;
mod progress;
mod safe;
mod status;
mod sync;

/// Re-export commonly used types and commands so they can be accessed from `branchguard::*`.
pub use check::{BYPASS_ENV, Divergence, DivergenceChecker, bypass_requested, cmd_check};
pub use config::{ConfigStore, GuardConfig};
pub use git::{AheadBehind, GitRepo, Vcs, is_repository};
pub use hook::{HookManager, HookState, MARKER};
pub use init::cmd_init;
pub use progress::{Progress, Silent, Spinner};
pub use safe::cmd_safe;
pub use status::cmd_status;
pub use sync::{BranchSyncer, SyncOutcome, SyncRequest, cmd_sync};
