//! Implementation of the 4 phases of a rollup.
//!
//! ## Overview
//!
//! A rollup follows 4 phases:
//! 1. Render Context - Read the target's stored context and overlay the caller's variables
//! 2. Rendering - Render the template into a scratch directory and validate the result
//! 3. Applying Strategies - Merge every rendered file with its target file in memory
//! 4. Writing to Disk - Write the staged files into the target project
//!
//! Loading `rollup.yaml` and the template's git metadata happens up front in
//! the [`orchestrator`], so configuration errors surface before any rendering.
//!
//! Each phase depends only on the previous phases and the foundation layers.

pub mod apply;
pub mod context;
pub mod orchestrator;
pub mod render;
pub mod write;

// Re-export phase modules by position
pub use apply as phase3;
pub use context as phase1;
pub use render as phase2;
pub use write as phase4;

pub use apply::{FileChange, FileReport};
pub use orchestrator::{execute_rollup, RollupOptions, RollupReport};
