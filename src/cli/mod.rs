//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project and workspaces | `init`, `status`, `workspace list` |
//! | Artifacts | Inspection and versioning | `artifact history`, `commit`, `revert` |
//! | Generation | Batches into the workspace | `reconcile`, `generate`, `derive`, `watch` |
//! | Endpoints | Collection management | `collection new`, `collection move` |
//! | Graph | Dependency view | `graph`, `graph --dot` |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output and debug-level logs:
//! ```bash
//! scaffold --verbose derive
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod artifact;
mod collection;
mod generate;
mod graph;
mod output;
mod session;
mod watch;
mod workspace_cmd;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
pub use watch::{process_inbox, InboxResult};
