//! Dead-man's-switch file deletion.
//!
//! Once armed, a countdown runs to a fixed deadline; when it passes, every file
//! under the configured roots is removed. The crate is split into:
//!
//! - **[`config`]**: loading and validating the switch configuration.
//! - **[`countdown`]**: the lock-guarded countdown state machine and its watcher.
//! - **[`deletion`]**: best-effort recursive file removal with per-entry error reports.
//!
//! The HTTP surface lives in the `deadman-server` binary.

pub mod config;
pub mod countdown;
pub mod deletion;
pub mod error;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
