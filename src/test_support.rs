//! Shared helpers for tests.

use crate::context::ConfigContext;
use tempfile::TempDir;

/// A fresh config directory and its context. Keep the `TempDir` alive for
/// the duration of the test; the directory is removed when it drops.
pub(crate) fn temp_context() -> (TempDir, ConfigContext) {
    let dir = TempDir::new().unwrap();
    let ctx = ConfigContext::resolve(Some(dir.path())).unwrap();
    (dir, ctx)
}
