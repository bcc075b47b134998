//! Configuration model for shaker.
//!
//! A `Profile` is a named, persisted set of provisioning parameters stored
//! as human-editable YAML under `<config_dir>/profile/`. The resolver merges
//! built-in defaults, the persisted default profile, an optional named
//! profile, and CLI overrides into a `ResolvedConfig` with strict
//! left-to-right precedence.

mod model;
mod resolve;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::{Profile, ResolvedConfig};
pub use resolve::{CliOverrides, resolve};
pub use types::SizePolicy;
