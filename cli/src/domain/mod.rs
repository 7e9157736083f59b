//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod env_file;
pub mod error;
pub mod mode;
pub mod mounts;
pub mod overlay;
pub mod registry;

pub use config::{DeployConfig, EnvOverrides, HostContext};
pub use error::DeployError;
pub use mode::RunMode;
pub use mounts::{MountSpec, parse_mounts};
pub use overlay::OverlayDocument;
