//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BridgeConfig (validated, immutable)
//!
//! host overrides (--address / --port)
//!     → endpoint.rs (fallback to defaults, never fails)
//!     → Endpoint handed to the lifecycle controller
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Bad endpoint values degrade to defaults rather than abort startup

pub mod endpoint;
pub mod loader;
pub mod schema;
pub mod validation;

pub use endpoint::Endpoint;
pub use loader::{load_config, ConfigError};
pub use schema::{BridgeConfig, ButtonConfig, ButtonsConfig, ObservabilityConfig, RemoteConfig};
