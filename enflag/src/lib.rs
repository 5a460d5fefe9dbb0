//! Layered configuration population from flags, environment variables,
//! `.env` files and declared defaults
//!
//! `enflag` fills a plain struct with configuration values by consulting,
//! in priority order, command-line flags, process environment variables
//! (with `.env`-style files layered beneath them), and per-field default
//! literals. Nested structs are supported with hierarchical name
//! prefixing, and fields may be primitives, durations, or comma-separated
//! sequences thereof.
//!
//! # Precedence
//!
//! For every field: **flag > environment > default**. Within the
//! environment tier, a real process variable always beats a value read
//! from an env file, and alternate names are tried in declaration order.
//! An empty string never counts as a value — it falls through to the next
//! tier exactly as if the variable were unset.
//!
//! # Example
//!
//! ```rust
//! use enflag::Enflag;
//! use std::time::Duration;
//!
//! #[derive(Debug, Default, Enflag)]
//! struct Config {
//!     // SERVER_ADDR, or --server-addr via a flag backend
//!     #[conf(default = "127.0.0.1:8080")]
//!     pub server_addr: String,
//!
//!     // PORT first, then SERVER_PORT
//!     #[conf(env = "PORT,SERVER_PORT", default = "8080")]
//!     pub port: u16,
//!
//!     #[conf(default = "30s")]
//!     pub request_timeout: Duration,
//!
//!     #[conf(nested, prefix = "DB_")]
//!     pub database: DbConfig,
//! }
//!
//! #[derive(Debug, Default, Enflag)]
//! struct DbConfig {
//!     // DB_HOST
//!     #[conf(default = "localhost")]
//!     pub host: String,
//! }
//!
//! # fn main() -> Result<(), enflag::EnflagError> {
//! # for key in ["SERVER_ADDR", "PORT", "SERVER_PORT", "REQUEST_TIMEOUT", "DB_HOST"] {
//! #     std::env::remove_var(key);
//! # }
//! let mut config = Config::default();
//! enflag::Loader::new().auto_load_env(false).load(&mut config)?;
//! assert_eq!(config.port, 8080);
//! assert_eq!(config.request_timeout, Duration::from_secs(30));
//! assert_eq!(config.database.host, "localhost");
//! # Ok(())
//! # }
//! ```
//!
//! # Attributes
//!
//! All field attributes live under `#[conf(...)]`:
//!
//! - `env = "PORT,SERVER_PORT"` — alternate environment names, tried in
//!   order. Default: the field name upper-cased.
//! - `flag = "port,p"` — flag names; the first is looked up on the
//!   configured [`FlagSource`]. Default: the field name kebab-cased.
//! - `default = "8080"` — default literal, converted like any resolved
//!   value.
//! - `required` — resolution failure across all tiers is a hard error.
//! - `usage = "..."` — help text surfaced through [`FieldDescriptor`].
//! - `nested` — recurse into this struct field instead of resolving it.
//! - `prefix = "DB_"` — with `nested`: prefix override for descendant
//!   names. Without an override the snake-cased field name plus `_` is
//!   used.
//! - `deserializer = "path::to::fn"` — convert with a custom
//!   `fn(&str) -> Result<T, E>` instead of [`FromEnvStr`].
//! - `skip` — leave this field alone entirely; it takes part in neither
//!   resolution nor descriptors.
//!
//! # Env files
//!
//! `KEY=VALUE` lines; `#` comments and blank lines are skipped; values may
//! be double-quoted (escape processing for `\"`, `\\`, `\n`, `\r`, `\t`)
//! or single-quoted (verbatim). A file value never overrides a variable
//! that is already set in the process environment. `.env`, `.env.local`,
//! `.env.development` and `.env.production` are auto-discovered unless
//! disabled; explicitly listed files must exist.
//!
//! # Failure policy
//!
//! By default a load stops at the first error; fields populated before the
//! error keep their values. With [`Loader::fail_on_error`]`(false)` every
//! field error is logged as a `tracing` warning instead, the load
//! continues, and `load` returns `Ok` with a best-effort structure.

mod de;
mod env_file;
mod error;
mod loader;
mod resolve;

pub use de::{CoerceError, FromEnvStr};
pub use error::EnflagError;
pub use loader::{load, Loader};
pub use resolve::{FieldDescriptor, FlagSource};

// Macro-facing surface
#[doc(hidden)]
pub use resolve::{resolve_field, resolve_field_with, FieldSpec};

pub use enflag_derive::Enflag;
pub use resolve::Context;

/// A configuration structure that can be populated by a [`Loader`].
///
/// Implemented via `#[derive(Enflag)]`; the derived code walks the
/// struct's fields in declaration order, recursing into `#[conf(nested)]`
/// fields with an accumulated name prefix.
pub trait Enflag {
    /// Resolve and assign every leaf field reachable from `self`.
    ///
    /// `prefix` is the concatenation of the loader's global prefix and
    /// all ancestor nested-structure prefixes.
    fn populate(&mut self, ctx: &mut Context<'_>, prefix: &str) -> Result<(), EnflagError>;

    /// Append a [`FieldDescriptor`] for every leaf field reachable from
    /// this type, with `prefix` applied.
    fn describe(prefix: &str, out: &mut Vec<FieldDescriptor>);
}
