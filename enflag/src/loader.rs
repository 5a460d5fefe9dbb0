//! Loader construction and the load pipeline
//!
//! A load is one synchronous pass: read the configured env files into the
//! environment view, then walk the target structure and resolve every leaf
//! field. Loads are expected to happen once at process startup; concurrent
//! loads are not coordinated.

use std::path::PathBuf;

use crate::env_file::{load_env_files, Environment};
use crate::error::EnflagError;
use crate::resolve::{Context, FieldDescriptor, FlagSource};
use crate::Enflag;

/// Populate `target` with default settings: fail-fast, auto-discovery of
/// conventional env files, no global prefix, no flag backend.
///
/// ```rust,no_run
/// use enflag::Enflag;
///
/// #[derive(Debug, Default, Enflag)]
/// struct Config {
///     #[conf(default = "8080")]
///     pub port: u16,
/// }
///
/// # fn main() -> Result<(), enflag::EnflagError> {
/// let mut config = Config::default();
/// enflag::load(&mut config)?;
/// # Ok(())
/// # }
/// ```
pub fn load<T: Enflag>(target: &mut T) -> Result<(), EnflagError> {
    Loader::new().load(target)
}

/// Configurable loader. Methods chain; call [`Loader::load`] to run.
pub struct Loader {
    env_prefix: String,
    env_files: Vec<PathBuf>,
    auto_load_env: bool,
    fail_on_error: bool,
    flags: Option<Box<dyn FlagSource>>,
}

impl Loader {
    /// A loader with default settings: fail-fast on, auto-discovery on,
    /// no global prefix, no flag backend.
    pub fn new() -> Self {
        Self {
            env_prefix: String::new(),
            env_files: Vec::new(),
            auto_load_env: true,
            fail_on_error: true,
            flags: None,
        }
    }

    /// Prefix every environment name with `prefix` (e.g. `"APP_"`).
    ///
    /// Flag names are not affected.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load exactly these env files, replacing auto-discovery.
    ///
    /// Listed files must exist. Call [`Loader::auto_load_env`] afterwards
    /// to also probe the conventional file names.
    pub fn env_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.env_files = files.into_iter().map(Into::into).collect();
        self.auto_load_env = false;
        self
    }

    /// Probe `.env`, `.env.local`, `.env.development` and
    /// `.env.production` in the working directory, skipping those that do
    /// not exist. On by default.
    pub fn auto_load_env(mut self, enabled: bool) -> Self {
        self.auto_load_env = enabled;
        self
    }

    /// `true` (default): abort the load on the first error. `false`: log
    /// each error as a warning and keep populating; [`Loader::load`] then
    /// returns `Ok` and the structure is best-effort.
    pub fn fail_on_error(mut self, enabled: bool) -> Self {
        self.fail_on_error = enabled;
        self
    }

    /// Use `source` to answer flag lookups. Without one, the flag tier
    /// never supplies a value.
    pub fn flags(mut self, source: impl FlagSource + 'static) -> Self {
        self.flags = Some(Box::new(source));
        self
    }

    /// Populate `target` from flags, environment, env files and defaults.
    pub fn load<T: Enflag>(&self, target: &mut T) -> Result<(), EnflagError> {
        let mut env = Environment::default();
        if let Err(err) = load_env_files(&self.env_files, self.auto_load_env, &mut env) {
            if self.fail_on_error {
                return Err(err);
            }
            tracing::warn!("config warning: {err}");
        }

        let mut ctx = Context::new(&env, self.flags.as_deref(), self.fail_on_error);
        target.populate(&mut ctx, &self.env_prefix)
    }

    /// Flattened descriptors of every leaf field of `T`, with this
    /// loader's global prefix applied — the input for hosts that register
    /// command-line flags or render help themselves.
    pub fn descriptors<T: Enflag>(&self) -> Vec<FieldDescriptor> {
        let mut out = Vec::new();
        T::describe(&self.env_prefix, &mut out);
        out
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
