//! Per-field value resolution
//!
//! For each leaf field the resolver consults three tiers in fixed
//! precedence order: command-line flag, environment (process env layered
//! over env files), then the declared default. The first tier supplying a
//! non-empty string wins; an empty string is indistinguishable from an
//! unset value and falls through to the next tier. That empty-means-absent
//! rule is load-bearing and applies uniformly to all three tiers.

use std::collections::HashMap;

use crate::de::FromEnvStr;
use crate::env_file::Environment;
use crate::error::EnflagError;

/// Lookup capability over an externally parsed set of command-line flags.
///
/// Flag registration, parsing and help output belong to the host; the
/// loader only asks for the current string value of a named flag. Flag
/// names are never prefixed — neither the loader's global prefix nor
/// nested-structure prefixes apply to them.
pub trait FlagSource {
    /// Return the current string value of `name`, if the host knows it.
    fn lookup(&self, name: &str) -> Option<String>;
}

impl FlagSource for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

#[cfg(feature = "clap")]
impl FlagSource for clap::ArgMatches {
    fn lookup(&self, name: &str) -> Option<String> {
        self.try_get_one::<String>(name).ok().flatten().cloned()
    }
}

/// Static descriptor of one leaf field, emitted by `#[derive(Enflag)]`.
#[doc(hidden)]
#[derive(Debug)]
pub struct FieldSpec {
    /// Field identifier, used for generated usage text.
    pub ident: &'static str,
    /// Candidate environment names, in order; never empty. The first is
    /// the primary name used in error messages.
    pub env_names: &'static [&'static str],
    /// Candidate flag names; the first is the one looked up.
    pub flag_names: &'static [&'static str],
    /// Default literal, coerced like any tier value.
    pub default_value: Option<&'static str>,
    /// Whether resolution failure is a hard error.
    pub required: bool,
    /// Help text for the host's flag registration.
    pub usage: Option<&'static str>,
}

/// One resolvable field of a configuration structure, with all prefixes
/// applied — the boundary handed to hosts that register flags or render
/// help themselves.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Fully qualified environment candidate names, upper-cased.
    pub env_names: Vec<String>,
    /// Primary flag name, if any.
    pub flag_name: Option<String>,
    /// Declared default literal.
    pub default_value: Option<String>,
    /// Whether the field is required.
    pub required: bool,
    /// Explicit usage text, or a derived summary line.
    pub usage: String,
}

impl FieldDescriptor {
    #[doc(hidden)]
    pub fn from_spec(prefix: &str, spec: &FieldSpec) -> Self {
        let env_names: Vec<String> = spec
            .env_names
            .iter()
            .map(|name| compose_name(prefix, name))
            .collect();
        let usage = match spec.usage {
            Some(text) => text.to_owned(),
            None => {
                let mut text = format!("{} (env: {})", spec.ident, env_names[0]);
                if let Some(default) = spec.default_value {
                    text.push_str(&format!(" (default: {default})"));
                }
                if spec.required {
                    text.push_str(" [required]");
                }
                text
            }
        };
        Self {
            env_names,
            flag_name: spec.flag_names.first().map(|s| (*s).to_owned()),
            default_value: spec.default_value.map(str::to_owned),
            required: spec.required,
            usage,
        }
    }
}

/// Fully qualify a candidate name: global prefix and accumulated nested
/// prefix are already concatenated into `prefix`.
pub(crate) fn compose_name(prefix: &str, name: &str) -> String {
    format!("{prefix}{name}").to_uppercase()
}

/// Shared state of one load: the environment view, the flag backend, and
/// the failure policy.
pub struct Context<'a> {
    env: &'a Environment,
    flags: Option<&'a dyn FlagSource>,
    fail_on_error: bool,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        env: &'a Environment,
        flags: Option<&'a dyn FlagSource>,
        fail_on_error: bool,
    ) -> Self {
        Self {
            env,
            flags,
            fail_on_error,
        }
    }

    /// Apply the failure policy to a field error: propagate under
    /// fail-fast, otherwise warn and keep going.
    fn report(&mut self, err: EnflagError) -> Result<(), EnflagError> {
        if self.fail_on_error {
            return Err(err);
        }
        tracing::warn!("config warning: {err}");
        Ok(())
    }
}

struct Resolution {
    value: Option<String>,
    /// Primary composed name, used for error reporting even when nothing
    /// was found.
    canonical_name: String,
}

fn resolve_raw(ctx: &Context<'_>, prefix: &str, spec: &FieldSpec) -> Resolution {
    let canonical_name = compose_name(prefix, spec.env_names[0]);

    if let (Some(flags), Some(flag_name)) = (ctx.flags, spec.flag_names.first()) {
        if let Some(value) = flags.lookup(flag_name) {
            if !value.is_empty() {
                return Resolution {
                    value: Some(value),
                    canonical_name,
                };
            }
        }
    }

    for name in spec.env_names {
        let qualified = compose_name(prefix, name);
        if let Some(value) = ctx.env.get(&qualified) {
            if !value.is_empty() {
                return Resolution {
                    value: Some(value),
                    canonical_name,
                };
            }
        }
    }

    if let Some(default) = spec.default_value {
        if !default.is_empty() {
            return Resolution {
                value: Some(default.to_owned()),
                canonical_name,
            };
        }
    }

    Resolution {
        value: None,
        canonical_name,
    }
}

/// Resolve and assign one leaf field. Called from derived `populate`
/// implementations.
#[doc(hidden)]
pub fn resolve_field<T: FromEnvStr>(
    dest: &mut T,
    ctx: &mut Context<'_>,
    prefix: &str,
    spec: &FieldSpec,
) -> Result<(), EnflagError> {
    resolve_field_with(dest, ctx, prefix, spec, T::from_env_str)
}

/// Like [`resolve_field`], but converts through `deserialize` instead of
/// the field type's [`FromEnvStr`] implementation. The declared default
/// flows through `deserialize` as well.
#[doc(hidden)]
pub fn resolve_field_with<T, E, F>(
    dest: &mut T,
    ctx: &mut Context<'_>,
    prefix: &str,
    spec: &FieldSpec,
    deserialize: F,
) -> Result<(), EnflagError>
where
    E: std::fmt::Display,
    F: Fn(&str) -> Result<T, E>,
{
    let resolution = resolve_raw(ctx, prefix, spec);
    match resolution.value {
        Some(raw) => match deserialize(&raw) {
            Ok(value) => {
                *dest = value;
                Ok(())
            }
            Err(err) => ctx.report(EnflagError::Conversion {
                name: resolution.canonical_name,
                value: raw,
                type_name: std::any::type_name::<T>(),
                message: err.to_string(),
            }),
        },
        None if spec.required => ctx.report(EnflagError::MissingRequired {
            name: resolution.canonical_name,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Keys are namespaced so a variable in the real process environment
    // cannot shadow the overlay values these tests rely on.
    const SPEC: FieldSpec = FieldSpec {
        ident: "port",
        env_names: &["ENFLAGT_PORT", "ENFLAGT_SERVER_PORT"],
        flag_names: &["port"],
        default_value: Some("8080"),
        required: false,
        usage: None,
    };

    fn flags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn flag_beats_environment() {
        let env = Environment::with_values([("ENFLAGT_PORT", "8085")]);
        let flag_values = flags(&[("port", "9000")]);
        let mut ctx = Context::new(&env, Some(&flag_values), true);

        let mut port = 0u16;
        resolve_field(&mut port, &mut ctx, "", &SPEC).unwrap();
        assert_eq!(port, 9000);
    }

    #[test]
    fn environment_beats_default() {
        let env = Environment::with_values([("ENFLAGT_PORT", "8085")]);
        let mut ctx = Context::new(&env, None, true);

        let mut port = 0u16;
        resolve_field(&mut port, &mut ctx, "", &SPEC).unwrap();
        assert_eq!(port, 8085);
    }

    #[test]
    fn default_used_when_nothing_set() {
        let env = Environment::default();
        let mut ctx = Context::new(&env, None, true);

        let mut port = 0u16;
        resolve_field(&mut port, &mut ctx, "", &SPEC).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn empty_flag_value_falls_through() {
        let env = Environment::with_values([("ENFLAGT_PORT", "8085")]);
        let flag_values = flags(&[("port", "")]);
        let mut ctx = Context::new(&env, Some(&flag_values), true);

        let mut port = 0u16;
        resolve_field(&mut port, &mut ctx, "", &SPEC).unwrap();
        assert_eq!(port, 8085);
    }

    #[test]
    fn empty_environment_value_falls_through_to_default() {
        let env = Environment::with_values([("ENFLAGT_PORT", "")]);
        let mut ctx = Context::new(&env, None, true);

        let mut port = 0u16;
        resolve_field(&mut port, &mut ctx, "", &SPEC).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn alternate_env_names_are_tried_in_order() {
        let env = Environment::with_values([("ENFLAGT_SERVER_PORT", "7000")]);
        let mut ctx = Context::new(&env, None, true);

        let mut port = 0u16;
        resolve_field(&mut port, &mut ctx, "", &SPEC).unwrap();
        assert_eq!(port, 7000);
    }

    #[test]
    fn prefix_is_applied_and_uppercased() {
        let env = Environment::with_values([("APP_DB_ENFLAGT_PORT", "5432")]);
        let mut ctx = Context::new(&env, None, true);

        let mut port = 0u16;
        resolve_field(&mut port, &mut ctx, "APP_db_", &SPEC).unwrap();
        assert_eq!(port, 5432);
    }

    #[test]
    fn required_missing_names_primary_candidate() {
        const REQUIRED: FieldSpec = FieldSpec {
            ident: "api_key",
            env_names: &["ENFLAGT_API_KEY", "ENFLAGT_TOKEN"],
            flag_names: &["api-key"],
            default_value: None,
            required: true,
            usage: None,
        };
        let env = Environment::default();
        let mut ctx = Context::new(&env, None, true);

        let mut key = String::new();
        let err = resolve_field(&mut key, &mut ctx, "svc_", &REQUIRED).unwrap_err();
        match err {
            EnflagError::MissingRequired { name } => assert_eq!(name, "SVC_ENFLAGT_API_KEY"),
            other => panic!("expected MissingRequired, got {other:?}"),
        }
    }

    #[test]
    fn conversion_failure_keeps_previous_value() {
        let env = Environment::with_values([("ENFLAGT_PORT", "not-a-port")]);
        let mut ctx = Context::new(&env, None, true);

        let mut port = 1234u16;
        let err = resolve_field(&mut port, &mut ctx, "", &SPEC).unwrap_err();
        assert!(matches!(err, EnflagError::Conversion { .. }));
        assert_eq!(port, 1234);
    }

    #[test]
    fn continue_mode_swallows_field_errors() {
        let env = Environment::with_values([("ENFLAGT_PORT", "not-a-port")]);
        let mut ctx = Context::new(&env, None, false);

        let mut port = 0u16;
        resolve_field(&mut port, &mut ctx, "", &SPEC).unwrap();
        assert_eq!(port, 0);
    }

    #[test]
    fn not_found_leaves_value_untouched_without_error() {
        const OPTIONAL: FieldSpec = FieldSpec {
            ident: "label",
            env_names: &["ENFLAGT_LABEL"],
            flag_names: &["label"],
            default_value: None,
            required: false,
            usage: None,
        };
        let env = Environment::default();
        let mut ctx = Context::new(&env, None, true);

        let mut label = String::from("preset");
        resolve_field(&mut label, &mut ctx, "", &OPTIONAL).unwrap();
        assert_eq!(label, "preset");
    }

    #[test]
    fn custom_deserializer_is_used() {
        let env = Environment::with_values([("ENFLAGT_PORT", "9")]);
        let mut ctx = Context::new(&env, None, true);

        let mut doubled = 0u16;
        resolve_field_with(&mut doubled, &mut ctx, "", &SPEC, |raw| {
            raw.parse::<u16>().map(|n| n * 2)
        })
        .unwrap();
        assert_eq!(doubled, 18);
    }

    #[test]
    fn descriptor_composes_names_and_usage() {
        let descriptor = FieldDescriptor::from_spec("APP_", &SPEC);
        assert_eq!(descriptor.env_names, vec!["APP_ENFLAGT_PORT", "APP_ENFLAGT_SERVER_PORT"]);
        assert_eq!(descriptor.flag_name.as_deref(), Some("port"));
        assert_eq!(descriptor.usage, "port (env: APP_ENFLAGT_PORT) (default: 8080)");
    }

    #[test]
    fn descriptor_prefers_explicit_usage() {
        const DOCUMENTED: FieldSpec = FieldSpec {
            ident: "port",
            env_names: &["ENFLAGT_PORT"],
            flag_names: &["port"],
            default_value: Some("8080"),
            required: false,
            usage: Some("listen port"),
        };
        let descriptor = FieldDescriptor::from_spec("", &DOCUMENTED);
        assert_eq!(descriptor.usage, "listen port");
    }

    #[test]
    fn descriptor_marks_required() {
        const REQUIRED: FieldSpec = FieldSpec {
            ident: "port",
            env_names: &["ENFLAGT_PORT"],
            flag_names: &["port"],
            default_value: None,
            required: true,
            usage: None,
        };
        let descriptor = FieldDescriptor::from_spec("", &REQUIRED);
        assert_eq!(descriptor.usage, "port (env: ENFLAGT_PORT) [required]");
    }
}
