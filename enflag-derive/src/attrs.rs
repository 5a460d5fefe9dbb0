//! Attribute parsing for `#[conf(...)]` annotations.
//!
//! This module extracts configuration attributes from struct fields during
//! macro expansion. Combination rules (e.g. `prefix` requires `nested`)
//! are enforced by the expansion code in `lib.rs`.

use syn::{Field, Lit};

/// Parsed `#[conf(...)]` attributes from a struct field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Alternate environment names, in lookup order.
    ///
    /// If `None`, the field name is converted to UPPER_SNAKE_CASE.
    pub env_names: Option<Vec<String>>,

    /// Flag names; only the first is looked up.
    ///
    /// If `None`, the field name is converted to kebab-case.
    pub flag_names: Option<Vec<String>>,

    /// Default literal, converted like any resolved value.
    pub default: Option<String>,

    /// Help text surfaced through field descriptors.
    pub usage: Option<String>,

    /// Whether resolution failure across all tiers is a hard error.
    pub required: bool,

    /// Recurse into this struct field instead of resolving it.
    pub nested: bool,

    /// Prefix override for a nested field's descendants. Without it the
    /// snake-cased field name plus `_` is used.
    pub prefix: Option<String>,

    /// Custom deserializer function path (e.g. `"serde_json::from_str"`).
    ///
    /// When specified, bypasses `FromEnvStr` and uses this function
    /// instead.
    pub deserializer: Option<String>,

    /// Leave this field alone entirely.
    pub skip: bool,
}

/// Split a comma-separated name list, trimming each entry.
fn split_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

fn string_value(meta: &syn::meta::ParseNestedMeta) -> syn::Result<String> {
    let value = meta.value()?;
    let lit: Lit = value.parse()?;
    match lit {
        Lit::Str(s) => Ok(s.value()),
        _ => Err(meta.error("expected a string literal")),
    }
}

impl FieldAttrs {
    /// Extract and parse `#[conf(...)]` attributes from a struct field.
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::default();

        for attr in &field.attrs {
            if !attr.path().is_ident("conf") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                // env = "PORT,SERVER_PORT"
                if meta.path.is_ident("env") {
                    let names = split_names(&string_value(&meta)?);
                    if names.is_empty() {
                        return Err(meta.error("env needs at least one name"));
                    }
                    attrs.env_names = Some(names);
                    return Ok(());
                }

                // flag = "port,p"
                if meta.path.is_ident("flag") {
                    let names = split_names(&string_value(&meta)?);
                    if names.is_empty() {
                        return Err(meta.error("flag needs at least one name"));
                    }
                    attrs.flag_names = Some(names);
                    return Ok(());
                }

                // default = "8080"
                if meta.path.is_ident("default") {
                    attrs.default = Some(string_value(&meta)?);
                    return Ok(());
                }

                // usage = "help text"
                if meta.path.is_ident("usage") {
                    attrs.usage = Some(string_value(&meta)?);
                    return Ok(());
                }

                // required
                if meta.path.is_ident("required") {
                    attrs.required = true;
                    return Ok(());
                }

                // nested
                if meta.path.is_ident("nested") {
                    attrs.nested = true;
                    return Ok(());
                }

                // prefix = "DB_"
                if meta.path.is_ident("prefix") {
                    attrs.prefix = Some(string_value(&meta)?);
                    return Ok(());
                }

                // deserializer = "function::path"
                if meta.path.is_ident("deserializer") {
                    attrs.deserializer = Some(string_value(&meta)?);
                    return Ok(());
                }

                // skip
                if meta.path.is_ident("skip") {
                    attrs.skip = true;
                    return Ok(());
                }

                Err(meta.error("unsupported conf attribute"))
            })?;
        }

        Ok(attrs)
    }
}
