//! Derive macro implementation for enflag

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

mod attrs;

use attrs::FieldAttrs;

/// `Enflag` derive macro
///
/// Implements the `enflag::Enflag` trait on structs with named fields:
/// `populate` resolves every leaf field in declaration order (recursing
/// into `#[conf(nested)]` fields with an accumulated name prefix) and
/// `describe` collects the flattened field descriptors.
///
/// # Supported Attributes
///
/// **Field-level** (`#[conf(...)]`):
/// - `env = "PORT,SERVER_PORT"`: alternate environment names
/// - `flag = "port,p"`: flag names (first is looked up)
/// - `default = "8080"`: default literal
/// - `usage = "..."`: help text
/// - `required`: resolution failure is a hard error
/// - `nested`: recurse into this struct field
/// - `prefix = "DB_"`: nested-prefix override (requires `nested`)
/// - `deserializer = "func"`: use a custom deserializer function
/// - `skip`: leave this field alone entirely
///
/// # Example
///
/// See the `enflag` crate documentation for usage examples.
#[proc_macro_derive(Enflag, attributes(conf))]
pub fn derive_enflag(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

fn expand(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;

    // Global prefixes are a Loader concern, so no struct-level attributes
    // exist; reject them instead of silently ignoring.
    for attr in &input.attrs {
        if attr.path().is_ident("conf") {
            return Err(syn::Error::new_spanned(
                attr,
                "struct-level conf attributes are not supported; \
                 configure a global prefix on the Loader",
            ));
        }
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Enflag only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(&input, "Enflag only supports structs"));
        }
    };

    let mut populate_stmts = Vec::new();
    let mut describe_stmts = Vec::new();

    for field in fields {
        let field_name = field.ident.as_ref().unwrap();
        let field_type = &field.ty;
        let attrs = FieldAttrs::from_field(field)?;

        if attrs.skip {
            if attrs.env_names.is_some()
                || attrs.flag_names.is_some()
                || attrs.default.is_some()
                || attrs.usage.is_some()
                || attrs.required
                || attrs.nested
                || attrs.prefix.is_some()
                || attrs.deserializer.is_some()
            {
                return Err(syn::Error::new_spanned(
                    field,
                    "skip cannot be combined with other conf attributes",
                ));
            }
            continue;
        }

        if attrs.nested {
            if attrs.env_names.is_some()
                || attrs.flag_names.is_some()
                || attrs.default.is_some()
                || attrs.usage.is_some()
                || attrs.required
                || attrs.deserializer.is_some()
            {
                return Err(syn::Error::new_spanned(
                    field,
                    "nested fields accept only the prefix attribute",
                ));
            }

            let component = attrs
                .prefix
                .unwrap_or_else(|| format!("{field_name}_"));

            populate_stmts.push(quote! {
                {
                    let __nested = ::std::format!("{}{}", __prefix, #component);
                    ::enflag::Enflag::populate(&mut self.#field_name, __ctx, &__nested)?;
                }
            });
            describe_stmts.push(quote! {
                {
                    let __nested = ::std::format!("{}{}", __prefix, #component);
                    <#field_type as ::enflag::Enflag>::describe(&__nested, __out);
                }
            });
            continue;
        }

        if attrs.prefix.is_some() {
            return Err(syn::Error::new_spanned(
                field,
                "the prefix attribute requires nested",
            ));
        }

        let ident_str = field_name.to_string();
        let env_names = attrs
            .env_names
            .unwrap_or_else(|| vec![ident_str.to_uppercase()]);
        let flag_names = attrs
            .flag_names
            .unwrap_or_else(|| vec![ident_str.replace('_', "-")]);
        let default_value = option_tokens(attrs.default.as_deref());
        let usage = option_tokens(attrs.usage.as_deref());
        let required = attrs.required;

        let spec = quote! {
            ::enflag::FieldSpec {
                ident: #ident_str,
                env_names: &[#(#env_names),*],
                flag_names: &[#(#flag_names),*],
                default_value: #default_value,
                required: #required,
                usage: #usage,
            }
        };

        let resolve = if let Some(func_path) = &attrs.deserializer {
            let func: proc_macro2::TokenStream = func_path.parse().map_err(|_| {
                syn::Error::new_spanned(field, "deserializer must be a function path")
            })?;
            // Wrapped in a closure so generic deserializers such as
            // serde_json::from_str unify with the expected Fn signature.
            quote! {
                ::enflag::resolve_field_with(
                    &mut self.#field_name,
                    __ctx,
                    __prefix,
                    &__SPEC,
                    |__raw: &str| #func(__raw),
                )?;
            }
        } else {
            quote! {
                ::enflag::resolve_field(&mut self.#field_name, __ctx, __prefix, &__SPEC)?;
            }
        };

        populate_stmts.push(quote! {
            {
                const __SPEC: ::enflag::FieldSpec = #spec;
                #resolve
            }
        });
        describe_stmts.push(quote! {
            __out.push(::enflag::FieldDescriptor::from_spec(__prefix, &#spec));
        });
    }

    Ok(quote! {
        impl ::enflag::Enflag for #struct_name {
            fn populate(
                &mut self,
                __ctx: &mut ::enflag::Context<'_>,
                __prefix: &str,
            ) -> ::core::result::Result<(), ::enflag::EnflagError> {
                #(#populate_stmts)*
                ::core::result::Result::Ok(())
            }

            fn describe(__prefix: &str, __out: &mut ::std::vec::Vec<::enflag::FieldDescriptor>) {
                #(#describe_stmts)*
            }
        }
    })
}

fn option_tokens(value: Option<&str>) -> proc_macro2::TokenStream {
    match value {
        Some(text) => quote! { ::core::option::Option::Some(#text) },
        None => quote! { ::core::option::Option::None },
    }
}
