//! Procedural macros for Formbase
//!
//! This crate provides `#[derive(Record)]`, which implements the
//! `formbase::Record` trait for an annotated struct: the static schema
//! descriptor plus the conversions to and from `FieldValues`.
//!
//! # Usage
//!
//! ```ignore
//! #[derive(Record, Clone, Debug)]
//! #[record(table = "forms")]
//! struct Form {
//!     #[record(primary_key)]
//!     id: String,
//!     name: String,
//!     #[record(column = "owner_id")]
//!     owner: Rel<User>,
//!     active: bool,
//! }
//! ```
//!
//! Struct attribute: `table = "..."` (defaults to the snake_case struct
//! name). Field attributes: `primary_key`, `column = "..."`,
//! `references = "..."` (relation fields; defaults to the target's primary
//! key), `json` (store the column as JSON through serde; the field type must
//! implement `Serialize` and `Deserialize`), `skip` (field exists on the
//! struct only; requires `Default`).
//!
//! Supported field types: `String`, `i32`, `i64`, `f64`, `bool`,
//! `DateTime<Utc>`, `Vec<u8>`, `serde_json::Value`, `Option` of any of
//! those, and `Rel<T>` for relations.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Data, DeriveInput, Field, Fields, GenericArgument, LitStr, PathArguments,
    Type,
};

use convert_case::{Case, Casing};

#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[derive(Default)]
struct FieldAttrs {
    primary_key: bool,
    column: Option<String>,
    references: Option<String>,
    json: bool,
    skip: bool,
}

enum Mapped<'a> {
    Relation { target: &'a Type },
    Scalar { kind: &'static str },
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let type_name = name.to_string();

    let mut table: Option<String> = None;
    for attr in &input.attrs {
        if attr.path().is_ident("record") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("table") {
                    let lit: LitStr = meta.value()?.parse()?;
                    table = Some(lit.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported record attribute"))
                }
            })?;
        }
    }
    let table = table.unwrap_or_else(|| type_name.to_case(Case::Snake));

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "#[derive(Record)] requires named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "#[derive(Record)] only supports structs",
            ))
        }
    };

    let mut schema_fields = Vec::new();
    let mut to_values = Vec::new();
    let mut from_values = Vec::new();

    for field in fields {
        let ident = field.ident.as_ref().expect("named field");
        let field_name = ident.to_string();
        let attrs = parse_field_attrs(field)?;

        if attrs.skip {
            from_values.push(quote! {
                #ident: ::core::default::Default::default(),
            });
            continue;
        }

        let column = attrs.column.clone().unwrap_or_else(|| field_name.clone());
        let (mapped, optional) = classify(&field.ty, &attrs)?;

        let column_call = if column != field_name {
            quote! { .column(#column) }
        } else {
            quote! {}
        };
        let pk_call = if attrs.primary_key {
            quote! { .primary_key() }
        } else {
            quote! {}
        };

        match mapped {
            Mapped::Relation { target } => {
                let references_call = match &attrs.references {
                    Some(r) => quote! { .references(#r) },
                    None => quote! {},
                };
                schema_fields.push(quote! {
                    .field(
                        formbase::FieldDef::relation(
                            #field_name,
                            <#target as formbase::Record>::TYPE_NAME,
                        )
                        #references_call #column_call #pk_call,
                    )
                });
                to_values.push(quote! {
                    match &self.#ident {
                        formbase::Rel::Unset => {}
                        formbase::Rel::Key(v) => values.set(
                            #field_name,
                            formbase::FieldValue::Scalar(v.clone()),
                        ),
                        formbase::Rel::Record(r) => values.set(
                            #field_name,
                            formbase::FieldValue::Nested(formbase::Record::to_values(&**r)?),
                        ),
                    }
                });
                from_values.push(quote! {
                    #ident: match values.take(#field_name) {
                        ::core::option::Option::Some(formbase::FieldValue::Scalar(v)) => {
                            formbase::Rel::Key(v)
                        }
                        ::core::option::Option::Some(formbase::FieldValue::Nested(nested)) => {
                            formbase::Rel::Record(::std::boxed::Box::new(
                                <#target as formbase::Record>::from_values(nested)?,
                            ))
                        }
                        ::core::option::Option::None => formbase::Rel::Unset,
                    },
                });
            }
            Mapped::Scalar { kind } => {
                let kind_ident = quote::format_ident!("{}", kind);
                schema_fields.push(quote! {
                    .field(
                        formbase::FieldDef::scalar(
                            #field_name,
                            formbase::ScalarKind::#kind_ident,
                        )
                        #column_call #pk_call,
                    )
                });
                // json fields go through serde so any Serialize/Deserialize
                // type maps to the column, not just the built-in scalar set
                let encode_expr = if attrs.json {
                    quote! { formbase::value::to_json(&self.#ident)? }
                } else {
                    quote! { formbase::Value::from(self.#ident.clone()) }
                };
                let decode_expr = if attrs.json {
                    quote! { formbase::value::from_json(v)? }
                } else {
                    quote! { formbase::FromValue::from_value(v)? }
                };
                to_values.push(quote! {
                    values.set(
                        #field_name,
                        formbase::FieldValue::Scalar(#encode_expr),
                    );
                });
                let missing_arm = if optional {
                    quote! { ::core::option::Option::None }
                } else {
                    quote! {
                        return ::core::result::Result::Err(formbase::SchemaError::MissingField {
                            type_name: #type_name.to_string(),
                            field: #field_name.to_string(),
                        })
                    }
                };
                from_values.push(quote! {
                    #ident: match values.take(#field_name) {
                        ::core::option::Option::Some(formbase::FieldValue::Scalar(v)) => {
                            #decode_expr
                        }
                        ::core::option::Option::Some(formbase::FieldValue::Nested(_)) => {
                            return ::core::result::Result::Err(formbase::SchemaError::NotARelation {
                                type_name: #type_name.to_string(),
                                field: #field_name.to_string(),
                            })
                        }
                        ::core::option::Option::None => #missing_arm,
                    },
                });
            }
        }
    }

    Ok(quote! {
        #[automatically_derived]
        impl formbase::Record for #name {
            const TYPE_NAME: &'static str = #type_name;

            fn schema() -> formbase::SchemaDef {
                formbase::SchemaDef::new(#type_name, #table)
                    #(#schema_fields)*
            }

            fn to_values(
                &self,
            ) -> ::core::result::Result<formbase::FieldValues, formbase::SchemaError> {
                let mut values = formbase::FieldValues::new();
                #(#to_values)*
                ::core::result::Result::Ok(values)
            }

            fn from_values(
                mut values: formbase::FieldValues,
            ) -> ::core::result::Result<Self, formbase::SchemaError> {
                ::core::result::Result::Ok(Self {
                    #(#from_values)*
                })
            }
        }
    })
}

fn parse_field_attrs(field: &Field) -> syn::Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("primary_key") {
                attrs.primary_key = true;
                Ok(())
            } else if meta.path.is_ident("column") {
                let lit: LitStr = meta.value()?.parse()?;
                attrs.column = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("references") {
                let lit: LitStr = meta.value()?.parse()?;
                attrs.references = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("json") {
                attrs.json = true;
                Ok(())
            } else if meta.path.is_ident("skip") {
                attrs.skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported record field attribute"))
            }
        })?;
    }
    Ok(attrs)
}

/// Work out how a field maps to the schema: relation, or scalar of which
/// kind, and whether it is optional (nullable).
fn classify<'a>(ty: &'a Type, attrs: &FieldAttrs) -> syn::Result<(Mapped<'a>, bool)> {
    let segment = last_segment(ty)
        .ok_or_else(|| syn::Error::new_spanned(ty, "unsupported field type for Record"))?;

    if segment.ident == "Rel" {
        let target = generic_inner(segment).ok_or_else(|| {
            syn::Error::new_spanned(ty, "Rel requires a record type parameter, e.g. Rel<User>")
        })?;
        return Ok((Mapped::Relation { target }, false));
    }

    if segment.ident == "Option" {
        let inner = generic_inner(segment)
            .ok_or_else(|| syn::Error::new_spanned(ty, "Option requires a type parameter"))?;
        let (mapped, _) = classify(inner, attrs)?;
        if matches!(mapped, Mapped::Relation { .. }) {
            return Err(syn::Error::new_spanned(
                ty,
                "relation fields use Rel<T> directly, not Option<Rel<T>>",
            ));
        }
        return Ok((mapped, true));
    }

    if attrs.json {
        return Ok((Mapped::Scalar { kind: "Json" }, false));
    }

    let kind = match segment.ident.to_string().as_str() {
        "String" => "Text",
        "i32" | "i64" => "Int",
        "f64" => "Float",
        "bool" => "Bool",
        "DateTime" => "Timestamp",
        "Vec" => {
            let inner = generic_inner(segment);
            match inner.and_then(last_segment) {
                Some(seg) if seg.ident == "u8" => "Blob",
                _ => {
                    return Err(syn::Error::new_spanned(
                        ty,
                        "only Vec<u8> is supported; annotate other collections with #[record(json)]",
                    ))
                }
            }
        }
        "Value" | "JsonValue" => "Json",
        _ => {
            return Err(syn::Error::new_spanned(
                ty,
                "unsupported field type for Record; annotate with #[record(json)] or use Rel<T>",
            ))
        }
    };
    Ok((Mapped::Scalar { kind }, false))
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(path) => path.path.segments.last(),
        _ => None,
    }
}

fn generic_inner(segment: &syn::PathSegment) -> Option<&Type> {
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}
