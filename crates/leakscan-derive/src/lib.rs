//! Derive macro for the `Inspect` trait.

use proc_macro2::TokenStream;
use quote::{format_ident, quote, quote_spanned};
use syn::{
    parse_macro_input, parse_quote, spanned::Spanned, Data, DeriveInput, Field, Fields,
    GenericParam, Generics, Ident, Index, Path,
};

/// Derives `Inspect` for structs and enums.
///
/// Every member is reported to the sink under its declaration name (the
/// index string for tuple fields). Supported attributes:
///
/// - `#[inspect(skip)]` on a field hides it from the scanner (the analog of
///   declaring the member known safe).
/// - `#[inspect(crate = path)]` on the type overrides the crate path when
///   `leakscan` is re-exported under another name.
///
/// Unions require a manual implementation.
#[proc_macro_derive(Inspect, attributes(inspect))]
pub fn derive_inspect(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let mut leakscan: Path = parse_quote!(::leakscan);

    for attr in &input.attrs {
        if !attr.path().is_ident("inspect") {
            continue;
        }

        let result = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                leakscan = meta.value()?.parse()?;
                Ok(())
            } else {
                Err(meta.error("unsupported attribute"))
            }
        });

        if let Err(err) = result {
            return err.into_compile_error().into();
        }
    }

    let name = &input.ident;
    let generics = add_trait_bounds(&leakscan, input.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let body = match generate_fields_body(name, &input.data) {
        Ok(body) => body,
        Err(err) => return err.into_compile_error().into(),
    };

    let generated = quote! {
        impl #impl_generics #leakscan::Inspect for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn fields<'a>(&'a self, sink: &mut #leakscan::FieldSink<'a>) {
                #body
            }
        }
    };

    generated.into()
}

fn add_trait_bounds(leakscan: &Path, mut generics: Generics) -> Generics {
    for param in &mut generics.params {
        if let GenericParam::Type(ref mut type_param) = *param {
            let has_inspect = type_param.bounds.iter().any(|b| {
                if let syn::TypeParamBound::Trait(t) = b {
                    t.path.segments.last().is_some_and(|s| s.ident == "Inspect")
                } else {
                    false
                }
            });
            let has_static = type_param.bounds.iter().any(|b| {
                if let syn::TypeParamBound::Lifetime(l) = b {
                    l.ident == "static"
                } else {
                    false
                }
            });

            if !has_inspect {
                type_param.bounds.push(parse_quote!(#leakscan::Inspect));
            }
            if !has_static {
                type_param.bounds.push(parse_quote!('static));
            }
        }
    }
    generics
}

/// Whether a field carries `#[inspect(skip)]`.
fn is_skipped(field: &Field) -> Result<bool, syn::Error> {
    let mut skipped = false;
    for attr in &field.attrs {
        if !attr.path().is_ident("inspect") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skipped = true;
                Ok(())
            } else {
                Err(meta.error("unsupported field attribute"))
            }
        })?;
    }
    Ok(skipped)
}

fn generate_fields_body(name: &Ident, data: &Data) -> Result<TokenStream, syn::Error> {
    match data {
        Data::Struct(data) => generate_struct_body(&data.fields),
        Data::Enum(data) => generate_enum_body(name, data),
        Data::Union(u) => Ok(quote_spanned! {
            u.union_token.span => compile_error!("`Inspect` must be manually implemented for unions");
        }),
    }
}

fn generate_struct_body(fields: &Fields) -> Result<TokenStream, syn::Error> {
    match fields {
        Fields::Named(f) => {
            let mut calls = Vec::new();
            for field in &f.named {
                if is_skipped(field)? {
                    continue;
                }
                let ident = field.ident.as_ref().expect("named field");
                let name_str = ident.to_string();
                calls.push(quote_spanned! {field.span() =>
                    sink.field(#name_str, &self.#ident);
                });
            }
            Ok(quote! { #(#calls)* })
        }
        Fields::Unnamed(f) => {
            let mut calls = Vec::new();
            for (i, field) in f.unnamed.iter().enumerate() {
                if is_skipped(field)? {
                    continue;
                }
                let index = Index::from(i);
                let name_str = i.to_string();
                calls.push(quote_spanned! {field.span() =>
                    sink.field(#name_str, &self.#index);
                });
            }
            Ok(quote! { #(#calls)* })
        }
        Fields::Unit => Ok(quote! {}),
    }
}

fn generate_enum_body(name: &Ident, data: &syn::DataEnum) -> Result<TokenStream, syn::Error> {
    let mut match_arms = Vec::new();
    for variant in &data.variants {
        let var_name = &variant.ident;
        let arm = match &variant.fields {
            Fields::Named(f) => {
                let mut bindings = Vec::new();
                let mut calls = Vec::new();
                for (i, field) in f.named.iter().enumerate() {
                    if is_skipped(field)? {
                        continue;
                    }
                    let ident = field.ident.as_ref().expect("named field");
                    let binding = format_ident!("field{}", i);
                    let name_str = ident.to_string();
                    bindings.push(quote! { #ident: #binding });
                    calls.push(quote! { sink.field(#name_str, #binding); });
                }
                quote! {
                    #name::#var_name { #(#bindings,)* .. } => {
                        #(#calls)*
                    }
                }
            }
            Fields::Unnamed(f) => {
                let mut bindings = Vec::new();
                let mut calls = Vec::new();
                for (i, field) in f.unnamed.iter().enumerate() {
                    let binding = format_ident!("field{}", i);
                    if is_skipped(field)? {
                        bindings.push(quote! { _ });
                        continue;
                    }
                    let name_str = i.to_string();
                    bindings.push(quote! { #binding });
                    calls.push(quote! { sink.field(#name_str, #binding); });
                }
                quote! {
                    #name::#var_name(#(#bindings),*) => {
                        #(#calls)*
                    }
                }
            }
            Fields::Unit => quote! {
                #name::#var_name => {}
            },
        };
        match_arms.push(arm);
    }

    Ok(quote! {
        match self {
            #(#match_arms)*
        }
    })
}
