//! Define procedural macro to process service config entries
extern crate proc_macro;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod service_config;

/// Derive `FromServiceConfig` for a struct with named fields and a `Default` impl.
///
/// Every field is read from the service parameters under its own name unless it carries
/// `#[service_config(skip)]`, or `#[service_config(rename = "key")]` to read it from a
/// different key. Supported field types are `String`, `bool`, the integer and float
/// primitives, and `Option` of any of those.
#[proc_macro_derive(FromServiceConfig, attributes(service_config))]
pub fn derive_from_service_config(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    service_config::expand(&input)
        .unwrap_or_else(to_compile_errors)
        .into()
}

fn to_compile_errors(errors: Vec<syn::Error>) -> proc_macro2::TokenStream {
    let compile_errors = errors.iter().map(syn::Error::to_compile_error);
    quote::quote!(#(#compile_errors)*)
}
