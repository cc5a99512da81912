use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Field, Fields, GenericArgument, LitStr, PathArguments, Type};

pub fn expand(input: &DeriveInput) -> Result<TokenStream, Vec<syn::Error>> {
    let name = &input.ident;
    let setters = config_setters(input)?;
    Ok(quote! {
        impl crate::config::FromServiceConfig for #name {
            fn from_config(config: &crate::config::ServiceConfig) -> Result<Self, crate::Error> {
                #[allow(unused_mut)]
                let mut base = Self::default();
                for key in config.parameters() {
                    match key.as_str() {
                        #(#setters)*
                        _ => log::warn!(
                            "unknown configuration parameter for {}: {}={:?}",
                            stringify!(#name),
                            key,
                            config.get_parameter(key)
                        ),
                    }
                }
                Ok(base)
            }
        }
    })
}

/// Options collected from `#[service_config(..)]` on a single field
#[derive(Default)]
struct FieldOptions {
    skip: bool,
    rename: Option<String>,
}

fn config_setters(input: &DeriveInput) -> Result<Vec<TokenStream>, Vec<syn::Error>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(vec![syn::Error::new(
                    input.span(),
                    "FromServiceConfig requires a struct with named fields",
                )])
            }
        },
        _ => {
            return Err(vec![syn::Error::new(
                input.span(),
                "FromServiceConfig can only be derived for structs",
            )])
        }
    };

    let mut setters = Vec::new();
    let mut errors = Vec::new();
    for field in fields {
        match field_options(field).and_then(|opts| generate_setter(field, opts)) {
            Ok(Some(setter)) => setters.push(setter),
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(setters)
    } else {
        Err(errors)
    }
}

fn field_options(field: &Field) -> syn::Result<FieldOptions> {
    let mut opts = FieldOptions::default();
    for attr in field
        .attrs
        .iter()
        .filter(|a| a.path().is_ident("service_config"))
    {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                opts.skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                let key: LitStr = meta.value()?.parse()?;
                opts.rename = Some(key.value());
                Ok(())
            } else {
                Err(meta.error("expected `skip` or `rename = \"..\"`"))
            }
        })?;
    }
    Ok(opts)
}

fn generate_setter(field: &Field, opts: FieldOptions) -> syn::Result<Option<TokenStream>> {
    if opts.skip {
        return Ok(None);
    }
    let name = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new(field.span(), "field must be named"))?;
    let key = opts.rename.unwrap_or_else(|| name.to_string());

    let (inner, optional) = match option_inner(&field.ty) {
        Some(inner) => (inner, true),
        None => (&field.ty, false),
    };
    let (get_fn, conversion) = param_getter(inner)?;

    let value = match conversion {
        Conversion::None => quote_spanned! { field.span() => val },
        Conversion::Cast(ty) => quote_spanned! { field.span() => val as #ty },
        // integers come in as i64, negative or oversized values must not wrap
        Conversion::Narrow(ty) => quote_spanned! { field.span() =>
            match <#ty as ::std::convert::TryFrom<i64>>::try_from(val) {
                Ok(v) => v,
                Err(_) => {
                    return Err(crate::Error::InvalidConfigurationValue(format!(
                        "invalid value for {}.{}, {} is out of range for {}",
                        config.handler(),
                        #key,
                        val,
                        stringify!(#ty)
                    )))
                }
            }
        },
    };
    let value = if optional {
        quote_spanned! { field.span() => Some(#value) }
    } else {
        value
    };

    Ok(Some(quote_spanned! { field.span() =>
        #key => {
            if let Some(val) = config.#get_fn(#key) {
                let val = val?;
                base.#name = #value
            }
        }
    }))
}

/// How the value returned by the parameter getter becomes the field type
enum Conversion<'a> {
    None,
    Cast(&'a Type),
    Narrow(&'a Type),
}

/// Return `T` when the type is written as `Option<T>`
fn option_inner(ty: &Type) -> Option<&Type> {
    let path = match ty {
        Type::Path(p) if p.qself.is_none() => &p.path,
        _ => return None,
    };
    let segment = path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => match args.args.first()? {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

fn param_getter(ty: &Type) -> syn::Result<(Ident, Conversion)> {
    let ident = match ty {
        Type::Path(p) if p.qself.is_none() => p.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    };
    match ident.as_deref() {
        Some("String") => Ok((format_ident!("get_parameter_as_string"), Conversion::None)),
        Some("bool") => Ok((format_ident!("get_parameter_as_bool"), Conversion::None)),
        Some("f32") | Some("f64") => Ok((
            format_ident!("get_parameter_as_f64"),
            Conversion::Cast(ty),
        )),
        Some("u8") | Some("u16") | Some("u32") | Some("u64") | Some("usize") | Some("i8")
        | Some("i16") | Some("i32") | Some("i64") | Some("isize") => {
            Ok((format_ident!("get_parameter_as_i64"), Conversion::Narrow(ty)))
        }
        _ => Err(syn::Error::new(
            ty.span(),
            "FromServiceConfig doesn't support this field type, use #[service_config(skip)]",
        )),
    }
}
