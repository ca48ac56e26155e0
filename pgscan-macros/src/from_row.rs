use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{token::{Brace, Paren}, *};

use crate::error;

pub fn from_row(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput { attrs: _, vis: _, ident, generics, data } = input;
    let Data::Struct(data) = data else {
        error!("only struct are currently supported")
    };

    let mut output = quote! {};
    let mut offset = quote! { 0 };

    let mut decode_field = |field: &Field| -> Result<TokenStream2> {
        let ty = &field.ty;
        let (value, len) = match is_flatten(field)? {
            true => (
                quote! { <#ty as ::pgscan::row::FromRow>::from_row(columns, offset + #offset)? },
                quote! { <#ty as ::pgscan::row::FromRow>::COLUMNS },
            ),
            false => (
                quote! { ::pgscan::row::try_get::<#ty>(columns, offset + #offset)? },
                quote! { 1 },
            ),
        };
        offset = quote! { #offset + #len };
        Ok(value)
    };

    match &data.fields {
        Fields::Unnamed(FieldsUnnamed { unnamed, .. }) => {
            let body = unnamed
                .iter()
                .map(|e| decode_field(e).map(|value| quote! { #value, }))
                .collect::<Result<Vec<_>>>()?;
            Paren::default().surround(&mut output, |e|e.extend(body));
        },
        Fields::Named(FieldsNamed { named, .. }) => {
            let body = named
                .iter()
                .map(|e| {
                    let id = e.ident.as_ref();
                    decode_field(e).map(|value| quote! { #id: #value, })
                })
                .collect::<Result<Vec<_>>>()?;
            Brace::default().surround(&mut output, |e|e.extend(body));
        }
        Fields::Unit => {}
    };

    let (g1, g2, g3) = generics.split_for_impl();

    Ok(quote! {
        #[automatically_derived]
        impl #g1 ::pgscan::row::FromRow for #ident #g2 #g3 {
            const COLUMNS: usize = #offset;

            fn from_row(
                columns: &::pgscan::row::Columns,
                offset: usize,
            ) -> ::std::result::Result<Self, ::pgscan::DecodeError> {
                Ok(Self #output)
            }
        }
    }.into())
}

/// `#[row(flatten)]`
fn is_flatten(field: &Field) -> Result<bool> {
    let Some(attr) = field.attrs.iter().find(|attr| attr.path().is_ident("row")) else {
        return Ok(false);
    };
    attr.parse_args_with(|e: parse::ParseStream| {
        if e.parse::<Ident>()? == "flatten" {
            Ok(true)
        } else {
            error!("possible value are: `flatten`")
        }
    })
}
