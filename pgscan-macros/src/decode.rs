use proc_macro::TokenStream;
use quote::quote;
use syn::*;
use crate::error;

pub fn decode(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput { attrs: _, vis: _, ident, mut generics, data } = input;

    let q1 = match data {
        Data::Struct(st) => match &st.fields {
            Fields::Unnamed(FieldsUnnamed { unnamed, .. }) => {
                if unnamed.len() != 1 {
                    error!("only one field struct is supported")
                }

                quote! {
                    Ok(Self(::pgscan::Decode::decode(value)?))
                }
            }
            Fields::Named(FieldsNamed { named, .. }) => {
                let Some(name) = named.first().and_then(|e| e.ident.as_ref()) else {
                    error!("only one field struct is supported")
                };
                if named.len() != 1 {
                    error!("only one field struct is supported")
                }

                quote! {
                    Ok(Self {
                        #name: ::pgscan::Decode::decode(value)?,
                    })
                }
            },
            Fields::Unit => error!("unit struct have no value to decode"),
        },
        Data::Enum(_) => error!("enum is not yet supported"),
        Data::Union(_) => error!("union is not supported"),
    };

    for ty in generics.type_params_mut() {
        ty.bounds.push(syn::parse_quote!(::pgscan::Decode));
    }

    let (g1, g2, g3) = generics.split_for_impl();

    Ok(quote! {
        #[automatically_derived]
        impl #g1 ::pgscan::Decode for #ident #g2 #g3 {
            fn decode(
                value: ::std::option::Option<&::pgscan::bytes::Bytes>,
            ) -> ::std::result::Result<Self, ::pgscan::DecodeError> {
                #q1
            }
        }
    }.into())
}
