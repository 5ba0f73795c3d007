use darling::{FromDeriveInput, FromField, ast};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(envcfg), supports(struct_named))]
struct RecordReceiver {
    ident: syn::Ident,
    generics: syn::Generics,
    data: ast::Data<(), FieldReceiver>,
}

#[derive(Debug, FromField)]
#[darling(attributes(envcfg))]
struct FieldReceiver {
    ident: Option<syn::Ident>,
    /// Comma-separated source keys.
    #[darling(default)]
    env: Option<String>,
    /// Comma-separated defaults, one per key.
    #[darling(default)]
    default: Option<String>,
    /// Flatten this sub-record into the enclosing one.
    #[darling(default)]
    embed: bool,
}

pub fn process_derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let receiver = match RecordReceiver::from_derive_input(&input) {
        Ok(receiver) => receiver,
        Err(err) => return err.write_errors().into(),
    };

    match generate_record_impl(&receiver) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into(),
    }
}

fn generate_record_impl(receiver: &RecordReceiver) -> darling::Result<TokenStream2> {
    let ast::Data::Struct(fields) = &receiver.data else {
        unreachable!("darling only accepts named structs here")
    };

    let mut errors = darling::Error::accumulator();
    let entries: Vec<TokenStream2> = fields
        .iter()
        .filter_map(|field| errors.handle(field_entry(field)))
        .collect();
    errors.finish()?;

    let ident = &receiver.ident;
    let name = ident.to_string();
    let (impl_generics, ty_generics, where_clause) = receiver.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::envcfg::Record for #ident #ty_generics #where_clause {
            fn record_name(&self) -> &'static str {
                #name
            }

            fn fields(&mut self) -> ::std::vec::Vec<::envcfg::Field<'_>> {
                ::std::vec![#(#entries),*]
            }
        }
    })
}

fn field_entry(field: &FieldReceiver) -> darling::Result<TokenStream2> {
    let Some(ident) = field.ident.as_ref() else {
        return Err(darling::Error::unsupported_shape("tuple fields"));
    };
    let name = ident.to_string();

    if field.embed {
        if field.env.is_some() || field.default.is_some() {
            return Err(darling::Error::custom(
                "`embed` cannot be combined with `env` or `default`",
            )
            .with_span(ident));
        }
        return Ok(quote! {
            ::envcfg::Field::embedded(#name, &mut self.#ident)
        });
    }

    match (&field.env, &field.default) {
        (Some(env), Some(default)) => Ok(quote! {
            ::envcfg::Field::tagged(#name, #env, &mut self.#ident).with_default(#default)
        }),
        (Some(env), None) => Ok(quote! {
            ::envcfg::Field::tagged(#name, #env, &mut self.#ident)
        }),
        (None, Some(_)) => Err(darling::Error::custom(
            "`default` needs an `env` tag naming the keys it applies to",
        )
        .with_span(ident)),
        (None, None) => Ok(quote! {
            ::envcfg::Field::untagged(#name)
        }),
    }
}
