//! Helpers shared by the attribute implementations.

use lazy_static::lazy_static;
use proc_macro2::{Group, Ident, Span, TokenStream, TokenTree};
use proc_macro_error::{abort_call_site, emit_error};
use std::env;
use syn::{
    parenthesized,
    parse::{Parse, ParseStream},
    token::Paren,
    Attribute,
};

lazy_static! {
    /// The name of the main `dbc` crate, as seen by the crate using the attributes.
    pub(crate) static ref CRATE_NAME: String = {
        match proc_macro_crate::crate_name("dbc") {
            Ok(name) => name,
            Err(err) => match env::var("CARGO_PKG_NAME") {
                // Doc tests and integration tests of `dbc` itself.
                Ok(val) if val == "dbc" => "dbc".into(),
                _ if cfg!(test) => "dbc".into(),
                _ => abort_call_site!("crate `dbc` must be imported: {}", err),
            },
        }
    };
}

/// The identifier under which the main crate can be reached.
pub(crate) fn crate_ident() -> Ident {
    Ident::new(&CRATE_NAME, Span::call_site())
}

/// Checks if `attr` is the attribute `name` of the main crate, as in `#[name]` or `#[dbc::name]`.
pub(crate) fn is_attr(name: &str, attr: &Attribute) -> bool {
    let segments = &attr.path.segments;

    match segments.len() {
        1 => segments[0].ident == name,
        2 => segments[0].ident == *CRATE_NAME && segments[1].ident == name,
        _ => false,
    }
}

/// Removes the attributes matching `filter` and passes each of them to `visit` once parsed.
///
/// Attributes that fail to parse are reported as errors.
pub(crate) fn take_attrs_parsed<ParsedAttr: Parse>(
    attributes: &mut Vec<Attribute>,
    filter: impl Fn(&Attribute) -> bool,
    mut visit: impl FnMut(ParsedAttr),
) {
    let (taken, kept): (Vec<_>, Vec<_>) = attributes.drain(..).partition(|attr| filter(attr));
    *attributes = kept;

    for attr in taken {
        match syn::parse2::<ParsedAttr>(attr.tokens) {
            Ok(parsed_attr) => visit(parsed_attr),
            Err(err) => emit_error!(err),
        }
    }
}

/// A parsable thing surrounded by parentheses.
pub(crate) struct Parenthesized<T> {
    /// The parentheses surrounding the object.
    _parentheses: Paren,
    /// The content that was surrounded by the parentheses.
    pub(crate) content: T,
}

impl<T: Parse> Parse for Parenthesized<T> {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let content;
        let parentheses = parenthesized!(content in input);
        let content = content.parse()?;

        Ok(Parenthesized {
            _parentheses: parentheses,
            content,
        })
    }
}

/// Replaces every `self` in `tokens` with `replacement`.
///
/// This allows checking conditions written for methods on a value that is not the receiver.
pub(crate) fn replace_self(tokens: TokenStream, replacement: &Ident) -> TokenStream {
    tokens
        .into_iter()
        .map(|tree| match tree {
            TokenTree::Ident(ident) if ident == "self" => TokenTree::Ident(replacement.clone()),
            TokenTree::Group(group) => {
                let mut replaced =
                    Group::new(group.delimiter(), replace_self(group.stream(), replacement));
                replaced.set_span(group.span());
                TokenTree::Group(replaced)
            }
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use quote::{format_ident, quote};

    use super::*;

    #[test]
    fn replace_self_descends_into_groups() {
        let replaced = replace_self(
            quote! { self.count <= (self.capacity + self_like) },
            &format_ident!("other"),
        );

        assert_eq!(
            replaced.to_string(),
            quote! { other.count <= (other.capacity + self_like) }.to_string()
        );
    }

    #[test]
    fn take_matching_attributes() {
        let mut function: syn::ItemFn = syn::parse2(quote! {
            #[contract(first)]
            #[inline]
            #[dbc::contract(second)]
            #[other::contract(third)]
            fn f() {}
        })
        .expect("valid function");
        let mut taken = Vec::new();

        take_attrs_parsed(
            &mut function.attrs,
            |attr| is_attr("contract", attr),
            |parsed: Parenthesized<Ident>| taken.push(parsed.content.to_string()),
        );

        assert_eq!(taken, ["first", "second"]);
        assert_eq!(function.attrs.len(), 2);
    }

    #[test]
    fn parse_parenthesized() {
        let result: syn::Result<Parenthesized<syn::Expr>> = syn::parse2(quote! { (a + b) });

        assert!(result.is_ok());

        let result: syn::Result<Parenthesized<syn::Expr>> = syn::parse2(quote! { a + b });

        assert!(result.is_err());
    }
}
