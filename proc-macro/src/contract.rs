//! Defines the `contract` attribute for free functions and methods.

use proc_macro2::TokenStream;
use proc_macro_error::emit_warning;
use quote::quote;
use syn::{spanned::Spanned, ItemFn};

use crate::{condition::ClauseList, render::Checks};

/// Renders `function` with the checks of `clauses` around its body.
pub(crate) fn render_contract(clauses: ClauseList, mut function: ItemFn) -> TokenStream {
    if clauses.is_empty() {
        emit_warning!(
            function.sig.span(),
            "this contract has no conditions and is ignored"
        );

        return quote! { #function };
    }

    let mut checks = Checks::new(function.sig.ident.to_string());
    checks.add_contract(clauses);

    if let Some(block) = checks.render_body(&function.sig, &function.block) {
        function.block = Box::new(block);
    }

    quote! { #function }
}
