//! Attribute macros for the `dbc` crate.
//!
//! This crate is an implementation detail of `dbc`. Use the re-exports of that crate instead.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use proc_macro_error::proc_macro_error;
use quote::quote;
use syn::{parse_macro_input, ItemFn, ItemImpl};

use crate::{condition::ClauseList, invariant::InvariantList};

mod condition;
mod contract;
mod helpers;
mod invariant;
mod printer;
mod render;

/// Checks pre- and postconditions around a function.
///
/// See the documentation of `dbc::contract` for details.
#[proc_macro_attribute]
#[proc_macro_error]
pub fn contract(attr: TokenStream, function: TokenStream) -> TokenStream {
    let dummy_function: TokenStream2 = function.clone().into();
    proc_macro_error::set_dummy(quote! {
        #dummy_function
    });

    let clauses = parse_macro_input!(attr as ClauseList);
    let function = parse_macro_input!(function as ItemFn);

    let output = contract::render_contract(clauses, function);

    proc_macro_error::set_dummy(quote! {
        #output
    });

    output.into()
}

/// Checks class invariants around the methods of an `impl` block.
///
/// See the documentation of `dbc::invariant` for details.
#[proc_macro_attribute]
#[proc_macro_error]
pub fn invariant(attr: TokenStream, item: TokenStream) -> TokenStream {
    let dummy_item: TokenStream2 = item.clone().into();
    proc_macro_error::set_dummy(quote! {
        #dummy_item
    });

    let invariants = parse_macro_input!(attr as InvariantList);
    let item = parse_macro_input!(item as ItemImpl);

    let output = invariant::render_invariant(invariants, item);

    // Reset the dummy here, in case errors were emitted for single methods.
    // This keeps the `contract` attributes of the methods from being expanded a second time.
    proc_macro_error::set_dummy(quote! {
        #output
    });

    output.into()
}
