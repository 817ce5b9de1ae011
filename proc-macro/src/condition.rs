//! Defines what a condition is and how it's parsed.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use std::fmt;
use syn::{
    parse::{Parse, ParseStream},
    spanned::Spanned,
    Expr, ExprClosure,
};

pub(crate) use self::clause::ClauseList;

mod clause;

/// A single condition of a contract.
#[derive(Clone)]
pub(crate) enum Condition {
    /// A boolean expression over the parameters.
    Expr(Expr),
    /// A closure receiving a reference to the return value.
    ///
    /// Only valid as a postcondition.
    WithResult(ExprClosure),
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Condition::Expr(expr) => write!(f, "{}", quote! { #expr }),
            Condition::WithResult(closure) => write!(f, "{}", quote! { #closure }),
        }
    }
}

impl Parse for Condition {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        match input.parse()? {
            Expr::Closure(closure) => {
                if closure.inputs.len() != 1 {
                    Err(syn::Error::new(
                        closure.span(),
                        "a postcondition closure takes exactly one argument: the result",
                    ))
                } else if closure.asyncness.is_some() || closure.movability.is_some() {
                    Err(syn::Error::new(
                        closure.span(),
                        "a postcondition must be a plain closure",
                    ))
                } else {
                    Ok(Condition::WithResult(closure))
                }
            }
            expr => Ok(Condition::Expr(expr)),
        }
    }
}

impl Condition {
    /// The span of the whole condition.
    pub(crate) fn span(&self) -> Span {
        match self {
            Condition::Expr(expr) => expr.span(),
            Condition::WithResult(closure) => closure.span(),
        }
    }

    /// The tokens shown in the diagnostic message of this condition.
    ///
    /// For closures this is only the body, so `|r| *r > 0` is reported as `*r > 0`.
    pub(crate) fn label(&self) -> TokenStream {
        match self {
            Condition::Expr(expr) => quote! { #expr },
            Condition::WithResult(closure) => {
                let body = &closure.body;
                quote! { #body }
            }
        }
    }

    /// Returns `true` if the condition wants to see the return value.
    pub(crate) fn takes_result(&self) -> bool {
        matches!(self, Condition::WithResult(_))
    }
}
