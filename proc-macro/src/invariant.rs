//! Defines the `invariant` attribute for `impl` blocks.

use proc_macro2::TokenStream;
use proc_macro_error::emit_error;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Expr, FnArg, ImplItem, ImplItemMethod, ItemImpl, ReturnType, Token, Type, Visibility,
};

use crate::{
    condition::ClauseList,
    helpers::{is_attr, take_attrs_parsed, Parenthesized},
    render::{borrows_mutably, Checks},
};

/// The conditions of an `invariant` attribute.
#[derive(Debug)]
pub(crate) struct InvariantList {
    /// The invariants in the order they were specified.
    conditions: Punctuated<Expr, Token![,]>,
}

impl Parse for InvariantList {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let conditions: Punctuated<Expr, Token![,]> = Punctuated::parse_terminated(input)?;

        if let Some(closure) = conditions.iter().find(|c| matches!(c, Expr::Closure(_))) {
            return Err(syn::Error::new(
                closure.span(),
                "an invariant is an expression over `self`, not a closure",
            ));
        }

        Ok(InvariantList { conditions })
    }
}

/// How the invariants apply to a single method.
#[derive(Debug, PartialEq, Eq)]
enum Guard {
    /// The method is not checked.
    Unchecked,
    /// The receiver is checked before the call only.
    Before,
    /// The receiver is checked before and after the call.
    Both,
    /// The returned value is checked.
    Result,
}

/// The kind of `impl` block the attribute was applied to.
struct ImplKind {
    /// The name of the implementing type.
    type_name: String,
    /// Whether this implements a trait.
    is_trait: bool,
    /// Whether this implements `Drop`.
    is_drop: bool,
}

impl ImplKind {
    fn of(item: &ItemImpl) -> Option<ImplKind> {
        let type_name = match &*item.self_ty {
            Type::Path(path) if path.qself.is_none() => path.path.segments.last()?.ident.to_string(),
            _ => return None,
        };
        let trait_name = item
            .trait_
            .as_ref()
            .and_then(|(_, path, _)| path.segments.last())
            .map(|segment| segment.ident.to_string());

        Some(ImplKind {
            type_name,
            is_trait: trait_name.is_some(),
            is_drop: trait_name.as_deref() == Some("Drop"),
        })
    }

    /// Decides how the invariants apply to `method`.
    fn guard(&self, method: &ImplItemMethod) -> Guard {
        if self.is_drop {
            return Guard::Before;
        }

        if !self.is_trait {
            if let Visibility::Inherited = method.vis {
                return Guard::Unchecked;
            }
        }

        match method.sig.inputs.first() {
            Some(FnArg::Receiver(receiver)) => {
                if receiver.reference.is_none() || borrows_mutably(&method.sig.output) {
                    Guard::Before
                } else {
                    Guard::Both
                }
            }
            _ if self.constructs(&method.sig.output) => Guard::Result,
            _ => Guard::Unchecked,
        }
    }

    /// Checks if a function returning `output` constructs the implementing type.
    fn constructs(&self, output: &ReturnType) -> bool {
        match output {
            ReturnType::Type(_, ty) => match &**ty {
                Type::Path(path) if path.qself.is_none() => path
                    .path
                    .segments
                    .last()
                    .map(|segment| segment.ident == "Self" || segment.ident == self.type_name)
                    .unwrap_or(false),
                _ => false,
            },
            ReturnType::Default => false,
        }
    }
}

/// Renders `item` with the invariants checked around its methods.
///
/// A `contract` attribute on a method is combined with the invariants, so that both are checked
/// in a single wrapper.
pub(crate) fn render_invariant(invariants: InvariantList, mut item: ItemImpl) -> TokenStream {
    let kind = match ImplKind::of(&item) {
        Some(kind) => kind,
        None => {
            emit_error!(
                item.self_ty.span(),
                "invariants can only be declared for named types"
            );

            return quote! { #item };
        }
    };

    for impl_item in item.items.iter_mut() {
        if let ImplItem::Method(method) = impl_item {
            render_method(&kind, &invariants, method);
        }
    }

    quote! { #item }
}

fn render_method(kind: &ImplKind, invariants: &InvariantList, method: &mut ImplItemMethod) {
    let mut clauses = ClauseList::default();

    take_attrs_parsed(
        &mut method.attrs,
        |attr| is_attr("contract", attr),
        |parsed: Parenthesized<ClauseList>| clauses.extend(parsed.content),
    );

    let mut checks = Checks::new(format!("{}::{}", kind.type_name, method.sig.ident));
    checks.add_contract(clauses);

    match kind.guard(method) {
        Guard::Unchecked => (),
        Guard::Before => checks.add_invariant_pre(&invariants.conditions),
        Guard::Both => {
            checks.add_invariant_pre(&invariants.conditions);
            checks.add_invariant_post(&invariants.conditions, false);
        }
        Guard::Result => checks.add_invariant_post(&invariants.conditions, true),
    }

    if checks.is_empty() {
        return;
    }

    if let Some(block) = checks.render_body(&method.sig, &method.block) {
        method.block = block;
    }
}
