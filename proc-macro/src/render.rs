//! Turns conditions into runtime checks around a function body.

use proc_macro2::{Ident, Spacing, TokenStream, TokenTree};
use proc_macro_error::emit_error;
use quote::{format_ident, quote};
use syn::{parse2, spanned::Spanned, Block, Expr, ReturnType, Signature, Type};

use crate::{
    condition::{ClauseList, Condition},
    helpers::{crate_ident, replace_self},
    printer,
};

/// The role a check plays, as shown in its diagnostic message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Role {
    Pre,
    Post,
    Mutated,
    InvariantPre,
    InvariantPost,
}

impl Role {
    fn label(self) -> &'static str {
        match self {
            Role::Pre => "precondition",
            Role::Post => "postcondition",
            Role::Mutated => "mutated-postcondition",
            Role::InvariantPre => "invariant precondition",
            Role::InvariantPost => "invariant postcondition",
        }
    }
}

/// A single condition together with how it is checked.
struct Check {
    role: Role,
    condition: Condition,
    /// The binding standing in for `self`, if the condition is not checked on the receiver.
    receiver: Option<Ident>,
}

impl Check {
    fn render(&self, owner: &str, krate: &Ident) -> TokenStream {
        let message = format!(
            "in {}: {}: {}",
            owner,
            self.role.label(),
            printer::print(self.condition.label())
        );

        let test = match (&self.condition, &self.receiver) {
            (Condition::Expr(expr), None) => quote! { (#expr) },
            (Condition::Expr(expr), Some(receiver)) => {
                let expr = replace_self(quote! { #expr }, receiver);
                quote! {
                    ({
                        let #receiver = &__dbc_result;
                        #expr
                    })
                }
            }
            (Condition::WithResult(closure), _) => {
                quote! { ::#krate::__private::check_result(&__dbc_result, #closure) }
            }
        };

        quote! {
            if __dbc_checked && !#test {
                ::#krate::__private::violated(#message);
            }
        }
    }
}

/// All checks of one function, in the order they run.
pub(crate) struct Checks {
    /// The name the function is reported under.
    owner: String,
    /// The checks before the body.
    pre: Vec<Check>,
    /// The checks after the body.
    post: Vec<Check>,
}

impl Checks {
    pub(crate) fn new(owner: String) -> Checks {
        Checks {
            owner,
            pre: Vec::new(),
            post: Vec::new(),
        }
    }

    /// Adds the conditions of a `contract` attribute.
    ///
    /// Mutated postconditions run after all plain postconditions.
    pub(crate) fn add_contract(&mut self, clauses: ClauseList) {
        let ClauseList { pre, post, mutated } = clauses;

        self.pre.extend(pre.into_iter().map(|condition| Check {
            role: Role::Pre,
            condition,
            receiver: None,
        }));
        self.post.extend(
            post.into_iter()
                .map(|condition| (Role::Post, condition))
                .chain(mutated.into_iter().map(|condition| (Role::Mutated, condition)))
                .map(|(role, condition)| Check {
                    role,
                    condition,
                    receiver: None,
                }),
        );
    }

    /// Checks the invariants on the receiver before the body.
    pub(crate) fn add_invariant_pre<'a>(&mut self, invariants: impl IntoIterator<Item = &'a Expr>) {
        self.pre.extend(invariants.into_iter().map(|expr| Check {
            role: Role::InvariantPre,
            condition: Condition::Expr(expr.clone()),
            receiver: None,
        }));
    }

    /// Checks the invariants after the body.
    ///
    /// With `on_result` set, `self` in the invariants refers to the returned value.
    pub(crate) fn add_invariant_post<'a>(
        &mut self,
        invariants: impl IntoIterator<Item = &'a Expr>,
        on_result: bool,
    ) {
        let receiver = if on_result {
            Some(format_ident!("__dbc_self"))
        } else {
            None
        };

        self.post.extend(invariants.into_iter().map(|expr| Check {
            role: Role::InvariantPost,
            condition: Condition::Expr(expr.clone()),
            receiver: receiver.clone(),
        }));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.post.is_empty()
    }

    /// Renders `block` surrounded by the checks.
    ///
    /// Returns `None` after emitting an error, if the function cannot be checked.
    pub(crate) fn render_body(&self, sig: &Signature, block: &Block) -> Option<Block> {
        if !self.supports(sig) {
            return None;
        }

        let krate = crate_ident();
        let pre = self.pre.iter().map(|check| check.render(&self.owner, &krate));

        let body = if self.post.is_empty() {
            quote! {
                {
                    let __dbc_checked = ::#krate::__private::checks_enabled();
                    #(#pre)*
                    #block
                }
            }
        } else {
            let output = match &sig.output {
                ReturnType::Default => quote! { () },
                ReturnType::Type(_, ty) => quote! { #ty },
            };
            let post = self.post.iter().map(|check| check.render(&self.owner, &krate));

            quote! {
                {
                    let __dbc_checked = ::#krate::__private::checks_enabled();
                    #(#pre)*
                    #[allow(clippy::redundant_closure_call)]
                    let __dbc_result: #output = (|| #block)();
                    #(#post)*
                    __dbc_result
                }
            }
        };

        Some(parse2(body).expect("valid block"))
    }

    /// Emits errors for signatures that cannot carry checks.
    fn supports(&self, sig: &Signature) -> bool {
        let mut supported = true;

        if let Some(asyncness) = &sig.asyncness {
            emit_error!(
                asyncness.span(),
                "contracts cannot be checked on `async fn`";
                help = "check the conditions in a synchronous wrapper instead"
            );
            supported = false;
        }

        if let Some(constness) = &sig.constness {
            emit_error!(constness.span(), "contracts cannot be checked on `const fn`");
            supported = false;
        }

        if !self.post.is_empty() {
            if let ReturnType::Type(_, ty) = &sig.output {
                if let Type::ImplTrait(_) = &**ty {
                    emit_error!(
                        ty.span(),
                        "postconditions cannot be checked on functions returning `impl Trait`"
                    );
                    supported = false;
                }
            }
        }

        supported
    }
}

/// Checks if the type mutably borrows from somewhere, such as `&mut T` or `Option<&'a mut T>`.
///
/// The receiver cannot be inspected while such a result is alive.
pub(crate) fn borrows_mutably(output: &ReturnType) -> bool {
    fn scan(tokens: TokenStream) -> bool {
        let mut after_ampersand = false;
        let mut after_lifetime = false;

        for tree in tokens {
            match tree {
                TokenTree::Group(group) => {
                    if scan(group.stream()) {
                        return true;
                    }
                    after_ampersand = false;
                }
                TokenTree::Punct(punct) if punct.as_char() == '&' => after_ampersand = true,
                TokenTree::Punct(punct)
                    if punct.as_char() == '\'' && punct.spacing() == Spacing::Joint =>
                {
                    after_lifetime = after_ampersand;
                }
                TokenTree::Ident(ident) if ident == "mut" && after_ampersand => return true,
                TokenTree::Ident(_) if after_lifetime => after_lifetime = false,
                _ => after_ampersand = false,
            }
        }

        false
    }

    match output {
        ReturnType::Default => false,
        ReturnType::Type(_, ty) => scan(quote! { #ty }),
    }
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::{parse2, ItemFn};

    use super::*;

    fn mut_borrow(function: TokenStream) -> bool {
        let function: ItemFn = parse2(function).expect("valid function");

        borrows_mutably(&function.sig.output)
    }

    #[test]
    fn detects_mutable_borrows() {
        assert!(mut_borrow(quote! { fn f(&mut self) -> &mut u8 {} }));
        assert!(mut_borrow(quote! { fn f(&mut self) -> Option<&'a mut u8> {} }));
        assert!(mut_borrow(quote! { fn f(&mut self) -> (u8, &mut [u8]) {} }));
    }

    #[test]
    fn ignores_shared_borrows() {
        assert!(!mut_borrow(quote! { fn f(&mut self) {} }));
        assert!(!mut_borrow(quote! { fn f(&self) -> &u8 {} }));
        assert!(!mut_borrow(quote! { fn f(&self) -> Option<&'a u8> {} }));
        assert!(!mut_borrow(quote! { fn f(&self) -> Box<dyn FnMut()> {} }));
    }

    #[test]
    fn messages_are_rendered_at_expansion() {
        let clauses: ClauseList = parse2(quote! { post(|r| *r >= 0) }).expect("valid clauses");
        let mut checks = Checks::new("negate".into());
        checks.add_contract(clauses);

        let rendered = checks.post[0]
            .render(&checks.owner, &format_ident!("dbc"))
            .to_string();

        assert!(rendered.contains("\"in negate: postcondition: *r >= 0\""));
        assert!(!rendered.contains("stringify"));
    }

    #[test]
    fn role_labels() {
        assert_eq!(Role::Pre.label(), "precondition");
        assert_eq!(Role::Mutated.label(), "mutated-postcondition");
        assert_eq!(Role::InvariantPost.label(), "invariant postcondition");
    }
}
