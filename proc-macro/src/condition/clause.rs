//! Defines the clauses grouping conditions by their role.

use std::fmt;
use syn::{
    parenthesized,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    token::Paren,
    Token,
};

use super::Condition;

/// The custom keywords used by the clauses.
mod custom_keywords {
    use syn::custom_keyword;

    custom_keyword!(pre);
    custom_keyword!(post);
    custom_keyword!(mutated);
}

/// The role of the conditions in a clause.
#[derive(Clone, Copy)]
enum ClauseKind {
    /// Conditions checked before the call.
    Pre(custom_keywords::pre),
    /// Conditions checked after the call, possibly with the result.
    Post(custom_keywords::post),
    /// Conditions checked after the call against the arguments.
    Mutated(custom_keywords::mutated),
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClauseKind::Pre(_) => write!(f, "pre"),
            ClauseKind::Post(_) => write!(f, "post"),
            ClauseKind::Mutated(_) => write!(f, "mutated"),
        }
    }
}

impl Parse for ClauseKind {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let lookahead = input.lookahead1();

        if lookahead.peek(custom_keywords::pre) {
            Ok(ClauseKind::Pre(input.parse()?))
        } else if lookahead.peek(custom_keywords::post) {
            Ok(ClauseKind::Post(input.parse()?))
        } else if lookahead.peek(custom_keywords::mutated) {
            Ok(ClauseKind::Mutated(input.parse()?))
        } else {
            Err(lookahead.error())
        }
    }
}

/// A clause of a `contract` attribute, such as `pre(x > 0, y > 0)`.
struct Clause {
    /// The kind of the clause.
    kind: ClauseKind,
    /// The parentheses following the keyword.
    _parentheses: Paren,
    /// The conditions in the clause.
    conditions: Punctuated<Condition, Token![,]>,
}

impl Parse for Clause {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let kind: ClauseKind = input.parse()?;
        let content;
        let parentheses = parenthesized!(content in input);
        let conditions: Punctuated<Condition, Token![,]> = Punctuated::parse_terminated(&content)?;

        if conditions.is_empty() {
            return Err(syn::Error::new(
                kind.span(),
                format!("`{}` clause without conditions", kind),
            ));
        }

        if let ClauseKind::Pre(_) | ClauseKind::Mutated(_) = kind {
            if let Some(closure) = conditions.iter().find(|c| c.takes_result()) {
                return Err(syn::Error::new(
                    closure.span(),
                    format!("only postconditions can receive the result, not `{}`", kind),
                ));
            }
        }

        Ok(Clause {
            kind,
            _parentheses: parentheses,
            conditions,
        })
    }
}

/// The conditions of a `contract` attribute, grouped by role.
#[derive(Debug, Default)]
pub(crate) struct ClauseList {
    /// The preconditions in the order they were specified.
    pub(crate) pre: Vec<Condition>,
    /// The postconditions in the order they were specified.
    pub(crate) post: Vec<Condition>,
    /// The mutated postconditions in the order they were specified.
    pub(crate) mutated: Vec<Condition>,
}

impl Parse for ClauseList {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let clauses: Punctuated<Clause, Token![,]> = Punctuated::parse_terminated(input)?;
        let mut list = ClauseList::default();

        for clause in clauses {
            list.target(clause.kind).extend(clause.conditions);
        }

        Ok(list)
    }
}

impl ClauseKind {
    fn span(&self) -> proc_macro2::Span {
        match self {
            ClauseKind::Pre(keyword) => keyword.span,
            ClauseKind::Post(keyword) => keyword.span,
            ClauseKind::Mutated(keyword) => keyword.span,
        }
    }
}

impl ClauseList {
    fn target(&mut self, kind: ClauseKind) -> &mut Vec<Condition> {
        match kind {
            ClauseKind::Pre(_) => &mut self.pre,
            ClauseKind::Post(_) => &mut self.post,
            ClauseKind::Mutated(_) => &mut self.mutated,
        }
    }

    /// Adds all conditions of `other` after the ones already present.
    pub(crate) fn extend(&mut self, other: ClauseList) {
        self.pre.extend(other.pre);
        self.post.extend(other.post);
        self.mutated.extend(other.mutated);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.post.is_empty() && self.mutated.is_empty()
    }
}
