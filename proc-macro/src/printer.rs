//! Prints conditions the way they are usually written in source code.
//!
//! `stringify!` separates every token by a space, which turns `*r >= 0` into `* r >= 0`. The
//! printer here places spaces around binary operators only.

use proc_macro2::{Delimiter, Spacing, TokenStream, TokenTree};

/// Operators spanning more than one character, longest first.
const COMPOUND_OPERATORS: &[&str] = &[
    "<<=", ">>=", "..=", "...", "::", "..", "->", "=>", "==", "!=", "<=", ">=", "&&", "||", "+=",
    "-=", "*=", "/=", "%=", "^=", "&=", "|=", "<<", ">>",
];

/// Operators that are prefix operators when no operand precedes them.
const PREFIX_OPERATORS: &[&str] = &["!", "-", "*", "&", "&&"];

/// A token of the printed output.
enum Piece {
    /// An identifier, literal or lifetime.
    Word(String),
    /// An operator or separator.
    Op(String),
    /// A delimited group.
    Group(Delimiter, TokenStream),
}

/// What was printed last.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Last {
    /// Nothing yet.
    Start,
    /// A word, such as an identifier.
    Word,
    /// The end of an operand, such as a closing parenthesis or `?`.
    Close,
    /// Something directly followed by the next token, such as `.` or `::`.
    Joined,
    /// A prefix operator.
    Prefix,
    /// Something already followed by a space, such as `,` or a binary operator.
    Spaced,
}

impl Last {
    fn expects_operand(self) -> bool {
        matches!(self, Last::Start | Last::Prefix | Last::Spaced)
    }
}

/// Prints `tokens` with conventional spacing.
pub(crate) fn print(tokens: TokenStream) -> String {
    let mut printer = Printer {
        out: String::new(),
        last: Last::Start,
        closure_params: false,
        generics: 0,
    };

    for piece in pieces(tokens) {
        printer.piece(piece);
    }

    printer.out
}

/// Splits `tokens` into pieces, merging joint punctuation into operators.
fn pieces(tokens: TokenStream) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut tokens = tokens.into_iter().peekable();

    while let Some(tree) = tokens.next() {
        match tree {
            TokenTree::Ident(ident) => pieces.push(Piece::Word(ident.to_string())),
            TokenTree::Literal(literal) => pieces.push(Piece::Word(literal.to_string())),
            TokenTree::Group(group) => pieces.push(Piece::Group(group.delimiter(), group.stream())),
            TokenTree::Punct(punct) if punct.as_char() == '\'' => {
                let mut lifetime = String::from("'");
                if let Some(TokenTree::Ident(ident)) = tokens.peek() {
                    lifetime.push_str(&ident.to_string());
                    tokens.next();
                }
                pieces.push(Piece::Word(lifetime));
            }
            TokenTree::Punct(punct) if punct.as_char() == '_' => {
                pieces.push(Piece::Word("_".into()))
            }
            TokenTree::Punct(punct) => {
                let mut glued = punct.as_char().to_string();
                let mut spacing = punct.spacing();

                while spacing == Spacing::Joint {
                    match tokens.peek() {
                        Some(TokenTree::Punct(next)) if next.as_char() != '\'' => {
                            glued.push(next.as_char());
                            spacing = next.spacing();
                            tokens.next();
                        }
                        _ => break,
                    }
                }

                pieces.extend(split_operators(&glued).into_iter().map(Piece::Op));
            }
        }
    }

    pieces
}

/// Splits glued punctuation such as `!*` into the operators it consists of.
fn split_operators(mut glued: &str) -> Vec<String> {
    let mut operators = Vec::new();

    while !glued.is_empty() {
        let len = COMPOUND_OPERATORS
            .iter()
            .find(|op| glued.starts_with(*op))
            .map(|op| op.len())
            .unwrap_or_else(|| glued.chars().next().map(char::len_utf8).unwrap_or(1));

        operators.push(glued[..len].to_string());
        glued = &glued[len..];
    }

    operators
}

struct Printer {
    out: String,
    last: Last,
    /// Whether the parameters of a closure are being printed.
    closure_params: bool,
    /// The number of open generic argument lists, such as in `Vec::<u8>`.
    generics: usize,
}

impl Printer {
    fn piece(&mut self, piece: Piece) {
        match piece {
            Piece::Word(word) => {
                if matches!(self.last, Last::Word | Last::Close) {
                    self.out.push(' ');
                }
                self.out.push_str(&word);
                self.last = Last::Word;
            }
            Piece::Op(op) => self.op(&op),
            Piece::Group(delimiter, stream) => {
                let inner = print(stream);

                match delimiter {
                    Delimiter::Parenthesis => self.out.push_str(&format!("({})", inner)),
                    Delimiter::Bracket => self.out.push_str(&format!("[{}]", inner)),
                    Delimiter::Brace => {
                        if matches!(self.last, Last::Word | Last::Close) {
                            self.out.push(' ');
                        }
                        if inner.is_empty() {
                            self.out.push_str("{}");
                        } else {
                            self.out.push_str(&format!("{{ {} }}", inner));
                        }
                    }
                    Delimiter::None => self.out.push_str(&inner),
                }

                self.last = Last::Close;
            }
        }
    }

    fn op(&mut self, op: &str) {
        match op {
            "." | "::" | ".." | "..=" => {
                self.out.push_str(op);
                self.last = Last::Joined;
            }
            "?" => {
                self.out.push('?');
                self.last = Last::Close;
            }
            "," | ";" | ":" => {
                self.out.push_str(op);
                self.out.push(' ');
                self.last = Last::Spaced;
            }
            "!" if self.last == Last::Word => {
                // macro invocation
                self.out.push('!');
                self.last = Last::Joined;
            }
            "<" if self.out.ends_with("::") => {
                self.out.push('<');
                self.generics += 1;
                self.last = Last::Joined;
            }
            ">" if self.generics > 0 => {
                self.out.push('>');
                self.generics -= 1;
                self.last = Last::Close;
            }
            ">>" if self.generics > 1 => {
                self.out.push_str(">>");
                self.generics -= 2;
                self.last = Last::Close;
            }
            "||" if self.last.expects_operand() => {
                self.out.push_str("|| ");
                self.last = Last::Spaced;
            }
            "|" if self.closure_params => {
                self.out.push_str("| ");
                self.closure_params = false;
                self.last = Last::Spaced;
            }
            "|" if self.last.expects_operand() => {
                self.out.push('|');
                self.closure_params = true;
                self.last = Last::Joined;
            }
            op if self.last.expects_operand() && PREFIX_OPERATORS.contains(&op) => {
                self.out.push_str(op);
                self.last = Last::Prefix;
            }
            op => {
                if !self.out.ends_with(' ') && !self.out.is_empty() {
                    self.out.push(' ');
                }
                self.out.push_str(op);
                self.out.push(' ');
                self.last = Last::Spaced;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;

    #[test]
    fn prefix_operators() {
        assert_eq!(print(quote! { !self.open }), "!self.open");
        assert_eq!(print(quote! { *r >= 0 }), "*r >= 0");
        assert_eq!(print(quote! { -x < -1 }), "-x < -1");
        assert_eq!(print(quote! { !*flag && &a == &b }), "!*flag && &a == &b");
    }

    #[test]
    fn binary_operators() {
        assert_eq!(print(quote! { divisor != 0 }), "divisor != 0");
        assert_eq!(print(quote! { a * b - c }), "a * b - c");
        assert_eq!(print(quote! { a || b }), "a || b");
    }

    #[test]
    fn method_chains_and_calls() {
        assert_eq!(
            print(quote! { self.items.len() <= self.capacity }),
            "self.items.len() <= self.capacity"
        );
        assert_eq!(print(quote! { v[0].is_some()? }), "v[0].is_some()?");
        assert_eq!(print(quote! { Vec::<u8>::new().is_empty() }), "Vec::<u8>::new().is_empty()");
        assert_eq!(print(quote! { matches!(x, Some(_)) }), "matches!(x, Some(_))");
        assert_eq!(print(quote! { x as u8 == 1 }), "x as u8 == 1");
    }

    #[test]
    fn closures() {
        assert_eq!(
            print(quote! { r.as_ref().map_or(true, |n| *n > 0) }),
            "r.as_ref().map_or(true, |n| *n > 0)"
        );
        assert_eq!(
            print(quote! { v.iter().all(|x: &u8| x.is_ascii()) }),
            "v.iter().all(|x: &u8| x.is_ascii())"
        );
        assert_eq!(print(quote! { f(|| true) }), "f(|| true)");
    }

    #[test]
    fn glued_punctuation() {
        assert_eq!(split_operators("!*"), ["!", "*"]);
        assert_eq!(split_operators(">=-"), [">=", "-"]);
        assert_eq!(split_operators("::"), ["::"]);
    }
}
