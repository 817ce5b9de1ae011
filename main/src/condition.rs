//! Conditions and how they are prepared for checking.

use indexmap::IndexMap;
use std::{fmt, iter::FromIterator, rc::Rc};

use crate::{
    args::Scope,
    error::{ContractViolation, Result},
};

/// The function type of the predicate of a condition.
type Predicate = dyn Fn(&Scope) -> Result<bool>;

/// The role a condition plays for the callable it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Checked before the call with the bound arguments.
    Precondition,
    /// Checked after the call, possibly with access to the result.
    Postcondition,
    /// Checked after the call with the bound, possibly mutated, arguments.
    MutatedPostcondition,
    /// A class invariant checked before a method call.
    InvariantPrecondition,
    /// A class invariant checked after a method call.
    InvariantPostcondition,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Role::Precondition => "precondition",
            Role::Postcondition => "postcondition",
            Role::MutatedPostcondition => "mutated-postcondition",
            Role::InvariantPrecondition => "invariant precondition",
            Role::InvariantPostcondition => "invariant postcondition",
        })
    }
}

/// How a condition is rendered in diagnostics.
#[derive(Debug, Clone)]
enum Label {
    /// The source text of an inline expression.
    Expr(String),
    /// The name of a reusable validator.
    Named(String),
}

struct ConditionInner {
    label: Label,
    predicate: Rc<Predicate>,
    takes_result: bool,
}

/// A boolean predicate over the parameter bindings of a call.
///
/// Conditions are compared by identity: clones of a condition are the same condition, while two
/// separately created conditions are different even if they look alike.
#[derive(Clone)]
pub struct Condition(Rc<ConditionInner>);

/// The identity of a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConditionId(usize);

impl Condition {
    fn new(label: Label, predicate: impl Fn(&Scope) -> Result<bool> + 'static) -> Condition {
        Condition(Rc::new(ConditionInner {
            label,
            predicate: Rc::new(predicate),
            takes_result: false,
        }))
    }

    /// Creates an inline condition, labeled with its expression text.
    ///
    /// ```rust
    /// use dbc::Condition;
    ///
    /// let non_negative = Condition::expr("x >= 0", |scope| Ok(scope.int("x")? >= 0));
    /// assert_eq!(non_negative.render(), "x >= 0");
    /// ```
    pub fn expr(
        source: impl Into<String>,
        predicate: impl Fn(&Scope) -> Result<bool> + 'static,
    ) -> Condition {
        Condition::new(Label::Expr(source.into()), predicate)
    }

    /// Creates a condition from a named validator, labeled with that name.
    pub fn named(
        name: impl Into<String>,
        predicate: impl Fn(&Scope) -> Result<bool> + 'static,
    ) -> Condition {
        Condition::new(Label::Named(name.into()), predicate)
    }

    /// Declares that this postcondition inspects the result of the call.
    ///
    /// The result is then available through [`Scope::result`]. This creates a new condition.
    pub fn with_result(self) -> Condition {
        Condition(Rc::new(ConditionInner {
            label: self.0.label.clone(),
            predicate: Rc::clone(&self.0.predicate),
            takes_result: true,
        }))
    }

    pub fn id(&self) -> ConditionId {
        ConditionId(Rc::as_ptr(&self.0) as *const () as usize)
    }

    /// Whether the condition wants the result of the call.
    pub fn takes_result(&self) -> bool {
        self.0.takes_result
    }

    /// The human readable form of this condition.
    pub fn render(&self) -> &str {
        match &self.0.label {
            Label::Expr(source) => {
                let source = source.trim();
                source.strip_prefix("return ").unwrap_or(source).trim_start()
            }
            Label::Named(name) => name.as_str(),
        }
    }

    /// Evaluates the predicate.
    pub fn check(&self, scope: &Scope) -> Result<bool> {
        (self.0.predicate)(scope)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Condition({:?})", self.render())
    }
}

/// An ordered set of conditions without duplicates.
#[derive(Debug, Clone, Default)]
pub struct ConditionSet {
    conditions: IndexMap<ConditionId, Condition>,
}

impl ConditionSet {
    pub fn new() -> ConditionSet {
        ConditionSet::default()
    }

    /// Adds a condition, returning `false` if it was already present.
    pub fn insert(&mut self, condition: Condition) -> bool {
        let id = condition.id();
        if self.conditions.contains_key(&id) {
            false
        } else {
            self.conditions.insert(id, condition);
            true
        }
    }

    pub fn contains(&self, condition: &Condition) -> bool {
        self.conditions.contains_key(&condition.id())
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Iterates over the conditions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.values()
    }
}

impl Extend<Condition> for ConditionSet {
    fn extend<I: IntoIterator<Item = Condition>>(&mut self, iter: I) {
        for condition in iter {
            self.insert(condition);
        }
    }
}

impl<'a> Extend<&'a Condition> for ConditionSet {
    fn extend<I: IntoIterator<Item = &'a Condition>>(&mut self, iter: I) {
        self.extend(iter.into_iter().cloned());
    }
}

impl FromIterator<Condition> for ConditionSet {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> ConditionSet {
        let mut set = ConditionSet::new();
        set.extend(iter);
        set
    }
}

impl From<Condition> for ConditionSet {
    fn from(condition: Condition) -> ConditionSet {
        std::iter::once(condition).collect()
    }
}

impl From<Vec<Condition>> for ConditionSet {
    fn from(conditions: Vec<Condition>) -> ConditionSet {
        conditions.into_iter().collect()
    }
}

impl<const N: usize> From<[Condition; N]> for ConditionSet {
    fn from(conditions: [Condition; N]) -> ConditionSet {
        IntoIterator::into_iter(conditions).collect()
    }
}

impl From<&[Condition]> for ConditionSet {
    fn from(conditions: &[Condition]) -> ConditionSet {
        conditions.iter().cloned().collect()
    }
}

impl From<&ConditionSet> for ConditionSet {
    fn from(conditions: &ConditionSet) -> ConditionSet {
        conditions.clone()
    }
}

/// A condition together with its diagnostic message.
#[derive(Debug, Clone)]
pub struct Prepared {
    condition: Condition,
    message: Rc<str>,
}

impl Prepared {
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// The message reported when the condition does not hold.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Checks the condition, failing with a contract violation if it does not hold.
    pub(crate) fn check(&self, scope: &Scope) -> Result<()> {
        if self.condition.check(scope)? {
            Ok(())
        } else {
            tracing::debug!(message = %self.message, "contract violated");
            Err(ContractViolation::new(&*self.message).into())
        }
    }
}

/// Prepared conditions of one role, in declaration order.
pub type PreparedConditions = IndexMap<ConditionId, Prepared>;

/// Composes the diagnostic message for each of the given conditions.
///
/// The messages have the form `in <owner>: <role>: <rendering>`. Duplicate conditions are only
/// included once.
pub fn prepare(conditions: impl Into<ConditionSet>, role: Role, owner: &str) -> PreparedConditions {
    let conditions: ConditionSet = conditions.into();
    conditions
        .iter()
        .map(|condition| {
            let message = format!("in {}: {}: {}", owner, role, condition.render());
            (
                condition.id(),
                Prepared {
                    condition: condition.clone(),
                    message: message.into(),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always() -> Condition {
        Condition::expr("true", |_| Ok(true))
    }

    #[test]
    fn prepare_single_condition() {
        let condition = Condition::expr("x >= 0", |scope| Ok(scope.int("x")? >= 0));

        let prepared = prepare(condition.clone(), Role::Precondition, "vector");

        assert_eq!(prepared.len(), 1);
        assert_eq!(
            prepared[&condition.id()].message(),
            "in vector: precondition: x >= 0"
        );
    }

    #[test]
    fn prepare_keeps_declaration_order() {
        let first = Condition::expr("b", |_| Ok(true));
        let second = Condition::expr("a", |_| Ok(true));

        let prepared = prepare(
            vec![first, second],
            Role::MutatedPostcondition,
            "mutator",
        );

        assert_eq!(
            prepared.values().map(Prepared::message).collect::<Vec<_>>(),
            [
                "in mutator: mutated-postcondition: b",
                "in mutator: mutated-postcondition: a"
            ]
        );
    }

    #[test]
    fn prepare_removes_duplicates() {
        let condition = always();

        let prepared = prepare(
            vec![condition.clone(), always(), condition],
            Role::Postcondition,
            "f",
        );

        assert_eq!(prepared.len(), 2);
    }

    #[test]
    fn named_conditions_render_their_name() {
        let condition = Condition::named("is_number", |_| Ok(true));

        let prepared = prepare([condition], Role::Postcondition, "add");

        assert_eq!(
            prepared.values().next().map(Prepared::message),
            Some("in add: postcondition: is_number")
        );
    }

    #[test]
    fn leading_return_is_stripped() {
        assert_eq!(Condition::expr("return x < 10", |_| Ok(true)).render(), "x < 10");
        assert_eq!(Condition::expr("returned", |_| Ok(true)).render(), "returned");
        assert_eq!(Condition::named("return x", |_| Ok(true)).render(), "return x");
    }

    #[test]
    fn with_result_creates_a_new_condition() {
        let condition = always();
        let with_result = condition.clone().with_result();

        assert!(!condition.takes_result());
        assert!(with_result.takes_result());
        assert_ne!(condition.id(), with_result.id());
        assert_eq!(with_result.render(), "true");
    }

    #[test]
    fn invariant_roles_are_labeled() {
        assert_eq!(Role::InvariantPrecondition.to_string(), "invariant precondition");
        assert_eq!(Role::InvariantPostcondition.to_string(), "invariant postcondition");
    }

    #[test]
    fn failing_prepared_check_reports_message() {
        let condition = Condition::expr("false", |_| Ok(false));
        let prepared = prepare(condition, Role::Precondition, "f");
        let scope = crate::Signature::default().bind(&crate::Args::new());

        let err = prepared
            .values()
            .next()
            .expect("one condition")
            .check(&scope)
            .unwrap_err();

        assert_eq!(err.to_string(), "in f: precondition: false");
    }
}
