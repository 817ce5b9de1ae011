//! Callables of the dynamic object model and the contracts wrapped around them.

use std::{fmt, rc::Rc};

use crate::{
    args::{Args, Scope, Signature},
    condition::{prepare, ConditionSet, Prepared, PreparedConditions, Role},
    error::Result,
    mode,
    value::Value,
};

/// The native implementation of a function.
type Body = dyn Fn(Args) -> Result<Value>;

/// When a group of conditions is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before the call, against the bound arguments.
    Pre,
    /// After the call, with access to the result.
    Post,
    /// After the call, against the bound arguments.
    Mutated,
}

/// The prepared conditions attached to a contracted function.
#[derive(Debug, Clone, Default)]
pub struct ContractTable {
    pre: PreparedConditions,
    post: PreparedConditions,
    mutated: PreparedConditions,
}

impl ContractTable {
    pub fn new() -> ContractTable {
        ContractTable::default()
    }

    fn phase_mut(&mut self, phase: Phase) -> &mut PreparedConditions {
        match phase {
            Phase::Pre => &mut self.pre,
            Phase::Post => &mut self.post,
            Phase::Mutated => &mut self.mutated,
        }
    }

    /// The conditions checked in `phase`, in the order they are checked.
    pub fn phase(&self, phase: Phase) -> impl Iterator<Item = &Prepared> {
        match phase {
            Phase::Pre => &self.pre,
            Phase::Post => &self.post,
            Phase::Mutated => &self.mutated,
        }
        .values()
    }

    /// Prepares `conditions` and adds them to `phase`.
    ///
    /// Conditions that are already part of the phase keep their original message.
    pub fn add(
        &mut self,
        phase: Phase,
        conditions: impl Into<ConditionSet>,
        role: Role,
        owner: &str,
    ) -> &mut ContractTable {
        let prepared = prepare(conditions, role, owner);
        let target = self.phase_mut(phase);
        for (id, entry) in prepared {
            target.entry(id).or_insert(entry);
        }
        self
    }

    /// Adds all conditions of `other`, keeping existing entries.
    pub fn merge(&mut self, other: &ContractTable) {
        for phase in [Phase::Pre, Phase::Post, Phase::Mutated].iter().copied() {
            let source = other.phase(phase).cloned().collect::<Vec<_>>();
            let target = self.phase_mut(phase);
            for entry in source {
                target.entry(entry.condition().id()).or_insert(entry);
            }
        }
    }

    /// The total number of conditions over all phases.
    pub fn len(&self) -> usize {
        self.pre.len() + self.post.len() + self.mutated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks the conditions of the given phase in order, stopping at the first failure.
    fn check(&self, phase: Phase, scope: &Scope) -> Result<()> {
        self.phase(phase).try_for_each(|entry| entry.check(scope))
    }
}

struct FunctionInner {
    name: String,
    signature: Signature,
    body: Rc<Body>,
    contract: Option<ContractTable>,
}

/// A named callable with a declared signature.
///
/// Cloning a function is cheap and yields a handle to the same function.
#[derive(Clone)]
pub struct Function(Rc<FunctionInner>);

impl Function {
    /// Creates a function whose body receives the bound parameters.
    ///
    /// ```rust
    /// use dbc::{args, Function, Signature, Value};
    ///
    /// let add = Function::new("add", Signature::new(vec!["a", "b"]), |scope| {
    ///     Ok(Value::Int(scope.int("a")? + scope.int("b")?))
    /// });
    ///
    /// assert_eq!(add.call(args![1, b = 2]), Ok(Value::Int(3)));
    /// ```
    pub fn new(
        name: impl Into<String>,
        signature: Signature,
        body: impl Fn(&Scope) -> Result<Value> + 'static,
    ) -> Function {
        let binder = signature.clone();
        Function::raw(name, signature, move |args| body(&binder.bind(&args)))
    }

    /// Creates a function whose body receives the arguments as passed.
    pub fn raw(
        name: impl Into<String>,
        signature: Signature,
        body: impl Fn(Args) -> Result<Value> + 'static,
    ) -> Function {
        Function(Rc::new(FunctionInner {
            name: name.into(),
            signature,
            body: Rc::new(body),
            contract: None,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn signature(&self) -> &Signature {
        &self.0.signature
    }

    /// The conditions checked around calls to this function, if it has any.
    pub fn contract(&self) -> Option<&ContractTable> {
        self.0.contract.as_ref()
    }

    /// Returns `true` if both handles refer to the same function.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Returns a function checking the conditions of `table` around calls to this function.
    ///
    /// If this function already has a contract, the returned function shares the same underlying
    /// body and has a single table holding the conditions of both.
    pub fn contracted(&self, table: &ContractTable) -> Function {
        let merged = match &self.0.contract {
            Some(existing) => {
                tracing::trace!(function = %self.0.name, added = table.len(), "merging contract");
                let mut merged = existing.clone();
                merged.merge(table);
                merged
            }
            None => {
                tracing::trace!(function = %self.0.name, conditions = table.len(), "applying contract");
                table.clone()
            }
        };

        Function(Rc::new(FunctionInner {
            name: self.0.name.clone(),
            signature: self.0.signature.clone(),
            body: Rc::clone(&self.0.body),
            contract: Some(merged),
        }))
    }

    /// Calls the function.
    ///
    /// For a contracted function the preconditions are checked first, then the body runs, then
    /// the postconditions and finally the mutated postconditions are checked. Any failing condition
    /// aborts the call with a [`ContractViolation`](crate::ContractViolation); errors of the body or
    /// of evaluating a condition are returned unchanged.
    pub fn call(&self, args: Args) -> Result<Value> {
        let table = match &self.0.contract {
            Some(table) => table,
            None => return (self.0.body)(args),
        };

        let scope = self.0.signature.bind(&args);

        table.check(Phase::Pre, &scope)?;

        let result = (self.0.body)(args)?;

        if !table.post.is_empty() {
            let with_result = scope.with_result(result.clone());
            for entry in table.post.values() {
                if entry.condition().takes_result() {
                    entry.check(&with_result)?;
                } else {
                    entry.check(&scope)?;
                }
            }
        }

        table.check(Phase::Mutated, &scope)?;

        Ok(result)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.0.name)
            .field("signature", &self.0.signature)
            .field("contract", &self.0.contract)
            .finish()
    }
}

/// Pre-, post- and mutated postconditions to wrap around functions.
#[derive(Debug, Clone, Default)]
pub struct Contract {
    pre: ConditionSet,
    post: ConditionSet,
    mutated: ConditionSet,
}

/// Creates a contract from the given conditions.
///
/// Each argument accepts a single [`Condition`](crate::Condition) or a collection of them.
pub fn contract(
    pre: impl Into<ConditionSet>,
    post: impl Into<ConditionSet>,
    mutated: impl Into<ConditionSet>,
) -> Contract {
    Contract {
        pre: pre.into(),
        post: post.into(),
        mutated: mutated.into(),
    }
}

impl Contract {
    /// Creates a contract without conditions.
    pub fn new() -> Contract {
        Contract::default()
    }

    /// Adds preconditions.
    pub fn pre(mut self, conditions: impl Into<ConditionSet>) -> Contract {
        let conditions: ConditionSet = conditions.into();
        self.pre.extend(conditions.iter());
        self
    }

    /// Adds postconditions.
    pub fn post(mut self, conditions: impl Into<ConditionSet>) -> Contract {
        let conditions: ConditionSet = conditions.into();
        self.post.extend(conditions.iter());
        self
    }

    /// Adds mutated postconditions.
    pub fn mutated(mut self, conditions: impl Into<ConditionSet>) -> Contract {
        let conditions: ConditionSet = conditions.into();
        self.mutated.extend(conditions.iter());
        self
    }

    /// Prepares the diagnostic messages for a function named `owner`.
    pub fn table(&self, owner: &str) -> ContractTable {
        let mut table = ContractTable::new();
        table
            .add(Phase::Pre, &self.pre, Role::Precondition, owner)
            .add(Phase::Post, &self.post, Role::Postcondition, owner)
            .add(Phase::Mutated, &self.mutated, Role::MutatedPostcondition, owner);
        table
    }

    /// Wraps `function` so this contract is checked on every call.
    ///
    /// In [`Mode::Optimized`](crate::Mode::Optimized) the function is returned unchanged.
    pub fn wrap(&self, function: &Function) -> Function {
        if !mode::checks_enabled() {
            return function.clone();
        }

        function.contracted(&self.table(function.name()))
    }
}
