//! The invariant engine: a [`ClassHook`] that enforces class invariants on methods.
//!
//! When a class is created through [`Invariant`], the invariant conditions of all its bases (in
//! declaration order) and its own declared conditions are collected into one set. That set becomes
//! the class's registry, which subclasses inherit and extend. The set is then attached to the
//! attributes defined by the class itself:
//!
//! - the constructor checks it after it ran,
//! - the destructor checks it before it runs,
//! - public methods and [special methods](SPECIAL_METHODS) check it before and after the call,
//! - the accessors of public properties are handled like public methods, each on its own.
//!
//! Attributes that already have a contract get the invariant merged into their existing table.

use crate::{
    class::{Attribute, Class, ClassDef, ClassHook, Plain, CONSTRUCTOR, DESTRUCTOR},
    condition::{ConditionSet, Role},
    function::{ContractTable, Function, Phase},
    mode,
};

/// Attributes starting with this prefix are private and not checked.
pub const PRIVATE_PREFIX: &str = "_";

/// Protocol methods which are checked even though they look private.
pub const SPECIAL_METHODS: &[&str] = &[
    "__repr__", "__str__", "__format__", "__hash__", "__bool__", "__eq__", "__ne__", "__lt__",
    "__le__", "__gt__", "__ge__", "__call__", "__len__", "__getitem__", "__setitem__",
    "__delitem__", "__contains__", "__iter__", "__next__", "__reversed__", "__missing__",
    "__getattr__", "__setattr__", "__delattr__", "__get__", "__set__", "__delete__", "__add__",
    "__sub__", "__mul__", "__truediv__", "__floordiv__", "__mod__", "__divmod__", "__pow__",
    "__lshift__", "__rshift__", "__and__", "__xor__", "__or__", "__radd__", "__rsub__",
    "__rmul__", "__rtruediv__", "__rfloordiv__", "__rmod__", "__rdivmod__", "__rpow__",
    "__rlshift__", "__rrshift__", "__rand__", "__rxor__", "__ror__", "__iadd__", "__isub__",
    "__imul__", "__itruediv__", "__ifloordiv__", "__imod__", "__ipow__", "__ilshift__",
    "__irshift__", "__iand__", "__ixor__", "__ior__", "__neg__", "__pos__", "__abs__",
    "__invert__", "__int__", "__float__", "__index__", "__enter__", "__exit__",
];

/// Whether calls to the attribute `name` are checked against the invariant.
pub fn is_checked(name: &str) -> bool {
    !name.starts_with(PRIVATE_PREFIX) || SPECIAL_METHODS.contains(&name)
}

/// When the invariant is checked around a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Guard {
    Before,
    After,
    Both,
}

/// Attaches `conditions` to `function` as invariant checks labeled with `owner`.
fn add_conditions(
    function: &Function,
    owner: &str,
    guard: Guard,
    conditions: &ConditionSet,
) -> Function {
    let mut table = ContractTable::new();

    if guard != Guard::After {
        table.add(Phase::Pre, conditions, Role::InvariantPrecondition, owner);
    }
    if guard != Guard::Before {
        table.add(
            Phase::Mutated,
            conditions,
            Role::InvariantPostcondition,
            owner,
        );
    }

    function.contracted(&table)
}

/// Creates classes whose methods enforce the class invariant.
///
/// A class opts in by being built with this hook, either directly or by inheriting from a class
/// that was.
///
/// ```rust
/// use dbc::{args, Class, ClassDef, Condition, Function, Invariant, Signature, Value};
///
/// let positive = Condition::expr("self.value > 0", |scope| {
///     Ok(scope.attr("self", "value")?.as_int()? > 0)
/// });
/// let init = Function::new("__init__", Signature::method(vec!["value"]), |scope| {
///     let value = scope.get("value")?.clone();
///     scope.get("self")?.as_object()?.set("value", value)?;
///     Ok(Value::None)
/// });
/// let class = ClassDef::new("Positive")
///     .invariant(positive)
///     .constructor(init)
///     .hook(Invariant)
///     .build();
///
/// assert!(class.instantiate(args![1]).is_ok());
///
/// let err = class.instantiate(args![0]).unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "in Positive.__init__: invariant postcondition: self.value > 0"
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Invariant;

impl ClassHook for Invariant {
    fn construct(&self, mut def: ClassDef) -> Class {
        if !mode::checks_enabled() {
            return Plain.construct(def);
        }

        let mut conditions = ConditionSet::new();
        for base in &def.bases {
            if let Some(registry) = base.registry() {
                conditions.extend(registry.iter());
            }
        }
        conditions.extend(def.invariants.iter());

        tracing::trace!(
            class = %def.name,
            conditions = conditions.len(),
            "enforcing class invariant"
        );

        if !conditions.is_empty() {
            let class_name = &def.name;

            for (name, attribute) in def.attributes.iter_mut() {
                let owner = format!("{}.{}", class_name, name);

                match attribute {
                    Attribute::Method(method) if name == CONSTRUCTOR => {
                        *method = add_conditions(method, &owner, Guard::After, &conditions);
                    }
                    Attribute::Method(method) if name == DESTRUCTOR => {
                        *method = add_conditions(method, &owner, Guard::Before, &conditions);
                    }
                    Attribute::Method(method) if is_checked(name) => {
                        *method = add_conditions(method, &owner, Guard::Both, &conditions);
                    }
                    Attribute::Property(property) if is_checked(name) => {
                        *property = property.map(|accessor, function| {
                            let owner = format!("{}: {}", owner, accessor);
                            add_conditions(function, &owner, Guard::Both, &conditions)
                        });
                    }
                    _ => (),
                }
            }
        }

        Class::from_def(def, Some(conditions))
    }
}
