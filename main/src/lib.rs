//! Design by contract with runtime checked pre- and postconditions and class invariants.
//!
//! This crate offers two ways of attaching contracts:
//!
//! - The [`contract`](macro@contract) and [`invariant`](macro@invariant) attributes check
//!   conditions on ordinary Rust functions and `impl` blocks. A violated condition panics.
//! - The runtime engine works on the dynamic object model of this crate ([`Value`],
//!   [`Function`], [`Class`]). Contracts are applied with [`Contract::wrap`] and invariants are
//!   enforced by creating classes through the [`Invariant`] hook. A violated condition is
//!   reported as [`Error::Violation`].
//!
//! Either way the message of a violation has the form `in <owner>: <role>: <condition>`:
//!
//! ```rust
//! use dbc::{args, Condition, Contract, Function, Signature, Value};
//!
//! let sqrt = Contract::new()
//!     .pre(Condition::expr("x >= 0", |scope| Ok(scope.float("x")? >= 0.0)))
//!     .wrap(&Function::new("sqrt", Signature::new(vec!["x"]), |scope| {
//!         Ok(Value::Float(scope.float("x")?.sqrt()))
//!     }));
//!
//! assert_eq!(sqrt.call(args![4.0]), Ok(Value::Float(2.0)));
//! assert_eq!(
//!     sqrt.call(args![-1.0]).unwrap_err().to_string(),
//!     "in sqrt: precondition: x >= 0"
//! );
//! ```
//!
//! # Disabling checks
//!
//! In [`Mode::Optimized`] contracts are not applied at all. The mode defaults to
//! `Optimized` when `debug_assertions` are disabled and can be changed with [`set_mode`]. The
//! `optimized` feature disables checks for the whole build.

mod args;
mod class;
mod condition;
mod error;
mod function;
mod invariant;
mod mode;
mod value;

pub use crate::{
    args::{Args, Scope, Signature},
    class::{
        Accessor, Attribute, Class, ClassDef, ClassHook, Object, Plain, Property, CONSTRUCTOR,
        DESTRUCTOR,
    },
    condition::{prepare, Condition, ConditionId, ConditionSet, Prepared, PreparedConditions, Role},
    error::{ContractViolation, Error, Result},
    function::{contract, Contract, ContractTable, Function, Phase},
    invariant::{is_checked, Invariant, PRIVATE_PREFIX, SPECIAL_METHODS},
    mode::{checks_enabled, mode, set_mode, Mode},
    value::{List, Map, Value},
};

/// Checks pre- and postconditions around a function.
///
/// Preconditions are given in `pre(..)`, postconditions in `post(..)` and postconditions over the
/// (possibly mutated) arguments in `mutated(..)`. A postcondition written as a closure receives a
/// reference to the returned value.
///
/// ```rust
/// use dbc::contract;
///
/// #[contract(pre(divisor != 0), post(|quotient| *quotient <= dividend))]
/// fn divide(dividend: u32, divisor: u32) -> u32 {
///     dividend / divisor
/// }
///
/// assert_eq!(divide(10, 2), 5);
/// ```
///
/// A violated condition panics with a message naming the function, the role and the condition:
///
/// ```rust,should_panic
/// # use dbc::contract;
/// #
/// # #[contract(pre(divisor != 0), post(|quotient| *quotient <= dividend))]
/// # fn divide(dividend: u32, divisor: u32) -> u32 {
/// #     dividend / divisor
/// # }
/// #
/// // panics with "in divide: precondition: divisor != 0"
/// divide(10, 0);
/// ```
pub use dbc_proc_macro::contract;

/// Checks class invariants around the methods of an `impl` block.
///
/// ```rust
/// use dbc::invariant;
///
/// struct Counter {
///     count: u32,
///     capacity: u32,
/// }
///
/// #[invariant(self.count <= self.capacity)]
/// impl Counter {
///     pub fn new(capacity: u32) -> Counter {
///         Counter { count: 0, capacity }
///     }
///
///     pub fn increment(&mut self) {
///         self.count += 1;
///     }
/// }
///
/// let mut counter = Counter::new(1);
/// counter.increment();
/// ```
///
/// A `#[contract(..)]` attribute on a method of such an `impl` block is combined with the
/// invariant. It is consumed by `invariant`, so `contract` does not need to be imported for it.
pub use dbc_proc_macro::invariant;

/// Support code for the attribute macros.
///
/// *WARNING* This is not considered to be part of the public API and may change at any time
/// without notice.
#[doc(hidden)]
pub mod __private {
    pub use crate::mode::checks_enabled;

    /// Evaluates a postcondition that receives the result.
    ///
    /// Taking the closure as a generic argument lets its parameter type be inferred.
    #[inline]
    pub fn check_result<T: ?Sized, F: FnOnce(&T) -> bool>(result: &T, condition: F) -> bool {
        condition(result)
    }

    /// Reports a violated condition of a statically checked contract.
    #[cold]
    #[track_caller]
    pub fn violated(message: &str) -> ! {
        panic!("{}", crate::ContractViolation::new(message))
    }
}
