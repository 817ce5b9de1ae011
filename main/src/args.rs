//! Call arguments, declared parameters and the binding between them.

use indexmap::IndexMap;
use std::collections::VecDeque;

use crate::{
    error::{Error, Result},
    value::Value,
};

/// Builds [`Args`] from positional values followed by `name = value` keyword values.
///
/// ```rust
/// let args = dbc::args![5, "x", c = 9];
///
/// assert_eq!(args.positional().len(), 2);
/// assert_eq!(args.keyword("c"), Some(&dbc::Value::Int(9)));
/// ```
#[macro_export]
macro_rules! args {
    (@push $args:ident;) => {};
    (@push $args:ident; $name:ident = $value:expr $(, $($rest:tt)*)?) => {
        $args.push_keyword(::core::stringify!($name), $value);
        $($crate::args!(@push $args; $($rest)*);)?
    };
    (@push $args:ident; $value:expr $(, $($rest:tt)*)?) => {
        $args.push($value);
        $($crate::args!(@push $args; $($rest)*);)?
    };
    ($($tokens:tt)*) => {{
        #[allow(unused_mut)]
        let mut args = $crate::Args::new();
        $crate::args!(@push args; $($tokens)*);
        args
    }};
}

/// The arguments of a single call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    /// The positional arguments in call order.
    positional: Vec<Value>,
    /// The keyword arguments in call order.
    keywords: IndexMap<String, Value>,
}

impl Args {
    /// Creates an empty argument list.
    pub fn new() -> Args {
        Args::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Args {
        self.push(value);
        self
    }

    /// Adds a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Args {
        self.push_keyword(name, value);
        self
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.positional.push(value.into());
    }

    /// Adds a keyword argument, replacing an earlier one of the same name.
    pub fn push_keyword(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.keywords.insert(name.into(), value.into());
    }

    /// Inserts a positional argument in front of all others.
    ///
    /// This is how a method receives the object it is called on.
    pub fn prepend(mut self, value: impl Into<Value>) -> Args {
        self.positional.insert(0, value.into());
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keywords(&self) -> &IndexMap<String, Value> {
        &self.keywords
    }

    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords.get(name)
    }

    pub fn into_positional(self) -> Vec<Value> {
        self.positional
    }
}

/// The declared parameters of a callable.
///
/// A signature is inspected once when a contract is applied, not on every call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    /// The names of the declared parameters in order.
    params: Vec<String>,
    /// The default values of parameters that have one.
    defaults: IndexMap<String, Value>,
    /// The name receiving surplus positional arguments.
    varargs: Option<String>,
    /// The name receiving surplus keyword arguments.
    kwargs: Option<String>,
}

impl Signature {
    /// Creates a signature with the given parameter names.
    pub fn new<I>(params: I) -> Signature
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Signature {
            params: params.into_iter().map(Into::into).collect(),
            ..Signature::default()
        }
    }

    /// Creates a method signature, which takes `self` before the given parameters.
    pub fn method<I>(params: I) -> Signature
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Signature::new(std::iter::once("self".to_string()).chain(params.into_iter().map(Into::into)))
    }

    /// Declares a default value for the parameter `name`.
    pub fn with_default(mut self, name: impl Into<String>, value: impl Into<Value>) -> Signature {
        self.defaults.insert(name.into(), value.into());
        self
    }

    /// Declares a catch-all parameter for surplus positional arguments.
    pub fn varargs(mut self, name: impl Into<String>) -> Signature {
        self.varargs = Some(name.into());
        self
    }

    /// Declares a catch-all parameter for surplus keyword arguments.
    pub fn kwargs(mut self, name: impl Into<String>) -> Signature {
        self.kwargs = Some(name.into());
        self
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Reconstructs the parameter bindings of one call.
    ///
    /// Each declared parameter takes, in this order of priority, the keyword argument of the same
    /// name, the next unconsumed positional argument or its default. Parameters without any of
    /// these are left unbound. Remaining positional arguments are bound to the varargs name as a
    /// list and remaining keyword arguments to the kwargs name as a map, if declared.
    pub fn bind(&self, args: &Args) -> Scope {
        let mut positional: VecDeque<Value> = args.positional.iter().cloned().collect();
        let mut keywords = args.keywords.clone();
        let mut bindings = IndexMap::with_capacity(self.params.len() + 2);

        for param in &self.params {
            let value = keywords
                .shift_remove(param)
                .or_else(|| positional.pop_front())
                .or_else(|| self.defaults.get(param).cloned());

            if let Some(value) = value {
                bindings.insert(param.clone(), value);
            }
        }

        if let Some(varargs) = &self.varargs {
            bindings.insert(varargs.clone(), Value::list(positional));
        }
        if let Some(kwargs) = &self.kwargs {
            bindings.insert(kwargs.clone(), Value::map(keywords));
        }

        Scope {
            bindings,
            result: None,
        }
    }
}

/// The parameter bindings of one call, as seen by conditions.
///
/// A scope is built fresh for every call and dropped after the last condition was checked.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: IndexMap<String, Value>,
    /// The return value, only present for postconditions that asked for it.
    result: Option<Value>,
}

impl Scope {
    /// Returns the value bound to `name`.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.bindings.get(name).ok_or_else(|| Error::Unbound {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        self.get(name)?.as_int()
    }

    pub fn float(&self, name: &str) -> Result<f64> {
        self.get(name)?.as_float()
    }

    pub fn str(&self, name: &str) -> Result<&str> {
        self.get(name)?.as_str()
    }

    /// Reads the attribute `attr` of the object bound to `name`.
    pub fn attr(&self, name: &str, attr: &str) -> Result<Value> {
        self.get(name)?.get_attr(attr)
    }

    /// The result of the call.
    ///
    /// Only bound for postconditions declared with
    /// [`Condition::with_result`](crate::Condition::with_result).
    pub fn result(&self) -> Result<&Value> {
        self.result.as_ref().ok_or_else(|| Error::Unbound {
            name: "result".to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub(crate) fn with_result(&self, result: Value) -> Scope {
        Scope {
            bindings: self.bindings.clone(),
            result: Some(result),
        }
    }
}
