//! Dynamically typed values passed to and returned from [`Function`](crate::Function)s.

use indexmap::IndexMap;
use std::{cell::RefCell, convert::TryFrom, fmt, rc::Rc};

use crate::{
    args::Args,
    class::Object,
    error::{Error, Result},
};

/// A shared, mutable list.
pub type List = Rc<RefCell<Vec<Value>>>;

/// A shared, mutable map with ordered string keys.
pub type Map = Rc<RefCell<IndexMap<String, Value>>>;

/// A value of the dynamic object model.
///
/// Lists, maps and objects are reference types: cloning a value yields another handle to the same
/// data, so a callee can mutate an argument in place.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absence of a value.
    None,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// An immutable string.
    Str(Rc<str>),
    /// A list of values.
    List(List),
    /// A map from strings to values.
    Map(Map),
    /// An instance of a [`Class`](crate::Class).
    Object(Object),
}

impl Value {
    /// Creates a new list value.
    pub fn list<I>(items: I) -> Value
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Value::List(Rc::new(RefCell::new(
            items.into_iter().map(Into::into).collect(),
        )))
    }

    /// Creates a new map value.
    pub fn map<I, K>(entries: I) -> Value
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Map(Rc::new(RefCell::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    /// The name of the type of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
        }
    }

    fn type_error<T>(&self, expected: &'static str) -> Result<T> {
        Err(Error::Type {
            expected,
            found: self.type_name(),
        })
    }

    /// Returns `true` for [`Value::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => other.type_error("bool"),
        }
    }

    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            other => other.type_error("int"),
        }
    }

    /// Returns the numeric value, converting integers.
    pub fn as_float(&self) -> Result<f64> {
        match self {
            Value::Int(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            other => other.type_error("float"),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::Str(s) => Ok(&**s),
            other => other.type_error("str"),
        }
    }

    pub fn as_list(&self) -> Result<&List> {
        match self {
            Value::List(list) => Ok(list),
            other => other.type_error("list"),
        }
    }

    pub fn as_map(&self) -> Result<&Map> {
        match self {
            Value::Map(map) => Ok(map),
            other => other.type_error("map"),
        }
    }

    pub fn as_object(&self) -> Result<&Object> {
        match self {
            Value::Object(object) => Ok(object),
            other => other.type_error("object"),
        }
    }

    /// The length of a string, list or map.
    ///
    /// Objects report their length through their `__len__` method.
    pub fn len(&self) -> Result<usize> {
        match self {
            Value::Str(s) => Ok(s.chars().count()),
            Value::List(list) => Ok(list.borrow().len()),
            Value::Map(map) => Ok(map.borrow().len()),
            Value::Object(object) => {
                let len = object.call_method("__len__", Args::new())?.as_int()?;
                usize::try_from(len)
                    .map_err(|_| Error::raised("`__len__` returned a negative length"))
            }
            other => other.type_error("sized value"),
        }
    }

    /// Returns `true` if [`len`](Value::len) is zero.
    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|len| len == 0)
    }

    /// Reads an attribute of an object.
    pub fn get_attr(&self, name: &str) -> Result<Value> {
        match self {
            Value::Object(object) => object.get(name),
            other => Err(Error::NoAttribute {
                owner: other.type_name().to_string(),
                name: name.to_string(),
            }),
        }
    }

    /// Calls a method on this value.
    ///
    /// Lists support `append`; objects dispatch to their class.
    pub fn call_method(&self, name: &str, args: Args) -> Result<Value> {
        match (self, name) {
            (Value::Object(object), _) => object.call_method(name, args),
            (Value::List(list), "append") => {
                let mut positional = args.into_positional().into_iter();
                match (positional.next(), positional.next()) {
                    (Some(item), None) => {
                        list.borrow_mut().push(item);
                        Ok(Value::None)
                    }
                    _ => Err(Error::raised("`append` takes exactly one argument")),
                }
            }
            (other, _) => Err(Error::NoAttribute {
                owner: other.type_name().to_string(),
                name: name.to_string(),
            }),
        }
    }
}

impl Default for Value {
    fn default() -> Value {
        Value::None
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(list) => {
                write!(f, "[")?;
                for (i, item) in list.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Object(object) => write!(f, "<{} object>", object.class().name()),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => |$v:ident| $conv:expr),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Value {
                    $conv
                }
            }
        )*
    };
}

impl_from! {
    () => |_v| Value::None,
    bool => |v| Value::Bool(v),
    i32 => |v| Value::Int(i64::from(v)),
    i64 => |v| Value::Int(v),
    f64 => |v| Value::Float(v),
    &str => |v| Value::Str(v.into()),
    String => |v| Value::Str(v.into()),
    Vec<Value> => |v| Value::List(Rc::new(RefCell::new(v))),
    Object => |v| Value::Object(v),
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Value {
        value.map_or(Value::None, Into::into)
    }
}
