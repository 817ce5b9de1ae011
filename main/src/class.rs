//! Classes, their construction hooks and their instances.

use indexmap::IndexMap;
use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    args::Args,
    condition::ConditionSet,
    error::{Error, Result},
    function::Function,
    value::Value,
};

/// The name of the method initializing new instances.
pub const CONSTRUCTOR: &str = "__init__";

/// The name of the method run before an instance is torn down.
pub const DESTRUCTOR: &str = "__del__";

/// One of the functions bundled in a [`Property`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    Getter,
    Setter,
    Deleter,
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Accessor::Getter => "getter",
            Accessor::Setter => "setter",
            Accessor::Deleter => "deleter",
        })
    }
}

/// A computed attribute with optional getter, setter and deleter.
///
/// All accessors receive the instance as `self`; the setter additionally receives the new value.
#[derive(Debug, Clone, Default)]
pub struct Property {
    getter: Option<Function>,
    setter: Option<Function>,
    deleter: Option<Function>,
}

impl Property {
    /// Creates a read-only property.
    pub fn new(getter: Function) -> Property {
        Property {
            getter: Some(getter),
            ..Property::default()
        }
    }

    pub fn with_setter(mut self, setter: Function) -> Property {
        self.setter = Some(setter);
        self
    }

    pub fn with_deleter(mut self, deleter: Function) -> Property {
        self.deleter = Some(deleter);
        self
    }

    pub fn accessor(&self, accessor: Accessor) -> Option<&Function> {
        match accessor {
            Accessor::Getter => self.getter.as_ref(),
            Accessor::Setter => self.setter.as_ref(),
            Accessor::Deleter => self.deleter.as_ref(),
        }
    }

    /// Replaces every present accessor with the output of `f`.
    pub fn map(&self, mut f: impl FnMut(Accessor, &Function) -> Function) -> Property {
        Property {
            getter: self.getter.as_ref().map(|g| f(Accessor::Getter, g)),
            setter: self.setter.as_ref().map(|s| f(Accessor::Setter, s)),
            deleter: self.deleter.as_ref().map(|d| f(Accessor::Deleter, d)),
        }
    }
}

/// An entry in the attribute table of a class.
#[derive(Debug, Clone)]
pub enum Attribute {
    Method(Function),
    Property(Property),
    Value(Value),
}

/// A hook run when a class is created from its definition.
pub trait ClassHook {
    /// Turns the definition into a class.
    fn construct(&self, def: ClassDef) -> Class;
}

/// Creates classes exactly as defined.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl ClassHook for Plain {
    fn construct(&self, def: ClassDef) -> Class {
        Class::from_def(def, None)
    }
}

/// The definition of a class, before it is created.
pub struct ClassDef {
    pub(crate) name: String,
    pub(crate) bases: Vec<Class>,
    pub(crate) attributes: IndexMap<String, Attribute>,
    pub(crate) invariants: ConditionSet,
    hook: Option<Rc<dyn ClassHook>>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> ClassDef {
        ClassDef {
            name: name.into(),
            bases: Vec::new(),
            attributes: IndexMap::new(),
            invariants: ConditionSet::new(),
            hook: None,
        }
    }

    /// Adds a base class. Bases are searched in the order they were added.
    pub fn base(mut self, base: &Class) -> ClassDef {
        self.bases.push(base.clone());
        self
    }

    pub fn method(self, name: impl Into<String>, function: Function) -> ClassDef {
        self.attribute(name, Attribute::Method(function))
    }

    pub fn constructor(self, function: Function) -> ClassDef {
        self.method(CONSTRUCTOR, function)
    }

    pub fn destructor(self, function: Function) -> ClassDef {
        self.method(DESTRUCTOR, function)
    }

    pub fn property(self, name: impl Into<String>, property: Property) -> ClassDef {
        self.attribute(name, Attribute::Property(property))
    }

    /// Adds a class level value, shared by all instances until they set their own.
    pub fn value(self, name: impl Into<String>, value: impl Into<Value>) -> ClassDef {
        self.attribute(name, Attribute::Value(value.into()))
    }

    pub fn attribute(mut self, name: impl Into<String>, attribute: Attribute) -> ClassDef {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Declares invariant conditions of this class.
    pub fn invariant(mut self, conditions: impl Into<ConditionSet>) -> ClassDef {
        let conditions: ConditionSet = conditions.into();
        self.invariants.extend(conditions.iter());
        self
    }

    /// Sets the hook used by [`build`](ClassDef::build).
    pub fn hook(mut self, hook: impl ClassHook + 'static) -> ClassDef {
        self.hook = Some(Rc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bases(&self) -> &[Class] {
        &self.bases
    }

    pub fn attributes(&self) -> &IndexMap<String, Attribute> {
        &self.attributes
    }

    pub fn invariants(&self) -> &ConditionSet {
        &self.invariants
    }

    /// Creates the class.
    ///
    /// Without an explicit hook the hook of the first base that has one is used, so subclasses are
    /// created the same way as their bases.
    pub fn build(mut self) -> Class {
        let hook = self
            .hook
            .clone()
            .or_else(|| self.bases.iter().find_map(|base| base.0.hook.clone()));
        self.hook = hook.clone();

        match hook {
            Some(hook) => hook.construct(self),
            None => Plain.construct(self),
        }
    }
}

struct ClassInner {
    name: String,
    bases: Vec<Class>,
    attributes: IndexMap<String, Attribute>,
    registry: Option<ConditionSet>,
    /// The hook given explicitly or inherited, `None` for classes built without one.
    hook: Option<Rc<dyn ClassHook>>,
}

/// A class of the dynamic object model.
#[derive(Clone)]
pub struct Class(Rc<ClassInner>);

impl Class {
    pub(crate) fn from_def(def: ClassDef, registry: Option<ConditionSet>) -> Class {
        Class(Rc::new(ClassInner {
            name: def.name,
            bases: def.bases,
            attributes: def.attributes,
            registry,
            hook: def.hook,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn bases(&self) -> &[Class] {
        &self.0.bases
    }

    /// The attributes defined by this class itself.
    pub fn attributes(&self) -> &IndexMap<String, Attribute> {
        &self.0.attributes
    }

    /// The effective invariant of this class, if it was created by the invariant engine.
    pub fn registry(&self) -> Option<&ConditionSet> {
        self.0.registry.as_ref()
    }

    pub fn ptr_eq(&self, other: &Class) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// The classes searched for attributes: this class, then its bases depth first from left to
    /// right, each class only once.
    pub fn mro(&self) -> Vec<Class> {
        fn visit(class: &Class, order: &mut Vec<Class>) {
            if order.iter().any(|seen| seen.ptr_eq(class)) {
                return;
            }
            order.push(class.clone());
            for base in class.bases() {
                visit(base, order);
            }
        }

        let mut order = Vec::new();
        visit(self, &mut order);
        order
    }

    /// Finds an attribute in this class or its bases.
    pub fn lookup(&self, name: &str) -> Option<Attribute> {
        self.mro()
            .iter()
            .find_map(|class| class.0.attributes.get(name).cloned())
    }

    pub fn is_subclass_of(&self, other: &Class) -> bool {
        self.mro().iter().any(|class| class.ptr_eq(other))
    }

    /// Creates an instance and runs the constructor, if there is one.
    pub fn instantiate(&self, args: Args) -> Result<Object> {
        let object = Object(Rc::new(ObjectInner {
            class: self.clone(),
            attributes: RefCell::new(IndexMap::new()),
        }));

        if let Some(Attribute::Method(constructor)) = self.lookup(CONSTRUCTOR) {
            constructor.call(args.prepend(object.clone()))?;
        }

        Ok(object)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.0.name)
            .field(
                "bases",
                &self.0.bases.iter().map(Class::name).collect::<Vec<_>>(),
            )
            .field("attributes", &self.0.attributes.keys().collect::<Vec<_>>())
            .finish()
    }
}

struct ObjectInner {
    class: Class,
    attributes: RefCell<IndexMap<String, Value>>,
}

/// An instance of a [`Class`].
#[derive(Clone)]
pub struct Object(Rc<ObjectInner>);

impl Object {
    pub fn class(&self) -> &Class {
        &self.0.class
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn no_attribute(&self, name: &str) -> Error {
        Error::NoAttribute {
            owner: self.0.class.name().to_string(),
            name: name.to_string(),
        }
    }

    /// Reads an attribute.
    ///
    /// Instance values are found first, then class values and properties along the method
    /// resolution order.
    pub fn get(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.0.attributes.borrow().get(name) {
            return Ok(value.clone());
        }

        match self.0.class.lookup(name) {
            Some(Attribute::Value(value)) => Ok(value),
            Some(Attribute::Property(property)) => match property.accessor(Accessor::Getter) {
                Some(getter) => getter.call(Args::new().arg(self.clone())),
                None => Err(Error::Accessor {
                    action: "read",
                    name: name.to_string(),
                }),
            },
            Some(Attribute::Method(_)) => Err(Error::Type {
                expected: "attribute value",
                found: "method",
            }),
            None => Err(self.no_attribute(name)),
        }
    }

    /// Writes an attribute, going through a property setter if there is one.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();

        if let Some(Attribute::Property(property)) = self.0.class.lookup(name) {
            return match property.accessor(Accessor::Setter) {
                Some(setter) => setter
                    .call(Args::new().arg(self.clone()).arg(value))
                    .map(drop),
                None => Err(Error::Accessor {
                    action: "set",
                    name: name.to_string(),
                }),
            };
        }

        self.0.attributes.borrow_mut().insert(name.to_string(), value);
        Ok(())
    }

    /// Deletes an attribute, going through a property deleter if there is one.
    pub fn delete(&self, name: &str) -> Result<()> {
        if let Some(Attribute::Property(property)) = self.0.class.lookup(name) {
            return match property.accessor(Accessor::Deleter) {
                Some(deleter) => deleter.call(Args::new().arg(self.clone())).map(drop),
                None => Err(Error::Accessor {
                    action: "delete",
                    name: name.to_string(),
                }),
            };
        }

        let removed = self.0.attributes.borrow_mut().shift_remove(name);
        removed.map(drop).ok_or_else(|| self.no_attribute(name))
    }

    /// Calls a method with this object as `self`.
    pub fn call_method(&self, name: &str, args: Args) -> Result<Value> {
        match self.0.class.lookup(name) {
            Some(Attribute::Method(method)) => method.call(args.prepend(self.clone())),
            Some(_) => Err(Error::NotCallable {
                name: name.to_string(),
            }),
            None => Err(self.no_attribute(name)),
        }
    }

    /// Runs the destructor, if there is one.
    pub fn destroy(&self) -> Result<()> {
        match self.0.class.lookup(DESTRUCTOR) {
            Some(Attribute::Method(destructor)) => {
                destructor.call(Args::new().arg(self.clone())).map(drop)
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{} object at {:p}>", self.0.class.name(), Rc::as_ptr(&self.0))
    }
}
