//! Record capability: named attribute access without runtime reflection.
//!
//! Every record type registers an [`AttributeTable`] once (usually inside a
//! [`std::sync::OnceLock`]) mapping attribute names to typed accessors. The marshaller reaches
//! attributes through the object-safe [`Reflect`] view, which is implemented for every
//! [`Record`].
//!
//! Accessors are closures written next to the type, so they can reach private fields.
//!
//! ```rust
//! use std::sync::OnceLock;
//!
//! use tabular_marshal::record::{AttributeTable, Record};
//!
//! #[derive(Debug, Default)]
//! struct College {
//!     name: String,
//! }
//!
//! impl Record for College {
//!     fn attributes() -> &'static AttributeTable<Self> {
//!         static TABLE: OnceLock<AttributeTable<College>> = OnceLock::new();
//!         TABLE.get_or_init(|| {
//!             AttributeTable::builder("College")
//!                 .field("name", |c: &College| &c.name, |c: &mut College| &mut c.name)
//!                 .default_constructible()
//!                 .build()
//!         })
//!     }
//! }
//!
//! #[derive(Debug, Default)]
//! struct Student {
//!     id: i32,
//!     college: Option<College>,
//! }
//!
//! impl Record for Student {
//!     fn attributes() -> &'static AttributeTable<Self> {
//!         static TABLE: OnceLock<AttributeTable<Student>> = OnceLock::new();
//!         TABLE.get_or_init(|| {
//!             AttributeTable::builder("Student")
//!                 .field("id", |s: &Student| &s.id, |s: &mut Student| &mut s.id)
//!                 .nested("college", |s: &Student| s.college.as_ref(), |s: &mut Student| s.college.as_mut())
//!                 .default_constructible()
//!                 .build()
//!         })
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;

use crate::types::{Value, ValueType};

type ScalarGet<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;
type ScalarSet<T> = Arc<dyn Fn(&mut T, Value) -> Result<(), String> + Send + Sync>;
type NestedGet<T> = Arc<dyn Fn(&T) -> Option<&dyn Reflect> + Send + Sync>;
type NestedGetMut<T> = Arc<dyn Fn(&mut T) -> Option<&mut dyn Reflect> + Send + Sync>;

/// A caller-defined record type that can be marshalled.
pub trait Record: Sized + 'static {
    /// The attribute table of this type, built once.
    fn attributes() -> &'static AttributeTable<Self>;
}

/// Object-safe view of a record used by the path resolver.
///
/// Implemented for every [`Record`]; nested records are reached as `&dyn Reflect`.
pub trait Reflect {
    /// Name of the record type, used in error messages.
    fn type_name(&self) -> &'static str;

    /// Read the attribute `name`, or `None` if the type (and its ancestors) declare no such
    /// attribute.
    fn attribute(&self, name: &str) -> Option<AttributeRef<'_>>;

    /// Writable access to the attribute `name`.
    fn attribute_mut(&mut self, name: &str) -> Option<AttributeMut<'_>>;
}

/// Read access to one attribute.
pub enum AttributeRef<'a> {
    /// A value attribute.
    Value(Value),
    /// A nested record attribute; `None` when the nested record is absent.
    Nested(Option<&'a dyn Reflect>),
}

/// Write access to one attribute.
pub enum AttributeMut<'a> {
    /// A value attribute.
    Scalar(ScalarSlot<'a>),
    /// A nested record attribute; `None` when the nested record is absent.
    Nested(Option<&'a mut dyn Reflect>),
}

/// A writable value attribute of one record instance.
pub struct ScalarSlot<'a> {
    value_type: ValueType,
    nullable: bool,
    assign: Box<dyn FnOnce(Value) -> Result<(), String> + 'a>,
}

impl<'a> ScalarSlot<'a> {
    /// Declared type of the attribute.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Whether the attribute accepts [`Value::Null`] (an `Option<_>` field).
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Store `value` into the attribute. The error string is the attribute's rejection reason.
    pub fn assign(self, value: Value) -> Result<(), String> {
        (self.assign)(value)
    }
}

impl fmt::Debug for ScalarSlot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarSlot")
            .field("value_type", &self.value_type)
            .field("nullable", &self.nullable)
            .finish()
    }
}

enum AttributeKind<T> {
    Scalar {
        value_type: ValueType,
        nullable: bool,
        get: ScalarGet<T>,
        set: ScalarSet<T>,
    },
    Nested {
        get: NestedGet<T>,
        get_mut: NestedGetMut<T>,
    },
}

struct Attribute<T> {
    name: &'static str,
    kind: AttributeKind<T>,
}

/// Name -> accessor table of a record type.
pub struct AttributeTable<T> {
    type_name: &'static str,
    attributes: Vec<Attribute<T>>,
    index: HashMap<&'static str, usize>,
    factory: Option<fn() -> T>,
}

impl<T: 'static> AttributeTable<T> {
    /// Start building the table of the type called `type_name`.
    pub fn builder(type_name: &'static str) -> AttributeTableBuilder<T> {
        AttributeTableBuilder {
            type_name,
            own: Vec::new(),
            inherited: Vec::new(),
            factory: None,
        }
    }

    /// Name of the record type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Attribute names: own attributes first, then inherited ones.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes.iter().map(|a| a.name)
    }

    /// Returns `true` if the type or one of its ancestors declares `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Create a new default instance, if the type registered a constructor.
    pub fn instantiate(&self) -> Option<T> {
        self.factory.map(|f| f())
    }

    fn get(&self, name: &str) -> Option<&Attribute<T>> {
        self.index.get(name).map(|&i| &self.attributes[i])
    }
}

impl<T> fmt::Debug for AttributeTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeTable")
            .field("type_name", &self.type_name)
            .field("attributes", &self.attributes.iter().map(|a| a.name).collect::<Vec<_>>())
            .field("constructible", &self.factory.is_some())
            .finish()
    }
}

/// Builder for [`AttributeTable`].
pub struct AttributeTableBuilder<T> {
    type_name: &'static str,
    own: Vec<Attribute<T>>,
    inherited: Vec<Attribute<T>>,
    factory: Option<fn() -> T>,
}

impl<T: 'static> AttributeTableBuilder<T> {
    /// Declare a value attribute backed by a field of type `F`.
    pub fn field<F, G, S>(mut self, name: &'static str, get: G, get_mut: S) -> Self
    where
        F: AttrValue + 'static,
        G: Fn(&T) -> &F + Send + Sync + 'static,
        S: Fn(&mut T) -> &mut F + Send + Sync + 'static,
    {
        let get: ScalarGet<T> = Arc::new(move |t: &T| get(t).to_value());
        let set: ScalarSet<T> = Arc::new(move |t: &mut T, v: Value| {
            *get_mut(t) = F::from_value(v)?;
            Ok(())
        });
        self.own.push(Attribute {
            name,
            kind: AttributeKind::Scalar {
                value_type: F::VALUE_TYPE,
                nullable: F::NULLABLE,
                get,
                set,
            },
        });
        self
    }

    /// Declare an attribute holding a nested record of type `U`.
    ///
    /// The accessors return `None` when the nested record is absent; nested paths are never
    /// created implicitly on import.
    pub fn nested<U, G, S>(mut self, name: &'static str, get: G, get_mut: S) -> Self
    where
        U: Record,
        G: Fn(&T) -> Option<&U> + Send + Sync + 'static,
        S: Fn(&mut T) -> Option<&mut U> + Send + Sync + 'static,
    {
        let get: NestedGet<T> = Arc::new(erase_ref(move |t: &T| get(t).map(|u| u as &dyn Reflect)));
        let get_mut: NestedGetMut<T> =
            Arc::new(erase_mut(move |t: &mut T| get_mut(t).map(|u| u as &mut dyn Reflect)));
        self.own.push(Attribute {
            name,
            kind: AttributeKind::Nested { get, get_mut },
        });
        self
    }

    /// Inherit every attribute of the ancestor record type `P`, reached through `get`/`get_mut`.
    ///
    /// Attributes declared on this type take precedence over inherited ones with the same name.
    pub fn extends<P, G, S>(mut self, get: G, get_mut: S) -> Self
    where
        P: Record,
        G: Fn(&T) -> &P + Send + Sync + 'static,
        S: Fn(&mut T) -> &mut P + Send + Sync + 'static,
    {
        let up = Arc::new(get);
        let up_mut = Arc::new(get_mut);

        for attr in &P::attributes().attributes {
            let kind = match &attr.kind {
                AttributeKind::Scalar {
                    value_type,
                    nullable,
                    get,
                    set,
                } => {
                    let (get, set) = (Arc::clone(get), Arc::clone(set));
                    let (up, up_mut) = (Arc::clone(&up), Arc::clone(&up_mut));
                    AttributeKind::Scalar {
                        value_type: *value_type,
                        nullable: *nullable,
                        get: Arc::new(move |t: &T| get(up(t))) as ScalarGet<T>,
                        set: Arc::new(move |t: &mut T, v: Value| set(up_mut(t), v)) as ScalarSet<T>,
                    }
                }
                AttributeKind::Nested { get, get_mut } => {
                    let (get, get_mut) = (Arc::clone(get), Arc::clone(get_mut));
                    let (up, up_mut) = (Arc::clone(&up), Arc::clone(&up_mut));
                    AttributeKind::Nested {
                        get: Arc::new(erase_ref(move |t: &T| get(up(t)))) as NestedGet<T>,
                        get_mut: Arc::new(erase_mut(move |t: &mut T| get_mut(up_mut(t)))) as NestedGetMut<T>,
                    }
                }
            };
            self.inherited.push(Attribute { name: attr.name, kind });
        }
        self
    }

    /// Register `T::default` as the constructor used on import.
    pub fn default_constructible(mut self) -> Self
    where
        T: Default,
    {
        self.factory = Some(T::default);
        self
    }

    /// Finish the table. The first declaration of a name wins; own attributes precede inherited
    /// ones.
    pub fn build(self) -> AttributeTable<T> {
        let mut attributes = Vec::with_capacity(self.own.len() + self.inherited.len());
        let mut index = HashMap::with_capacity(attributes.capacity());
        for attr in self.own.into_iter().chain(self.inherited) {
            if index.contains_key(attr.name) {
                continue;
            }
            index.insert(attr.name, attributes.len());
            attributes.push(attr);
        }
        AttributeTable {
            type_name: self.type_name,
            attributes,
            index,
            factory: self.factory,
        }
    }
}

fn erase_ref<T, F>(f: F) -> F
where
    F: Fn(&T) -> Option<&dyn Reflect>,
{
    f
}

fn erase_mut<T, F>(f: F) -> F
where
    F: Fn(&mut T) -> Option<&mut dyn Reflect>,
{
    f
}

impl<T: Record> Reflect for T {
    fn type_name(&self) -> &'static str {
        T::attributes().type_name
    }

    fn attribute(&self, name: &str) -> Option<AttributeRef<'_>> {
        let attr = T::attributes().get(name)?;
        Some(match &attr.kind {
            AttributeKind::Scalar { get, .. } => AttributeRef::Value(get(self)),
            AttributeKind::Nested { get, .. } => AttributeRef::Nested(get(self)),
        })
    }

    fn attribute_mut(&mut self, name: &str) -> Option<AttributeMut<'_>> {
        let attr = T::attributes().get(name)?;
        Some(match &attr.kind {
            AttributeKind::Scalar {
                value_type,
                nullable,
                set,
                ..
            } => AttributeMut::Scalar(ScalarSlot {
                value_type: *value_type,
                nullable: *nullable,
                assign: Box::new(move |v| set(self, v)),
            }),
            AttributeKind::Nested { get_mut, .. } => AttributeMut::Nested(get_mut(self)),
        })
    }
}

/// Conversion between a Rust field type and [`Value`].
///
/// Implement this for your own field types with [`ValueType::Other`]: on import they receive the
/// raw cell text as [`Value::Text`] and decide how to accept it.
///
/// ```rust
/// use tabular_marshal::record::AttrValue;
/// use tabular_marshal::types::{Value, ValueType};
///
/// #[derive(Debug, Default, PartialEq)]
/// enum Grade {
///     #[default]
///     Pass,
///     Fail,
/// }
///
/// impl AttrValue for Grade {
///     const VALUE_TYPE: ValueType = ValueType::Other("Grade");
///
///     fn to_value(&self) -> Value {
///         Value::Text(match self {
///             Grade::Pass => "pass".to_string(),
///             Grade::Fail => "fail".to_string(),
///         })
///     }
///
///     fn from_value(value: Value) -> Result<Self, String> {
///         match value {
///             Value::Text(s) if s == "pass" => Ok(Grade::Pass),
///             Value::Text(s) if s == "fail" => Ok(Grade::Fail),
///             other => Err(format!("unknown grade {other:?}")),
///         }
///     }
/// }
/// ```
pub trait AttrValue: Sized {
    /// Declared type used to coerce cell text on import.
    const VALUE_TYPE: ValueType;
    /// `true` for `Option<_>` fields: empty cells import as `None`.
    const NULLABLE: bool = false;

    /// Current value of the field.
    fn to_value(&self) -> Value;

    /// Convert a coerced value into the field type.
    fn from_value(value: Value) -> Result<Self, String>;
}

fn mismatch(expected: ValueType, got: &Value) -> String {
    format!("expected {expected} value, got {got:?}")
}

macro_rules! attr_value {
    ($ty:ty, $vt:ident, $variant:ident) => {
        impl AttrValue for $ty {
            const VALUE_TYPE: ValueType = ValueType::$vt;

            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }

            fn from_value(value: Value) -> Result<Self, String> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(mismatch(Self::VALUE_TYPE, &other)),
                }
            }
        }
    };
}

attr_value!(String, Text, Text);
attr_value!(i16, Int16, Int16);
attr_value!(i32, Int32, Int32);
attr_value!(i64, Int64, Int64);
attr_value!(f32, Float32, Float32);
attr_value!(f64, Float64, Float64);
attr_value!(char, Char, Char);
attr_value!(BigDecimal, Decimal, Decimal);
attr_value!(NaiveDateTime, DateTime, DateTime);

impl<V: AttrValue> AttrValue for Option<V> {
    const VALUE_TYPE: ValueType = V::VALUE_TYPE;
    const NULLABLE: bool = true;

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, String> {
        if value.is_null() {
            return Ok(None);
        }
        V::from_value(value).map(Some)
    }
}
