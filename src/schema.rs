//! Record schemas built from explicit accessor tables
//!
//! A record type implements [`Record`] and lists its attributes in a
//! [`FieldTable`]: a getter/setter pair per attribute plus the column
//! bindings attached to it. [`Schema::build`] turns that table into the
//! ordered, direction-filtered list of bound fields that the reader and
//! writer work from. Nested target paths (`"dept.name"`) are resolved into
//! composed accessors once, at build time.
//!
//! ```
//! use excelbatch::binding::FieldBinding;
//! use excelbatch::binding::Direction;
//! use excelbatch::schema::{FieldTable, Record, Schema};
//!
//! #[derive(Default)]
//! struct Dept {
//!     name: String,
//! }
//!
//! impl Record for Dept {
//!     fn fields(table: &mut FieldTable<Self>) {
//!         table.attr("name", |d| &d.name, |d| &mut d.name);
//!     }
//! }
//!
//! #[derive(Default)]
//! struct User {
//!     id: i64,
//!     dept: Option<Dept>,
//! }
//!
//! impl Record for User {
//!     fn fields(table: &mut FieldTable<Self>) {
//!         table
//!             .attr("id", |u| &u.id, |u| &mut u.id)
//!             .bind(FieldBinding::new(1, "ID"));
//!         table
//!             .nested("dept", |u| u.dept.as_ref(), |u| u.dept.get_or_insert_with(Dept::default))
//!             .bind(FieldBinding::new(2, "Department").target("name"));
//!     }
//! }
//!
//! let schema = Schema::<User>::build(Direction::Export).unwrap();
//! assert_eq!(schema.labels(), vec!["ID", "Department"]);
//! ```

use crate::binding::{Direction, FieldBinding};
use crate::error::{ExcelError, Result};
use crate::types::DATETIME_FORMAT;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// Declared type of a bound field, the target of cell coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    Date,
    DateTime,
    Bool,
}

/// Typed value moved between records and cells
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    String(String),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Bool(bool),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Plain text form: ISO dates, shortest float representation, `""` for null.
    pub fn to_plain_string(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::String(s) => s.clone(),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Long(l) => l.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Double(d) => d.to_string(),
            FieldValue::Decimal(d) => d.to_string(),
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            FieldValue::Bool(b) => b.to_string(),
        }
    }

    /// Numeric view used for column totals.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(f64::from(*i)),
            FieldValue::Long(l) => Some(*l as f64),
            FieldValue::Float(f) => Some(f64::from(*f)),
            FieldValue::Double(d) => Some(*d),
            FieldValue::Decimal(d) => d.to_f64(),
            FieldValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plain_string())
    }
}

/// Rust types that can be bound to a column
pub trait FieldKind: Sized + 'static {
    const TYPE: FieldType;

    fn to_value(&self) -> FieldValue;

    /// `None` when the value has a different shape than `Self`.
    fn from_value(value: FieldValue) -> Option<Self>;
}

macro_rules! field_kind {
    ($ty:ty, $variant:ident) => {
        impl FieldKind for $ty {
            const TYPE: FieldType = FieldType::$variant;

            fn to_value(&self) -> FieldValue {
                FieldValue::$variant(self.clone())
            }

            fn from_value(value: FieldValue) -> Option<Self> {
                match value {
                    FieldValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

field_kind!(String, String);
field_kind!(i32, Int);
field_kind!(i64, Long);
field_kind!(f32, Float);
field_kind!(f64, Double);
field_kind!(Decimal, Decimal);
field_kind!(NaiveDate, Date);
field_kind!(NaiveDateTime, DateTime);
field_kind!(bool, Bool);

impl<V: FieldKind> FieldKind for Option<V> {
    const TYPE: FieldType = V::TYPE;

    fn to_value(&self) -> FieldValue {
        match self {
            Some(v) => v.to_value(),
            None => FieldValue::Null,
        }
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Null => Some(None),
            other => V::from_value(other).map(Some),
        }
    }
}

type ValueGetter<T> = Arc<dyn Fn(&T) -> FieldValue + Send + Sync>;
type ValueSetter<T> = Arc<dyn Fn(&mut T, FieldValue) -> bool + Send + Sync>;
type RefGetter<O, T> = Arc<dyn Fn(&O) -> Option<&T> + Send + Sync>;
type MutGetter<O, T> = Arc<dyn Fn(&mut O) -> &mut T + Send + Sync>;
type Resolver<T> = Arc<dyn Fn(&str) -> Result<Accessor<T>> + Send + Sync>;

fn ref_getter<O, T, F>(f: F) -> RefGetter<O, T>
where
    F: Fn(&O) -> Option<&T> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn mut_getter<O, T, F>(f: F) -> MutGetter<O, T>
where
    F: Fn(&mut O) -> &mut T + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Type-erased getter/setter pair for one (possibly nested) attribute
pub(crate) struct Accessor<T> {
    ty: FieldType,
    get: ValueGetter<T>,
    set: ValueSetter<T>,
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        Accessor {
            ty: self.ty,
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<T: 'static> Accessor<T> {
    /// Lift an accessor on `T` to one on an outer record `O`.
    fn project<O: 'static>(
        &self,
        outer: RefGetter<O, T>,
        outer_mut: MutGetter<O, T>,
    ) -> Accessor<O> {
        let get = Arc::clone(&self.get);
        let set = Arc::clone(&self.set);
        Accessor {
            ty: self.ty,
            get: Arc::new(move |o: &O| match outer(o) {
                Some(inner) => get(inner),
                None => FieldValue::Null,
            }),
            set: Arc::new(move |o: &mut O, value: FieldValue| set(outer_mut(o), value)),
        }
    }
}

enum Target<T> {
    Value(Accessor<T>),
    Nested(Resolver<T>),
}

struct Entry<T> {
    name: &'static str,
    target: Target<T>,
    bindings: Vec<FieldBinding>,
}

/// A record type whose attributes can be mapped to worksheet columns
pub trait Record: Default + 'static {
    /// Declare attributes in declaration order; bindings attach with [`AttrDecl::bind`].
    fn fields(table: &mut FieldTable<Self>);
}

/// Attribute table filled in by [`Record::fields`]
pub struct FieldTable<T> {
    entries: Vec<Entry<T>>,
}

/// Handle returned for a declared attribute
pub struct AttrDecl<'a> {
    bindings: &'a mut Vec<FieldBinding>,
}

impl AttrDecl<'_> {
    /// Attach a column binding; an attribute may carry several.
    pub fn bind(self, binding: FieldBinding) -> Self {
        self.bindings.push(binding);
        self
    }
}

impl<T: Record> FieldTable<T> {
    pub(crate) fn collect() -> Self {
        let mut table = FieldTable {
            entries: Vec::new(),
        };
        T::fields(&mut table);
        table
    }

    /// Declare a plain attribute.
    pub fn attr<V, G, S>(&mut self, name: &'static str, get: G, get_mut: S) -> AttrDecl<'_>
    where
        V: FieldKind,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        S: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        let accessor = Accessor {
            ty: V::TYPE,
            get: Arc::new(move |t: &T| get(t).to_value()),
            set: Arc::new(move |t: &mut T, value: FieldValue| match V::from_value(value) {
                Some(v) => {
                    *get_mut(t) = v;
                    true
                }
                None => false,
            }),
        };
        self.push(name, Target::Value(accessor))
    }

    /// Declare an attribute holding another record; bindings on it name a
    /// `target` path inside that record. `get_mut` creates the inner record
    /// when it is missing.
    pub fn nested<P, G, S>(&mut self, name: &'static str, get: G, get_mut: S) -> AttrDecl<'_>
    where
        P: Record,
        G: Fn(&T) -> Option<&P> + Send + Sync + 'static,
        S: Fn(&mut T) -> &mut P + Send + Sync + 'static,
    {
        let inner = FieldTable::<P>::collect();
        let outer = ref_getter(get);
        let outer_mut = mut_getter(get_mut);
        let resolver: Resolver<T> = Arc::new(move |path: &str| {
            let accessor = inner.resolve(path)?;
            Ok(accessor.project(Arc::clone(&outer), Arc::clone(&outer_mut)))
        });
        self.push(name, Target::Nested(resolver))
    }

    /// Pull in every attribute and binding of an embedded parent record.
    pub fn inherit<P, G, S>(&mut self, project: G, project_mut: S)
    where
        P: Record,
        G: Fn(&T) -> &P + Send + Sync + 'static,
        S: Fn(&mut T) -> &mut P + Send + Sync + 'static,
    {
        let outer = ref_getter(move |t: &T| Some(project(t)));
        let outer_mut = mut_getter(project_mut);
        for entry in FieldTable::<P>::collect().entries {
            let target = match entry.target {
                Target::Value(acc) => {
                    Target::Value(acc.project(Arc::clone(&outer), Arc::clone(&outer_mut)))
                }
                Target::Nested(resolver) => {
                    let outer = Arc::clone(&outer);
                    let outer_mut = Arc::clone(&outer_mut);
                    Target::Nested(Arc::new(move |path: &str| {
                        let accessor = resolver(path)?;
                        Ok(accessor.project(Arc::clone(&outer), Arc::clone(&outer_mut)))
                    }))
                }
            };
            self.entries.push(Entry {
                name: entry.name,
                target,
                bindings: entry.bindings,
            });
        }
    }

    fn push(&mut self, name: &'static str, target: Target<T>) -> AttrDecl<'_> {
        let index = self.entries.len();
        self.entries.push(Entry {
            name,
            target,
            bindings: Vec::new(),
        });
        AttrDecl {
            bindings: &mut self.entries[index].bindings,
        }
    }

    /// Resolve a dotted attribute path to an accessor.
    fn resolve(&self, path: &str) -> Result<Accessor<T>> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == head)
            .ok_or_else(|| ExcelError::InvalidBinding(format!("unknown attribute '{}'", head)))?;

        match (&entry.target, rest) {
            (Target::Value(acc), None) => Ok(acc.clone()),
            (Target::Value(_), Some(_)) => Err(ExcelError::InvalidBinding(format!(
                "attribute '{}' is not a nested record",
                head
            ))),
            (Target::Nested(resolver), Some(rest)) => resolver(rest),
            (Target::Nested(_), None) => Err(ExcelError::InvalidBinding(format!(
                "attribute '{}' is a nested record; a target path is required",
                head
            ))),
        }
    }
}

/// One bound column of a schema
pub struct SchemaField<T> {
    binding: FieldBinding,
    path: String,
    accessor: Accessor<T>,
}

impl<T> SchemaField<T> {
    pub fn binding(&self) -> &FieldBinding {
        &self.binding
    }

    /// Attribute path, e.g. `dept.name`
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn field_type(&self) -> FieldType {
        self.accessor.ty
    }

    /// `FieldValue::Null` when any link of a nested path is missing.
    pub fn get(&self, record: &T) -> FieldValue {
        (self.accessor.get)(record)
    }

    /// Returns false when `value` does not fit the field's type.
    pub fn set(&self, record: &mut T, value: FieldValue) -> bool {
        (self.accessor.set)(record, value)
    }
}

/// Ordered bound fields of a record type for one direction
pub struct Schema<T> {
    direction: Direction,
    fields: Vec<SchemaField<T>>,
}

impl<T: Record> Schema<T> {
    /// Collect the bindings that apply to `direction`, sorted by order.
    /// `Direction::All` keeps every binding.
    pub fn build(direction: Direction) -> Result<Self> {
        let table = FieldTable::<T>::collect();
        let mut fields = Vec::new();

        for entry in &table.entries {
            for binding in &entry.bindings {
                if direction != Direction::All && !binding.direction.applies_to(direction) {
                    continue;
                }
                let target = binding.target_path.as_deref().filter(|p| !p.is_empty());
                let (accessor, path) = match (&entry.target, target) {
                    (Target::Value(acc), None) => (acc.clone(), entry.name.to_string()),
                    (Target::Value(_), Some(path)) => {
                        return Err(ExcelError::InvalidBinding(format!(
                            "'{}' has target '{}' but is not a nested record",
                            entry.name, path
                        )))
                    }
                    (Target::Nested(resolver), Some(path)) => (
                        resolver(path).map_err(|e| match e {
                            ExcelError::InvalidBinding(msg) => {
                                ExcelError::InvalidBinding(format!("{}: {}", entry.name, msg))
                            }
                            other => other,
                        })?,
                        format!("{}.{}", entry.name, path),
                    ),
                    (Target::Nested(_), None) => {
                        return Err(ExcelError::InvalidBinding(format!(
                            "nested record '{}' is bound to '{}' without a target path",
                            entry.name, binding.label
                        )))
                    }
                };
                fields.push(SchemaField {
                    binding: binding.clone(),
                    path,
                    accessor,
                });
            }
        }

        // stable: equal orders keep declaration order
        fields.sort_by_key(|f| f.binding.order);

        Ok(Schema { direction, fields })
    }
}

impl<T> Schema<T> {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn fields(&self) -> &[SchemaField<T>] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.binding.label.as_str()).collect()
    }

    /// Tallest row height requested by any binding, in points.
    pub fn max_row_height(&self) -> f64 {
        self.fields
            .iter()
            .map(|f| f.binding.row_height)
            .fold(0.0, f64::max)
    }

    pub fn has_statistics(&self) -> bool {
        self.fields.iter().any(|f| f.binding.collect_statistics)
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("direction", &self.direction)
            .field("labels", &self.labels())
            .finish()
    }
}
