use crate::value::Value;

///
/// AttributeAccess
///
/// Column-keyed field access over a domain object. An explicit,
/// injected capability; the compiler never reflects over types.
///

pub trait AttributeAccess {
    /// Read the value stored under `column`, if the type carries it.
    fn get(&self, column: &str) -> Option<Value>;

    /// Write `value` into the field mapped to `column`.
    /// Unknown columns are ignored; the accessor table is authoritative.
    fn set(&mut self, column: &str, value: Value);
}

///
/// AccessorEntry
/// One column-to-field binding, built once per domain type.
///

pub struct AccessorEntry<T> {
    pub column: &'static str,
    pub get: fn(&T) -> Value,
    pub set: fn(&mut T, Value),
}

///
/// AccessorTable
///
/// Ordered accessor entries for one domain type. Order follows the
/// table's declared column order so assignment lists render
/// deterministically.
///

pub struct AccessorTable<T> {
    entries: Vec<AccessorEntry<T>>,
}

impl<T> AccessorTable<T> {
    #[must_use]
    pub const fn new(entries: Vec<AccessorEntry<T>>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entry(&self, column: &str) -> Option<&AccessorEntry<T>> {
        self.entries.iter().find(|e| e.column == column)
    }

    /// Read `column` from `obj`.
    #[must_use]
    pub fn get(&self, obj: &T, column: &str) -> Option<Value> {
        self.entry(column).map(|e| (e.get)(obj))
    }

    /// Write `value` into `obj` under `column`. Returns false when the
    /// column has no binding.
    pub fn set(&self, obj: &mut T, column: &str, value: Value) -> bool {
        match self.entry(column) {
            Some(e) => {
                (e.set)(obj, value);
                true
            }
            None => false,
        }
    }

    /// Iterate bindings in declared order.
    pub fn iter(&self) -> impl Iterator<Item = &AccessorEntry<T>> {
        self.entries.iter()
    }
}
