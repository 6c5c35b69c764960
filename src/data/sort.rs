use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// A sortable attribute value extracted from an item
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl SortValue {
    fn type_rank(&self) -> u8 {
        // Null < Boolean < numbers < Text
        match self {
            SortValue::Null => 0,
            SortValue::Boolean(_) => 1,
            SortValue::Integer(_) | SortValue::Float(_) => 2,
            SortValue::Text(_) => 3,
        }
    }
}

/// Natural ordering: numeric across integers and floats, lexicographic for
/// text, nulls first, and a fixed order between unrelated types
pub fn compare_sort_values(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Integer(a), SortValue::Integer(b)) => a.cmp(b),
        (SortValue::Float(a), SortValue::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (SortValue::Integer(i), SortValue::Float(f)) => {
            (*i as f64).partial_cmp(f).unwrap_or(Ordering::Equal)
        }
        (SortValue::Float(f), SortValue::Integer(i)) => {
            f.partial_cmp(&(*i as f64)).unwrap_or(Ordering::Equal)
        }
        (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
        (SortValue::Boolean(a), SortValue::Boolean(b)) => a.cmp(b),
        (SortValue::Null, SortValue::Null) => Ordering::Equal,
        _ => a.type_rank().cmp(&b.type_rank()),
    }
}

impl From<&Value> for SortValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => SortValue::Null,
            Value::Bool(b) => SortValue::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SortValue::Integer(i),
                None => n.as_f64().map(SortValue::Float).unwrap_or(SortValue::Null),
            },
            Value::String(s) => SortValue::Text(s.clone()),
            other => SortValue::Text(other.to_string()),
        }
    }
}

/// Items that can expose an attribute to sort on
pub trait Sortable {
    type Key;

    fn sort_value(&self, key: &Self::Key) -> SortValue;
}

/// JSON objects sort by field name; a missing field sorts as null
impl Sortable for Value {
    type Key = String;

    fn sort_value(&self, key: &String) -> SortValue {
        self.get(key.as_str())
            .map(SortValue::from)
            .unwrap_or(SortValue::Null)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// Active sort key and direction.
///
/// Asking to sort by the active key flips the direction; asking for a
/// different key starts over in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct SortState<K> {
    key: Option<K>,
    order: SortOrder,
}

impl<K> Default for SortState<K> {
    fn default() -> Self {
        Self {
            key: None,
            order: SortOrder::Ascending,
        }
    }
}

impl<K: PartialEq> SortState<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(key: Option<K>, order: SortOrder) -> Self {
        Self { key, order }
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn sort_by(&mut self, key: K) {
        if self.key.as_ref() == Some(&key) {
            self.order = self.order.toggled();
        } else {
            self.key = Some(key);
            self.order = SortOrder::Ascending;
        }
    }

    /// A sorted copy of `items`; the source is left untouched.
    ///
    /// The sort is stable, so items with equal keys keep their source order
    /// in both directions. Without an active key the copy is in source order.
    pub fn sorted<T>(&self, items: &[T]) -> Vec<T>
    where
        T: Sortable<Key = K> + Clone,
    {
        let mut rows = items.to_vec();
        if let Some(key) = &self.key {
            rows.sort_by(|a, b| {
                self.order
                    .apply(compare_sort_values(&a.sort_value(key), &b.sort_value(key)))
            });
        }
        rows
    }
}
