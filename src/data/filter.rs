use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde_json::Value;
use std::fmt;

type Predicate<T> = Box<dyn Fn(&T, &str) -> bool + Send + Sync>;

/// Query-driven filter over a borrowed sequence.
///
/// The view is recomputed on every [`apply`](Filter::apply); callers that
/// need caching must hold on to the result themselves.
pub struct Filter<T> {
    query: String,
    predicate: Predicate<T>,
}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").field("query", &self.query).finish()
    }
}

impl<T> Filter<T> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T, &str) -> bool + Send + Sync + 'static,
    {
        Self {
            query: String::new(),
            predicate: Box::new(predicate),
        }
    }

    /// Case-insensitive substring match against a text projection of each item
    pub fn contains_ignore_case<P>(text: P) -> Self
    where
        P: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self::new(move |item, query| {
            text(item).to_lowercase().contains(&query.to_lowercase())
        })
    }

    /// Skim-style fuzzy match; items scoring at or below `score_threshold` are dropped
    pub fn fuzzy<P>(text: P, score_threshold: i64) -> Self
    where
        P: Fn(&T) -> String + Send + Sync + 'static,
    {
        let matcher = SkimMatcherV2::default();
        Self::new(move |item, query| {
            matcher
                .fuzzy_match(&text(item), query)
                .is_some_and(|score| score > score_threshold)
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn clear(&mut self) {
        self.query.clear();
    }

    /// Filter `items` by the current query.
    ///
    /// An empty query hands back the source itself without calling the
    /// predicate.
    pub fn apply<'a>(&self, items: &'a [T]) -> FilteredView<'a, T> {
        if self.query.is_empty() {
            return FilteredView::All(items);
        }

        let matches: Vec<&T> = items
            .iter()
            .filter(|item| (self.predicate)(*item, &self.query))
            .collect();
        tracing::trace!(
            target: "filter",
            "Query {:?} kept {} of {} items",
            self.query,
            matches.len(),
            items.len()
        );
        FilteredView::Matches(matches)
    }
}

/// Result of [`Filter::apply`]
#[derive(Debug, Clone)]
pub enum FilteredView<'a, T> {
    /// Empty query: the untouched source
    All(&'a [T]),
    /// Items that satisfied the predicate, in source order
    Matches(Vec<&'a T>),
}

impl<'a, T> FilteredView<'a, T> {
    pub fn len(&self) -> usize {
        match self {
            FilteredView::All(items) => items.len(),
            FilteredView::Matches(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when no filtering took place
    pub fn is_unfiltered(&self) -> bool {
        matches!(self, FilteredView::All(_))
    }

    pub fn iter(&self) -> FilteredIter<'a, '_, T> {
        match self {
            FilteredView::All(items) => FilteredIter::All(items.iter()),
            FilteredView::Matches(items) => FilteredIter::Matches(items.iter()),
        }
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

pub enum FilteredIter<'a, 'v, T> {
    All(std::slice::Iter<'a, T>),
    Matches(std::slice::Iter<'v, &'a T>),
}

impl<'a, 'v, T> Iterator for FilteredIter<'a, 'v, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            FilteredIter::All(iter) => iter.next(),
            FilteredIter::Matches(iter) => iter.next().copied(),
        }
    }
}

/// Render a JSON value as plain text for matching
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::from("null"),
        _ => value.to_string(),
    }
}

/// Text of one field of a JSON object, or of every field joined by spaces
/// when `field` is `None`
pub fn json_text(item: &Value, field: Option<&str>) -> String {
    match (item.as_object(), field) {
        (Some(obj), Some(field)) => obj.get(field).map(value_to_text).unwrap_or_default(),
        (Some(obj), None) => obj.values().map(value_to_text).collect::<Vec<_>>().join(" "),
        (None, _) => value_to_text(item),
    }
}
