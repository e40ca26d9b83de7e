use std::cmp::Ordering;

use mongodb::bson::{doc, Bson, Document};

/// A fluent builder for document queries: filter conditions, ordering and a limit.
///
/// The same query renders to a MongoDB filter/sort pair and can be evaluated
/// in process by the in-memory store, with matching semantics.
///
/// # Example
///
/// ```ignore
/// let q = Query::new()
///     .where_eq("status", "published")
///     .where_contains("tags", "rust")
///     .order_by("createdAt", false)
///     .limit(10);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    conditions: Vec<Condition>,
    order: Vec<(String, bool)>,
    limit_val: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    /// MongoDB equality: the field equals the value, or is an array holding it.
    Eq(String, Bson),
    /// The field is an array holding the value.
    Contains(String, Bson),
}

impl Condition {
    fn field(&self) -> &str {
        match self {
            Condition::Eq(field, _) | Condition::Contains(field, _) => field,
        }
    }

    fn to_document(&self) -> Document {
        match self {
            Condition::Eq(field, value) => doc! { field.as_str(): value.clone() },
            Condition::Contains(field, value) => {
                doc! { field.as_str(): { "$elemMatch": { "$eq": value.clone() } } }
            }
        }
    }

    fn matches(&self, document: &Document) -> bool {
        match self {
            Condition::Eq(field, value) => match document.get(field) {
                Some(Bson::Array(items)) => {
                    items.contains(value) || matches!(value, Bson::Array(whole) if whole == items)
                }
                Some(actual) => actual == value,
                None => value == &Bson::Null,
            },
            Condition::Contains(field, value) => match document.get(field) {
                Some(Bson::Array(items)) => items.contains(value),
                _ => false,
            },
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.conditions.push(Condition::Eq(field.to_string(), value.into()));
        self
    }

    pub fn where_contains(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.conditions
            .push(Condition::Contains(field.to_string(), value.into()));
        self
    }

    pub fn order_by(mut self, field: &str, ascending: bool) -> Self {
        self.order.push((field.to_string(), ascending));
        self
    }

    /// Cap the number of returned documents. Follows MongoDB: `0` means no
    /// cap and a negative value caps at its absolute value.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit_val = Some(limit);
        self
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit_val
    }

    /// The effective cap on returned documents, if any.
    pub fn max_results(&self) -> Option<usize> {
        match self.limit_val {
            None | Some(0) => None,
            Some(n) => Some(usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX)),
        }
    }

    /// Render the conditions as a MongoDB filter document.
    ///
    /// Conditions on distinct fields share one document; repeated fields are
    /// combined under `$and` so none is lost.
    pub fn filter_document(&self) -> Document {
        let mut fields: Vec<&str> = self.conditions.iter().map(Condition::field).collect();
        fields.sort_unstable();
        fields.dedup();

        if fields.len() == self.conditions.len() {
            let mut filter = Document::new();
            for cond in &self.conditions {
                for (key, value) in cond.to_document() {
                    filter.insert(key, value);
                }
            }
            filter
        } else {
            let clauses: Vec<Bson> = self
                .conditions
                .iter()
                .map(|c| Bson::Document(c.to_document()))
                .collect();
            doc! { "$and": clauses }
        }
    }

    /// Render the ordering as a MongoDB sort document (`1` ascending, `-1` descending).
    pub fn sort_document(&self) -> Option<Document> {
        if self.order.is_empty() {
            return None;
        }
        let mut sort = Document::new();
        for (field, ascending) in &self.order {
            sort.insert(field.as_str(), if *ascending { 1 } else { -1 });
        }
        Some(sort)
    }

    /// Whether `document` satisfies every condition.
    pub fn matches(&self, document: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(document))
    }

    /// Compare two documents by the query ordering.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for (field, ascending) in &self.order {
            let ord = compare_values(a.get(field), b.get(field));
            let ord = if *ascending { ord } else { ord.reverse() };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

/// MongoDB cross-type sort order: missing and null first, then numbers,
/// strings, documents, arrays, object ids, booleans and dates.
fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) => 0,
        Some(Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_)) => 1,
        Some(Bson::String(_) | Bson::Symbol(_)) => 2,
        Some(Bson::Document(_)) => 3,
        Some(Bson::Array(_)) => 4,
        Some(Bson::Binary(_)) => 5,
        Some(Bson::ObjectId(_)) => 6,
        Some(Bson::Boolean(_)) => 7,
        Some(Bson::DateTime(_)) => 8,
        Some(Bson::Timestamp(_)) => 9,
        Some(_) => 10,
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(d) => Some(*d),
        _ => None,
    }
}

fn compare_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Some(Bson::String(x)), Some(Bson::String(y))) => x.cmp(y),
        (Some(Bson::DateTime(x)), Some(Bson::DateTime(y))) => x.cmp(y),
        (Some(Bson::ObjectId(x)), Some(Bson::ObjectId(y))) => x.bytes().cmp(&y.bytes()),
        (Some(Bson::Boolean(x)), Some(Bson::Boolean(y))) => x.cmp(y),
        (Some(x), Some(y)) => match (as_f64(x), as_f64(y)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        _ => Ordering::Equal,
    }
}
