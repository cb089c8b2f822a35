//! Client-side search and sort over already-fetched rows.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use showroom_core::Row;

/// Anything a list view can search and sort.
pub trait Searchable {
    /// Value of a named field. Derived fields (a composed address, say) are
    /// allowed; unknown names return `None`.
    fn field(&self, name: &str) -> Option<Value>;
}

impl Searchable for Row {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Sort state of one table screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListView {
    pub sort_by: Option<String>,
    pub order: SortOrder,
}

impl ListView {
    pub fn sorted_by(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            sort_by: Some(field.into()),
            order,
        }
    }

    /// Clicking the current column flips the order; a new column starts
    /// ascending.
    pub fn toggle(&mut self, field: &str) {
        if self.sort_by.as_deref() == Some(field) {
            self.order = self.order.flipped();
        } else {
            self.sort_by = Some(field.to_string());
            self.order = SortOrder::Asc;
        }
    }

    /// Filter by `query` across `fields`, then sort.
    pub fn apply<'a, T: Searchable>(&self, items: &'a [T], query: &str, fields: &[&str]) -> Vec<&'a T> {
        let mut hits = search(items, query, fields);
        self.sort(&mut hits);
        hits
    }

    pub fn sort<T: Searchable>(&self, items: &mut [&T]) {
        let Some(field) = self.sort_by.as_deref() else { return };
        items.sort_by(|a, b| {
            let (ka, kb) = (SortKey::of(a.field(field)), SortKey::of(b.field(field)));
            // Missing values stay at the bottom in both directions.
            match (&ka, &kb) {
                (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
                (SortKey::Missing, _) => Ordering::Greater,
                (_, SortKey::Missing) => Ordering::Less,
                _ => match self.order {
                    SortOrder::Asc => ka.cmp(&kb),
                    SortOrder::Desc => kb.cmp(&ka),
                },
            }
        });
    }
}

/// Case-insensitive substring match across `fields`. An empty (or blank)
/// query matches everything.
pub fn search<'a, T: Searchable>(items: &'a [T], query: &str, fields: &[&str]) -> Vec<&'a T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| {
            fields.iter().any(|f| {
                item.field(f)
                    .and_then(|v| display_text(&v))
                    .map(|text| text.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
        })
        .collect()
}

fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
    Missing,
}

impl SortKey {
    fn of(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => SortKey::Missing,
            Some(Value::Number(n)) => n.as_f64().map(SortKey::Number).unwrap_or(SortKey::Missing),
            Some(Value::String(s)) if s.is_empty() => SortKey::Missing,
            Some(other) => display_text(&other)
                .map(|t| SortKey::Text(t.to_lowercase()))
                .unwrap_or(SortKey::Missing),
        }
    }

    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            // Numbers before text when a column mixes both.
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
            _ => Ordering::Equal,
        }
    }
}
