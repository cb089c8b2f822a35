//! Customer quote requests.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use showroom_core::tables;

use crate::book::BookEntry;
use crate::search::Searchable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub street_address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Quote {
    /// `street city district state`, missing parts left blank.
    pub fn address(&self) -> String {
        [&self.street_address, &self.city, &self.district, &self.state]
            .iter()
            .map(|part| part.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl BookEntry for Quote {
    const TABLE: &'static str = tables::QUOTES;
    const LABEL: &'static str = "Quote";
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "email", "address"];

    fn key_value(&self) -> &Value {
        &self.id
    }
}

impl Searchable for Quote {
    fn field(&self, name: &str) -> Option<Value> {
        let text = |v: &Option<String>| v.clone().map(Value::String);
        match name {
            "id" => Some(self.id.clone()),
            "name" => text(&self.name),
            "email" => text(&self.email),
            "phone" => text(&self.phone),
            "requirements" => text(&self.requirements),
            "city" => text(&self.city),
            "district" => text(&self.district),
            "state" => text(&self.state),
            "created_at" => text(&self.created_at),
            "address" => Some(json!(self.address())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::TableBook;
    use crate::search::search;
    use showroom_core::{InMemoryRecordStore, Row, ShowroomError};
    use std::sync::Arc;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    fn store() -> Arc<InMemoryRecordStore> {
        Arc::new(InMemoryRecordStore::new().with_rows(
            tables::QUOTES,
            vec![
                row(json!({"id": 1, "name": "Ravi", "email": "ravi@mail.com", "street_address": "12 MG Road",
                    "city": "Kochi", "district": "Ernakulam", "state": "Kerala", "created_at": "2026-01-01T00:00:00Z"})),
                row(json!({"id": 2, "name": "Sara", "email": "sara@mail.com", "city": "Pune",
                    "created_at": "2026-02-01T00:00:00Z"})),
            ],
        ))
    }

    #[test]
    fn test_address_with_missing_parts() {
        let quote: Quote = serde_json::from_value(json!({"id": 2, "city": "Pune"})).unwrap();
        assert_eq!(quote.address(), " Pune  ");
    }

    #[tokio::test]
    async fn test_list_newest_first_and_search_address() {
        let book: TableBook<Quote> = TableBook::new(store());
        let quotes = book.list().await.unwrap();
        assert_eq!(quotes[0].name.as_deref(), Some("Sara"));

        let hits = search(&quotes, "ernakulam", Quote::SEARCH_FIELDS);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, json!(1));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = store();
        let book: TableBook<Quote> = TableBook::new(store.clone());

        let mut changes = Row::new();
        changes.insert("requirements".into(), json!("Dining set for 6"));
        book.update(&json!(2), changes).await.unwrap();
        let rows = store.rows(tables::QUOTES).await;
        assert_eq!(rows[1]["requirements"], "Dining set for 6");

        book.delete(&json!(1)).await.unwrap();
        assert_eq!(store.rows(tables::QUOTES).await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_rejects_empty_and_key_changes() {
        let store = store();
        let book: TableBook<Quote> = TableBook::new(store.clone());
        assert!(matches!(book.update(&json!(1), Row::new()).await, Err(ShowroomError::Validation(_))));

        let mut changes = Row::new();
        changes.insert("id".into(), json!(99));
        assert!(book.update(&json!(1), changes).await.is_err());
        assert_eq!(store.write_count(), 0);
    }
}
