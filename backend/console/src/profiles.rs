//! Customer profiles.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use showroom_core::tables;

use crate::book::BookEntry;
use crate::search::Searchable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Value,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Profile {
    /// `city district state`, missing parts left blank.
    pub fn address(&self) -> String {
        [&self.city, &self.district, &self.state]
            .iter()
            .map(|part| part.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl BookEntry for Profile {
    const TABLE: &'static str = tables::PROFILES;
    const LABEL: &'static str = "Profile";
    const SEARCH_FIELDS: &'static [&'static str] = &["full_name", "email", "phone", "address"];

    fn key_value(&self) -> &Value {
        &self.id
    }
}

impl Searchable for Profile {
    fn field(&self, name: &str) -> Option<Value> {
        let text = |v: &Option<String>| v.clone().map(Value::String);
        match name {
            "id" => Some(self.id.clone()),
            "full_name" => text(&self.full_name),
            "email" => text(&self.email),
            "phone" => text(&self.phone),
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
    use crate::search::{search, ListView, SortOrder};
    use showroom_core::InMemoryRecordStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_search_by_phone_and_sort_by_name() {
        let rows = vec![
            json!({"id": "a1", "full_name": "zoya khan", "phone": "9000012345", "state": "Goa"}),
            json!({"id": "b2", "full_name": "Arjun Rao", "phone": "9000067890", "city": "Mysuru"}),
            json!({"id": "c3", "full_name": null, "email": "anon@mail.com"}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();
        let store = Arc::new(InMemoryRecordStore::new().with_rows(tables::PROFILES, rows));
        let book: TableBook<Profile> = TableBook::new(store);
        let profiles = book.list().await.unwrap();
        assert_eq!(profiles.len(), 3);

        let hits = search(&profiles, "67890", Profile::SEARCH_FIELDS);
        assert_eq!(hits[0].id, json!("b2"));
        assert_eq!(search(&profiles, "goa", Profile::SEARCH_FIELDS).len(), 1);

        let view = ListView::sorted_by("full_name", SortOrder::Asc);
        let sorted = view.apply(&profiles, "", Profile::SEARCH_FIELDS);
        let ids: Vec<_> = sorted.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec![json!("b2"), json!("a1"), json!("c3")]);
    }

    #[test]
    fn test_row_without_id_is_rejected() {
        assert!(serde_json::from_value::<Profile>(json!({"full_name": "x"})).is_err());
    }
}
