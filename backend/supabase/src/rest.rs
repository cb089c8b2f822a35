//! Table access over the PostgREST interface.

use async_trait::async_trait;
use reqwest::Response;
use serde_json::Value;
use tracing::debug;

use showroom_core::{MatchKey, Query, RecordStore, Result, Row, ShowroomError};

use crate::connection::{error_message, Connection};

/// [`RecordStore`] backed by `/rest/v1`.
pub struct RestRecordStore {
    conn: Connection,
}

impl RestRecordStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    fn table_url(&self, table: &str) -> String {
        self.conn.endpoint(&format!("rest/v1/{table}"))
    }
}

/// Render a filter value the way PostgREST expects it after `eq.`.
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Query-string pairs for a select.
pub(crate) fn select_params(query: &Query) -> Vec<(String, String)> {
    let columns = query
        .columns
        .as_ref()
        .map(|c| c.join(","))
        .unwrap_or_else(|| "*".to_string());
    let mut params = vec![("select".to_string(), columns)];
    for filter in &query.filters {
        params.push((filter.column.clone(), format!("eq.{}", literal(&filter.value))));
    }
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }
    params
}

pub(crate) fn match_params(key: &MatchKey) -> [(String, String); 1] {
    [(key.column.clone(), format!("eq.{}", literal(&key.value)))]
}

async fn check(table: &str, response: reqwest::Result<Response>) -> Result<Response> {
    let response = response.map_err(|e| ShowroomError::persist(table, e))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ShowroomError::persist(
        table,
        format!("{}: {}", status, error_message(&body)),
    ))
}

#[async_trait]
impl RecordStore for RestRecordStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>> {
        debug!(table = %table, "Selecting rows");
        let request = self
            .conn
            .authorize(self.conn.client().get(self.table_url(table)))
            .query(&select_params(query));
        let response = check(table, request.send().await).await?;
        response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| ShowroomError::persist(table, format!("unreadable rows: {e}")))
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Row> {
        debug!(table = %table, "Inserting row");
        let request = self
            .conn
            .authorize(self.conn.client().post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(&[row]);
        let response = check(table, request.send().await).await?;
        let mut rows = response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| ShowroomError::persist(table, format!("unreadable insert result: {e}")))?;
        if rows.is_empty() {
            return Err(ShowroomError::persist(table, "insert returned no row"));
        }
        Ok(rows.swap_remove(0))
    }

    async fn update(&self, table: &str, changes: Row, key: &MatchKey) -> Result<()> {
        debug!(table = %table, key = %key, "Updating row");
        let request = self
            .conn
            .authorize(self.conn.client().patch(self.table_url(table)))
            .query(&match_params(key))
            .header("Prefer", "return=minimal")
            .json(&changes);
        check(table, request.send().await).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, key: &MatchKey) -> Result<()> {
        debug!(table = %table, key = %key, "Deleting row");
        let request = self
            .conn
            .authorize(self.conn.client().delete(self.table_url(table)))
            .query(&match_params(key));
        check(table, request.send().await).await?;
        Ok(())
    }

    async fn call(&self, function: &str, args: Value) -> Result<Value> {
        let target = format!("rpc/{function}");
        let request = self
            .conn
            .authorize(self.conn.client().post(self.conn.endpoint(&format!("rest/v1/{target}"))))
            .json(&args);
        let response = check(&target, request.send().await).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ShowroomError::persist(&target, e))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ShowroomError::persist(&target, format!("unreadable result: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_params_full() {
        let query = Query::all()
            .columns(&["role", "user_id"])
            .eq("user_id", "0b6c")
            .order_by("created_at", false);
        assert_eq!(
            select_params(&query),
            vec![
                ("select".to_string(), "role,user_id".to_string()),
                ("user_id".to_string(), "eq.0b6c".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_select_params_default_star() {
        assert_eq!(select_params(&Query::all()), vec![("select".to_string(), "*".to_string())]);
    }

    #[test]
    fn test_match_params_numeric_key() {
        let [(column, value)] = match_params(&MatchKey::id(42));
        assert_eq!(column, "id");
        assert_eq!(value, "eq.42");
    }

    #[test]
    fn test_table_url() {
        let store = RestRecordStore::new(Connection::new("https://abc.supabase.co", "anon"));
        assert_eq!(store.table_url("team_members"), "https://abc.supabase.co/rest/v1/team_members");
    }
}
