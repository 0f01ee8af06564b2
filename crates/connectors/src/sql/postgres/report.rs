use crate::sql::{error::DbError, postgres::connect::connect_client};
use model::{
    core::value::{FieldValue, Value},
    records::row::Record,
};
use tokio_postgres::Client;

/// Read-only client for inspecting what a run persisted, used by completion
/// listeners that report row counts and sample rows.
pub struct PgReport {
    client: Client,
}

impl PgReport {
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let client = connect_client(url).await?;
        Ok(PgReport { client })
    }

    pub async fn count(&self, table: &str) -> Result<i64, DbError> {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let row = self.client.query_one(sql.as_str(), &[]).await?;
        Ok(row.get(0))
    }

    /// Up to `limit` rows of the named text columns, as records.
    pub async fn sample(
        &self,
        table: &str,
        columns: &[String],
        limit: i64,
    ) -> Result<Vec<Record>, DbError> {
        let sql = format!("SELECT {} FROM {table} LIMIT {limit}", columns.join(", "));
        let rows = self.client.query(sql.as_str(), &[]).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let field_values = columns
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let value = row
                        .try_get::<_, Option<String>>(i)
                        .ok()
                        .flatten()
                        .map(Value::String)
                        .unwrap_or(Value::Null);
                    FieldValue::new(name, value)
                })
                .collect();
            records.push(Record::new(table, field_values));
        }
        Ok(records)
    }
}
