use crate::sql::{
    error::DbError,
    postgres::{connect::connect_client, params::PgParamStore},
};
use async_trait::async_trait;
use engine_core::{connectors::sink::RecordSink, error::SinkError};
use model::records::row::Record;
use tokio_postgres::Client;
use tracing::debug;

/// Writes each chunk as one Postgres transaction: a parameterized insert per
/// record, committed together. A rejected chunk leaves nothing behind;
/// chunks committed earlier are untouched.
pub struct PgRecordSink {
    client: Client,
    table: String,
    columns: Vec<String>,
    insert_sql: String,
}

impl PgRecordSink {
    pub async fn connect(url: &str, table: &str, columns: &[String]) -> Result<Self, DbError> {
        if columns.is_empty() {
            return Err(DbError::Write(format!(
                "no columns configured for table `{table}`"
            )));
        }
        let client = connect_client(url).await?;
        let insert_sql = build_insert(table, columns);
        debug!(table, sql = %insert_sql, "Connected Postgres sink");
        Ok(PgRecordSink {
            client,
            table: table.to_string(),
            columns: columns.to_vec(),
            insert_sql,
        })
    }

    async fn insert_chunk(&mut self, records: &[Record]) -> Result<(), DbError> {
        let tx = self.client.transaction().await?;
        for record in records {
            let values = record.values();
            if values.len() != self.columns.len() {
                return Err(DbError::Write(format!(
                    "record {record} has {} fields, table `{}` expects {}",
                    values.len(),
                    self.table,
                    self.columns.len()
                )));
            }
            let bindings = PgParamStore::from_values(values);
            tx.execute(self.insert_sql.as_str(), &bindings.as_refs())
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl RecordSink for PgRecordSink {
    async fn write_chunk(&mut self, records: &[Record]) -> Result<(), SinkError> {
        self.insert_chunk(records).await.map_err(SinkError::from)?;
        debug!(table = %self.table, rows = records.len(), "Chunk committed");
        Ok(())
    }
}

fn build_insert(table: &str, columns: &[String]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    )
}
