use crate::error::CliError;
use tokio_postgres::NoTls;
use tracing::{error, info};

pub struct PostgresConnectionPinger {
    pub conn_str: String,
}

impl PostgresConnectionPinger {
    pub async fn ping(&self) -> Result<(), CliError> {
        let (client, connection) = tokio_postgres::connect(&self.conn_str, NoTls).await?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                error!(%err, "Postgres connection error");
            }
        });
        client.simple_query("SELECT 1").await?;
        info!("Postgres connection OK");
        Ok(())
    }
}
