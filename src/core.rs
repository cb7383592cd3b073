use std::path::Path;

use anyhow::Context;
use sqlx::{Connection, PgConnection};
use tracing::debug;

use crate::config::{DbConfig, DbType};

/// Something that can run one SQL script as a single batch.
#[allow(async_fn_in_trait)]
pub trait BatchExecutor {
	async fn execute_batch(&mut self, sql: &str) -> anyhow::Result<()>;

	/// Releases the underlying connection once the run is over.
	async fn finish(self) -> anyhow::Result<()>
	where
		Self: Sized,
	{
		Ok(())
	}
}

impl BatchExecutor for PgConnection {
	async fn execute_batch(&mut self, sql: &str) -> anyhow::Result<()> {
		// Simple query protocol, so one script may hold many statements.
		sqlx::raw_sql(sql).execute(&mut *self).await?;
		Ok(())
	}

	async fn finish(self) -> anyhow::Result<()> {
		Connection::close(self).await?;
		Ok(())
	}
}

pub async fn connect(cfg: &DbConfig, engine: DbType) -> anyhow::Result<PgConnection> {
	match engine {
		DbType::Postgres => {
			debug!("opening postgres connection");
			PgConnection::connect(cfg.connection_string())
				.await
				.context("Failed connecting to postgres")
		}
	}
}

pub fn display(p: &Path) -> String {
	p.to_string_lossy().into_owned()
}
