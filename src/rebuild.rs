use std::{fs, io::Write, path::Path};

use tracing::info;

use crate::core::BatchExecutor;
use crate::error::{DbdsError, Result};
use crate::scripts::locate_all;

/// Runs drop, create, index and populate scripts in that order, each as one
/// batch. Every script must exist before the first one runs. The first
/// failure stops the run and nothing already applied is undone.
pub async fn rebuild<E, W>(db: &mut E, scripts_dir: &Path, mut output: W) -> Result<()>
where
	E: BatchExecutor,
	W: Write,
{
	let scripts = locate_all(scripts_dir)?;

	for (script, path) in scripts {
		let sql = fs::read_to_string(&path).map_err(|source| DbdsError::ScriptRead {
			path: path.clone(),
			source,
		})?;
		info!(script = %path.display(), bytes = sql.len(), "executing script");

		db.execute_batch(&sql)
			.await
			.map_err(|source| DbdsError::Execution { path, source })?;

		writeln!(output, "{}", script.done_message())
			.map_err(|e| DbdsError::io("Error writing to stdout", e))?;
	}

	Ok(())
}
