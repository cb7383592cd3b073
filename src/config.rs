use std::{
	fs::{self, File},
	io::{BufRead, BufReader, ErrorKind},
	path::Path,
};

use tracing::debug;

use crate::core::display;
use crate::error::{DbdsError, Result};

const CONNECTION_STRING_KEY: &str = "connectionString";
const DB_TYPE_KEY: &str = "dbType";

/// Connection settings read from `dbds.cfg`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbConfig {
	connection_string: String,
	db_type: String,
}

/// Database engines `rebuild` knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbType {
	Postgres,
}

impl DbConfig {
	pub fn new(connection_string: impl Into<String>, db_type: impl Into<String>) -> Self {
		Self {
			connection_string: connection_string.into(),
			db_type: db_type.into(),
		}
	}

	pub fn connection_string(&self) -> &str {
		&self.connection_string
	}

	pub fn db_type(&self) -> &str {
		&self.db_type
	}

	pub fn engine(&self) -> Result<DbType> {
		match self.db_type.as_str() {
			"postgres" => Ok(DbType::Postgres),
			other => Err(DbdsError::UnsupportedDbType(other.to_string())),
		}
	}

	fn render(&self) -> String {
		format!(
			"{CONNECTION_STRING_KEY}:\"{}\"\n{DB_TYPE_KEY}:\"{}\"\n",
			self.connection_string, self.db_type
		)
	}
}

/// Writes the config through a sibling temp file so a failed write never
/// leaves a truncated `dbds.cfg` behind.
pub fn write_config(path: &Path, cfg: &DbConfig) -> Result<()> {
	let tmp = path.with_extension("cfg.tmp");
	fs::write(&tmp, cfg.render())
		.map_err(|e| DbdsError::io(format!("Error writing to file {}", display(&tmp)), e))?;

	if let Err(e) = fs::rename(&tmp, path) {
		let _ = fs::remove_file(&tmp);
		return Err(DbdsError::io(
			format!("Error creating file {}", display(path)),
			e,
		));
	}
	Ok(())
}

pub fn read_config(path: &Path) -> Result<DbConfig> {
	debug!(path = %path.display(), "reading config");
	let file = File::open(path)
		.map_err(|e| DbdsError::io(format!("Error opening file {}", display(path)), e))?;

	let mut cfg = DbConfig::default();
	for line in BufReader::new(file).lines() {
		let line = line.map_err(|e| match e.kind() {
			ErrorKind::InvalidData => DbdsError::InvalidConfigEncoding {
				path: path.to_path_buf(),
			},
			_ => DbdsError::io("Error reading file", e),
		})?;
		apply_line(&mut cfg, &line)?;
	}

	if cfg.connection_string.is_empty() {
		return Err(DbdsError::MissingConfigValue {
			field: CONNECTION_STRING_KEY,
		});
	}
	if cfg.db_type.is_empty() {
		return Err(DbdsError::MissingConfigValue { field: DB_TYPE_KEY });
	}
	Ok(cfg)
}

fn apply_line(cfg: &mut DbConfig, line: &str) -> Result<()> {
	let (key, value) = line.split_once(':').unwrap_or((line, ""));
	match key {
		CONNECTION_STRING_KEY => cfg.connection_string = unquote(value).to_string(),
		DB_TYPE_KEY => cfg.db_type = unquote(value).to_string(),
		_ if line.trim().is_empty() => {}
		_ if !line.contains(':') => {
			return Err(DbdsError::InvalidConfigFormat {
				line: line.to_string(),
			});
		}
		_ => {
			return Err(DbdsError::UnknownConfigKey {
				key: key.to_string(),
			});
		}
	}
	Ok(())
}

fn unquote(value: &str) -> &str {
	value
		.strip_prefix('"')
		.and_then(|v| v.strip_suffix('"'))
		.unwrap_or(value)
}
