use std::path::{Path, PathBuf};

use crate::error::{DbdsError, Result};

/// The four scripts a rebuild runs, in the only order they may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
	Drop,
	Create,
	Indexes,
	Populate,
}

impl Script {
	pub const ORDER: [Script; 4] = [
		Script::Drop,
		Script::Create,
		Script::Indexes,
		Script::Populate,
	];

	pub fn file_name(self) -> &'static str {
		match self {
			Script::Drop => "schemas_drop.sql",
			Script::Create => "schemas_create.sql",
			Script::Indexes => "schemas_indexes.sql",
			Script::Populate => "schemas_populate.sql",
		}
	}

	pub fn placeholder(self) -> &'static str {
		match self {
			Script::Drop => "-- Insert your 'DROP TABLE' statements here",
			Script::Create => "-- Insert your 'CREATE TABLE' statements here",
			Script::Indexes => "-- Insert your 'CREATE INDEX' statements here",
			Script::Populate => "-- Insert your 'INSERT INTO' statements here",
		}
	}

	/// Printed once the script has been executed.
	pub fn done_message(self) -> &'static str {
		match self {
			Script::Drop => "Tables dropped",
			Script::Create => "Tables created",
			Script::Indexes => "Indexes created",
			Script::Populate => "Tables populated",
		}
	}

	pub fn path_in(self, scripts_dir: &Path) -> PathBuf {
		scripts_dir.join(self.file_name())
	}
}

pub fn locate(scripts_dir: &Path, script: Script) -> Result<PathBuf> {
	let path = script.path_in(scripts_dir);
	if !path.exists() {
		return Err(DbdsError::MissingScript(path));
	}
	Ok(path)
}

/// Every script resolved to an existing path, in run order.
pub fn locate_all(scripts_dir: &Path) -> Result<Vec<(Script, PathBuf)>> {
	Script::ORDER
		.iter()
		.map(|&script| locate(scripts_dir, script).map(|path| (script, path)))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	fn touch_all_but(dir: &Path, skip: Option<Script>) {
		for script in Script::ORDER {
			if Some(script) != skip {
				fs::write(script.path_in(dir), "").unwrap();
			}
		}
	}

	#[test]
	fn locate_all_keeps_run_order() {
		let dir = TempDir::new().unwrap();
		touch_all_but(dir.path(), None);

		let located: Vec<Script> = locate_all(dir.path())
			.unwrap()
			.into_iter()
			.map(|(s, _)| s)
			.collect();
		assert_eq!(located, Script::ORDER);
	}

	#[test]
	fn first_missing_script_is_reported() {
		let dir = TempDir::new().unwrap();
		touch_all_but(dir.path(), Some(Script::Create));

		match locate_all(dir.path()) {
			Err(DbdsError::MissingScript(path)) => {
				assert_eq!(path, dir.path().join("schemas_create.sql"))
			}
			other => panic!("expected missing script, got {other:?}"),
		}
	}

	#[test]
	fn drop_script_is_reported_before_later_ones() {
		let dir = TempDir::new().unwrap();

		let err = locate_all(dir.path()).unwrap_err();
		assert_eq!(
			err.to_string(),
			format!(
				"Could not find script from path: {}",
				dir.path().join("schemas_drop.sql").display()
			)
		);
	}
}
