use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "dbds.cfg";
pub const SCRIPTS_DIR_NAME: &str = "dbds_scripts";

/// Process exit statuses, one per error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodes {
	pub general: u8,
	pub command_not_found: u8,
	pub command_line: u8,
	pub data_format: u8,
	pub system: u8,
}

impl ExitCodes {
	pub const DEFAULT: ExitCodes = ExitCodes {
		general: 1,
		command_not_found: 27,
		command_line: 64,
		data_format: 65,
		system: 71,
	};
}

impl Default for ExitCodes {
	fn default() -> Self {
		Self::DEFAULT
	}
}

/// Where the config file and scripts live, plus the exit codes the
/// dispatcher reports. Built once in `main` and passed down by reference.
#[derive(Debug, Clone)]
pub struct Settings {
	config_path: PathBuf,
	scripts_dir: PathBuf,
	exit_codes: ExitCodes,
}

impl Settings {
	/// Fixed names resolved against `root`.
	pub fn in_dir(root: &Path) -> Self {
		Self {
			config_path: root.join(CONFIG_FILE_NAME),
			scripts_dir: root.join(SCRIPTS_DIR_NAME),
			exit_codes: ExitCodes::DEFAULT,
		}
	}

	pub fn config_path(&self) -> &Path {
		&self.config_path
	}

	pub fn scripts_dir(&self) -> &Path {
		&self.scripts_dir
	}

	pub fn exit_codes(&self) -> &ExitCodes {
		&self.exit_codes
	}
}

impl Default for Settings {
	/// Relative to the current working directory.
	fn default() -> Self {
		Self::in_dir(Path::new(""))
	}
}
