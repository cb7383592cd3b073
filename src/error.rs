use std::{io, path::PathBuf};

use thiserror::Error;

use crate::settings::ExitCodes;

pub type Result<T, E = DbdsError> = std::result::Result<T, E>;

pub const USAGE: &str = "dbds usage:
[dbds init]    -> Initialize new configuration and create base sql scripts. Fill the required data in them.
[dbds rebuild] -> Start database seed with existing config and sql scripts.";

#[derive(Debug, Error)]
pub enum DbdsError {
	#[error("{}", USAGE)]
	Usage,

	#[error("Unknown command: {0}")]
	UnknownCommand(String),

	#[error("{0}")]
	CommandLine(String),

	#[error("Invalid config format. Use key:\"value\". (From line: '{line}')")]
	InvalidConfigFormat { line: String },

	#[error("Invalid config format. {} is not valid UTF-8.", .path.display())]
	InvalidConfigEncoding { path: PathBuf },

	#[error("Invalid config key '{key}' found.")]
	UnknownConfigKey { key: String },

	#[error("Did not find configuration value for '{field}'.")]
	MissingConfigValue { field: &'static str },

	#[error("Found config dbType: '{0}'. However, postgres is the only supported type.")]
	UnsupportedDbType(String),

	#[error("{context}: {source}")]
	Io {
		context: String,
		#[source]
		source: io::Error,
	},

	#[error("Error reading input: {0}")]
	PromptInput(#[source] io::Error),

	#[error("Could not find script from path: {}", .0.display())]
	MissingScript(PathBuf),

	#[error("reading {}: {source}", .path.display())]
	ScriptRead {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("executing {}: {source:#}", .path.display())]
	Execution { path: PathBuf, source: anyhow::Error },

	#[error("{0:#}")]
	Connect(anyhow::Error),
}

impl DbdsError {
	pub fn io(context: impl Into<String>, source: io::Error) -> Self {
		Self::Io {
			context: context.into(),
			source,
		}
	}

	/// Failures that abort the run outright rather than mapping to a
	/// dedicated exit status.
	pub fn is_fatal(&self) -> bool {
		matches!(
			self,
			Self::ScriptRead { .. } | Self::Execution { .. } | Self::Connect(_)
		)
	}

	pub fn exit_code(&self, codes: &ExitCodes) -> u8 {
		match self {
			Self::Usage
			| Self::UnsupportedDbType(_)
			| Self::PromptInput(_)
			| Self::MissingScript(_)
			| Self::ScriptRead { .. }
			| Self::Execution { .. }
			| Self::Connect(_) => codes.general,
			Self::UnknownCommand(_) => codes.command_not_found,
			Self::CommandLine(_) => codes.command_line,
			Self::InvalidConfigFormat { .. }
			| Self::InvalidConfigEncoding { .. }
			| Self::UnknownConfigKey { .. }
			| Self::MissingConfigValue { .. } => codes.data_format,
			Self::Io { .. } => codes.system,
		}
	}
}
