use std::{
	fs,
	io::{self, BufRead, Write},
	path::Path,
};

use tracing::debug;

use crate::config::{DbConfig, write_config};
use crate::core::display;
use crate::error::{DbdsError, Result};
use crate::scripts::Script;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
	Confirmed,
	Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
	Scaffolded,
	/// An existing config was found and the user chose to keep it.
	Declined,
}

/// Asks until the answer is `y` or `n`.
pub fn confirm_overwrite<R: BufRead, W: Write>(
	mut input: R,
	mut output: W,
	config_path: &Path,
	scripts_dir: &Path,
) -> Result<Confirmation> {
	let mut line = String::new();
	loop {
		writeln!(
			output,
			"Configuration file '{}' already exists.",
			display(config_path)
		)
		.map_err(stdout_err)?;
		writeln!(
			output,
			"Force delete existing dbds config and sql scripts under {}? (y/n)",
			display(scripts_dir)
		)
		.map_err(stdout_err)?;
		output.flush().map_err(stdout_err)?;

		line.clear();
		let read = input.read_line(&mut line).map_err(DbdsError::PromptInput)?;
		if read == 0 {
			return Err(DbdsError::PromptInput(io::Error::new(
				io::ErrorKind::UnexpectedEof,
				"end of input",
			)));
		}

		match line.trim().to_lowercase().as_str() {
			"y" => return Ok(Confirmation::Confirmed),
			"n" => return Ok(Confirmation::Declined),
			_ => writeln!(output, "Invalid input. Please enter 'y' or 'n'.").map_err(stdout_err)?,
		}
	}
}

pub fn initialize<R: BufRead, W: Write>(
	settings: &Settings,
	input: R,
	mut output: W,
) -> Result<InitOutcome> {
	let config_path = settings.config_path();
	let scripts_dir = settings.scripts_dir();

	if config_path.exists() {
		match confirm_overwrite(input, &mut output, config_path, scripts_dir)? {
			Confirmation::Declined => {
				writeln!(output, "dbds terminated").map_err(stdout_err)?;
				return Ok(InitOutcome::Declined);
			}
			Confirmation::Confirmed => {
				for script in Script::ORDER {
					remove_if_exists(&script.path_in(scripts_dir))?;
				}
			}
		}
	}

	fs::create_dir_all(scripts_dir).map_err(|e| {
		DbdsError::io(
			format!("Error creating directory {}", display(scripts_dir)),
			e,
		)
	})?;

	for script in Script::ORDER {
		write_script(&script.path_in(scripts_dir), script.placeholder(), &mut output)?;
	}

	write_config(config_path, &DbConfig::new("", ""))?;
	writeln!(output, "Config file '{}' created.", display(config_path)).map_err(stdout_err)?;
	writeln!(
		output,
		"Please fill out the required information to the configuration file and the sql scripts."
	)
	.map_err(stdout_err)?;

	Ok(InitOutcome::Scaffolded)
}

fn write_script<W: Write>(path: &Path, text: &str, output: &mut W) -> Result<()> {
	let mut file = fs::File::create(path)
		.map_err(|e| DbdsError::io(format!("Error creating file {}", display(path)), e))?;
	writeln!(output, "Sql file '{}' created", display(path)).map_err(stdout_err)?;

	file.write_all(text.as_bytes())
		.map_err(|e| DbdsError::io(format!("Error writing to file {}", display(path)), e))?;
	writeln!(output, "Text written to file '{text}'").map_err(stdout_err)?;
	Ok(())
}

fn remove_if_exists(path: &Path) -> Result<()> {
	match fs::remove_file(path) {
		Ok(()) => {
			debug!(path = %path.display(), "removed script");
			Ok(())
		}
		Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
		Err(e) => Err(DbdsError::io(
			format!("Failed to delete file {}", display(path)),
			e,
		)),
	}
}

fn stdout_err(e: io::Error) -> DbdsError {
	DbdsError::io("Error writing to stdout", e)
}
