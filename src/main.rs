use std::{
	ffi::OsString,
	io::{self, Write},
	process::ExitCode,
};

use clap::{CommandFactory, Parser, Subcommand, error::ErrorKind};
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;
mod core;
mod error;
mod rebuild;
mod scaffold;
mod scripts;
mod settings;

use crate::config::{DbConfig, DbType, read_config};
use crate::core::{BatchExecutor, connect};
use crate::error::{DbdsError, Result};
use crate::rebuild::rebuild;
use crate::scaffold::initialize;
use crate::settings::Settings;

#[derive(Parser, Debug)]
#[command(
	name = "dbds",
	about = "Scaffold SQL scripts and rebuild a database from them",
	disable_help_subcommand = true,
	disable_help_flag = true,
	disable_version_flag = true
)]
pub struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
	/// Initialize new configuration and create base sql scripts
	Init,
	/// Drop, create, index and populate the database from the sql scripts
	Rebuild,
}

fn init_tracing() {
	tracing_subscriber::registry()
		.with(fmt::layer().with_writer(io::stderr).with_target(false))
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.init();
}

fn parse_args<I, T>(args: I) -> Result<Commands>
where
	I: IntoIterator<Item = T>,
	T: Into<OsString> + Clone,
{
	let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
	let first = args.get(1).map(|arg| arg.to_string_lossy().into_owned());

	match Cli::try_parse_from(&args) {
		Ok(cli) => Ok(cli.command),
		Err(err) => match err.kind() {
			ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
				Err(DbdsError::Usage)
			}
			// Whatever sits where the command belongs, flags included.
			ErrorKind::InvalidSubcommand | ErrorKind::UnknownArgument
				if first.as_deref().is_some_and(|name| !is_command(name)) =>
			{
				Err(DbdsError::UnknownCommand(first.unwrap_or_default()))
			}
			_ => Err(DbdsError::CommandLine(err.render().to_string())),
		},
	}
}

fn is_command(name: &str) -> bool {
	Cli::command().find_subcommand(name).is_some()
}

async fn run(settings: &Settings, command: Commands) -> Result<()> {
	match command {
		Commands::Init => {
			let outcome = initialize(settings, io::stdin().lock(), io::stdout())?;
			debug!(?outcome, "init finished");
		}
		Commands::Rebuild => {
			run_rebuild(
				settings,
				|cfg, engine| async move { connect(&cfg, engine).await },
				io::stdout(),
			)
			.await?;
		}
	}
	Ok(())
}

/// Validates the config, and only then opens a connection through
/// `connector` and runs the scripts.
async fn run_rebuild<C, F, E, W>(settings: &Settings, connector: C, mut output: W) -> Result<()>
where
	C: FnOnce(DbConfig, DbType) -> F,
	F: Future<Output = anyhow::Result<E>>,
	E: BatchExecutor,
	W: Write,
{
	let cfg = read_config(settings.config_path())?;
	let engine = cfg.engine()?;
	debug!(db_type = cfg.db_type(), "config loaded");

	let mut db = connector(cfg, engine).await.map_err(DbdsError::Connect)?;
	rebuild(&mut db, settings.scripts_dir(), &mut output).await?;
	if let Err(e) = db.finish().await {
		warn!(error = %e, "closing connection failed");
	}

	writeln!(output, "dbds rebuild completed")
		.map_err(|e| DbdsError::io("Error writing to stdout", e))?;
	Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
	init_tracing();
	let settings = Settings::default();

	let result = match parse_args(std::env::args_os()) {
		Ok(command) => run(&settings, command).await,
		Err(err) => Err(err),
	};

	match result {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			if err.is_fatal() {
				eprintln!("fatal: {err}");
			} else {
				println!("{err}");
			}
			ExitCode::from(err.exit_code(settings.exit_codes()))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn known_commands_parse() {
		assert_eq!(parse_args(["dbds", "init"]).unwrap(), Commands::Init);
		assert_eq!(parse_args(["dbds", "rebuild"]).unwrap(), Commands::Rebuild);
	}

	#[test]
	fn no_command_prints_usage() {
		let err = parse_args(["dbds"]).unwrap_err();
		assert!(matches!(err, DbdsError::Usage));
		assert!(err.to_string().starts_with("dbds usage:"));
		assert_eq!(err.exit_code(&settings::ExitCodes::DEFAULT), 1);
	}

	#[test]
	fn unknown_command_is_named() {
		let err = parse_args(["dbds", "seed"]).unwrap_err();
		assert_eq!(err.to_string(), "Unknown command: seed");
		assert_eq!(err.exit_code(&settings::ExitCodes::DEFAULT), 27);
	}

	#[test]
	fn extra_arguments_are_usage_errors() {
		let err = parse_args(["dbds", "init", "now"]).unwrap_err();
		assert!(matches!(err, DbdsError::CommandLine(_)));
		assert_eq!(err.exit_code(&settings::ExitCodes::DEFAULT), 64);
	}

	#[test]
	fn flag_in_command_position_is_unknown_command() {
		let err = parse_args(["dbds", "--force"]).unwrap_err();
		assert_eq!(err.to_string(), "Unknown command: --force");
		assert_eq!(err.exit_code(&settings::ExitCodes::DEFAULT), 27);

		for arg in ["-h", "--help", "-V", "--version"] {
			let err = parse_args(["dbds", arg]).unwrap_err();
			assert!(matches!(err, DbdsError::UnknownCommand(ref name) if name == arg));
		}
	}

	#[test]
	fn help_is_not_a_command() {
		let err = parse_args(["dbds", "help"]).unwrap_err();
		assert_eq!(err.to_string(), "Unknown command: help");
		assert_eq!(err.exit_code(&settings::ExitCodes::DEFAULT), 27);
	}

	#[test]
	fn flag_after_command_is_a_usage_error() {
		let err = parse_args(["dbds", "rebuild", "--force"]).unwrap_err();
		assert!(matches!(err, DbdsError::CommandLine(_)));
		assert_eq!(err.exit_code(&settings::ExitCodes::DEFAULT), 64);
	}

	mod rebuild_command {
		use super::*;
		use crate::scripts::Script;
		use std::{cell::Cell, fs, future::ready};
		use tempfile::TempDir;

		#[derive(Default)]
		struct Recorder {
			batches: Vec<String>,
		}

		impl BatchExecutor for Recorder {
			async fn execute_batch(&mut self, sql: &str) -> anyhow::Result<()> {
				self.batches.push(sql.to_string());
				Ok(())
			}
		}

		fn project(config: &str) -> (TempDir, Settings) {
			let dir = TempDir::new().unwrap();
			let settings = Settings::in_dir(dir.path());
			fs::create_dir(settings.scripts_dir()).unwrap();
			for script in Script::ORDER {
				fs::write(script.path_in(settings.scripts_dir()), script.placeholder()).unwrap();
			}
			fs::write(settings.config_path(), config).unwrap();
			(dir, settings)
		}

		#[tokio::test]
		async fn unsupported_engine_never_connects() {
			let (_dir, settings) = project("connectionString:\"mysql://localhost/app\"\ndbType:\"mysql\"\n");
			let connected = Cell::new(false);

			let err = run_rebuild(
				&settings,
				|_, _| {
					connected.set(true);
					ready(Ok(Recorder::default()))
				},
				io::sink(),
			)
			.await
			.unwrap_err();

			assert!(matches!(err, DbdsError::UnsupportedDbType(ref t) if t == "mysql"));
			assert_eq!(err.exit_code(settings.exit_codes()), 1);
			assert!(!connected.get());
		}

		#[tokio::test]
		async fn invalid_config_never_connects() {
			let (_dir, settings) = project("connectionString:\"postgres://localhost/app\"\n");
			let connected = Cell::new(false);

			let err = run_rebuild(
				&settings,
				|_, _| {
					connected.set(true);
					ready(Ok(Recorder::default()))
				},
				io::sink(),
			)
			.await
			.unwrap_err();

			assert!(matches!(err, DbdsError::MissingConfigValue { field: "dbType" }));
			assert!(!connected.get());
		}

		#[tokio::test]
		async fn valid_config_connects_and_runs_all_scripts() {
			let (_dir, settings) = project("connectionString:\"postgres://localhost/app\"\ndbType:\"postgres\"\n");
			let mut out = Vec::new();

			run_rebuild(
				&settings,
				|cfg, engine| {
					assert_eq!(cfg.connection_string(), "postgres://localhost/app");
					assert_eq!(engine, DbType::Postgres);
					ready(Ok(Recorder::default()))
				},
				&mut out,
			)
			.await
			.unwrap();

			assert_eq!(
				String::from_utf8(out).unwrap(),
				"Tables dropped\nTables created\nIndexes created\nTables populated\ndbds rebuild completed\n"
			);
		}

		#[tokio::test]
		async fn connection_failure_is_fatal() {
			let (_dir, settings) = project("connectionString:\"postgres://localhost/app\"\ndbType:\"postgres\"\n");

			let err = run_rebuild(
				&settings,
				|_, _| ready(Err::<Recorder, _>(anyhow::anyhow!("connection refused"))),
				io::sink(),
			)
			.await
			.unwrap_err();

			assert!(err.is_fatal());
			assert!(err.to_string().contains("connection refused"));
		}
	}
}
