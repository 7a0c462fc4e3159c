// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use std::path::PathBuf;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_db_path(db_path: Option<PathBuf>) -> PathBuf {
    db_path.unwrap_or_else(srctrack::db::paths::default_db_path)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let db_path = resolve_db_path(cli.db_path);

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path),
        Commands::Install {
            archive,
            work_dir,
            no_track,
            json,
        } => {
            let succeeded = commands::cmd_install(&archive, &db_path, work_dir, no_track, json)?;
            if !succeeded {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::List { archive } => commands::cmd_list(&archive),
        Commands::Show { archive, member } => commands::cmd_show(&archive, &member),
        Commands::Detect { archive } => commands::cmd_detect(&archive),
        Commands::Packages { name } => commands::cmd_packages(&db_path, name.as_deref()),
        Commands::Files { package_id } => commands::cmd_files(&db_path, package_id),
        Commands::Owner { path } => commands::cmd_owner(&db_path, &path),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "srctrack", &mut std::io::stdout());
            Ok(())
        }
    }
}
