// src/cli/mod.rs
//! CLI definitions for srctrack
//!
//! The command implementations live in the `commands` module.
//!
//! - `install` - Build and install a source archive, tracking its files
//! - `list` / `show` / `detect` - Inspect an archive without building it
//! - `packages` / `files` / `owner` - Query the package store
//! - `completions` - Shell completion scripts

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "srctrack")]
#[command(version)]
#[command(about = "Build and install source tarballs with file tracking", long_about = None)]
pub struct Cli {
    /// Path to the database file (default: $SRCTRACK_DB or the user data dir)
    #[arg(short, long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the package database
    Init,

    /// Build and install a .tar.gz source archive
    Install {
        /// Path to the source archive
        archive: PathBuf,

        /// Directory for extraction and staging (default: $SRCTRACK_WORK_DIR
        /// or the system temp dir)
        #[arg(short, long)]
        work_dir: Option<PathBuf>,

        /// Build and install without recording files in the database
        #[arg(long)]
        no_track: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the members of a source archive
    List {
        /// Path to the source archive
        archive: PathBuf,
    },

    /// Print one member of a source archive
    Show {
        /// Path to the source archive
        archive: PathBuf,

        /// Member name as shown by `list`
        member: String,
    },

    /// Detect the build system of a source archive
    Detect {
        /// Path to the source archive
        archive: PathBuf,
    },

    /// List tracked packages
    Packages {
        /// Only packages with this name
        name: Option<String>,
    },

    /// List files installed by a package
    Files {
        /// Package ID as shown by `packages`
        package_id: i64,
    },

    /// Find the packages that installed a path
    Owner {
        /// Absolute path
        path: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
