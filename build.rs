// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Archive path argument shared by the inspection commands
fn archive_arg() -> Arg {
    Arg::new("archive")
        .required(true)
        .value_name("ARCHIVE")
        .help("Path to the .tar.gz source archive")
}

fn build_cli() -> Command {
    Command::new("srctrack")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build and install source tarballs with file tracking")
        .subcommand_required(true)
        .arg(
            Arg::new("db_path")
                .short('d')
                .long("db-path")
                .value_name("PATH")
                .global(true)
                .help("Database path (default: $SRCTRACK_DB or the user data dir)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(clap::ArgAction::SetTrue)
                .help("Show debug output"),
        )
        .subcommand(Command::new("init").about("Initialize the package database"))
        .subcommand(
            Command::new("install")
                .about("Build and install a .tar.gz source archive")
                .arg(archive_arg())
                .arg(
                    Arg::new("work_dir")
                        .short('w')
                        .long("work-dir")
                        .value_name("DIR")
                        .help("Directory for extraction and staging"),
                )
                .arg(
                    Arg::new("no_track")
                        .long("no-track")
                        .action(clap::ArgAction::SetTrue)
                        .help("Build and install without recording files in the database"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(clap::ArgAction::SetTrue)
                        .help("Print the result as JSON"),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List the members of a source archive")
                .arg(archive_arg()),
        )
        .subcommand(
            Command::new("show")
                .about("Print one member of a source archive")
                .arg(archive_arg())
                .arg(Arg::new("member").required(true).help("Member name as shown by list")),
        )
        .subcommand(
            Command::new("detect")
                .about("Detect the build system of a source archive")
                .arg(archive_arg()),
        )
        .subcommand(
            Command::new("packages")
                .about("List tracked packages")
                .arg(Arg::new("name").help("Only packages with this name")),
        )
        .subcommand(
            Command::new("files")
                .about("List files installed by a package")
                .arg(Arg::new("package_id").required(true).help("Package ID")),
        )
        .subcommand(
            Command::new("owner")
                .about("Find the packages that installed a path")
                .arg(Arg::new("path").required(true).help("Absolute path")),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("srctrack.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
