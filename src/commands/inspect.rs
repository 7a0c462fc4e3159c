// src/commands/inspect.rs

//! Archive inspection commands

use anyhow::{Context, Result};
use srctrack::archive::{self, MemberContent};
use srctrack::buildsys;
use std::path::Path;

/// List archive members
pub fn cmd_list(archive_path: &Path) -> Result<()> {
    let members = archive::list(archive_path)
        .with_context(|| format!("Failed to read archive: {}", archive_path.display()))?;

    for member in &members {
        if member.is_dir {
            println!("  {}/", member.name.trim_end_matches('/'));
        } else {
            println!("  {} ({} bytes)", member.name, member.size);
        }
    }
    println!("\nTotal: {} member(s)", members.len());
    Ok(())
}

/// Print one archive member
pub fn cmd_show(archive_path: &Path, member: &str) -> Result<()> {
    let content = archive::read_member(archive_path, member)
        .with_context(|| format!("Failed to read {} from {}", member, archive_path.display()))?;

    match content {
        MemberContent::Text(text) => print!("{}", text),
        MemberContent::Directory => println!("{} is a directory", member),
        MemberContent::Binary => println!("{} is not a text file", member),
    }
    Ok(())
}

/// Extract an archive and report its build system
pub fn cmd_detect(archive_path: &Path) -> Result<()> {
    let extracted = archive::extract(archive_path)
        .with_context(|| format!("Failed to extract archive: {}", archive_path.display()))?;

    match buildsys::detect(extracted.root()) {
        Some(build_system) => {
            println!("Build system: {}", build_system);
            for command in build_system.commands() {
                println!("  [{:?}] {}", command.role, command);
            }
        }
        None => println!("No known build system detected"),
    }
    Ok(())
}
