// src/commands/query.rs
//! Package store queries

use anyhow::{Context, Result};
use srctrack::PackageStore;
use srctrack::db::models::Package;
use std::path::Path;

fn open_store(db_path: &Path) -> Result<PackageStore> {
    PackageStore::open(db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))
}

fn print_packages(packages: &[Package]) {
    for package in packages {
        let id = package
            .id
            .map(|i| i.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "  [{}] {} {} (installed {})",
            id,
            package.name,
            package.version,
            package.install_timestamp.as_deref().unwrap_or("unknown")
        );
    }
}

/// List tracked packages, optionally only those named `name`
pub fn cmd_packages(db_path: &Path, name: Option<&str>) -> Result<()> {
    let store = open_store(db_path)?;
    let packages = match name {
        Some(name) => store.find_by_name(name)?,
        None => store.list_packages()?,
    };

    if packages.is_empty() {
        println!("No packages found.");
    } else {
        println!("Tracked packages:");
        print_packages(&packages);
        println!("\nTotal: {} package(s)", packages.len());
    }
    Ok(())
}

/// List the files a package installed
pub fn cmd_files(db_path: &Path, package_id: i64) -> Result<()> {
    let store = open_store(db_path)?;
    let package = store
        .get_package(package_id)?
        .with_context(|| format!("Package {} not found", package_id))?;

    let mut files: Vec<String> = store.files_for(package_id)?.into_iter().collect();
    files.sort();

    println!("{} {}:", package.name, package.version);
    for file in &files {
        println!("  {}", file);
    }
    println!("\nTotal: {} file(s)", files.len());
    Ok(())
}

/// Show which packages installed `path`
pub fn cmd_owner(db_path: &Path, path: &str) -> Result<()> {
    let store = open_store(db_path)?;
    let owners = store.owners_of(path)?;

    if owners.is_empty() {
        println!("{} is not owned by any tracked package", path);
    } else {
        println!("{} is owned by:", path);
        print_packages(&owners);
    }
    Ok(())
}
