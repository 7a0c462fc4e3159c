// src/commands/mod.rs
//! Command handlers for the srctrack CLI

mod inspect;
mod install;
mod query;

pub use inspect::{cmd_detect, cmd_list, cmd_show};
pub use install::{cmd_init, cmd_install};
pub use query::{cmd_files, cmd_owner, cmd_packages};
