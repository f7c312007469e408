// src/main.rs

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let global = commands::GlobalOptions {
        config: cli.config,
        digest_algorithm: cli.digest_algorithm,
    };

    match cli.command {
        Commands::ImportMd {
            xml,
            workspace,
            path,
            directory,
            stream,
            mdtype,
            mdtype_version,
            othermdtype,
            section,
            technical,
            ref_file,
            stdout,
        } => commands::cmd_import_md(
            commands::ImportArgs {
                xml,
                workspace,
                path,
                directory,
                stream,
                mdtype,
                mdtype_version,
                othermdtype,
                section,
                technical,
                ref_file,
                stdout,
            },
            &global,
        ),
        Commands::AddReference {
            md_id,
            workspace,
            path,
            directory,
            stream,
            ref_file,
        } => commands::cmd_add_reference(
            &md_id,
            &workspace,
            path.as_deref(),
            directory.as_deref(),
            stream,
            &ref_file,
            &global,
        ),
        Commands::Refs {
            workspace,
            ref_file,
            path,
            stream,
            directory,
        } => commands::cmd_refs(
            &workspace,
            &ref_file,
            path.as_deref(),
            stream,
            directory.as_deref(),
            &global,
        ),
        Commands::Objects {
            workspace,
            ref_file,
            path,
        } => commands::cmd_objects(&workspace, &ref_file, path.as_deref(), &global),
        Commands::RemoveRefs {
            workspace,
            ref_file,
        } => commands::cmd_remove_refs(&workspace, &ref_file),
        Commands::Clean { workspace } => commands::cmd_clean(&workspace, &global),
    }
}
