// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanshelf: scan-to-file document library
//
// Entry point. Initialises logging and backend services, then runs one
// command against the application state.

mod cli;
mod services;
mod state;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::UNIX_EPOCH;

use clap::Parser;
use scanshelf_core::error::{Result, ScanshelfError};
use scanshelf_core::human_errors::humanize_error;
use scanshelf_core::time::format_timestamp;
use scanshelf_core::types::{DocumentFormat, Locator, OutputDocument, ScannedDocument};
use scanshelf_library::AssemblyInput;

use cli::{Cli, Commands};
use services::app_services::AppServices;
use state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("Scanshelf starting");

    let services = AppServices::init();
    tracing::debug!(data_dir = %services.data_dir().display(), "services ready");
    let mut state = AppState::new();

    match run(cli.command, &services, &mut state).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = %err, "command failed");
            let human = humanize_error(&err);
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, services: &AppServices, state: &mut AppState) -> Result<()> {
    match command {
        Commands::List { query } => {
            state.set_documents(services.library().list_all().await);
            if let Some(query) = query {
                state.search(&query);
            }
            for doc in &state.filtered {
                println!(
                    "{}\t{}\t{}",
                    doc.display_name,
                    doc.format,
                    format_timestamp(doc.last_modified)
                );
            }
            Ok(())
        }

        Commands::Preview { path } => {
            let document = document_at(&path)?;
            let pages = services.library().render(document.clone()).await;
            if pages.is_empty() {
                return Err(ScanshelfError::Decode(format!(
                    "no pages rendered from {}",
                    path.display()
                )));
            }
            state.select(document, pages);
            for page in &state.pages.pages {
                println!("{}", page.as_path().display());
            }
            for skipped in &state.pages.skipped {
                eprintln!("page {} skipped: {}", skipped.index + 1, skipped.reason);
            }
            Ok(())
        }

        Commands::Save {
            format,
            name,
            pdf,
            images,
        } => {
            let input = AssemblyInput {
                images,
                existing_pdf: pdf,
            };
            let saved = save(services, format.into(), input, name).await?;
            state.set_saved(saved);
            print_saved(&state.saved);
            Ok(())
        }

        Commands::Capture { dir, format, name } => {
            let output = services.capture(dir).await?;
            state.set_capture(output);
            let saved = save(services, format.into(), state.assembly_input(), name).await?;
            state.set_saved(saved);
            state.clear_scan_results();
            print_saved(&state.saved);
            Ok(())
        }
    }
}

async fn save(
    services: &AppServices,
    format: DocumentFormat,
    input: AssemblyInput,
    name: Option<String>,
) -> Result<Vec<OutputDocument>> {
    if input.is_empty() {
        return Err(ScanshelfError::EmptyInput);
    }
    let saved = services.library().assemble(format, input, name).await;
    if saved.is_empty() {
        return Err(ScanshelfError::StorageAccess(format!(
            "no {format} output was written"
        )));
    }
    Ok(saved)
}

fn print_saved(saved: &[OutputDocument]) {
    for output in saved {
        println!("{}", output.path.display());
    }
}

/// Describe a file on disk as a catalog entry.
fn document_at(path: &Path) -> Result<ScannedDocument> {
    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| ScanshelfError::UnsupportedFormat(path.display().to_string()))?;
    let metadata = std::fs::metadata(path)?;
    let modified = metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0);
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(ScannedDocument::new(
        format,
        name,
        Locator::from_path(PathBuf::from(path)),
        modified,
    ))
}
