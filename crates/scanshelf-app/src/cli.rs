// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use scanshelf_core::types::DocumentFormat;

/// Scan, save, browse, and preview documents.
#[derive(Debug, Parser)]
#[command(name = "scanshelf", about, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List saved documents, newest first
    List {
        /// Only show documents whose name contains this text
        #[arg(long, short)]
        query: Option<String>,
    },

    /// Render a saved document into page images
    Preview {
        /// Path to a saved PDF, DOCX, JPEG or PNG
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Save page images (or an existing PDF) as a new document
    Save {
        /// Output format
        #[arg(long, short, value_enum)]
        format: FormatArg,

        /// Output name without extension. Default: scanned_<timestamp>
        #[arg(long, short)]
        name: Option<String>,

        /// Already-combined PDF to save instead of assembling the images
        #[arg(long, value_name = "FILE")]
        pdf: Option<PathBuf>,

        /// Page images in order
        #[arg(value_name = "IMAGES")]
        images: Vec<PathBuf>,
    },

    /// Read a capture session from a directory and save it
    Capture {
        /// Directory holding the captured pages
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Output format
        #[arg(long, short, value_enum)]
        format: FormatArg,

        /// Output name without extension. Default: scanned_<timestamp>
        #[arg(long, short)]
        name: Option<String>,
    },
}

/// Output format choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Pdf,
    Docx,
    #[value(alias = "jpg")]
    Jpeg,
    Png,
}

impl From<FormatArg> for DocumentFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Pdf => DocumentFormat::Pdf,
            FormatArg::Docx => DocumentFormat::Docx,
            FormatArg::Jpeg => DocumentFormat::Jpeg,
            FormatArg::Png => DocumentFormat::Png,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_parses_images_in_order() {
        let cli = Cli::try_parse_from([
            "scanshelf", "save", "--format", "docx", "--name", "memo", "b.png", "a.png",
        ])
        .expect("parse");
        match cli.command {
            Commands::Save {
                format,
                name,
                pdf,
                images,
            } => {
                assert_eq!(format, FormatArg::Docx);
                assert_eq!(name.as_deref(), Some("memo"));
                assert!(pdf.is_none());
                assert_eq!(images, [PathBuf::from("b.png"), PathBuf::from("a.png")]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn jpg_is_accepted_for_jpeg() {
        let cli = Cli::try_parse_from(["scanshelf", "capture", "scans", "-f", "jpg"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Capture {
                format: FormatArg::Jpeg,
                ..
            }
        ));
    }

    #[test]
    fn format_is_required_for_save() {
        assert!(Cli::try_parse_from(["scanshelf", "save", "a.png"]).is_err());
    }
}
