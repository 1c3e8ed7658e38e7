use std::path::PathBuf;

use clap::Parser;

/// docchat — chat with your PDF documents from the terminal.
#[derive(Parser, Debug)]
#[command(name = "docchat", version, about)]
pub struct Args {
    /// PDF files to chat about (at least one).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Model identifier override.
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (e.g. "docchat=debug").
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print a structured summary of the documents before the chat loop.
    #[arg(short = 's', long)]
    pub summary: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
