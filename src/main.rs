use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use log::info;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use pdfview::ViewerApp;
use pdfview::reload;

/// Minimal PDF viewer with live reload.
///
/// Send SIGUSR1 to the process to reload the document from disk.
#[derive(Parser)]
#[command(name = "pdfview", version, about)]
struct Cli {
    /// Path to the PDF file to display
    file: PathBuf,
}

fn main() -> Result<()> {
    // Every startup problem, arity included, exits with status 1.
    let cli = Cli::try_parse().unwrap_or_else(|err| {
        let _ = err.print();
        process::exit(if err.use_stderr() { 1 } else { 0 });
    });

    if !cli.file.exists() {
        eprintln!("File {} not found", cli.file.display());
        process::exit(1);
    }

    better_panic::install();
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    reload::install_signal_handler();

    info!("starting pdfview for {}", cli.file.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_title("pdfview"),
        ..Default::default()
    };

    eframe::run_native(
        "pdfview",
        options,
        Box::new(move |_cc| Ok(Box::new(ViewerApp::new(cli.file)))),
    )
    .map_err(|err| anyhow::anyhow!("display backend failed: {err}"))?;

    Ok(())
}
