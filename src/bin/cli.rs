//! cellstore CLI
//!
//! Fills a synthetic sheet through a chosen backend and reports timings.
//! Useful for comparing the memory and disk backends on large grids.

use std::path::PathBuf;
use std::time::Instant;

use cellstore::{BackendKind, Border, BorderStyle, Config, Sheet, Style};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// cellstore CLI
#[derive(Parser, Debug)]
#[command(name = "cellstore-cli")]
#[command(about = "Exercise spreadsheet cell storage backends")]
#[command(version)]
struct Args {
    /// Backend to store cells in ("memory" or "disk")
    #[arg(short, long, default_value = "memory")]
    backend: BackendKind,

    /// Disk backend cache budget in KiB
    #[arg(short = 'c', long, default_value = "1024")]
    cache_kb: usize,

    /// Directory for the disk backend's temporary storage
    #[arg(short, long)]
    temp_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a rows x cols grid, then read every row back
    Fill {
        /// Number of rows
        #[arg(short, long, default_value = "1000")]
        rows: usize,

        /// Number of columns
        #[arg(short = 'k', long, default_value = "20")]
        cols: usize,

        /// Give every Nth cell a border style (0 = never)
        #[arg(short, long, default_value = "0")]
        styled_every: usize,

        /// Print the contents of this row after filling
        #[arg(short, long)]
        print_row: Option<usize>,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cellstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();
    tracing::info!("cellstore CLI v{}", cellstore::VERSION);

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> cellstore::Result<()> {
    let mut builder = Config::builder().cache_size_kib(args.cache_kb)?;
    if let Some(root) = args.temp_root {
        builder = builder.temp_root(root);
    }
    let config = builder.build();
    config.validate()?;

    let constructor = args.backend.constructor(config);

    match args.command {
        Commands::Fill {
            rows,
            cols,
            styled_every,
            print_row,
        } => {
            let mut sheet = Sheet::new("Sheet1", &constructor)?;
            tracing::info!(backend = ?args.backend, rows, cols, "filling sheet");

            let mut border = Style::new();
            border.border = Border::all(BorderStyle::Thin);
            border.apply_border = true;

            let started = Instant::now();
            let mut written = 0usize;
            for r in 0..rows {
                for _ in 0..cols {
                    let mut cell = sheet.add_cell(r)?;
                    cell.set_string(format!("R{}C{}", r, cell.col()));
                    if styled_every > 0 && written % styled_every == 0 {
                        cell.set_style(border.clone());
                    }
                    sheet.write_cell(&cell)?;
                    written += 1;
                }
            }
            let write_elapsed = started.elapsed();

            let started = Instant::now();
            let mut visited = 0usize;
            for r in 0..rows {
                sheet.for_each_in_row(r, |_| {
                    visited += 1;
                    Ok(())
                })?;
            }
            let read_elapsed = started.elapsed();

            println!(
                "wrote {} cells in {:.3?}, visited {} cells in {:.3?}",
                written, write_elapsed, visited, read_elapsed
            );

            if let Some(r) = print_row {
                sheet.for_each_in_row(r, |cell| {
                    let styled = if cell.style().is_some() { " (styled)" } else { "" };
                    println!("{} = {:?}{}", cell.key(), cell.value(), styled);
                    Ok(())
                })?;
            }

            sheet.close()?;
        }
    }

    Ok(())
}
