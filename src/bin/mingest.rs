//! Media ingest CLI (mingest) - Main binary entry point

use media_ingest::catalog::{MemoryCatalog, SyncRequest};
use media_ingest::cli::args::{Command, IngestArgs, ScanArgs, ViewArgs, parse_args};
use media_ingest::cli::output::{format_json, format_text};
use media_ingest::config::Config;
use media_ingest::services::workflow::{IngestOptions, ingest_local};
use media_ingest::{Error, ScanOptions};
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    // Initialize logger (controlled by RUST_LOG environment variable)
    // Example: RUST_LOG=debug mingest ingest ~/Pictures
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return;
    }

    match args[1].as_str() {
        "--help" | "-h" => {
            print_help();
            return;
        }
        "--version" | "-v" => {
            print_version();
            return;
        }
        _ => {}
    }

    let cli_args = match parse_args(&args) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Use --help for usage information");
            process::exit(2);
        }
    };

    let exit_code = match &cli_args.command {
        Command::Scan(scan_args) => handle_scan(scan_args),
        Command::View(view_args) => handle_view(view_args),
        Command::Ingest(ingest_args) => handle_ingest(ingest_args),
    };

    process::exit(exit_code);
}

fn exit_code_for(err: &Error) -> i32 {
    match err {
        Error::InvalidInput(_) => 2,
        _ => 4,
    }
}

fn load_config(path: Option<&String>) -> Result<Config, i32> {
    Config::load(path.map(Path::new)).map_err(|e| {
        eprintln!("Error: {e}");
        exit_code_for(&e)
    })
}

fn handle_scan(args: &ScanArgs) -> i32 {
    let config = match load_config(args.config.as_ref()) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let opts = ScanOptions {
        sort_by_filename: args.sorted,
    };

    if !args.quiet {
        eprintln!("Scanning: {}", args.path);
    }

    let summary = match media_ingest::scan_summary(&config.source, &args.path, &opts) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return exit_code_for(&e);
        }
    };

    if !args.quiet {
        eprintln!(
            "Found {} medias ({} other files skipped)",
            summary.medias.len(),
            summary.skipped
        );
    }

    if let Some(snapshot_path) = &args.snapshot {
        if let Err(e) = media_ingest::io::snapshot::write_medias(Path::new(snapshot_path), &summary.medias) {
            eprintln!("Error: Failed to save snapshot: {e}");
            return 4;
        }
        if !args.quiet {
            eprintln!("Snapshot saved: {snapshot_path} ({} medias)", summary.medias.len());
        }
    }

    if args.json {
        println!("{}", format_json(&summary.root, &summary.medias, &summary.errors));
    } else if !args.quiet {
        format_text(&summary.root, &summary.medias, &summary.errors);
    }

    if summary.errors.is_empty() {
        0
    } else {
        3
    }
}

fn handle_view(args: &ViewArgs) -> i32 {
    let medias = match media_ingest::io::snapshot::read_medias(Path::new(&args.from_snapshot)) {
        Ok(medias) => medias,
        Err(e) => {
            eprintln!("Error reading snapshot: {e}");
            return 4;
        }
    };

    if args.json {
        println!("{}", format_json(&args.from_snapshot, &medias, &[]));
    } else {
        format_text(&args.from_snapshot, &medias, &[]);
    }

    0
}

fn handle_ingest(args: &IngestArgs) -> i32 {
    let mut config = match load_config(args.config.as_ref()) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Some(catalog_path) = &args.catalog {
        config.catalog.path = PathBuf::from(catalog_path);
    }

    if let Err(e) = config.validate_local() {
        eprintln!("Error: {e}");
        return 2;
    }

    let media_dir = Path::new(&args.path);
    if !media_dir.is_dir() {
        eprintln!("Error: Path is not a directory: {}", args.path);
        return 2;
    }

    let catalog = MemoryCatalog::new(config.catalog.remote_base.clone());
    let opts = IngestOptions {
        upload: args.upload,
        sync: SyncRequest {
            full: args.full_sync,
            force: false,
        },
    };

    let report = match ingest_local(&catalog, &config, media_dir, opts) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            return exit_code_for(&e);
        }
    };

    format_text(&config.catalog.path.to_string_lossy(), &report.medias, &[]);

    eprintln!(
        "Sync: {} inserted, {} changed, {} removed",
        report.synced.medias_inserted, report.synced.medias_changed, report.synced.medias_removed
    );
    if !report.found_medias {
        eprintln!("No new medias merged from {}", args.path);
    }
    if args.upload {
        eprintln!("Uploaded: {}", report.uploaded);
    }

    0
}

fn print_help() {
    println!("Media ingest CLI (mingest) - Discover local photos and feed them to a catalog");
    println!();
    println!("USAGE:");
    println!("    mingest scan <DIR> [OPTIONS]");
    println!("    mingest view <SNAPSHOT> [OPTIONS]");
    println!("    mingest ingest <DIR> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    scan      List photos in a directory with their capture metadata");
    println!("    view      Display medias stored in a Parquet snapshot");
    println!("    ingest    Merge a directory into a catalog, optionally uploading new medias");
    println!();
    println!("GLOBAL OPTIONS:");
    println!("    -h, --help                 Show this help message");
    println!("    -v, --version              Show version information");
    println!();
    println!("SCAN OPTIONS:");
    println!("    --sorted                  Order medias by file name");
    println!("    --json                    Emit machine-readable output");
    println!("    --snapshot <FILE>         Also save the medias to a Parquet snapshot");
    println!("    --config <FILE>           Read the local source from a JSON config");
    println!("    --quiet                   Suppress non-error output");
    println!();
    println!("VIEW OPTIONS:");
    println!("    --json                    Emit machine-readable output");
    println!();
    println!("INGEST OPTIONS:");
    println!("    --catalog <FILE>          Catalog storage (default: media-catalog.parquet)");
    println!("    --config <FILE>           JSON config (service, catalog, source)");
    println!("    --upload                  Upload medias that only exist locally");
    println!("    --full-sync               Drop local sizes whose files disappeared");
    println!();
    println!("EXAMPLES:");
    println!("    mingest scan ~/Pictures --sorted");
    println!("    mingest scan ~/Pictures --snapshot pictures.parquet --quiet");
    println!("    mingest ingest ~/Pictures --catalog photos.parquet --upload");
    println!("    RUST_LOG=debug mingest ingest ~/Pictures --full-sync");
}

fn print_version() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_DATE: &str = env!("GIT_DATE");
    const BUILD_TARGET: &str = env!("BUILD_TARGET");

    println!("mingest {VERSION}");
    println!("Commit: {GIT_HASH} ({GIT_DATE})");
    println!("Target: {BUILD_TARGET}");

    #[cfg(debug_assertions)]
    println!("Build: debug");
    #[cfg(not(debug_assertions))]
    println!("Build: release");
}
