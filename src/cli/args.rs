//! CLI argument parsing

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub command: Command,
}

#[derive(Debug, Clone)]
pub enum Command {
    Scan(ScanArgs),
    View(ViewArgs),
    Ingest(IngestArgs),
}

#[derive(Debug, Clone, Default)]
pub struct ScanArgs {
    pub path: String,
    pub sorted: bool,
    pub json: bool,
    pub snapshot: Option<String>,
    pub config: Option<String>,
    pub quiet: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ViewArgs {
    pub from_snapshot: String,
    pub json: bool,
}

#[derive(Debug, Clone, Default)]
pub struct IngestArgs {
    pub path: String,
    pub catalog: Option<String>,
    pub config: Option<String>,
    pub upload: bool,
    pub full_sync: bool,
}

/// Parse command line arguments
pub fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    if args.len() < 2 {
        return Err("No command specified".to_string());
    }

    let command = match args[1].as_str() {
        "scan" => Command::Scan(parse_scan_args(&args[2..])?),
        "view" => Command::View(parse_view_args(&args[2..])?),
        "ingest" => Command::Ingest(parse_ingest_args(&args[2..])?),
        _ => return Err(format!("Unknown command: {}", args[1])),
    };

    Ok(CliArgs { command })
}

fn value<'a>(args: &'a [String], i: &mut usize, what: &str) -> Result<&'a String, String> {
    *i += 1;
    args.get(*i)
        .ok_or_else(|| format!("{} requires {what}", args[*i - 1]))
}

fn positional(slot: &mut String, arg: &str) -> Result<(), String> {
    if slot.is_empty() {
        *slot = arg.to_string();
        Ok(())
    } else {
        Err(format!("Unexpected argument: {arg}"))
    }
}

fn parse_scan_args(args: &[String]) -> Result<ScanArgs, String> {
    let mut scan_args = ScanArgs::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--sorted" => scan_args.sorted = true,
            "--json" => scan_args.json = true,
            "--quiet" => scan_args.quiet = true,
            "--snapshot" => {
                scan_args.snapshot = Some(value(args, &mut i, "a file path")?.clone());
            }
            "--config" => {
                scan_args.config = Some(value(args, &mut i, "a file path")?.clone());
            }
            arg if !arg.starts_with("--") => positional(&mut scan_args.path, arg)?,
            _ => return Err(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    if scan_args.path.is_empty() {
        return Err("Missing required argument: DIR".to_string());
    }

    Ok(scan_args)
}

fn parse_view_args(args: &[String]) -> Result<ViewArgs, String> {
    let mut view_args = ViewArgs::default();

    for arg in args {
        match arg.as_str() {
            "--json" => view_args.json = true,
            arg if !arg.starts_with("--") => positional(&mut view_args.from_snapshot, arg)?,
            _ => return Err(format!("Unknown option: {arg}")),
        }
    }

    if view_args.from_snapshot.is_empty() {
        return Err("Missing required argument: SNAPSHOT_FILE".to_string());
    }

    Ok(view_args)
}

fn parse_ingest_args(args: &[String]) -> Result<IngestArgs, String> {
    let mut ingest_args = IngestArgs::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--upload" => ingest_args.upload = true,
            "--full-sync" => ingest_args.full_sync = true,
            "--catalog" => {
                ingest_args.catalog = Some(value(args, &mut i, "a file path")?.clone());
            }
            "--config" => {
                ingest_args.config = Some(value(args, &mut i, "a file path")?.clone());
            }
            arg if !arg.starts_with("--") => positional(&mut ingest_args.path, arg)?,
            _ => return Err(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    if ingest_args.path.is_empty() {
        return Err("Missing required argument: DIR".to_string());
    }

    Ok(ingest_args)
}
