use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use stackscope_dump::{group, parse_reader, sort, Goroutine};
use stackscope_highlight::{enrich_markup, CancelFlag, Highlighter, TokenCache};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "stackscope")]
#[command(about = "Inspect Go goroutine dumps", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(flatten)]
    roots: RootArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a dump and print its goroutines as JSON
    Parse(ParseArgs),

    /// Parse a dump and print goroutines grouped by identical stacks
    Group(GroupArgs),
}

#[derive(Args)]
struct RootArgs {
    /// Local project root (source of highlighted files)
    #[arg(long, global = true)]
    root: Option<String>,

    /// Local GOROOT
    #[arg(long, global = true)]
    goroot: Option<String>,

    /// Local GOPATH
    #[arg(long, global = true)]
    gopath: Option<String>,

    /// Project root as printed in the dump (defaults to --root)
    #[arg(long, global = true)]
    remote_root: Option<String>,

    /// GOROOT as printed in the dump (defaults to --goroot)
    #[arg(long, global = true)]
    remote_goroot: Option<String>,

    /// GOPATH as printed in the dump (defaults to --gopath)
    #[arg(long, global = true)]
    remote_gopath: Option<String>,
}

#[derive(Args)]
struct FilterArgs {
    /// Dump file (stdin when omitted or "-")
    input: Option<PathBuf>,

    /// Skip goroutines blocked for less than this many minutes
    #[arg(long)]
    min_minutes: Option<u64>,

    /// Skip goroutines blocked for more than this many minutes
    #[arg(long)]
    max_minutes: Option<u64>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct ParseArgs {
    #[command(flatten)]
    filter: FilterArgs,

    /// Context lines around each call site; negative disables highlighting
    #[arg(long, allow_hyphen_values = true)]
    wrap: Option<i32>,

    /// Highlight at most this many goroutines (0 = all)
    #[arg(long)]
    markup_limit: Option<usize>,
}

#[derive(Args)]
struct GroupArgs {
    #[command(flatten)]
    filter: FilterArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_env(|name| std::env::var(name).ok())?;
    apply_root_args(&mut config, &cli.roots);

    match cli.command {
        Commands::Parse(args) => {
            if let Some(wrap) = args.wrap {
                config.markup.wrap_size = wrap;
            }
            if let Some(limit) = args.markup_limit {
                config.markup.limit = limit;
            }
            apply_filter_args(&mut config, &args.filter);
            config.validate()?;
            run_parse(&config, &args.filter).await?
        }
        Commands::Group(args) => {
            apply_filter_args(&mut config, &args.filter);
            config.validate()?;
            run_group(&config, &args.filter)?
        }
    }

    Ok(())
}

fn apply_root_args(config: &mut Config, roots: &RootArgs) {
    let overrides = [
        (&roots.root, &mut config.local.root),
        (&roots.goroot, &mut config.local.goroot),
        (&roots.gopath, &mut config.local.gopath),
        (&roots.remote_root, &mut config.remote.root),
        (&roots.remote_goroot, &mut config.remote.goroot),
        (&roots.remote_gopath, &mut config.remote.gopath),
    ];
    for (flag, slot) in overrides {
        if let Some(value) = flag {
            slot.clone_from(value);
        }
    }
}

fn apply_filter_args(config: &mut Config, args: &FilterArgs) {
    if args.min_minutes.is_some() {
        config.filter.min_minutes = args.min_minutes;
    }
    if args.max_minutes.is_some() {
        config.filter.max_minutes = args.max_minutes;
    }
}

fn read_input(input: Option<&Path>) -> Result<Vec<u8>> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read(path)
            .with_context(|| format!("Failed to read dump {}", path.display())),
        _ => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read dump from stdin")?;
            Ok(buf)
        }
    }
}

/// Parse, sort and filter the dump named by `args`
fn load_goroutines(config: &Config, args: &FilterArgs) -> Result<Vec<Goroutine>> {
    let raw = read_input(args.input.as_deref())?;
    let remote = config.remote_env();
    let mut goroutines = parse_reader(raw.as_slice(), &remote).context("Failed to parse dump")?;
    sort(&mut goroutines);

    let total = goroutines.len();
    let (goroutines, skipped) = config.duration_filter().apply(goroutines);
    log::info!("Parsed {total} goroutines ({skipped} skipped by duration filter)");
    Ok(goroutines)
}

async fn run_parse(config: &Config, args: &FilterArgs) -> Result<()> {
    let mut goroutines = load_goroutines(config, args)?;

    let options = config.markup_options();
    if !options.is_disabled() {
        let cancel = CancelFlag::new();
        let interrupt = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Interrupted, cancelling markup");
                    cancel.cancel();
                }
            })
        };

        let highlighter = Highlighter::new(config.local_env(), Arc::new(TokenCache::local()))
            .with_options(config.render_options());
        let result = enrich_markup(Arc::new(highlighter), &mut goroutines, options, &cancel).await;
        interrupt.abort();
        result.context("Failed to highlight call sites")?;
    }

    write_json(&goroutines, args.pretty)
}

fn run_group(config: &Config, args: &FilterArgs) -> Result<()> {
    let goroutines = load_goroutines(config, args)?;
    let groups = group(&goroutines);
    log::info!("{} groups", groups.len());
    write_json(&groups, args.pretty)
}

fn write_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
