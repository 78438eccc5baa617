//! vbsharp: convert a directory of VB-style source files to C#-style source.

use anyhow::Context;
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use vbsharp::{VbsharpConfig, convert_dir};
use vbsharp_convert::converter_for_language;

#[derive(Parser, Debug)]
#[command(name = "vbsharp", version, about = "Convert VB-style source files to C#-style source")]
struct Cli {
    /// Directory of files to convert [default: input/ next to the executable]
    input: Option<PathBuf>,

    /// Directory for converted files [default: output/ next to the executable]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file read after the global and project configs
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source language of the input files
    #[arg(long, default_value = "vb")]
    from: String,

    /// Indentation unit for the output (`\t` is read as a tab)
    #[arg(long)]
    indent: Option<String>,

    /// Print every source and converted line
    #[arg(long)]
    echo: bool,

    /// Print the batch report as JSON
    #[arg(long)]
    json: bool,

    /// Wait for Enter before exiting
    #[arg(long)]
    pause: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(cli: &Cli, config: &VbsharpConfig) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match (cli.quiet, cli.verbose) {
            (true, _) => "error",
            (false, 0) => config.log.level.as_deref().unwrap_or("info"),
            (false, 1) => "debug",
            (false, _) => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn exe_dir() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate the executable")?;
    Ok(exe.parent().map(Path::to_path_buf).unwrap_or_default())
}

fn pause() {
    print!("Press Enter to exit...");
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("cannot read the current directory")?;
    let (config, problems) = VbsharpConfig::load(&cwd, cli.config.as_deref());
    init_logging(cli, &config);
    for problem in &problems {
        tracing::warn!("ignoring config {problem}");
    }

    let mut options = config.convert_options();
    if let Some(indent) = &cli.indent {
        options.indent = indent.replace("\\t", "\t");
    }

    let converter = converter_for_language(&cli.from)
        .with_context(|| format!("no converter for language `{}`", cli.from))?;

    let base = exe_dir()?;
    let input = cli
        .input
        .clone()
        .or(config.paths.input.clone())
        .unwrap_or_else(|| base.join("input"));
    let output = cli
        .output
        .clone()
        .or(config.paths.output.clone())
        .unwrap_or_else(|| base.join("output"));

    let report = convert_dir(&input, &output, converter, &options)?;

    if cli.echo {
        for file in &report.files {
            for line in &file.echo {
                println!("{line}");
            }
        }
    }
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.format_text());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let result = run(&cli);
    if cli.pause {
        pause();
    }
    result
}
