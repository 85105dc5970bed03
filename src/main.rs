//! imgutil CLI - inspect and resize single image files

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use serde::Serialize;
use tracing::{debug, info};

use imgutil::{init, Config, ImageInformation, ImageProcessor, ResizeMode, ResizeOutcome, ResizeRequest};

/// imgutil - image metadata and validated resizing
#[derive(Parser)]
#[command(
    name = "imgutil",
    version,
    about = "Inspect image files and resize them into a target box",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (.toml or .yaml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'Q', long, conflicts_with = "verbose", global = true)]
    quiet: bool,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Show file size, MD5 hash and dimensions of an image
    Info {
        /// Image file
        path: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Resize an image into a WIDTH x HEIGHT box
    Resize {
        /// Source image
        source: PathBuf,
        /// Destination file, or directory when it has no extension
        destination: PathBuf,
        /// Target width in pixels
        #[arg(short, long, value_name = "PIXELS", value_parser = clap::value_parser!(u32).range(1..))]
        width: u32,
        /// Target height in pixels
        #[arg(short = 'H', long, value_name = "PIXELS", value_parser = clap::value_parser!(u32).range(1..))]
        height: u32,
        /// How to fit the image into the box
        #[arg(short, long, value_enum, default_value = "fit")]
        mode: CliResizeMode,
        /// Replace an existing destination file
        #[arg(long)]
        overwrite: bool,
        /// Skip reading back metadata of the written file
        #[arg(long)]
        no_information: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Generate example configuration file
    ExampleConfig {
        /// Output file path
        #[arg(short, long, default_value = "imgutil.toml")]
        output: PathBuf,
        /// Use YAML format instead of TOML
        #[arg(long)]
        yaml: bool,
    },
}

/// CLI-compatible resize mode enum
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliResizeMode {
    Contain,
    Cover,
    Fill,
    Fit,
}

impl From<CliResizeMode> for ResizeMode {
    fn from(mode: CliResizeMode) -> Self {
        match mode {
            CliResizeMode::Contain => ResizeMode::Contain,
            CliResizeMode::Cover => ResizeMode::Cover,
            CliResizeMode::Fill => ResizeMode::Fill,
            CliResizeMode::Fit => ResizeMode::Fit,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", style("Error").red().bold(), e);
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(&cli, &config) {
        eprintln!("{}: Failed to initialize logging: {}", style("Error").red().bold(), e);
        process::exit(1);
    }

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("{}: {}", style("Error").red().bold(), e);
        process::exit(1);
    }
}

fn load_config(cli: &Cli) -> imgutil::Result<Config> {
    let Some(path) = &cli.config else {
        return Ok(Config::default());
    };

    let config = Config::from_file(path)?;
    config.validate()?;
    Ok(config)
}

/// Command-line verbosity wins over the configured level
fn init_logging(cli: &Cli, config: &Config) -> imgutil::Result<()> {
    if cli.verbose || cli.quiet {
        let mut config = config.clone();
        config.logging.level = if cli.quiet { "error" } else { "debug" }.to_string();
        return imgutil::init_with_config(&config);
    }

    if cli.config.is_some() {
        imgutil::init_with_config(config)
    } else {
        if std::env::var_os("RUST_LOG").is_none() {
            std::env::set_var("RUST_LOG", "warn");
        }
        init()
    }
}

async fn run(command: Commands, config: &Config) -> anyhow::Result<()> {
    let processor = ImageProcessor::from_config(config);

    match command {
        Commands::Info { path, json } => {
            let info = processor
                .image_information(&path)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            if json {
                print_json(&info)?;
            } else {
                print_information(&info);
            }
        }
        Commands::Resize {
            source,
            destination,
            width,
            height,
            mode,
            overwrite,
            no_information,
            json,
        } => {
            let request = ResizeRequest::new(source, destination, width, height)
                .resize_mode(mode.into())
                .overwrite(overwrite)
                .information(!no_information);
            debug!("CLI resize request: {:?}", request);

            let outcome = processor
                .resize(request)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            if json {
                print_json(&outcome)?;
            } else {
                print_outcome(&outcome);
            }
        }
        Commands::ExampleConfig { output, yaml } => {
            let output = if yaml { output.with_extension("yaml") } else { output };
            Config::default().to_file(&output)?;
            info!("Wrote example configuration to {:?}", output);
            println!("{} {}", style("Wrote").green().bold(), output.display());
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_information(info: &ImageInformation) {
    println!("{:>10} {}x{}", style("size").bold(), info.width, info.height);
    println!("{:>10} {} bytes", style("file").bold(), info.file_size);
    println!("{:>10} {}", style("md5").bold(), info.md5);
}

fn print_outcome(outcome: &ResizeOutcome) {
    println!("{} {}", style("Resized").green().bold(), outcome.path.display());
    if let Some(info) = &outcome.information {
        print_information(info);
    }
}
