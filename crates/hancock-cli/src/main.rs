use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use hancock_core::scraper::NodeDirectory;
use hancock_core::{Config, FileReport, LanguageDefinition, LanguageRegistry, OutputFormat, Scanner};

#[derive(Parser)]
#[command(name = "hancock")]
#[command(about = "Extract declaration hierarchies from source code", long_about = None)]
struct Cli {
    /// Config file to use instead of the default locations
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape files or directories and print their declaration forests
    Scrape {
        /// Files or directories to scrape
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Scrape every file as this language
        #[arg(short, long)]
        language: Option<String>,

        /// Output format (json or yaml)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Print the node directory instead of the forest
        #[arg(long)]
        dump_directory: bool,
    },
    /// List registered languages and their file extensions
    Languages,
    /// Load and compile a language definition file
    Check {
        /// Definition file (.toml, .yaml, .yml or .json)
        definition: PathBuf,
    },
    /// Print the default configuration
    InitConfig,
}

/// One file's node directory, as dumped by `--dump-directory`.
#[derive(Serialize)]
struct DirectoryDump<'a> {
    path: &'a Path,
    language: &'a str,
    directory: &'a NodeDirectory,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .wrap_err_with(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().wrap_err("Failed to load config")?,
    };

    match cli.command {
        Commands::Scrape {
            paths,
            language,
            format,
            dump_directory,
        } => {
            let registry = build_registry(&config)?;
            let mut scanner = Scanner::with_config(&registry, &config).keep_directory(dump_directory);
            if let Some(name) = &language {
                scanner = scanner.language(name)?;
            }

            let mut reports = Vec::new();
            for path in &paths {
                if path.is_dir() {
                    reports.extend(scanner.scrape_directory(path)?);
                } else {
                    reports.push(scanner.scrape_file(path)?);
                }
            }

            let format = format.unwrap_or(config.output.format);
            let output = if dump_directory {
                let dumps: Vec<_> = reports.iter().filter_map(dump_of).collect();
                render(&dumps, format, config.output.pretty)?
            } else {
                render(&reports, format, config.output.pretty)?
            };
            println!("{}", output);
        }
        Commands::Languages => {
            let registry = build_registry(&config)?;
            for (name, extensions) in registry.list() {
                println!("{:<16} {}", name, extensions.join(", "));
            }
        }
        Commands::Check { definition } => {
            let loaded = LanguageDefinition::from_file(&definition)
                .wrap_err_with(|| format!("Failed to load {}", definition.display()))?;
            let name = loaded.name.clone();
            let language = loaded
                .compile()
                .wrap_err_with(|| format!("Language '{}' does not compile", name))?;

            println!(
                "{}: {} signatures compiled",
                language.name(),
                language.expressions().len()
            );
            for expression in language.expressions() {
                println!("  {:<40} {}", expression.name(), expression.as_str());
            }
        }
        Commands::InitConfig => {
            print!("{}", Config::default_config_string());
        }
    }

    Ok(())
}

/// `HANCOCK_LOG` takes precedence; otherwise `warn`, or `debug` with `-v`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("HANCOCK_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_registry(config: &Config) -> Result<LanguageRegistry> {
    let mut registry = LanguageRegistry::new();
    if let Some(dir) = &config.languages.definitions_dir {
        let loaded = registry
            .load_dir(dir)
            .wrap_err_with(|| format!("Failed to load language definitions from {}", dir.display()))?;
        tracing::debug!(loaded, dir = %dir.display(), "loaded language definitions");
    }
    Ok(registry)
}

fn dump_of(report: &FileReport) -> Option<DirectoryDump<'_>> {
    Some(DirectoryDump {
        path: &report.path,
        language: &report.language,
        directory: report.directory.as_ref()?,
    })
}

fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat, pretty: bool) -> Result<String> {
    let output = match format {
        OutputFormat::Json if pretty => serde_json::to_string_pretty(value)?,
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    Ok(output)
}
