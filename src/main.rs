//! Gecko extension packager CLI

use clap::{Parser, Subcommand};
use colored::*;
use geckopack::packager::install::auto_install;
use geckopack::{create_build, BuildConfig, LocaleSelection};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "geckopack")]
#[command(about = "Package Gecko extension source trees into XPI archives", long_about = None)]
#[command(version)]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Extension source directory
    #[arg(default_value = ".")]
    base_dir: PathBuf,

    /// Build type, selects the metadata.<type> file
    #[arg(short = 't', long = "type", default_value = "gecko")]
    build_type: String,

    /// Locales to package: a comma separated list or "all"
    #[arg(short, long)]
    locales: Option<String>,

    /// Build number appended to the version of development builds
    #[arg(short = 'b', long = "build")]
    build_num: Option<String>,

    /// Create a release build
    #[arg(short, long)]
    release: bool,

    /// PEM file with the private key and certificates to sign the build with
    #[arg(short, long = "key")]
    key_file: Option<PathBuf>,

    /// Create a build for multiprocess compatible browsers
    #[arg(long)]
    multicompartment: bool,

    /// Directory with lib/<module>.js files scripts may require. Without it,
    /// required modules are not pulled into the package and must ship in lib/
    #[arg(long)]
    module_library: Option<PathBuf>,
}

impl BuildArgs {
    fn into_config(self) -> BuildConfig {
        let mut config = BuildConfig::new(self.base_dir).release(self.release);
        config.build_type = self.build_type;
        config.multicompartment = self.multicompartment;
        if let Some(locales) = self.locales {
            config = config.with_locales(LocaleSelection::parse(&locales));
        }
        if let Some(build_num) = self.build_num {
            config = config.with_build_num(build_num);
        }
        if let Some(key_file) = self.key_file {
            config = config.with_key_file(key_file);
        }
        if let Some(library) = self.module_library {
            config = config.with_module_library(library);
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create an XPI from an extension source directory
    Build {
        #[command(flatten)]
        args: BuildArgs,

        /// Output file, defaults to <basename>-<version>.xpi
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build and push the XPI to a running auto-installer
    Install {
        #[command(flatten)]
        args: BuildArgs,

        #[arg(long, default_value = "localhost")]
        host: String,

        #[arg(long, default_value_t = 8888)]
        port: u16,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build { args, output } => {
            let mut config = args.into_config();
            if let Some(output) = output {
                config = config.with_out_file(output);
            }

            match create_build(config) {
                Ok(build) => {
                    println!("{}", "✅ Build completed successfully!".green().bold());
                    println!();
                    println!("📦 Summary:");
                    println!("  - Version: {}", build.version);
                    println!("  - Files: {}", build.file_count);
                    println!("  - Output: {}", build.path.display());
                    if !build.warnings.is_empty() {
                        println!(
                            "  - {}",
                            format!("Warnings: {} (reported above)", build.warnings.len()).yellow()
                        );
                    }
                }
                Err(e) => {
                    eprintln!("{}", "❌ Build failed!".red().bold());
                    eprintln!("{}", format!("Error: {:#}", e).red());
                    std::process::exit(1);
                }
            }
        }

        Commands::Install { args, host, port } => {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(e) => {
                    eprintln!("{}", format!("Failed to initialize async runtime: {}", e).red());
                    std::process::exit(1);
                }
            };

            match runtime.block_on(auto_install(args.into_config(), &host, port)) {
                Ok(()) => {
                    println!(
                        "{}",
                        format!("✅ Installed build on {}:{}", host, port).green().bold()
                    );
                }
                Err(e) => {
                    eprintln!("{}", "❌ Install failed!".red().bold());
                    eprintln!("{}", format!("Error: {:#}", e).red());
                    std::process::exit(1);
                }
            }
        }
    }
}
