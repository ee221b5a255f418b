//! CLI tool for splash image patching.

mod commands;
mod exit_codes;
mod output;
mod select;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

use exit_codes::ExitCode;
use splashpatch::extract::DEFAULT_OUTPUT_DIR;

/// Replace splash images inside application archives
#[derive(Parser)]
#[command(name = "splashpatch")]
#[command(author, version, about = "Replace splash images inside application archives", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(long, short = 'c', default_value = "config.json", global = true)]
    config: PathBuf,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Log debug details
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,
}

/// Which configured target to operate on
#[derive(Args)]
pub struct TargetArgs {
    /// Target category (prompts when omitted)
    #[arg(long)]
    category: Option<String>,

    /// Product within the category (prompts when omitted)
    #[arg(long)]
    product: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured targets
    Targets,

    /// Copy the configured entries out of the archive (alias: x)
    #[command(alias = "x")]
    Extract {
        #[command(flatten)]
        target: TargetArgs,

        /// Installation directory (defaults to the product's environment variable)
        #[arg(short = 'd', long)]
        install_dir: Option<String>,

        /// Output directory
        #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,
    },

    /// Report the configured entries without changing anything (alias: i)
    #[command(alias = "i")]
    Inspect {
        #[command(flatten)]
        target: TargetArgs,

        /// Installation directory (defaults to the product's environment variable)
        #[arg(short = 'd', long)]
        install_dir: Option<String>,
    },

    /// Replace the configured entries with an image (alias: p)
    #[command(alias = "p")]
    Patch {
        /// Replacement image
        image: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        /// Installation directory (defaults to the product's environment variable)
        #[arg(short = 'd', long)]
        install_dir: Option<String>,

        /// User substituted into the cache path (defaults to the configured user)
        #[arg(short = 'u', long)]
        user: Option<String>,

        /// Skip cache invalidation
        #[arg(long)]
        no_cache: bool,
    },

    /// Put every backed-up archive back in place (alias: r)
    #[command(alias = "r")]
    Restore {
        #[command(flatten)]
        target: TargetArgs,

        /// Installation directory (defaults to the product's environment variable)
        #[arg(short = 'd', long)]
        install_dir: Option<String>,

        /// User substituted into the cache path (defaults to the configured user)
        #[arg(short = 'u', long)]
        user: Option<String>,

        /// Skip cache invalidation
        #[arg(long)]
        no_cache: bool,
    },

    /// Delete stale cache files of the newest cache directory
    Invalidate {
        #[command(flatten)]
        target: TargetArgs,

        /// User substituted into the cache path (defaults to the configured user)
        #[arg(short = 'u', long)]
        user: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

fn main() {
    // Set up Ctrl+C handler
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted");
        std::process::exit(exit_codes::USER_INTERRUPT);
    })
    .ok();

    let cli = Cli::parse();

    // Library records go through `log`; the subscriber bridges them.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level_for(cli.quiet, cli.verbose))
        .with_target(false)
        .without_time()
        .init();

    let ctx = commands::Context {
        config_path: &cli.config,
        format: cli.format,
    };

    let exit_code = match cli.command {
        Commands::Targets => commands::targets(&ctx),

        Commands::Extract {
            target,
            install_dir,
            output,
        } => commands::extract(&ctx, &target, install_dir, &output),

        Commands::Inspect {
            target,
            install_dir,
        } => commands::inspect(&ctx, &target, install_dir),

        Commands::Patch {
            image,
            target,
            install_dir,
            user,
            no_cache,
        } => commands::patch(
            &ctx,
            commands::PatchArgs {
                target: &target,
                install_dir,
                image: &image,
                user,
                no_cache,
            },
        ),

        Commands::Restore {
            target,
            install_dir,
            user,
            no_cache,
        } => commands::restore(&ctx, &target, install_dir, user, no_cache),

        Commands::Invalidate { target, user } => commands::invalidate(&ctx, &target, user),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}

/// Returns the log level for the verbosity flags.
fn level_for(quiet: bool, verbose: bool) -> LevelFilter {
    if quiet {
        LevelFilter::WARN
    } else if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_patch_command() {
        let cli = Cli::try_parse_from([
            "splashpatch",
            "--config",
            "targets.json",
            "patch",
            "splash.png",
            "--category",
            "JetBrains",
            "--product",
            "IntelliJ IDEA",
            "--no-cache",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("targets.json"));
        match cli.command {
            Commands::Patch {
                image,
                target,
                no_cache,
                ..
            } => {
                assert_eq!(image, PathBuf::from("splash.png"));
                assert_eq!(target.category.as_deref(), Some("JetBrains"));
                assert_eq!(target.product.as_deref(), Some("IntelliJ IDEA"));
                assert!(no_cache);
            }
            _ => panic!("Expected patch command"),
        }
    }

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(true, false), LevelFilter::WARN);
        assert_eq!(level_for(false, true), LevelFilter::DEBUG);
        assert_eq!(level_for(false, false), LevelFilter::INFO);
    }

    #[test]
    fn test_extract_default_output() {
        let cli = Cli::try_parse_from(["splashpatch", "extract"]).unwrap();
        match cli.command {
            Commands::Extract { output, .. } => assert_eq!(output, PathBuf::from("extracted")),
            _ => panic!("Expected extract command"),
        }
    }
}
