use clap::{Parser, Subcommand};
use evaluator::EvaluateOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use ui::ValidateOptions;

#[derive(Debug, Parser)]
#[command(
    name = "xamlint",
    about = "UiPath XAML workflow validator",
    version,
    long_about = "Validates UiPath XAML workflow documents against structural, namespace, security and activity rules.\n\nExamples:\n  xamlint validate Main.xaml                      # Validate a single workflow\n  xamlint validate ./Project                      # Validate every .xaml file below a directory\n  xamlint validate --json Main.xaml               # Emit a JSON report\n  xamlint validate --strict ./Project             # Fail on warnings too\n  xamlint --debug validate Main.xaml              # Show detailed logs"
)]
struct Xamlint {
    #[command(subcommand)]
    command: Commands,

    /// Run in verbose mode with detailed output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Run in debug mode with extensive rule details
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate XAML workflow files
    Validate {
        /// Path to a workflow file or a directory of workflows
        path: PathBuf,

        /// Treat warnings as failures for the exit code
        #[arg(long)]
        strict: bool,

        /// Print JSON reports instead of text
        #[arg(long)]
        json: bool,

        /// JSON file with expected prefix to URI bindings
        #[arg(long, value_name = "PATH")]
        namespace_registry: Option<PathBuf>,

        /// project.json to use instead of searching above each document
        #[arg(long, value_name = "PATH")]
        project_meta: Option<PathBuf>,
    },
}

fn main() {
    let cli = Xamlint::parse();

    // Set log level based on command line flags
    if cli.debug {
        logging::set_log_level(logging::LogLevel::Debug);
        logging::debug("Debug mode enabled - showing detailed logs");
    } else if cli.verbose {
        logging::set_log_level(logging::LogLevel::Info);
        logging::info("Verbose mode enabled");
    } else {
        logging::set_log_level(logging::LogLevel::Warning);
    }

    match cli.command {
        Commands::Validate {
            path,
            strict,
            json,
            namespace_registry,
            project_meta,
        } => {
            let options = ValidateOptions {
                strict,
                json,
                evaluate: EvaluateOptions {
                    project_meta,
                    namespace_registry,
                },
            };

            let stdout = io::stdout();
            let mut out = stdout.lock();
            let code = ui::validate_path(&path, &options, &mut out)
                .and_then(|code| out.flush().map(|_| code))
                .unwrap_or_else(|e| {
                    eprintln!("Error: {}", e);
                    1
                });
            std::process::exit(code);
        }
    }
}
