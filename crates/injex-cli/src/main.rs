mod commands;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use injex_core::model::SchemaVersion;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "injex",
    version,
    about = "Extract UEFA injury report forms (Word and scanned PDF) into flat records"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaArg {
    Legacy,
    Extended,
}

impl From<SchemaArg> for SchemaVersion {
    fn from(arg: SchemaArg) -> Self {
        match arg {
            SchemaArg::Legacy => SchemaVersion::Legacy,
            SchemaArg::Extended => SchemaVersion::Extended,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one .docx or .pdf form into a record
    Extract {
        /// Path to a .docx or .pdf file
        input_file: PathBuf,

        /// Output column set
        #[arg(short, long, value_enum, default_value = "legacy")]
        schema: SchemaArg,

        /// Custom JSON template file (overrides built-in selection)
        #[arg(short, long, value_name = "FILE")]
        template: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the extraction as JSON to a file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Write checkbox overlay PNGs for PDF pages into this directory
        #[arg(long, value_name = "DIR")]
        debug_dir: Option<PathBuf>,
    },
    /// Extract every .docx and .pdf below a directory into one CSV
    Batch {
        /// Root directory (men/ and women/ subdirectories set SEX)
        dir: PathBuf,

        /// Output column set
        #[arg(short, long, value_enum, default_value = "legacy")]
        schema: SchemaArg,

        /// Custom JSON template file (overrides built-in selection)
        #[arg(short, long, value_name = "FILE")]
        template: Option<PathBuf>,

        /// CSV output file (default: stdout)
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Inspect and validate form templates
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },
}

#[derive(Subcommand)]
enum TemplatesAction {
    /// List built-in templates
    List,
    /// Explain a template's fields in plain language
    Explain {
        /// Built-in template name or form type (e.g., "knee", "LOWER_EXTREMITIES")
        name: String,
    },
    /// Validate a custom template file
    Validate {
        /// Path to JSON template file
        file: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{level},injex_core={level},injex={level}"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Extract {
            input_file,
            schema,
            template,
            output,
            out,
            debug_dir,
        } => commands::extract::run(input_file, schema.into(), template, &output, out, debug_dir),
        Commands::Batch {
            dir,
            schema,
            template,
            out,
        } => commands::batch::run(dir, schema.into(), template, out),
        Commands::Templates { action } => match action {
            TemplatesAction::List => commands::templates::list(),
            TemplatesAction::Explain { name } => commands::templates::explain(&name),
            TemplatesAction::Validate { file } => commands::templates::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
