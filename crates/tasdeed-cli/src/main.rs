mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tasdeed",
    version,
    about = "Field extraction for utility bill PDFs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the fields of every page of a bill PDF
    Extract {
        /// Path to the bill PDF
        pdf_file: PathBuf,

        /// Account id the bill belongs to (used for placeholder pages)
        #[arg(short, long)]
        account: Option<String>,

        /// Custom JSON template file (default: built-in templates)
        #[arg(short, long = "templates", value_name = "FILE")]
        templates: Option<PathBuf>,

        /// Output format: table (default), json or csv
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the result to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Show which layout each page of a bill PDF uses
    Classify {
        /// Path to the bill PDF
        pdf_file: PathBuf,

        /// Custom JSON template file (default: built-in templates)
        #[arg(short, long = "templates", value_name = "FILE")]
        templates: Option<PathBuf>,
    },
    /// Extract one row per account from a directory of bill PDFs
    Batch {
        /// Account list (.xlsx or .csv) with SUBTYPE and ACCOUNTNO columns
        #[arg(long, value_name = "FILE")]
        accounts: PathBuf,

        /// Directory holding <ACCOUNTNO>.pdf files
        #[arg(long, value_name = "DIR")]
        pdf_dir: PathBuf,

        /// Directory for the output CSV
        #[arg(long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,

        /// Only process accounts of this subtype
        #[arg(long)]
        subtype: Option<String>,

        /// Custom JSON template file (default: built-in templates)
        #[arg(short, long = "templates", value_name = "FILE")]
        templates: Option<PathBuf>,

        /// Also write an .xlsx copy of the output
        #[arg(long)]
        xlsx: bool,
    },
    /// Inspect and validate bill templates
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },
}

#[derive(Subcommand)]
enum TemplatesAction {
    /// List the built-in layouts
    List,
    /// Print the field table of a layout
    Show {
        /// Layout name: new_nama, old_nama or dofar
        layout: String,
    },
    /// Validate a custom template file
    Validate {
        /// Path to JSON template file
        file: PathBuf,
    },
}

fn main() {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            pdf_file,
            account,
            templates,
            output,
            out,
        } => commands::extract::run(pdf_file, account, templates, &output, out),
        Commands::Classify {
            pdf_file,
            templates,
        } => commands::classify::run(pdf_file, templates),
        Commands::Batch {
            accounts,
            pdf_dir,
            out_dir,
            subtype,
            templates,
            xlsx,
        } => commands::batch::run(accounts, pdf_dir, out_dir, subtype, templates, xlsx),
        Commands::Templates { action } => match action {
            TemplatesAction::List => commands::templates::list(),
            TemplatesAction::Show { layout } => commands::templates::show(&layout),
            TemplatesAction::Validate { file } => commands::templates::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
