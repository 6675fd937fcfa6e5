pub mod manifest;
mod query;
mod report;
mod schema;
pub mod session;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "declscope",
    version,
    about = "Inspect package existence and declaration resolution for a workspace",
    long_about = "Declscope loads a JSON workspace manifest into an in-memory index and answers \
                  the questions a compiler front end asks while resolving names: which packages \
                  exist in a module, what a package declares, and why a lookup came back empty."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Manifest and module every query runs against.
#[derive(Args, Debug, Clone)]
pub struct Target {
    /// Path to the workspace manifest (JSON)
    #[arg(short, long, value_name = "MANIFEST")]
    pub manifest: PathBuf,
    /// Name of the module to query
    #[arg(short = 'M', long, value_name = "MODULE")]
    pub module: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check whether a package exists in a module
    Exists {
        #[command(flatten)]
        target: Target,
        /// Dotted package name. Empty for the root package.
        #[arg(value_name = "PACKAGE", default_value = "")]
        package: String,
    },
    /// List the packages of a module
    #[command(
        long_about = "Lists every package that exists in the module's indexed sources, \
                            including implied parent packages. With --under, lists only the \
                            direct sub-packages of the given package."
    )]
    Packages {
        #[command(flatten)]
        target: Target,
        /// Only list direct children of this package
        #[arg(long, value_name = "PACKAGE")]
        under: Option<String>,
    },
    /// Resolve the declarations of a package
    Resolve {
        #[command(flatten)]
        target: Target,
        /// Dotted package name
        #[arg(value_name = "PACKAGE")]
        package: String,
        /// Only show declarations with this short name
        #[arg(long)]
        name: Option<String>,
    },
    /// List the members of a class-like declaration
    Class {
        #[command(flatten)]
        target: Target,
        /// Fully qualified class name
        #[arg(value_name = "FQ_NAME")]
        fq_name: String,
    },
    /// Produce a diagnostic report for a package that failed to resolve
    Report {
        #[command(flatten)]
        target: Target,
        /// Dotted package name
        #[arg(value_name = "PACKAGE")]
        package: String,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the JSON schema of the workspace manifest
    Schema,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = declscope_core::logging::init_logging("cli", false);

    match cli.command {
        Commands::Exists { target, package } => query::exists(&target, &package),
        Commands::Packages { target, under } => query::packages(&target, under.as_deref()),
        Commands::Resolve {
            target,
            package,
            name,
        } => query::resolve(&target, &package, name.as_deref()),
        Commands::Class { target, fq_name } => query::class(&target, &fq_name),
        Commands::Report {
            target,
            package,
            json,
        } => report::run(&target, &package, json),
        Commands::Schema => schema::run(),
    }
}
