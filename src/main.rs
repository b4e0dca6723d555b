use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use kdeps::{DepOptions, Options};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Plain,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Import-dependency queries for KCL config trees", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output format
    #[arg(long, value_enum, default_value = "plain", global = true)]
    format: Format,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the source files of the application at PATH
    Files {
        /// Application directory (its package root is discovered upward)
        path: String,

        /// Include transitive dependency files
        #[arg(long)]
        all: bool,

        /// Print absolute paths
        #[arg(long)]
        abs: bool,
    },
    /// List the packages the application at PATH imports
    Packages {
        path: String,

        /// Include the transitive closure
        #[arg(long)]
        all: bool,
    },
    /// List everything the given files transitively import
    Upstream {
        /// Tree root
        path: String,

        /// Seed file, root-relative (repeatable)
        #[arg(long = "file", required = true)]
        files: Vec<String>,
    },
    /// List files and packages affected by the given changes
    Downstream {
        /// Tree root
        path: String,

        /// Seed file, root-relative (repeatable)
        #[arg(long = "file", required = true)]
        files: Vec<String>,

        /// Changed path, root-relative (repeatable; may name deleted files)
        #[arg(long = "changed", required = true)]
        changed: Vec<String>,
    },
    /// Classify every application under PATH as touched or untouched
    Apps {
        /// Tree root
        path: String,

        /// Changed path, root-relative (repeatable)
        #[arg(long = "changed")]
        changed: Vec<String>,

        /// Tolerate packages that match no source files
        #[arg(long)]
        ignore_errors: bool,

        /// Treat kcl.mod dependencies as graph boundaries
        #[arg(long)]
        exclude_external: bool,
    },
}

#[derive(Serialize)]
struct AppsReport {
    touched: Vec<String>,
    untouched: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Files { path, all, abs } => {
            let opts = Options {
                all,
                use_abs_path: abs,
                ..Default::default()
            };
            let files = kdeps::list_dep_files(&path, Some(&opts))
                .with_context(|| format!("listing files of {path}"))?;
            print_list(&files, args.format)?;
        }
        Command::Packages { path, all } => {
            let opts = Options {
                all,
                ..Default::default()
            };
            let pkgs = kdeps::list_dep_packages(&path, Some(&opts))
                .with_context(|| format!("listing packages of {path}"))?;
            print_list(&pkgs, args.format)?;
        }
        Command::Upstream { path, files } => {
            let opts = DepOptions {
                files,
                changed_paths: Vec::new(),
            };
            let up = kdeps::list_upstream_files(&path, &opts)
                .with_context(|| format!("listing upstream of seeds in {path}"))?;
            print_list(&up, args.format)?;
        }
        Command::Downstream {
            path,
            files,
            changed,
        } => {
            let opts = DepOptions {
                files,
                changed_paths: changed,
            };
            let down = kdeps::list_downstream_files(&path, &opts)
                .with_context(|| format!("listing downstream of changes in {path}"))?;
            print_list(&down, args.format)?;
        }
        Command::Apps {
            path,
            changed,
            ignore_errors,
            exclude_external,
        } => {
            let opts = Options {
                ignore_errors,
                exclude_external,
                ..Default::default()
            };
            let (touched, untouched) = kdeps::list_touched_apps(&path, &changed, Some(&opts))
                .with_context(|| format!("classifying applications under {path}"))?;
            match args.format {
                Format::Plain => {
                    for app in &touched {
                        println!("touched   {app}");
                    }
                    for app in &untouched {
                        println!("untouched {app}");
                    }
                }
                Format::Json => {
                    let report = AppsReport { touched, untouched };
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
            }
        }
    }

    Ok(())
}

fn print_list(items: &[String], format: Format) -> Result<()> {
    match format {
        Format::Plain => {
            for item in items {
                println!("{item}");
            }
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(items)?),
    }
    Ok(())
}
