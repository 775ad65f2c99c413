use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pkglog::config::GlobalConfig;
use pkglog::database::{PackageDatabase, PackageSort};
use pkglog::package::{FileSort, PackageLog};
use pkglog::query;

#[derive(Parser)]
#[command(name = "pkglog", about = "inspect and unregister package install logs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log directory (overrides config and PKGLOG_LOG_DIR)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Reduce log output (show warnings/errors only)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List logged packages with size, file count and install date
    List {
        /// Sort by name, size, files, missing or date
        #[arg(long, short, default_value = "name")]
        sort: PackageSort,

        /// Reverse the sort order
        #[arg(long, short)]
        reverse: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the files logged by a package
    Files {
        /// Package name or base name
        package: String,

        /// Sort by name or size
        #[arg(long, short, default_value = "name")]
        sort: FileSort,

        /// Reverse the sort order
        #[arg(long, short)]
        reverse: bool,
    },
    /// Show package metadata
    Info {
        /// Package name or base name
        package: String,
    },
    /// Print the configure options a package was built with
    ConfOpts {
        /// Package name or base name
        package: String,
    },
    /// Find which packages logged a file
    Owner {
        /// Absolute file path
        file: String,
    },
    /// Unregister packages by deleting their logs
    Remove {
        /// Package names
        #[arg(required = true)]
        packages: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut filter = if cli.quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::new("info")
    };
    if cli.verbose > 0 {
        filter = EnvFilter::new("debug");
    }
    if cli.verbose > 1 {
        filter = EnvFilter::new("trace");
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = GlobalConfig::load(cli.config.as_deref())
        .context("failed to load config")?;
    if let Some(dir) = cli.log_dir {
        config.general.log_dir = dir;
    }
    config.check_log_dir().context("invalid log directory")?;

    let mut db = PackageDatabase::open(&config.general.log_dir)
        .context("failed to read log directory")?;

    match cli.command {
        Commands::List { sort, reverse, json } => {
            db.sort(sort, reverse);
            if json {
                query::print_package_json(&db)?;
            } else if db.is_empty() {
                println!("no packages logged");
            } else {
                query::print_package_list(&db);
            }
        }
        Commands::Files { package, sort, reverse } => {
            let name = resolve(&db, &package)?;
            let pkg = db.get_mut(&name)
                .context("package vanished from database")?;
            pkg.sort_files(sort, reverse);
            query::print_files(pkg, std::io::stdout().is_terminal());
        }
        Commands::Info { package } => {
            let name = resolve(&db, &package)?;
            if let Some(pkg) = db.get(&name) {
                println!("{}", query::info_block(pkg));
            }
        }
        Commands::ConfOpts { package } => {
            let name = resolve(&db, &package)?;
            if let Some(pkg) = db.get(&name) {
                println!("{}", pkg.info().conf_opts);
            }
        }
        Commands::Owner { file } => {
            let owners = db.find_by_path(&file);
            query::print_owners(&file, &owners);
            if owners.is_empty() {
                std::process::exit(1);
            }
        }
        Commands::Remove { packages } => {
            for name in &packages {
                match db.remove(name) {
                    Ok(()) => println!("removed: {}", name),
                    Err(e) => {
                        eprintln!("error removing {}: {}", name, e);
                        std::process::exit(1);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Map a name or base name to exactly one logged package, exiting when it
/// matches none or several.
fn resolve(db: &PackageDatabase, query: &str) -> Result<String> {
    let matches: Vec<&PackageLog> = db.find_by_name(query);
    match matches.as_slice() {
        [pkg] => Ok(pkg.name().to_string()),
        [] => {
            eprintln!("package '{}' is not logged", query);
            std::process::exit(1);
        }
        several => {
            let names: Vec<&str> = several.iter().map(|p| p.name()).collect();
            eprintln!("'{}' matches several packages: {}", query, names.join(", "));
            std::process::exit(1);
        }
    }
}
