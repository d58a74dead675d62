use std::path::PathBuf;

use clap::Parser;
use ormjoin::{config, generation};

/// ormjoin - join planner for generated ORM accessors
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Schema definition file (YAML)
    #[arg(long = "src")]
    source: Option<PathBuf>,

    /// Output directory for the generated join plan
    #[arg(long = "dst")]
    destination: Option<PathBuf>,

    /// Package name of the generated code
    #[arg(long)]
    package: Option<String>,

    /// Maximum number of tables joined together (1 disables joins)
    #[arg(long)]
    join_num: Option<usize>,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

impl From<Cli> for config::CliOverrides {
    fn from(cli: Cli) -> Self {
        config::CliOverrides {
            source: cli.source,
            destination: cli.destination,
            package: cli.package,
            join_num: cli.join_num,
            compact: cli.compact,
        }
    }
}

fn main() {
    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Flags given on the command line win; only unset ones are read from the environment
    let overrides: config::CliOverrides = cli.into();
    let config = match overrides
        .resolve()
        .and_then(config::GeneratorConfig::from_cli)
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    match generation::run_with_config(&config) {
        Ok(report) => println!(
            "Planned {} tables and {} joined tables -> {}",
            report.table_count,
            report.joined_table_count,
            report.output_path.display()
        ),
        Err(e) => {
            eprintln!("Generation failed: {}", e);
            std::process::exit(1);
        }
    }
}
