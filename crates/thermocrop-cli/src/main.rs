mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "thermocrop", about = "Plant temperature statistics from thermal images")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the sample identity parsed from filenames
    Parse(commands::parse::ParseArgs),
    /// Compute temperature statistics for one sample
    Analyze(commands::analyze::AnalyzeArgs),
    /// Analyze every thermal/visual pair in a directory
    Batch(commands::batch::BatchArgs),
    /// Print the default analysis config, or check a config file
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Parse(args) => commands::parse::run(args),
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Batch(args) => commands::batch::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn batch_prints_results_only() {
        let cli = Cli::try_parse_from(["thermocrop", "batch", "samples", "--roi", "0,0,10,10"]);
        assert!(matches!(cli.map(|c| c.command), Ok(Commands::Batch(_))));

        let with_export = Cli::try_parse_from([
            "thermocrop",
            "batch",
            "samples",
            "--roi",
            "0,0,10,10",
            "--csv",
            "out.csv",
        ]);
        assert!(with_export.is_err());
    }

    #[test]
    fn analyze_needs_a_region() {
        assert!(Cli::try_parse_from(["thermocrop", "analyze", "img.jpg"]).is_err());
        assert!(
            Cli::try_parse_from(["thermocrop", "analyze", "img.jpg", "--roi", "1,2,3,4"]).is_ok()
        );
    }
}
