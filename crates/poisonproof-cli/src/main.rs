// poisonproof CLI entry point

use std::process::ExitCode;

use clap::Parser;
use poisonproof_cli::{commands, logging, output, Cli, Commands};

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let style = output::OutputStyle::default();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Scan { paths, format } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let ingest = commands::load_ingest_config(cli.ingest_config.as_deref())?;
            let summary = commands::run_scan(&paths, &ingest, &config, format, &style, &mut out)?;
            if summary.failed > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Profile { path, format } => {
            commands::run_profile(&path, format, &style, &mut out)?;
        }
        Commands::Generate {
            rows,
            anomalies,
            seed,
            output,
        } => {
            commands::run_generate(rows, anomalies, seed, &output, &style, &mut out)?;
        }
        Commands::Config => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::run_config(&config, &mut out)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
