use clap::Parser;
use sitecover_cli::cli::{Cli, Commands};
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::FmtSubscriber;

mod commands;

use crate::commands::evaluate::EvaluateArgs;
use crate::commands::solve::SolveArgs;
use crate::commands::util::{configure_threads, exit_code};
use crate::commands::{baseline, cost_matrix, evaluate, export_sites, plan, solve};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {err}");
    }

    match run(&cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(command: &Commands) -> anyhow::Result<()> {
    debug!(?command, "dispatching");
    match command {
        Commands::CostMatrix {
            demand,
            candidates,
            out,
            layers,
            threads,
        } => {
            configure_threads(threads);
            cost_matrix::handle(demand, candidates, out, layers)
        }
        Commands::Baseline {
            demand,
            supply,
            threshold,
            out,
            layers,
            threads,
        } => {
            configure_threads(threads);
            baseline::handle(demand, supply, *threshold, out, layers)
        }
        Commands::Solve {
            cost_matrix,
            demand,
            supply,
            out,
            report,
            config,
            solver,
            layers,
        } => solve::handle(SolveArgs {
            cost_matrix,
            demand: demand.as_ref(),
            supply: supply.as_ref(),
            out,
            report: report.as_ref(),
            config: config.as_ref(),
            solver,
            layers,
        }),
        Commands::Evaluate {
            demand,
            candidates,
            supply,
            solution,
            threshold,
            out,
            compare,
            before,
            layers,
            threads,
        } => {
            configure_threads(threads);
            evaluate::handle(EvaluateArgs {
                demand,
                candidates,
                supply: supply.as_ref(),
                solution,
                threshold: *threshold,
                out,
                compare: compare.as_ref(),
                before: before.as_ref(),
                layers,
            })
        }
        Commands::ExportSites {
            candidates,
            solution,
            out,
            crs,
        } => export_sites::handle(candidates, solution, out, crs.as_deref()),
        Commands::Plan {
            config,
            output_dir,
            dump_config,
            solver,
        } => plan::handle(config, output_dir.as_ref(), *dump_config, solver),
    }
}
