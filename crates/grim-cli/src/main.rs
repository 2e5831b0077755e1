use clap::Parser;
use grim_cli::cli::{build_cli_command, Cli, Commands};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod commands;

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("could not install log subscriber: {e}");
    }

    let result = match &cli.command {
        Some(Commands::Optimize {
            scenario,
            solver,
            threads,
        }) => commands::optimize::handle(scenario, solver.as_deref(), *threads),
        Some(Commands::Validate { scenario }) => commands::validate::handle(scenario),
        Some(Commands::Ptdf { lines, nodes, out }) => commands::ptdf::handle(lines, *nodes, out),
        None => {
            let mut cmd = build_cli_command();
            if let Err(e) = cmd.print_help() {
                eprintln!("{e}");
            }
            println!();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("{:#}", err);
        eprintln!("Error: {:#}", err);
        std::process::exit(commands::exit_code(&err));
    }
}
