use std::io;

use clap::Parser;
use nestegg::api::cli::{Cli, CliError, Command, run_project, run_prompt, run_required};

fn init_logging(filter: &str) {
    env_logger::Builder::new()
        .parse_filters(filter)
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let outcome = match cli.command {
        Command::Serve(args) => nestegg::api::run_http_server(args.socket_addr())
            .await
            .map_err(CliError::from),
        Command::Project(args) => run_project(&args, &mut io::stdout().lock()),
        Command::Required(args) => run_required(&args, &mut io::stdout().lock()),
        Command::Prompt(args) => run_prompt(&args, &mut io::stdin().lock(), &mut io::stdout().lock()),
    };

    if let Err(e) = outcome {
        log::debug!("command failed: {e:?}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
