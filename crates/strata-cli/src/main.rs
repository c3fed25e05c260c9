mod cli;
mod run;

use std::process::ExitCode;

use clap::Parser;

use cli::{Cli, Command};
use strata_observe::init_local_offset;

fn main() -> ExitCode {
    let cli = Cli::parse();
    // The local offset can only be read safely while single-threaded.
    init_local_offset();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("strata: cannot start runtime: {e}");
            return run::error_exit();
        }
    };

    let result = runtime.block_on(async {
        match cli.command {
            Command::Run(args) => run::run(args).await,
            Command::Check { config } => run::check(&config),
            Command::Stages => {
                run::stages();
                Ok(ExitCode::SUCCESS)
            }
        }
    });

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("strata: {e:#}");
            run::error_exit()
        }
    }
}
