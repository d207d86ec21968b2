//! webshell launcher - prepare the runtime sandbox helper and start the app

mod cli;
mod logging;
mod runner;

use cli::Cli;
use console::style;
use runner::run_launcher;
use webshell_launch::LauncherConfig;

fn main() {
    let cli = Cli::from_argv(std::env::args_os());

    let config = match LauncherConfig::from_process(cli.args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    logging::init_logger(config.verbose);

    std::process::exit(run_launcher(config));
}
