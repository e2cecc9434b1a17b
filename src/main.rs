use clap::Parser;
use env_logger::Env;

mod cmd;

fn main() {
    let cli = cmd::Cli::parse();
    let default_filter = if cli.command.verbose() { "info" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = cli.command.run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
