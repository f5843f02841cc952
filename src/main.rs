use clap::Parser;
use feedvault::cli::commands::Cli;
use feedvault::cli::handlers;

fn main() {
    let cli = Cli::parse();

    match cli.command {
        None => {
            // No subcommand → launch TUI
            let data_dir = match handlers::resolve_data_dir(cli.data_dir.as_deref()) {
                Ok(dir) => dir,
                Err(e) => {
                    eprintln!("error: {}", e);
                    std::process::exit(1);
                }
            };
            if let Err(e) = feedvault::tui::run(&data_dir) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(_) => {
            if let Err(e) = handlers::dispatch(cli) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
