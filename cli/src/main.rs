mod commands;
mod terminal;

use commands::{CommandLine, Commands, resolve, scan};
use invscan_common::config::Config;
use terminal::{print, progress};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    if commands.no_color {
        colored::control::set_override(false);
    }
    progress::init_logging();

    let cfg = Config {
        quiet: commands.quiet,
    };

    match commands.command {
        Commands::Scan(args) => {
            print::header("starting inventory scan", cfg.quiet);
            scan::scan(args, &commands.powershell, &cfg).await
        }
        Commands::Resolve(args) => {
            print::header("resolving hosts", cfg.quiet);
            resolve::resolve(args, &commands.powershell, &cfg).await
        }
    }
}
