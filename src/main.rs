use clap::Parser;
use credcore::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Encrypt {
            ref context,
            ref value,
        } => credcore::cli::commands::encrypt::execute(context, value),
        Commands::Decrypt {
            ref context,
            ref envelope,
        } => credcore::cli::commands::decrypt::execute(context, envelope),
        Commands::IssueKey {
            ref environment,
            ref name,
            application,
            user,
            ref permissions,
        } => credcore::cli::commands::issue_key::execute(
            environment,
            name,
            application,
            user,
            permissions,
        ),
    };

    if let Err(e) = result {
        credcore::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
