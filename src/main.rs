use clap::Parser;
use credentials::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Edit { ref editor } => {
            credentials::cli::commands::edit::execute(&cli, editor.as_deref())
        }
        Commands::Show => credentials::cli::commands::show::execute(&cli),
    };

    if let Err(e) = result {
        credentials::output::error(&e.to_string());
        std::process::exit(1);
    }
}
