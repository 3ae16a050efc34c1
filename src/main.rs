use clap::Parser;
use openkey_lib::cli::{Cli, Commands, Connection};
use openkey_lib::AppError;
use std::process;

fn main() {
    let cli = Cli::parse();

    // 默认只显示错误日志，避免干扰命令输出和 TUI
    let log_level = if cli.verbose { "debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let conn = Connection::resolve(&cli);
    match cli.command {
        // Default to the settings page if no command is provided
        None | Some(Commands::Ui) => openkey_lib::cli::tui::run(&conn),
        Some(Commands::Show { provider }) => {
            openkey_lib::cli::commands::provider::show(&conn, provider.as_deref())
        }
        Some(Commands::Use { provider }) => {
            openkey_lib::cli::commands::provider::use_provider(&conn, &provider)
        }
        Some(Commands::Set { provider, pairs }) => {
            openkey_lib::cli::commands::provider::set_fields(&conn, &provider, &pairs)
        }
        Some(Commands::Edit { provider }) => {
            openkey_lib::cli::interactive::edit(&conn, provider.as_deref())
        }
        Some(Commands::Config(cmd)) => openkey_lib::cli::commands::config::execute(cmd, &conn),
        Some(Commands::Completions { shell }) => {
            openkey_lib::cli::generate_completions(shell);
            Ok(())
        }
    }
}
