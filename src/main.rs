use clap::Parser;
use visual_sentinel::commands::{self, Cli, Commands};
use visual_sentinel::config::ValidatorConfig;

fn main() {
    let cli = Cli::parse();

    let project_root = ValidatorConfig::find_project_root()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    match cli.command {
        Commands::Validate {
            snapshot,
            format,
            delay_ms,
            no_save,
        } => {
            commands::validate::handle_validate(&project_root, &snapshot, &format, delay_ms, !no_save);
        }
        Commands::Watch { snapshot } => {
            commands::watch::start_watch(&project_root, &snapshot);
        }
        Commands::Rules { category } => {
            commands::rules::handle_rules_command(&project_root, category.as_deref());
        }
        Commands::Report { format } => {
            commands::report::handle_report_command(&project_root, &format);
        }
    }
}
