use yieldwatch::{
    arguments::{is_help_requested, is_once_enabled, print_help, validate_overrides},
    logger::{self, LogTag},
};

/// Main entry point for yieldwatch
///
/// - `--once`: refresh a single time, print the top yields, exit
/// - default: background refresh plus the HTTP API until Ctrl+C / SIGTERM
#[tokio::main]
async fn main() {
    if is_help_requested() {
        print_help();
        std::process::exit(0);
    }

    logger::init();

    if let Err(e) = validate_overrides() {
        logger::error(LogTag::System, &format!("Argument validation failed: {}", e));
        logger::flush();
        std::process::exit(2);
    }

    let exit_code = if is_once_enabled() {
        match yieldwatch::run::run_once_mode().await {
            Ok(()) => 0,
            Err(e) => {
                logger::error(LogTag::System, &format!("{:#}", e));
                1
            }
        }
    } else {
        match yieldwatch::run::run_service().await {
            Ok(()) => {
                logger::info(LogTag::System, "yieldwatch stopped");
                0
            }
            Err(e) => {
                logger::error(LogTag::System, &format!("yieldwatch failed: {}", e));
                1
            }
        }
    };

    logger::flush();
    std::process::exit(exit_code);
}
