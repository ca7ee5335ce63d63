/// Centralized argument handling for yieldwatch
///
/// Features:
/// - Centralized CMD_ARGS storage with thread-safe access
/// - Flag and value lookup helpers
/// - Validation for the numeric overrides
use crate::logger::LogTag;
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
/// Thread-safe singleton that stores arguments for access throughout the application
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Sets the global command-line arguments
/// Used by tests to override the default env::args() collection
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Gets a copy of the current command-line arguments
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => {
            // Fallback to env::args if mutex is poisoned
            env::args().collect()
        }
    }
}

/// Checks if a specific argument is present in the command line
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Gets the value of a command-line argument that follows a flag
/// Returns None if the flag is not found or has no value
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    for (i, arg) in args.iter().enumerate() {
        if arg == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

pub fn is_help_requested() -> bool {
    has_arg("--help") || has_arg("-h")
}

/// Single refresh, print the top yields, exit
pub fn is_once_enabled() -> bool {
    has_arg("--once")
}

pub fn get_config_path_override() -> Option<String> {
    get_arg_value("--config")
}

pub fn get_host_override() -> Option<String> {
    get_arg_value("--host")
}

/// Parsed --port value; invalid values are reported by [`validate_overrides`]
pub fn get_port_override() -> Option<u16> {
    get_arg_value("--port").and_then(|v| v.parse::<u16>().ok())
}

/// Parsed --interval value in seconds
pub fn get_interval_override() -> Option<u64> {
    get_arg_value("--interval").and_then(|v| v.parse::<u64>().ok())
}

/// Validate numeric overrides before anything starts
pub fn validate_overrides() -> Result<(), String> {
    if let Some(raw) = get_arg_value("--port") {
        match raw.parse::<u16>() {
            Ok(0) | Err(_) => {
                return Err(format!(
                    "Invalid --port value '{}': expected a number between 1 and 65535",
                    raw
                ))
            }
            Ok(_) => {}
        }
    }

    if let Some(raw) = get_arg_value("--interval") {
        match raw.parse::<u64>() {
            Ok(0) | Err(_) => {
                return Err(format!(
                    "Invalid --interval value '{}': expected a positive number of seconds",
                    raw
                ))
            }
            Ok(_) => {}
        }
    }

    Ok(())
}

pub fn print_help() {
    println!("yieldwatch - cached yield rankings from the DefiLlama pools feed");
    println!();
    println!("USAGE:");
    println!("    yieldwatch [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --config <path>      Configuration file (default: config.toml)");
    println!("    --host <host>        Webserver bind host override");
    println!("    --port <port>        Webserver port override");
    println!("    --interval <secs>    Refresh interval override");
    println!("    --once               Refresh once, print the top yields and exit");
    println!("    --verbose            Enable verbose logging");
    println!("    --quiet              Only warnings and errors");
    println!("    --log-level=<level>  Most detailed level printed (error, warn, info, debug, verbose)");
    let modules: Vec<String> = LogTag::all().iter().map(|tag| tag.to_debug_key()).collect();
    println!(
        "    --debug-<module>     Debug logs for one module ({}, all)",
        modules.join(", ")
    );
    println!("    --no-file-log        Do not write logs/yieldwatch.log");
    println!("    -h, --help           Print this help");
}
