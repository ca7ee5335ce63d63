//! Configuration system
//!
//! TOML file with embedded defaults (see `schemas`), loaded once at startup
//! and read through `with_config` / `get_config_clone`.

#[macro_use]
mod macros;
mod schemas;
mod utils;

pub use schemas::{
    Config, NamedConfig, NamedProtocol, QueryConfig, RefreshConfig, UpstreamConfig,
    WebserverConfig,
};
pub use utils::{
    apply_cli_overrides, config_path, get_config_clone, load_config, parse_config,
    read_config_file, set_config, with_config, CONFIG_FILE_PATH,
};
