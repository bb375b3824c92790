use crate::memcache;
use crate::memcache::cli::parser::MemtextConfig;
use crate::memcache_server::reactor::MemtextServerConfig;
use crate::memcache_server::runtime_builder;
use crate::server::timer;
use log::{error, info};
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing_log::LogTracer;

fn get_log_level(verbose: u8) -> tracing::Level {
    // Vary the output based on how many times the user used the "verbose" flag
    // (i.e. 'myprog -v -v -v' or 'myprog -vvv' vs 'myprog -v'
    match verbose {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

impl From<&MemtextConfig> for MemtextServerConfig {
    fn from(config: &MemtextConfig) -> Self {
        MemtextServerConfig::new(
            config.listen_address,
            config.port,
            config.backlog_limit,
            Duration::from_millis(config.expiration_check_interval),
            config.expiration_checks_per_cycle,
        )
    }
}

pub fn run(args: Vec<String>) {
    let cli_config = match memcache::cli::parser::parse(args) {
        Ok(config) => config,
        Err(err) => {
            eprint!("{}", err);
            process::exit(1);
        }
    };

    if let Err(err) = LogTracer::init() {
        eprintln!("Cannot initialize logger: {}", err);
    }
    if let Err(err) = tracing_subscriber::fmt()
        .with_max_level(get_log_level(cli_config.verbose))
        .try_init()
    {
        eprintln!("Cannot initialize tracing subscriber: {}", err);
    }

    info!("Listen address: {}", cli_config.listen_address);
    info!("Listen port: {}", cli_config.port);
    info!("Listen backlog: {}", cli_config.backlog_limit);
    info!(
        "Expiration check interval: {} ms",
        cli_config.expiration_check_interval
    );
    info!(
        "Expiration checks per cycle: {}",
        cli_config.expiration_checks_per_cycle
    );

    let system_timer: Arc<timer::SystemTimer> = Arc::new(timer::SystemTimer::new());
    let server_config = MemtextServerConfig::from(&cli_config);
    if let Err(err) = runtime_builder::run_memtext_server(server_config, system_timer) {
        error!("Server stopped: {}", err);
        process::exit(1);
    }
}
