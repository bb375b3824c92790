use crate::version::MEMTEXT_VERSION;
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::RangeInclusive;

const DEFAULT_PORT: u16 = 11211;
const DEFAULT_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const LISTEN_BACKLOG: u32 = 1024;
const EXPIRATION_CHECK_INTERVAL_MS: u64 = 100;
const EXPIRATION_CHECKS_PER_CYCLE: usize = 20;

#[derive(Parser, Debug, Clone)]
#[command(author, version = MEMTEXT_VERSION, about, long_about = None)]
/// memtextd - memcached text protocol compatible cache server
pub struct MemtextConfig {
    #[arg(short, long, value_name = "PORT", value_parser = port_in_range, default_value_t = DEFAULT_PORT)]
    /// TCP port to listen on
    pub port: u16,

    #[arg(short, long = "listen", value_name = "ADDRESS", default_value_t = DEFAULT_ADDRESS)]
    /// interface to listen on
    pub listen_address: IpAddr,

    #[arg(short = 'b', long = "listen-backlog", value_name = "BACKLOG", default_value_t = LISTEN_BACKLOG)]
    /// set the backlog queue limit
    pub backlog_limit: u32,

    #[arg(short, long, action = clap::ArgAction::Count)]
    /// sets the level of verbosity
    pub verbose: u8,

    #[arg(long, value_name = "MILLISECONDS", value_parser = clap::value_parser!(u64).range(1..), default_value_t = EXPIRATION_CHECK_INTERVAL_MS)]
    /// how often expired keys are purged in the background
    pub expiration_check_interval: u64,

    #[arg(long, value_name = "KEYS", value_parser = checks_in_range, default_value_t = EXPIRATION_CHECKS_PER_CYCLE)]
    /// max number of keys examined by one background purge
    pub expiration_checks_per_cycle: usize,
}

const PORT_RANGE: RangeInclusive<usize> = 1..=65535;

fn port_in_range(s: &str) -> Result<u16, String> {
    let port: usize = s
        .parse()
        .map_err(|_| format!("`{s}` isn't a port number"))?;
    if PORT_RANGE.contains(&port) {
        Ok(port as u16)
    } else {
        Err(format!(
            "port not in range {}-{}",
            PORT_RANGE.start(),
            PORT_RANGE.end()
        ))
    }
}

fn checks_in_range(s: &str) -> Result<usize, String> {
    let checks: usize = s
        .parse()
        .map_err(|_| format!("`{s}` isn't a number of keys"))?;
    if checks == 0 {
        return Err(String::from("at least one key has to be checked per cycle"));
    }
    Ok(checks)
}

impl MemtextConfig {
    fn from_args(args: Vec<String>) -> Result<MemtextConfig, String> {
        MemtextConfig::try_parse_from(args.iter()).map_err(|err| err.to_string())
    }
}

pub fn parse(args: Vec<String>) -> Result<MemtextConfig, String> {
    MemtextConfig::from_args(args)
}
