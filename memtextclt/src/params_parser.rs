use clap::Parser;
use std::{fmt::Debug, net::IpAddr, net::Ipv4Addr, ops::RangeInclusive};

const DEFAULT_PORT: u16 = 11211;
const DEFAULT_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_THREADS: usize = 10;
const DEFAULT_CLIENTS: usize = 150;
const DEFAULT_INPUT_DELAY_MS: u64 = 20;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
/// load generator for memcached text protocol servers
pub struct MemtextClientConfig {
    #[arg(short, long, value_name = "PORT", value_parser = port_in_range, default_value_t = DEFAULT_PORT)]
    /// TCP port the server listens on
    pub port: u16,

    #[arg(short, long, value_name = "ADDRESS", default_value_t = DEFAULT_ADDRESS)]
    /// server address
    pub server_address: IpAddr,

    #[arg(short, long, value_name = "THREADS", default_value_t = DEFAULT_THREADS)]
    /// number of concurrent threads
    pub threads: usize,

    #[arg(short, long, value_name = "CLIENTS", default_value_t = DEFAULT_CLIENTS)]
    /// connections opened one after another by every thread
    pub clients: usize,

    #[arg(short, long, value_name = "MILLISECONDS", default_value_t = DEFAULT_INPUT_DELAY_MS)]
    /// pause after every line sent
    pub input_delay: u64,

    #[arg(short, long, action = clap::ArgAction::Count, default_value_t = 2)]
    /// sets the level of verbosity
    pub verbose: u8,
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

impl MemtextClientConfig {
    fn from_args(args: Vec<String>) -> Result<MemtextClientConfig, String> {
        MemtextClientConfig::try_parse_from(args.iter()).map_err(|err| err.to_string())
    }
}

pub fn parse(args: Vec<String>) -> Result<MemtextClientConfig, String> {
    MemtextClientConfig::from_args(args)
}
