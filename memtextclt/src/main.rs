use std::env;
extern crate clap;
mod params_parser;

fn main() {
    load_test::run(env::args().collect())
}

mod load_test {
    use crate::params_parser::{self, MemtextClientConfig};
    use env_logger::Builder;
    use log::{error, info};
    use memtextclt::MemcachedClient;
    use std::io::{self, Write};
    use std::net::SocketAddr;
    use std::process;
    use std::thread;
    use std::time::{Duration, Instant};

    fn get_log_level(verbose: u8) -> log::LevelFilter {
        // Vary the output based on how many times the user used the "verbose" flag
        // (i.e. 'myprog -v -v -v' or 'myprog -vvv' vs 'myprog -v'
        match verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }

    pub fn init_logger(cli_config: &MemtextClientConfig) {
        let mut builder = Builder::new();
        builder.filter_level(get_log_level(cli_config.verbose));
        builder.format_module_path(false);
        builder.format_file(false);
        builder.format_source_path(false);
        builder.format_target(false);

        builder.format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "[{}] {style}{:<5}{style:#}: {}",
                buf.timestamp(),
                record.level(),
                record.args()
            )
        });
        builder.init();
    }

    fn request(addr: SocketAddr, input_delay: Duration, lines: &[&str]) -> io::Result<String> {
        MemcachedClient::connect(addr)?
            .with_input_delay(input_delay)
            .resolve_request(lines)
    }

    /// Stores `key1`, then hammers it with `get` from every thread.
    fn load(cli_config: &MemtextClientConfig) -> io::Result<Duration> {
        let addr = SocketAddr::new(cli_config.server_address, cli_config.port);
        let input_delay = Duration::from_millis(cli_config.input_delay);
        request(addr, input_delay, &["set key1 15 0 5", "check"])?;

        let started = Instant::now();
        let workers: Vec<_> = (0..cli_config.threads)
            .map(|_| {
                let clients = cli_config.clients;
                thread::spawn(move || -> io::Result<()> {
                    for _ in 0..clients {
                        request(addr, input_delay, &["get key1"])?;
                    }
                    Ok(())
                })
            })
            .collect();

        for worker in workers {
            match worker.join() {
                Ok(result) => result?,
                Err(_) => return Err(io::Error::other("load thread panicked")),
            }
        }
        Ok(started.elapsed())
    }

    pub fn run(args: Vec<String>) {
        let cli_config = match params_parser::parse(args) {
            Ok(config) => config,
            Err(err) => {
                eprint!("{}", err);
                process::exit(1);
            }
        };

        init_logger(&cli_config);

        info!("Server address: {}", cli_config.server_address);
        info!("Server port: {}", cli_config.port);
        info!("Threads: {}", cli_config.threads);
        info!("Clients per thread: {}", cli_config.clients);

        match load(&cli_config) {
            Ok(elapsed) => {
                println!("Total time: {:.3} ms", elapsed.as_secs_f64() * 1000.0);
                println!("done");
            }
            Err(err) => {
                error!("Load test failed: {}", err);
                process::exit(1);
            }
        }
    }
}
