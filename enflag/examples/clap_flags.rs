//! Example demonstrating clap as the flag backend
//!
//! The loader's descriptors drive flag registration, clap does the
//! parsing, and the resulting ArgMatches answers flag lookups.

use clap::{Arg, Command};
use enflag::{Enflag, Loader};

#[derive(Debug, Default, Enflag)]
struct Config {
    #[conf(flag = "port", default = "8080", usage = "listen port")]
    pub port: u16,

    #[conf(flag = "workers", default = "1,2", usage = "worker ids")]
    pub workers: Vec<u32>,
}

fn main() -> anyhow::Result<()> {
    let loader = Loader::new();

    let mut command = Command::new("clap_flags");
    for descriptor in loader.descriptors::<Config>() {
        if let Some(flag) = descriptor.flag_name {
            command = command.arg(Arg::new(flag.clone()).long(flag).help(descriptor.usage));
        }
    }

    // Stand-in for std::env::args_os().
    let matches = command.get_matches_from(["clap_flags", "--port", "9000"]);

    let mut config = Config::default();
    loader.flags(matches).load(&mut config)?;

    println!("Configuration parsed through clap:");
    println!("  Port: {}", config.port);
    println!("  Workers: {:?}", config.workers);

    Ok(())
}
