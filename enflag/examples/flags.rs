//! Example demonstrating a custom flag backend
//!
//! Flag parsing belongs to the host; the loader only needs a lookup. Here
//! the backend is a plain map, standing in for whatever the host parsed
//! from its command line.

use std::collections::HashMap;

use enflag::{Enflag, Loader};

#[derive(Debug, Default, Enflag)]
struct Config {
    #[conf(flag = "port,p", default = "8080", usage = "listen port")]
    pub port: u16,

    #[conf(flag = "log-level", default = "info")]
    pub log_level: String,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("PORT", "8085");

    let parsed_flags: HashMap<String, String> =
        [("port".to_string(), "9000".to_string())].into_iter().collect();

    let loader = Loader::new().flags(parsed_flags);

    println!("Registerable fields:");
    for descriptor in loader.descriptors::<Config>() {
        if let Some(flag) = &descriptor.flag_name {
            println!("  --{flag}: {}", descriptor.usage);
        }
    }

    let mut config = Config::default();
    loader.load(&mut config)?;

    println!("Resolved configuration:");
    println!("  Port: {} (flag wins over PORT=8085)", config.port);
    println!("  Log level: {}", config.log_level);

    Ok(())
}
