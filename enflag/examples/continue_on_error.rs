//! Example demonstrating best-effort loading
//!
//! With fail_on_error(false) every field error is logged as a warning and
//! the load keeps going, producing a partially populated structure.

use enflag::{Enflag, Loader};

#[derive(Debug, Default, Enflag)]
struct Config {
    #[conf(default = "svc")]
    pub name: String,

    pub port: u16,

    #[conf(required)]
    pub api_key: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    std::env::set_var("PORT", "not-a-number");
    std::env::remove_var("API_KEY");

    let mut config = Config::default();
    Loader::new().fail_on_error(false).load(&mut config)?;

    // Both errors were logged; the rest of the structure is usable.
    println!("Best-effort configuration:");
    println!("  Name: {}", config.name);
    println!("  Port: {} (left at zero)", config.port);
    println!("  API key: {:?} (left empty)", config.api_key);

    Ok(())
}
