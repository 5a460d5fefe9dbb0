//! Basic example: environment variables and defaults

use enflag::Enflag;

#[derive(Debug, Default, Enflag)]
struct Config {
    // DATABASE_URL
    pub database_url: String,

    #[conf(default = "8080")]
    pub port: u16,

    #[conf(default = "false")]
    pub debug: bool,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("DATABASE_URL", "postgres://localhost/db");
    std::env::set_var("DEBUG", "true");
    // PORT is not set, so the default applies.

    let mut config = Config::default();
    enflag::load(&mut config)?;

    println!("Basic configuration:");
    println!("  Database URL: {}", config.database_url);
    println!("  Port: {}", config.port);
    println!("  Debug: {}", config.debug);

    Ok(())
}
