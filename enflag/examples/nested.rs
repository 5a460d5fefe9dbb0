//! Example demonstrating nested structures and name prefixes

use std::time::Duration;

use enflag::{Enflag, Loader};

#[derive(Debug, Default, Enflag)]
struct Config {
    #[conf(default = "api")]
    pub service_name: String,

    // Descendants resolve as MYAPP_DB_*
    #[conf(nested, prefix = "DB_")]
    pub database: DbConfig,

    // No prefix override: descendants resolve as MYAPP_METRICS_*
    #[conf(nested)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Default, Enflag)]
struct DbConfig {
    #[conf(default = "localhost")]
    pub host: String,

    #[conf(default = "5432")]
    pub port: u16,
}

#[derive(Debug, Default, Enflag)]
struct MetricsConfig {
    #[conf(default = "10s")]
    pub flush_interval: Duration,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("MYAPP_DB_HOST", "db.internal");
    std::env::set_var("MYAPP_METRICS_FLUSH_INTERVAL", "1m30s");

    let mut config = Config::default();
    Loader::new().env_prefix("MYAPP_").load(&mut config)?;

    println!("Nested configuration with prefix 'MYAPP_':");
    println!("  Service: {}", config.service_name);
    println!("  Database host: {}", config.database.host);
    println!("  Database port: {}", config.database.port);
    println!("  Metrics flush interval: {:?}", config.metrics.flush_interval);

    Ok(())
}
