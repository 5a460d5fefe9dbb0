//! Example demonstrating .env file loading

use std::io::Write;

use enflag::{Enflag, Loader};
use tempfile::NamedTempFile;

#[derive(Debug, Default, Enflag)]
struct Config {
    pub app_host: String,

    pub app_motd: String,

    #[conf(default = "8080")]
    pub app_port: u16,
}

fn main() -> anyhow::Result<()> {
    let mut env_file = NamedTempFile::new()?;
    writeln!(env_file, "# demo settings")?;
    writeln!(env_file, "APP_HOST=files.internal")?;
    writeln!(env_file, r#"APP_MOTD="hello\nfrom a file""#)?;
    writeln!(env_file, "APP_PORT=9090")?;

    // A real environment variable always beats the file value.
    std::env::set_var("APP_PORT", "3000");

    let mut config = Config::default();
    Loader::new().env_files([env_file.path()]).load(&mut config)?;

    println!("Configuration from an env file:");
    println!("  Host: {}", config.app_host);
    println!("  Motd: {}", config.app_motd);
    println!("  Port: {} (process environment wins)", config.app_port);

    Ok(())
}
