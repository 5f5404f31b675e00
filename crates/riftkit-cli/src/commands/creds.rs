//! Show the connection details read from the lockfile.

use anyhow::{Context, Result};

use crate::app::App;

pub fn run(app: &App) -> Result<()> {
    let client = app.local_client();
    let creds = client
        .credentials()
        .context("Game client not found; is it running?")?;

    println!("Process:  {} (PID {})", creds.process, creds.pid);
    println!("Endpoint: {}", creds.base_url());
    println!("Auth:     {}", creds.basic_auth_header());
    Ok(())
}
