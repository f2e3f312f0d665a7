use ecosystem_config::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present; a missing file is not an error
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    cli::run_cli().await
}
