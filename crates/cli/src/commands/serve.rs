//! `celeste serve`: Start the HTTP API server.

use celeste_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("✨ Celeste Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Endpoint:  POST {}/ask", config.gateway.api_prefix.trim_end_matches('/'));
    println!("   Frontend:  {}", config.gateway.allowed_origin);

    celeste_gateway::start(config).await?;

    Ok(())
}
