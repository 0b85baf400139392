//! `celeste status`: Show effective configuration.

use celeste_config::AppConfig;

fn key_state(present: bool) -> &'static str {
    if present { "set" } else { "missing" }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("✨ Celeste Status");
    println!("=================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Provider:     {}", config.default_provider);
    println!("  Model:        {}", config.default_model);
    println!("  Temperature:  {} (extraction {})", config.default_temperature, config.extraction_temperature);
    println!("  Max tokens:   {}", config.default_max_tokens);
    println!("  LLM key:      {}", key_state(config.has_api_key()));
    println!("  Weather key:  {}", key_state(config.has_weather_key()));
    println!("  Weather API:  {}", config.weather.base_url);
    println!("  Timezone:     {}", config.persona.timezone);
    println!(
        "  Persona:      {}",
        if config.persona.system_prompt_override.is_some() { "custom" } else { "built-in" }
    );
    println!("  Gateway:      {}:{}{}", config.gateway.host, config.gateway.port, config.gateway.api_prefix);
    println!("  CORS origin:  {}", config.gateway.allowed_origin);
    println!("  Timeouts:     llm {}s, weather {}s", config.timeouts.llm_secs, config.timeouts.weather_secs);

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ℹ️  No config file, using defaults and environment");
    }

    Ok(())
}
