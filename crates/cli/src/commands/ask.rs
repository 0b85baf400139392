//! `celeste ask`: run the pipeline once and print the reply.

use celeste_agent::{AskInput, Celeste};
use celeste_config::AppConfig;
use celeste_core::location::Coordinates;

pub async fn run(
    query: String,
    lat: Option<f64>,
    lon: Option<f64>,
    timezone: Option<String>,
    show_prompt: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Err(e) = config.require_api_key() {
        eprintln!();
        eprintln!("  ERROR: {e}");
        eprintln!();
        eprintln!("  Set GEMINI_API_KEY in your environment or a .env file, or add");
        eprintln!("  api_key to {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err(e.into());
    }

    if lat.is_some() != lon.is_some() {
        eprintln!("  ⚠️  Both --lat and --lon are needed; ignoring coordinates");
    }

    let celeste = Celeste::from_config(&config)?;
    let answer = celeste
        .answer(AskInput {
            query: &query,
            history: &[],
            coordinates: Coordinates::from_parts(lat, lon),
            timezone: timezone.as_deref(),
        })
        .await;

    if show_prompt {
        println!("── prompt ({}) ──", answer.context.timezone.name());
        println!("{}", answer.context.bundle);
        println!("── reply ──");
    }
    println!("{}", answer.reply);

    Ok(())
}
