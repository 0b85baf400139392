//! `celeste doctor`: Diagnose configuration and credentials.

use celeste_config::AppConfig;
use celeste_core::provider::Provider;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Celeste Doctor: System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ Language-model key configured");
    } else {
        println!("  ❌ No language-model key, set GEMINI_API_KEY (the server will not start)");
        issues += 1;
    }

    if config.has_weather_key() {
        println!("  ✅ Weather key configured");
    } else {
        println!("  ⚠️  No weather key, set WEATHERAPI_KEY to enable weather context");
        issues += 1;
    }

    println!("  ✅ Timezone '{}' recognised", config.persona.timezone);

    match celeste_providers::router::build_from_config(&config) {
        Ok(router) => match router.default() {
            Some(provider) => match provider.health_check().await {
                Ok(true) => println!("  ✅ Provider '{}' reachable", provider.name()),
                Ok(false) => {
                    println!("  ❌ Provider '{}' rejected the health check (check the key)", provider.name());
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Provider '{}' unreachable: {e}", provider.name());
                    issues += 1;
                }
            },
            None => {
                println!("  ❌ Provider '{}' could not be built", config.default_provider);
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Provider setup failed: {e}");
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
