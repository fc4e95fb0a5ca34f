//! `policydraft init` — First-time setup.

use policydraft_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("📄 PolicyDraft — First-Time Setup");
    println!("=================================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run init.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
    }

    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    for dir in [&config.storage.data_dir, &config.upload_dir] {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("✅ Created {}", dir.display());
        }
    }

    println!("\n📝 Next steps:");
    println!("   1. Set OPENAI_API_KEY (or api_key in config.toml)");
    println!("   2. policydraft policy add handbook.txt");
    println!("   3. policydraft template create --name Memo --file memo.txt");
    println!("   4. policydraft generate --template <id> --input field-1=...");

    Ok(())
}
