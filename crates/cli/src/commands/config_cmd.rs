//! `policydraft config` — Show and validate the active configuration.

use policydraft_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");
            if !config.has_api_key() {
                println!("   ⚠️  No API key set (set POLICYDRAFT_API_KEY or OPENAI_API_KEY)");
            }

            println!();
            println!("   API base:     {}", config.ai.api_base);
            println!("   Embeddings:   {} ({} dims)", config.ai.embedding_model, config.vector.dimensions);
            println!("   Generation:   {} (temperature {}, max {} tokens)",
                config.ai.generation_model, config.ai.temperature, config.ai.max_tokens);
            println!("   Chunking:     {} chars, {} overlap", config.rag.chunk_size, config.rag.chunk_overlap);
            println!("   Results:      {}", config.rag.results_count);
            println!("   Storage:      {} ({})", config.storage.backend, config.storage.data_dir.display());
            println!("   Uploads:      {}", config.upload_dir.display());
            println!();
            println!("{config:#?}");
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}
