//! `policydraft policy` — Policy document commands.

use std::path::Path;

use super::{App, print_degradations};

pub async fn add(app: &App, path: &Path, description: &str) -> Result<(), Box<dyn std::error::Error>> {
    let upload = app.policies.upload(path, description).await?;
    if upload.duplicate {
        println!(
            "ℹ️  Identical content already indexed as {} ({})",
            upload.policy.name, upload.policy.id
        );
        return Ok(());
    }

    println!(
        "✅ Indexed {} ({}) — {} chunks",
        upload.policy.name, upload.policy.id, upload.chunk_count
    );
    print_degradations(&upload.degradations);
    Ok(())
}

pub async fn list(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let policies = app.policies.list().await?;
    if policies.is_empty() {
        println!("No policies yet — add one with `policydraft policy add <file>`");
        return Ok(());
    }

    println!("📚 Policies ({})", policies.len());
    for p in &policies {
        let description = if p.description.is_empty() { "" } else { p.description.as_str() };
        println!(
            "  {}  {}  {}  {}",
            p.id,
            p.name,
            p.uploaded_at.format("%Y-%m-%d"),
            description
        );
    }
    Ok(())
}

pub async fn delete(app: &App, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let policy = app.policies.delete(id).await?;
    println!("🗑️  Deleted policy {} ({})", policy.name, policy.id);
    Ok(())
}
