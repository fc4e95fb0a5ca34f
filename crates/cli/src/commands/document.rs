//! `policydraft document` — Inspect generated documents.

use super::App;

pub async fn show(app: &App, id: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let doc = app.documents.get(id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("📄 Document {} [{}]", doc.id, doc.state());
    println!("   Template:   {}", doc.template_id());
    println!("   Generated:  {}", doc.generated_at().format("%Y-%m-%d %H:%M:%S"));
    if let Some(refined) = doc.refined_at {
        println!("   Refined:    {}", refined.format("%Y-%m-%d %H:%M:%S"));
    }
    println!("\n{}", doc.content);
    Ok(())
}

pub async fn list(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let docs = app.documents.list().await?;
    if docs.is_empty() {
        println!("No documents yet — run `policydraft generate`");
        return Ok(());
    }

    println!("📄 Documents ({})", docs.len());
    for doc in &docs {
        let preview: String = doc.content.chars().take(60).collect();
        println!(
            "  {}  {}  [{}]  {}",
            doc.id,
            doc.generated_at().format("%Y-%m-%d %H:%M"),
            doc.state(),
            preview.replace('\n', " ")
        );
    }
    Ok(())
}
