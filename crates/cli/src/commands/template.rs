//! `policydraft template` — Template management commands.

use policydraft_core::TemplateDraft;

use super::App;

pub async fn create(app: &App, draft: TemplateDraft) -> Result<(), Box<dyn std::error::Error>> {
    let template = app.templates.create(draft).await?;
    println!("✅ Created template {} ({})", template.name, template.id);
    print_fields(&template);
    Ok(())
}

pub async fn list(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let templates = app.templates.list().await?;
    if templates.is_empty() {
        println!("No templates yet — create one with `policydraft template create`");
        return Ok(());
    }

    println!("📋 Templates ({})", templates.len());
    for t in &templates {
        println!(
            "  {}  {}  [{} fields, {} policies]",
            t.id,
            t.name,
            t.fields().len(),
            t.policy_ids.len()
        );
    }
    Ok(())
}

pub async fn show(app: &App, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let template = app.templates.get(id).await?;
    println!("📋 {} ({})", template.name, template.id);
    if !template.description.is_empty() {
        println!("   {}", template.description);
    }
    println!("   Created:  {}", template.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("   Updated:  {}", template.updated_at.format("%Y-%m-%d %H:%M:%S"));
    if !template.policy_ids.is_empty() {
        println!("   Policies: {}", template.policy_ids.join(", "));
    }
    print_fields(&template);
    println!("\n{}", template.content());
    Ok(())
}

pub async fn update(
    app: &App,
    id: &str,
    draft: TemplateDraft,
) -> Result<(), Box<dyn std::error::Error>> {
    let template = app.templates.update(id, draft).await?;
    println!("✅ Updated template {} ({})", template.name, template.id);
    print_fields(&template);
    Ok(())
}

pub async fn delete(app: &App, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    app.templates.delete(id).await?;
    println!("🗑️  Deleted template {id}");
    Ok(())
}

fn print_fields(template: &policydraft_core::Template) {
    if template.fields().is_empty() {
        println!("   No fields");
        return;
    }
    println!("   Fields:");
    for field in template.fields() {
        println!("     {}  {} — {}", field.id, field.title, field.description);
    }
}
