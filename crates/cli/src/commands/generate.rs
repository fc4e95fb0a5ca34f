//! `policydraft generate` and `policydraft refine` — Document transitions.

use std::collections::HashMap;

use policydraft_engine::Transition;

use super::{App, print_degradations};

/// Parse repeated `field-N=value` arguments. Later duplicates win.
pub fn parse_inputs(raw: &[String]) -> Result<HashMap<String, String>, String> {
    raw.iter()
        .map(|arg| {
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| format!("Invalid input '{arg}', expected field-N=value"))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(format!("Invalid input '{arg}', field id is empty"));
            }
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

pub async fn create(
    app: &App,
    template_id: &str,
    inputs: &HashMap<String, String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let transition = app.documents.create(template_id, inputs).await?;
    report("Generated", &transition);
    Ok(())
}

pub async fn refine(
    app: &App,
    document_id: &str,
    feedback: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let transition = app.documents.refine(document_id, feedback).await?;
    report("Refined", &transition);
    Ok(())
}

fn report(verb: &str, transition: &Transition) {
    let doc = &transition.document;
    println!("✅ {verb} document {} [{}]", doc.id, doc.state());
    print_degradations(&transition.degradations);
    println!("\n{}", doc.content);
}
