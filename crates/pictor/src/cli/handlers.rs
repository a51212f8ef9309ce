//! Command handlers.

use super::commands::{Commands, OutputFormat};
use pictor::{
    ConvertOptions, Gallery, GenerationDetails, ImageEncoding, ImagePage, MetadataRecord,
    PictorConfig, PictorResult,
};
use pictor_error::{JsonError, StorageError, StorageErrorKind};
use serde_json::Value;
use std::path::Path;

/// Run one CLI command against `gallery`.
pub async fn handle_command(
    command: Commands,
    gallery: &Gallery,
    config: &PictorConfig,
) -> PictorResult<()> {
    match command {
        Commands::Store {
            file,
            prompt,
            model,
            fields,
        } => store(gallery, &file, prompt, model, fields).await,

        Commands::List {
            page,
            per_page,
            format,
        } => {
            let per_page = per_page.unwrap_or(config.gallery.per_page);
            list(gallery, page, per_page, format).await
        }

        Commands::Show { id } => show(gallery, &id).await,

        Commands::Delete { id } => {
            gallery.remove(&id).await?;
            println!("Deleted {}", id);
            Ok(())
        }

        Commands::Convert {
            id,
            format,
            quality,
            output,
        } => convert(gallery, &id, &format, quality, output.as_deref()).await,
    }
}

async fn store(
    gallery: &Gallery,
    file: &Path,
    prompt: Option<String>,
    model: Option<String>,
    fields: Vec<(String, String)>,
) -> PictorResult<()> {
    let mut metadata: MetadataRecord = fields
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();

    let entry = match (prompt, model) {
        (Some(prompt), Some(model)) => {
            gallery
                .record_generation(file, GenerationDetails::new(prompt, model), metadata)
                .await?
        }
        (Some(prompt), None) => {
            metadata.insert("prompt".into(), Value::String(prompt));
            gallery.record(file, metadata).await?
        }
        (None, _) => gallery.record(file, metadata).await?,
    };

    println!("Stored {} ({})", entry.id(), entry.image_path().display());
    Ok(())
}

async fn list(
    gallery: &Gallery,
    page: usize,
    per_page: usize,
    format: OutputFormat,
) -> PictorResult<()> {
    let result = gallery.page(page, per_page).await?;

    match format {
        OutputFormat::Json => println!("{}", to_pretty_json(&result)?),
        OutputFormat::Human => print_page(&result, page),
    }
    Ok(())
}

fn print_page(result: &ImagePage, page: usize) {
    println!("Page {} of {}", page, result.total_pages);
    println!("{:-<80}", "");
    for record in &result.images {
        let image = record
            .get("image_filename")
            .and_then(Value::as_str)
            .unwrap_or("?");
        let timestamp = record.get("timestamp").and_then(Value::as_str).unwrap_or("?");
        let prompt = record
            .get("original_prompt")
            .or_else(|| record.get("prompt"))
            .and_then(Value::as_str)
            .unwrap_or("");
        println!("{:<42} {:<34} {}", image, timestamp, prompt);
    }
    println!("{:-<80}", "");
    println!("Total on page: {} items", result.images.len());
}

async fn show(gallery: &Gallery, id: &str) -> PictorResult<()> {
    match gallery.metadata(id).await? {
        Some(record) => {
            println!("{}", to_pretty_json(&record)?);
            Ok(())
        }
        None => Err(StorageError::new(StorageErrorKind::NotFound(format!(
            "metadata not found: {id}"
        )))
        .into()),
    }
}

async fn convert(
    gallery: &Gallery,
    id: &str,
    format: &str,
    quality: Option<u8>,
    output: Option<&Path>,
) -> PictorResult<()> {
    let encoding: ImageEncoding = format.parse()?;
    let options = ConvertOptions { quality };
    match output {
        Some(dest) => {
            let export = gallery.export_to(id, encoding, options, dest).await?;
            println!("Wrote {} ({})", export.path().display(), export.mime_type());
        }
        None => {
            let export = gallery.export(id, encoding, options).await?;
            println!(
                "{} -> {} ({})",
                export.download_name(),
                export.path().display(),
                export.mime_type()
            );
        }
    }
    Ok(())
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> PictorResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| JsonError::new(e.to_string()).into())
}
