//! End-to-end tests for the gallery facade.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use pictor::{
    ConvertOptions, DerivativeCacheConfig, Gallery, GenerationDetails, ImageEncoding,
    MetadataRecord, PictorConfig, StorageConfig,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> PictorConfig {
    PictorConfig {
        storage: StorageConfig {
            image_dir: dir.path().join("images"),
            metadata_dir: dir.path().join("metadata"),
        },
        derivatives: DerivativeCacheConfig::default().with_scratch_dir(dir.path().join("scratch")),
        ..Default::default()
    }
}

/// A freshly "generated" image waiting in an upload directory.
fn generated_image(dir: &TempDir, name: &str) -> PathBuf {
    let uploads = dir.path().join("uploads");
    std::fs::create_dir_all(&uploads).unwrap();
    let path = uploads.join(name);

    let mut rgba = RgbaImage::from_pixel(32, 24, Rgba([20, 40, 200, 255]));
    rgba.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
    DynamicImage::ImageRgba8(rgba)
        .save_with_format(&path, ImageFormat::Png)
        .unwrap();
    path
}

fn record(value: serde_json::Value) -> MetadataRecord {
    value.as_object().unwrap().clone()
}

fn dir_entries(path: &Path) -> usize {
    std::fs::read_dir(path).unwrap().count()
}

#[tokio::test]
async fn test_record_then_lookup() {
    let dir = TempDir::new().unwrap();
    let gallery = Gallery::from_config(&config_in(&dir)).unwrap();
    let source = generated_image(&dir, "out.png");

    let entry = gallery
        .record(&source, record(json!({"prompt": "a cat"})))
        .await
        .unwrap();

    assert!(!source.exists());
    assert_eq!(entry.image_filename(), &format!("{}.webp", entry.id()));
    assert_eq!(entry.metadata_filename(), &format!("{}.json", entry.id()));

    let path = gallery.image_path(entry.id()).await.unwrap();
    assert_eq!(&path, entry.image_path());

    let metadata = gallery.metadata(entry.id()).await.unwrap().unwrap();
    assert_eq!(metadata["prompt"], "a cat");
    assert_eq!(metadata["image_filename"], json!(entry.image_filename()));
    assert!(metadata["timestamp"].as_str().unwrap().ends_with("+00:00"));
}

#[tokio::test]
async fn test_record_generation_flattens_details() {
    let dir = TempDir::new().unwrap();
    let gallery = Gallery::from_config(&config_in(&dir)).unwrap();
    let source = generated_image(&dir, "gen.png");

    let details = GenerationDetails::new("un phare", "flux-schnell")
        .with_translated_prompt("a lighthouse")
        .with_parameter("aspect_ratio", "16:9");
    let entry = gallery
        .record_generation(&source, details, record(json!({"seed": 42})))
        .await
        .unwrap();

    let metadata = gallery.metadata(entry.id()).await.unwrap().unwrap();
    assert_eq!(metadata["original_prompt"], "un phare");
    assert_eq!(metadata["translated_prompt"], "a lighthouse");
    assert_eq!(metadata["model_id"], "flux-schnell");
    assert_eq!(metadata["parameters"], json!({"aspect_ratio": "16:9"}));
    assert_eq!(metadata["seed"], 42);
}

#[tokio::test]
async fn test_page_lists_recorded_images() {
    let dir = TempDir::new().unwrap();
    let gallery = Gallery::from_config(&config_in(&dir)).unwrap();

    for i in 0..3 {
        let source = generated_image(&dir, &format!("{i}.png"));
        gallery
            .record(&source, record(json!({"n": i})))
            .await
            .unwrap();
    }

    let page = gallery.page(1, 2).await.unwrap();
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.images.len(), 2);

    let page = gallery.page(2, 2).await.unwrap();
    assert_eq!(page.images.len(), 1);
}

#[tokio::test]
async fn test_remove_deletes_both_halves() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let gallery = Gallery::from_config(&config).unwrap();
    let source = generated_image(&dir, "x.png");
    let entry = gallery.record(&source, MetadataRecord::new()).await.unwrap();

    gallery.remove(entry.id()).await.unwrap();

    assert!(gallery.metadata(entry.id()).await.unwrap().is_none());
    assert!(gallery.image_path(entry.id()).await.unwrap_err().is_not_found());
    assert_eq!(dir_entries(&config.storage.image_dir), 0);
    assert_eq!(dir_entries(&config.storage.metadata_dir), 0);

    // Second removal is a no-op.
    gallery.remove(entry.id()).await.unwrap();
}

#[tokio::test]
async fn test_remove_with_only_metadata_present() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let gallery = Gallery::from_config(&config).unwrap();
    let source = generated_image(&dir, "x.png");
    let entry = gallery.record(&source, MetadataRecord::new()).await.unwrap();
    std::fs::remove_file(entry.image_path()).unwrap();

    gallery.remove(entry.id()).await.unwrap();
    assert_eq!(dir_entries(&config.storage.metadata_dir), 0);
}

#[tokio::test]
async fn test_export_jpeg_and_png() {
    let dir = TempDir::new().unwrap();
    let gallery = Gallery::from_config(&config_in(&dir)).unwrap();
    let source = generated_image(&dir, "x.png");
    let entry = gallery.record(&source, MetadataRecord::new()).await.unwrap();

    let jpeg = gallery
        .export(entry.id(), ImageEncoding::Jpeg, ConvertOptions::with_quality(85))
        .await
        .unwrap();
    assert_eq!(jpeg.download_name(), &format!("{}.jpg", entry.id()));
    assert_eq!(jpeg.mime_type(), "image/jpeg");
    assert_eq!(image::open(jpeg.path()).unwrap().color(), image::ColorType::Rgb8);

    let png = gallery
        .export(entry.id(), ImageEncoding::Png, ConvertOptions::default())
        .await
        .unwrap();
    assert_eq!(png.download_name(), &format!("{}.png", entry.id()));
    assert_eq!(png.mime_type(), "image/png");

    let decoded = image::open(png.path()).unwrap();
    assert_eq!(decoded.color(), image::ColorType::Rgb8);
    assert_eq!(decoded.to_rgb8().get_pixel(0, 0).0, [255, 255, 255]);
    assert_eq!(decoded.to_rgb8().get_pixel(5, 5).0, [20, 40, 200]);

    // The stored original is untouched.
    assert!(entry.image_path().exists());
    assert_eq!(gallery.derivatives().await.total_tracked, 2);
}

#[tokio::test]
async fn test_export_missing_image_is_not_found() {
    let dir = TempDir::new().unwrap();
    let gallery = Gallery::from_config(&config_in(&dir)).unwrap();

    let err = gallery
        .export("does-not-exist", ImageEncoding::Png, ConvertOptions::default())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("image not found"));
    assert_eq!(dir_entries(dir.path().join("scratch").as_path()), 0);
    assert_eq!(gallery.derivatives().await.total_tracked, 0);
}

#[tokio::test]
async fn test_identifier_with_separator_rejected() {
    let dir = TempDir::new().unwrap();
    let gallery = Gallery::from_config(&config_in(&dir)).unwrap();

    let err = gallery.image_path("../escape").await.unwrap_err();
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_sweeper_from_gallery_stops() {
    let dir = TempDir::new().unwrap();
    let gallery = Gallery::from_config(&config_in(&dir)).unwrap();

    let handle = gallery.start_sweeper();
    tokio::time::timeout(std::time::Duration::from_secs(2), handle.stop())
        .await
        .unwrap();
}

#[test]
fn test_unsupported_format_tokens() {
    for token in ["JPG", "gif", "jpeg", ""] {
        let err = token.parse::<ImageEncoding>().unwrap_err();
        assert!(err.to_string().contains(token));
    }
    assert_eq!("jpg".parse::<ImageEncoding>().unwrap(), ImageEncoding::Jpeg);
    assert_eq!("png".parse::<ImageEncoding>().unwrap(), ImageEncoding::Png);
}

#[tokio::test]
async fn test_export_to_leaves_scratch_empty() {
    let dir = TempDir::new().unwrap();
    let gallery = Gallery::from_config(&config_in(&dir)).unwrap();
    let source = generated_image(&dir, "x.png");
    let entry = gallery.record(&source, MetadataRecord::new()).await.unwrap();
    let dest = dir.path().join("download.jpg");

    let export = gallery
        .export_to(entry.id(), ImageEncoding::Jpeg, ConvertOptions::default(), &dest)
        .await
        .unwrap();

    assert_eq!(export.path(), &dest);
    assert_eq!(export.download_name(), &format!("{}.jpg", entry.id()));
    assert_eq!(export.mime_type(), "image/jpeg");
    assert_eq!(image::open(&dest).unwrap().color(), image::ColorType::Rgb8);

    assert_eq!(dir_entries(&dir.path().join("scratch")), 0);
    assert_eq!(gallery.derivatives().await.total_tracked, 0);
}

#[tokio::test]
async fn test_export_to_unwritable_destination_still_cleans_scratch() {
    let dir = TempDir::new().unwrap();
    let gallery = Gallery::from_config(&config_in(&dir)).unwrap();
    let source = generated_image(&dir, "x.png");
    let entry = gallery.record(&source, MetadataRecord::new()).await.unwrap();
    let dest = dir.path().join("missing-dir").join("download.png");

    let err = gallery
        .export_to(entry.id(), ImageEncoding::Png, ConvertOptions::default(), &dest)
        .await
        .unwrap_err();

    assert!(!err.is_not_found());
    assert_eq!(dir_entries(&dir.path().join("scratch")), 0);
    assert_eq!(gallery.derivatives().await.total_tracked, 0);
}
