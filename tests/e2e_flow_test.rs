//! End-to-end flow tests covering complete document lifecycles.

use backdrop::models::{AppConfig, DocumentId, ImageBuffer, ImageDocument, PresetConfig, Rgb};
use backdrop::services::{BackdropService, BackgroundOutcome, DocumentRegistry, DEFAULT_BACKGROUND};
use pretty_assertions::assert_eq;
use std::sync::Arc;

/// Preset index of the dominant-color entry
const DOMINANT: usize = 3;

fn service(selected: usize) -> BackdropService {
    let config = AppConfig {
        presets: PresetConfig {
            custom: vec!["black".to_string()],
            selected,
        },
        ..AppConfig::default()
    };
    BackdropService::new(Arc::new(config)).unwrap()
}

fn bitmap(color: Rgb) -> ImageBuffer {
    ImageBuffer::filled(6, 4, color)
}

#[tokio::test]
async fn test_open_with_css_preset() {
    let service = service(0);
    let document = ImageDocument::loaded(DocumentId::new("a"), bitmap(Rgb::new(1, 2, 3)));

    let outcome = service.open_document(document.clone()).await.unwrap();

    assert_eq!(outcome, BackgroundOutcome::Preset(DEFAULT_BACKGROUND.to_string()));
    assert_eq!(document.background().as_deref(), Some(DEFAULT_BACKGROUND));
    assert!(document.correlation_id().is_none());
}

#[tokio::test]
async fn test_open_with_dominant_color_preset() {
    let service = service(DOMINANT);
    let document = ImageDocument::loaded(DocumentId::new("a"), bitmap(Rgb::new(200, 40, 10)));

    let outcome = service.open_document(document.clone()).await.unwrap();

    assert_eq!(outcome, BackgroundOutcome::Applied(Rgb::new(200, 40, 10)));
    assert_eq!(document.background().as_deref(), Some("rgb(200,40,10)"));
    assert!(document.correlation_id().is_some());
    assert_eq!(service.dispatcher().pending_count().await, 0);
}

#[tokio::test]
async fn test_document_still_loading_is_sampled_once_loaded() {
    let service = Arc::new(service(DOMINANT));
    let document = ImageDocument::loading(DocumentId::new("slow"));

    let task = {
        let service = service.clone();
        let document = document.clone();
        tokio::spawn(async move { service.open_document(document).await })
    };

    tokio::task::yield_now().await;
    document.finish_loading(bitmap(Rgb::new(0, 128, 0)));

    let outcome = task.await.unwrap().unwrap();
    assert_eq!(outcome, BackgroundOutcome::Applied(Rgb::new(0, 128, 0)));
}

#[tokio::test]
async fn test_select_applies_to_every_open_document() {
    let service = service(0);
    let red = ImageDocument::loaded(DocumentId::new("red"), bitmap(Rgb::new(255, 0, 0)));
    let blue = ImageDocument::loaded(DocumentId::new("blue"), bitmap(Rgb::new(0, 0, 255)));
    service.open_document(red.clone()).await.unwrap();
    service.open_document(blue.clone()).await.unwrap();

    service.select_preset(DOMINANT).await.unwrap();
    assert_eq!(red.background().as_deref(), Some("rgb(255,0,0)"));
    assert_eq!(blue.background().as_deref(), Some("rgb(0,0,255)"));

    service.select_preset(1).await.unwrap();
    assert_eq!(red.background().as_deref(), Some("white"));
    assert_eq!(blue.background().as_deref(), Some("white"));
}

#[tokio::test]
async fn test_closed_document_is_not_updated() {
    let service = service(0);
    let open = ImageDocument::loaded(DocumentId::new("open"), bitmap(Rgb::new(255, 0, 0)));
    let closed = ImageDocument::loaded(DocumentId::new("closed"), bitmap(Rgb::new(0, 0, 255)));
    service.open_document(open.clone()).await.unwrap();
    service.open_document(closed.clone()).await.unwrap();

    service.close_document(closed.id()).await;
    service.select_preset(2).await.unwrap();

    assert_eq!(open.background().as_deref(), Some("rgb(128,128,128)"));
    assert_eq!(closed.background().as_deref(), Some(DEFAULT_BACKGROUND));
    assert_eq!(service.registry().live_documents().await.len(), 1);
}

#[tokio::test]
async fn test_custom_preset_lifecycle() {
    let service = service(0);
    let document = ImageDocument::loaded(DocumentId::new("doc"), bitmap(Rgb::new(5, 5, 5)));
    service.open_document(document.clone()).await.unwrap();

    let index = service.add_custom_preset("  rgb(9,8,7)  ").await.unwrap();
    assert_eq!(index, 5);
    assert_eq!(document.background().as_deref(), Some("rgb(9,8,7)"));
    assert_eq!(service.presets().await.selected_index(), 5);

    // Removing the selected last preset moves the selection onto "black"
    service.remove_preset(index).await.unwrap();
    let presets = service.presets().await;
    assert_eq!(presets.selected_index(), 4);
    assert_eq!(presets.custom(), vec!["black"]);
    assert_eq!(document.background().as_deref(), Some("black"));

    assert!(service.remove_preset(1).await.is_err());
    assert!(service.add_custom_preset("   ").await.is_none());
}

#[tokio::test]
async fn test_resampling_supersedes_old_id() {
    let service = service(DOMINANT);
    let document = ImageDocument::loaded(DocumentId::new("doc"), bitmap(Rgb::new(40, 40, 40)));

    service.open_document(document.clone()).await.unwrap();
    let first = document.correlation_id().unwrap();

    service.apply_dominant_color(&document).await.unwrap();
    let second = document.correlation_id().unwrap();

    assert_ne!(first, second);
    assert_eq!(document.background().as_deref(), Some("rgb(40,40,40)"));
}
