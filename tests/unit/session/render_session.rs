use std::time::Duration;

use super::*;
use crate::assets::data_uri;
use crate::canvas::model::{BackgroundLayer, FitMode, LogoSpec};
use crate::compile::compositor::SYMBOL_NODE_ID;
use crate::foundation::core::{Point, Size};

fn session() -> RenderSession {
    RenderSession::new(RenderSessionOpts {
        resolver: ResolverOpts {
            timeout: Duration::from_secs(3),
            ..ResolverOpts::default()
        },
        preview_scale: 1.0,
    })
    .unwrap()
}

fn red_png_uri() -> String {
    use image::ImageEncoder as _;
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(&[255, 0, 0, 255], 1, 1, image::ExtendedColorType::Rgba8)
        .unwrap();
    data_uri::encode("image/png", &out)
}

fn background(id: &str, src: &str) -> BackgroundLayer {
    BackgroundLayer {
        id: id.to_string(),
        src: src.to_string(),
        position: Point::ORIGIN,
        size: Size::new(800.0, 600.0),
        mode: FitMode::Fill,
        z_index: 1,
        opacity: 1.0,
    }
}

#[tokio::test]
async fn default_configuration_renders_symbol_on_top() {
    let s = session();
    let canvas = s.render(&CanvasConfiguration::default()).await.unwrap();
    assert_eq!(canvas.generation, 1);
    assert!(canvas.warnings().is_empty());
    assert_eq!(canvas.tree.paint_order(), vec![SYMBOL_NODE_ID]);
    assert_eq!(s.last_good().await.unwrap().generation, 1);
}

#[tokio::test]
async fn unreachable_background_is_a_warning_not_a_failure() {
    let mut config = CanvasConfiguration::default();
    config
        .backgrounds
        .push(background("bg-ok", &red_png_uri()));
    config
        .backgrounds
        .push(background("bg-missing", "https://nonexistent.invalid/x.png"));

    let canvas = session().render(&config).await.unwrap();
    assert_eq!(canvas.tree.paint_order(), vec!["bg-ok", SYMBOL_NODE_ID]);
    let ids: Vec<_> = canvas.warnings().iter().map(|w| w.layer_id.as_str()).collect();
    assert_eq!(ids, vec!["bg-missing"]);
}

#[tokio::test]
async fn symbol_failure_keeps_last_good() {
    let s = session();
    let good = s.render(&CanvasConfiguration::default()).await.unwrap();

    let mut bad = CanvasConfiguration::default();
    bad.qr.content.clear();
    let err = s.render(&bad).await.unwrap_err();
    assert!(matches!(err, CanvasError::SymbolGeneration(_)));
    assert_eq!(s.last_good().await.unwrap().generation, good.generation);
}

#[tokio::test]
async fn older_cycle_is_superseded_by_newer_one() {
    let s = session();
    let first = CanvasConfiguration::default();
    let mut second = CanvasConfiguration::default();
    second.qr.content = "second".to_string();

    let (a, b) = tokio::join!(s.render(&first), s.render(&second));
    assert!(matches!(a, Err(CanvasError::Superseded { generation: 1 })));
    assert_eq!(b.unwrap().generation, 2);
    assert_eq!(s.last_good().await.unwrap().generation, 2);
}

#[tokio::test]
async fn failed_logo_falls_back_to_plain_symbol() {
    let mut config = CanvasConfiguration::default();
    config.qr.logo = Some(LogoSpec {
        src: "data:image/png;base64,not-an-image".to_string(),
        size: 40.0,
    });
    let canvas = session().render(&config).await.unwrap();
    assert_eq!(canvas.warnings().len(), 1);
    assert_eq!(canvas.warnings()[0].layer_id, LOGO_ASSET_ID);
    let last = canvas.tree.nodes.last().unwrap();
    match &last.content {
        crate::compile::plan::NodeContent::Symbol { symbol, logo, .. } => {
            assert!(symbol.logo_box.is_none());
            assert!(logo.is_none());
        }
        other => panic!("unexpected top node {other:?}"),
    }
}

#[tokio::test]
async fn export_uses_scale_and_rejects_bad_quality_early() {
    let s = session();
    let config = CanvasConfiguration::default();
    let png = s.export(&config, &ExportOptions::default()).await.unwrap().image;
    assert_eq!((png.width, png.height), (1600, 1200));
    assert!(!png.bytes.is_empty());

    let err = s
        .export(
            &config,
            &ExportOptions {
                quality: Some(2.0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CanvasError::Validation(_)));
    // Exports never advance the preview generation.
    assert_eq!(s.generation(), 0);
}

#[tokio::test]
async fn failed_preview_leaves_previous_preview() {
    let s = session();
    let first = s.preview(&CanvasConfiguration::default()).await.unwrap();
    assert_eq!((first.image.width, first.image.height), (800, 600));

    let mut bad = CanvasConfiguration::default();
    bad.export.width = 0;
    assert!(s.preview(&bad).await.is_err());
    let kept = s.last_preview().await.unwrap();
    assert_eq!(kept.canvas.generation, first.canvas.generation);
}

#[tokio::test]
async fn slow_preview_never_replaces_a_newer_one() {
    let s = session();
    let mut large = CanvasConfiguration::default();
    large.export.width = 4000;
    large.export.height = 4000;
    let mut small = CanvasConfiguration::default();
    small.export.width = 300;
    small.export.height = 300;

    // Start the second cycle once the first has composed and is rasterizing.
    let newer = async {
        while s.last_good().await.is_none() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        s.preview(&small).await
    };
    let (a, b) = tokio::join!(s.preview(&large), newer);
    assert!(matches!(a, Err(CanvasError::Superseded { generation: 1 })), "{a:?}");
    assert_eq!(b.unwrap().canvas.generation, 2);

    let kept = s.last_preview().await.unwrap();
    assert_eq!(kept.canvas.generation, 2);
    assert_eq!((kept.image.width, kept.image.height), (300, 300));
}

#[test]
fn rejects_non_positive_preview_scale() {
    let opts = RenderSessionOpts {
        preview_scale: 0.0,
        ..RenderSessionOpts::default()
    };
    assert!(matches!(
        RenderSession::new(opts),
        Err(CanvasError::Validation(_))
    ));
}
