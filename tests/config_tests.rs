use gallery_lightbox::config::Configuration;
use gallery_lightbox::geometry::Rect;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn empty_config_uses_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    let cfg = cfg.validated().unwrap();
    assert!((cfg.lightbox.zoom_factor - 2.5).abs() < f32::EPSILON);
    assert!((cfg.lightbox.default_aspect_ratio - 0.75).abs() < f32::EPSILON);
    assert_eq!(cfg.lightbox.timings.shrink, Duration::from_millis(380));
    assert_eq!(cfg.lightbox.timings.fade_out, Duration::from_millis(150));
    assert_eq!(cfg.frame_interval, Duration::from_millis(16));
    assert_eq!(cfg.gallery.columns, 3);
    assert!((cfg.gallery.lazy_init_min_width - 768.0).abs() < f32::EPSILON);
    assert!(cfg.product.is_none());
}

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
lightbox:
  zoom-factor: 3
  timings:
    crossfade: 200ms
    fade-out: 1s
gallery:
  library-path: "/photos"
  batch-size: 6
  reveal: { fade: 250ms, threshold: 0.5 }
frame-interval: 8ms
loader-max-concurrent: 2
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    assert!((cfg.lightbox.zoom_factor - 3.0).abs() < f32::EPSILON);
    assert_eq!(cfg.lightbox.timings.crossfade, Duration::from_millis(200));
    assert_eq!(cfg.lightbox.timings.fade_out, Duration::from_secs(1));
    assert_eq!(cfg.lightbox.timings.expand, Duration::from_millis(380));
    assert_eq!(cfg.gallery.library_path, Some(PathBuf::from("/photos")));
    assert_eq!(cfg.gallery.batch_size, 6);
    assert_eq!(cfg.gallery.reveal.fade, Duration::from_millis(250));
    assert!((cfg.gallery.reveal.offset - 20.0).abs() < f32::EPSILON);
    assert_eq!(cfg.frame_interval, Duration::from_millis(8));
    assert_eq!(cfg.loader_max_concurrent, 2);
}

#[test]
fn parse_product_section() {
    let yaml = r#"
gallery:
  images:
    - { src: a.jpg, width: 1200, height: 800 }
    - { src: b.jpg }
product:
  images: [ { src: p1.jpg }, { src: p2.jpg } ]
  checkout-base-url: "https://shop.example/checkout?qty="
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.gallery.images.len(), 2);
    assert_eq!(cfg.gallery.images[0].width, Some(1200));
    assert_eq!(cfg.gallery.images[1].height, None);
    let product = cfg.product.unwrap();
    assert_eq!(product.images.len(), 2);
    assert_eq!(product.quantity.min, 1);
    assert_eq!(product.quantity.max, 50);
    assert_eq!(product.card, Rect::new(16.0, 16.0, 320.0, 320.0));
}

#[test]
fn zero_zoom_factor_is_rejected() {
    let cfg: Configuration = serde_yaml::from_str("lightbox: { zoom-factor: 1.0 }").unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(format!("{err:#}").contains("zoom-factor"));
}

#[test]
fn zero_duration_is_rejected() {
    let cfg: Configuration =
        serde_yaml::from_str("lightbox: { timings: { shrink: 0s } }").unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(format!("{err:#}").contains("timings.shrink"));
}

#[test]
fn inverted_quantity_bounds_are_rejected() {
    let yaml = r#"
product:
  images: [ { src: p.jpg } ]
  checkout-base-url: "x"
  quantity: { min: 10, max: 5 }
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn reveal_threshold_must_be_a_fraction() {
    let cfg: Configuration =
        serde_yaml::from_str("gallery: { reveal: { threshold: 1.5 } }").unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn from_yaml_file_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");
    let err = Configuration::from_yaml_file(&missing).unwrap_err();
    assert!(format!("{err:#}").contains("nope.yaml"));
}
