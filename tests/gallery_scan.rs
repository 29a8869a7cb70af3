use std::fs;
use std::path::Path;

use gallery_lightbox::gallery::scan::{discover_images, is_image, probe_dimensions};

fn write_png(path: &Path, width: u32, height: u32) {
    image::RgbImage::new(width, height).save(path).unwrap();
}

#[test]
fn discovers_images_recursively_in_path_order() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("b-album");
    fs::create_dir_all(&nested).unwrap();
    write_png(&dir.path().join("a.png"), 8, 6);
    write_png(&nested.join("c.PNG"), 3, 4);
    fs::write(dir.path().join("notes.txt"), b"skip me").unwrap();

    let images = discover_images(dir.path()).unwrap();
    let names: Vec<String> = images
        .iter()
        .map(|img| {
            Path::new(&img.src)
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(names, ["a.png", "c.PNG"]);
    assert_eq!((images[0].width, images[0].height), (Some(8), Some(6)));
    assert_eq!((images[1].width, images[1].height), (Some(3), Some(4)));
}

#[test]
fn unreadable_image_is_kept_without_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.jpg"), b"definitely not a jpeg").unwrap();
    let images = discover_images(dir.path()).unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].aspect_ratio(), None);
}

#[test]
fn probe_reads_header_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.png");
    write_png(&path, 16, 9);
    assert_eq!(probe_dimensions(&path), Some((16, 9)));
    assert_eq!(probe_dimensions(&dir.path().join("missing.png")), None);
}

#[test]
fn extension_filter() {
    assert!(is_image(Path::new("x.JPG")));
    assert!(is_image(Path::new("x.webp")));
    assert!(is_image(Path::new("x.gif")));
    assert!(!is_image(Path::new("x.tiff")));
    assert!(!is_image(Path::new("README")));
}

#[test]
fn missing_root_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(discover_images(&dir.path().join("absent")).is_err());
}
