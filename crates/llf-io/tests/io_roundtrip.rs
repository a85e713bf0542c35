use llf_core::LumaBuffer;
use llf_io::{read, write, Format, ImageData};

#[test]
fn detects_png_by_magic_bytes_despite_extension() {
    let dir = tempfile::tempdir().unwrap();
    let png_path = dir.path().join("image.png");
    let image = ImageData::from_u8(4, 2, 3, (0..24).collect()).unwrap();
    write(&png_path, &image).expect("write png");

    // Same bytes under a misleading name
    let renamed = dir.path().join("image.jpg");
    std::fs::copy(&png_path, &renamed).unwrap();
    assert_eq!(Format::detect(&renamed).unwrap(), Format::Png);

    let loaded = read(&renamed).expect("read renamed png");
    assert_eq!(loaded, image);
}

#[test]
fn luma_buffer_survives_png_roundtrip() {
    let luma = LumaBuffer::from_fn(17, 9, |x, y| (x * 13 + y * 7) as u8).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("luma.png");

    write(&path, &ImageData::from_luma(&luma)).unwrap();
    let loaded = read(&path).unwrap();

    assert_eq!(loaded.channels, 1);
    assert_eq!(loaded.data, luma.as_slice());
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read(dir.path().join("missing.png")).unwrap_err();
    assert!(matches!(err, llf_io::IoError::Io(_)));
}
