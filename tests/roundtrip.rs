use iv1::container::Iv1File;
use iv1::rgb8_image::Rgb8Image;
use iv1::{pipeline, DEFAULT_SEED};

fn solid_image(w: usize, h: usize, color: [u8; 3]) -> Rgb8Image {
    let mut pixels = Vec::with_capacity(w * h * 3);
    for _ in 0..(w * h) {
        pixels.extend_from_slice(&color);
    }
    Rgb8Image {
        width: w,
        height: h,
        pixels,
    }
}

fn checkerboard(w: usize, h: usize) -> Rgb8Image {
    let mut pixels = Vec::with_capacity(w * h * 3);
    for y in 0..h {
        for x in 0..w {
            let on = (x / 4 + y / 4) % 2 == 0;
            let v = if on { 220u8 } else { 20u8 };
            pixels.extend_from_slice(&[v, v / 2, 255 - v]);
        }
    }
    Rgb8Image {
        width: w,
        height: h,
        pixels,
    }
}

fn mean_abs_error(a: &Rgb8Image, b: &Rgb8Image) -> f64 {
    assert_eq!(a.pixels.len(), b.pixels.len());
    let sum: f64 = a
        .pixels
        .iter()
        .zip(&b.pixels)
        .map(|(x, y)| (*x as f64 - *y as f64).abs())
        .sum();
    sum / a.pixels.len() as f64
}

#[test]
fn constant_image_round_trips_losslessly() {
    let image = solid_image(16, 16, [30, 60, 90]);
    let file = pipeline::encode(&image, DEFAULT_SEED)
        .unwrap()
        .expect("non-empty image encodes");
    let decoded = pipeline::decode(&file).unwrap();

    assert_eq!(decoded.width, 16);
    assert_eq!(decoded.height, 16);
    // A single flat color is representable exactly by one codeword in
    // each dictionary, modulo the container's 8-bit float quantization.
    assert!(mean_abs_error(&image, &decoded) < 2.0);
}

#[test]
fn checkerboard_round_trip_stays_within_a_visible_error_bound() {
    let image = checkerboard(32, 32);
    let file = pipeline::encode(&image, DEFAULT_SEED)
        .unwrap()
        .expect("non-empty image encodes");
    let decoded = pipeline::decode(&file).unwrap();

    assert_eq!(decoded.width, 32);
    assert_eq!(decoded.height, 32);
    assert!(mean_abs_error(&image, &decoded) < 40.0);
}

#[test]
fn non_block_aligned_input_crops_back_to_original_size() {
    let image = checkerboard(7, 5);
    let file = pipeline::encode(&image, DEFAULT_SEED)
        .unwrap()
        .expect("non-empty image encodes");

    assert_eq!(file.n_blocks_x, 2);
    assert_eq!(file.n_blocks_y, 2);
    assert_eq!(file.actual_w, 7);
    assert_eq!(file.actual_h, 5);

    let decoded = pipeline::decode(&file).unwrap();
    assert_eq!(decoded.width, 7);
    assert_eq!(decoded.height, 5);
}

#[test]
fn empty_image_encodes_to_nothing() {
    let image = Rgb8Image::empty();
    assert!(pipeline::encode(&image, DEFAULT_SEED).unwrap().is_none());
}

#[test]
fn file_round_trip_through_disk_preserves_shape_and_indices() {
    let dir = std::env::temp_dir().join(format!("iv1-roundtrip-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("out.iv1");

    let image = checkerboard(16, 16);
    let file = pipeline::encode(&image, DEFAULT_SEED).unwrap().unwrap();
    file.save(&path).unwrap();

    let loaded = Iv1File::load(&path).unwrap();
    assert_eq!(loaded.n_blocks_x, file.n_blocks_x);
    assert_eq!(loaded.n_blocks_y, file.n_blocks_y);
    assert_eq!(loaded.actual_w, file.actual_w);
    assert_eq!(loaded.actual_h, file.actual_h);
    assert_eq!(loaded.indices0, file.indices0);
    assert_eq!(loaded.indices1, file.indices1);

    for (a, b) in loaded.dict0.iter().flatten().zip(file.dict0.iter().flatten()) {
        assert!((a - b).abs() <= 1.0 / 510.0 + 1e-6);
    }

    std::fs::remove_file(&path).ok();
    std::fs::remove_dir(&dir).ok();
}

#[test]
fn bad_magic_is_rejected_end_to_end() {
    let dir = std::env::temp_dir().join(format!("iv1-roundtrip-badmagic-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("bad.iv1");
    std::fs::write(&path, b"ABCD\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00").unwrap();

    let err = Iv1File::load(&path).unwrap_err();
    assert!(matches!(err, iv1::Error::BadMagic));

    std::fs::remove_file(&path).ok();
    std::fs::remove_dir(&dir).ok();
}

#[test]
fn dictview_is_deterministic_for_a_fixed_seed() {
    let image = checkerboard(32, 32);
    let file = pipeline::encode(&image, DEFAULT_SEED).unwrap().unwrap();

    let view_a = pipeline::dictview(&file).unwrap();
    let view_b = pipeline::dictview(&file).unwrap();
    assert_eq!(view_a.pixels, view_b.pixels);
}
