use std::path::Path;

use image::{Rgb, RgbImage};

pub fn write_test_image(path: &Path, color: [u8; 3]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create image parent dirs");
    }
    RgbImage::from_pixel(8, 6, Rgb(color))
        .save(path)
        .expect("write test image");
}
