use std::io::Cursor;

use super::*;

fn encode_png(w: u32, h: u32, rgba: Vec<u8>) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(w, h, rgba).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let buf = encode_png(1, 1, vec![100u8, 50u8, 200u8, 128u8]);

    let prepared = decode_image(&buf).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_keeps_row_major_layout() {
    let buf = encode_png(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]);
    let prepared = decode_image(&buf).unwrap();
    assert_eq!((prepared.width, prepared.height), (2, 1));
    assert_eq!(&prepared.rgba8_premul[..4], &[255, 0, 0, 255]);
    assert_eq!(&prepared.rgba8_premul[4..], &[0, 0, 255, 255]);
}

#[test]
fn decode_image_rejects_garbage() {
    assert!(decode_image(b"definitely not a png").is_err());
}

#[test]
fn premultiply_zeroes_transparent_pixels() {
    let mut px = vec![10u8, 20, 30, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![0, 0, 0, 0]);
}

#[test]
fn decode_image_accepts_other_formats() {
    let img = image::RgbImage::from_pixel(3, 2, image::Rgb([9, 8, 7]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Bmp)
        .unwrap();

    let prepared = decode_image(&buf).unwrap();
    assert_eq!((prepared.width, prepared.height), (3, 2));
    assert_eq!(&prepared.rgba8_premul[..4], &[9, 8, 7, 255]);
}

#[test]
fn premultiply_leaves_opaque_pixels_alone() {
    let mut px = vec![10u8, 20, 30, 255, 255, 255, 255, 51];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![10, 20, 30, 255, 51, 51, 51, 51]);
}
