mod common;

use image::{GrayImage, Luma, Rgb, RgbImage};

use thermocrop_core::error::ThermoError;
use thermocrop_core::frame::PixelGrid;
use thermocrop_core::io::{crop_grid, load_image, CropRect};

use common::{gray, patterned_frame};

#[test]
fn test_load_gray_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("P01_27_Controle_Dia_R1_thermal.png");
    GrayImage::from_fn(6, 4, |x, y| Luma([(x * 10 + y) as u8]))
        .save(&path)
        .unwrap();

    match load_image(&path).unwrap() {
        PixelGrid::Gray(frame) => {
            assert_eq!((frame.width(), frame.height()), (6, 4));
            assert_eq!(frame.data[[3, 5]], 53);
        }
        PixelGrid::Color(_) => panic!("expected a gray image"),
    }
}

#[test]
fn test_load_rgb_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.png");
    RgbImage::from_fn(5, 3, |x, _| if x < 2 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) })
        .save(&path)
        .unwrap();

    let grid = load_image(&path).unwrap();
    assert!(grid.is_color());
    match grid {
        PixelGrid::Color(color) => {
            assert_eq!((color.width(), color.height()), (5, 3));
            assert_eq!(color.red.data[[0, 0]], 255);
            assert_eq!(color.blue.data[[2, 4]], 255);
        }
        PixelGrid::Gray(_) => panic!("expected a color image"),
    }
}

#[test]
fn test_missing_image_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_image(&dir.path().join("missing.png")),
        Err(ThermoError::Io(_))
    ));
}

#[test]
fn test_crop_rect_parsing() {
    let rect: CropRect = "10, 20,30,40".parse().unwrap();
    assert_eq!(rect, CropRect::new(10, 20, 30, 40));
    assert!(matches!("1,2,3".parse::<CropRect>(), Err(ThermoError::Config(_))));
    assert!("a,b,c,d".parse::<CropRect>().is_err());
}

#[test]
fn test_crop_rect_validation() {
    assert!(CropRect::new(0, 0, 10, 10).validated(10, 10).is_ok());
    assert!(CropRect::new(1, 0, 10, 10).validated(10, 10).is_err());
    assert!(CropRect::new(0, 0, 0, 5).validated(10, 10).is_err());
}

#[test]
fn test_crop_grid_cuts_region() {
    let frame = patterned_frame(20, 30);
    let expected = frame.data[[7, 4]];
    let cropped = crop_grid(&gray(frame), &CropRect::new(4, 7, 6, 5)).unwrap();
    assert_eq!((cropped.width(), cropped.height()), (6, 5));
    match cropped {
        PixelGrid::Gray(f) => assert_eq!(f.data[[0, 0]], expected),
        PixelGrid::Color(_) => unreachable!(),
    }
}
