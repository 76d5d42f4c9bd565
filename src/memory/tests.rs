//! Image window tests

use crate::error::Error;
use crate::memory::Image;

#[test]
fn image_addressing() {
    let data = [0x00, 0x21, 0x03, 0x40, 0xC9];
    let image = Image::new(&data, 1, 0x4000, 3).unwrap();

    assert_eq!(image.read_byte(0x4000), Some(0x21));
    assert_eq!(image.read_word(0x4001, false), Some(0x4003));
    assert_eq!(image.read_word(0x4001, true), Some(0x0340));
    assert_eq!(image.read_byte(0x3FFF), Some(0x00));
    assert_eq!(image.read_byte(0x3FFE), None);
    assert_eq!(image.read_byte(0x4004), None);
    assert_eq!(image.window_from(0x4001), &[0x03, 0x40]);
    assert_eq!(image.window_from(0x4003), &[] as &[u8]);
    assert_eq!(image.end(), 0x4003);
}

#[test]
fn image_bounds() {
    let data = [0u8; 4];

    assert!(matches!(
        Image::new(&data, 2, 0, 3),
        Err(Error::OutOfBounds { .. })
    ));
    assert!(matches!(
        Image::new(&data, 0, 0xFFFE, 4),
        Err(Error::OutOfBounds { .. })
    ));
    assert!(Image::new(&data, 0, 0xFFFC, 4).is_ok());
}
