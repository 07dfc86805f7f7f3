use super::*;
use crate::foundation::core::Rgba8;
use proptest::prelude::*;

const C: Canvas = Canvas {
    width: 3,
    height: 2,
};

#[test]
fn over_endpoints() {
    assert_eq!(over([10, 20, 30], [200, 200, 200], 0), [10, 20, 30]);
    assert_eq!(over([10, 20, 30], [200, 201, 202], 255), [200, 201, 202]);
    assert_eq!(over([0, 0, 0], [255, 255, 255], 128), [128, 128, 128]);
}

#[test]
fn fill_shows_through_empty_stack() {
    let out = alpha_blend(&[], C, Rgb8::new(5, 6, 7), None).unwrap();
    assert_eq!(out.pixel(2, 1), [5, 6, 7, 255]);
}

#[test]
fn size_mismatch_is_rejected() {
    let bad = FrameBuffer::transparent(2, 2);
    assert!(alpha_blend(&[bad], C, Rgb8::BLACK, None).is_err());
}

#[test]
fn remap_skips_first_layer() {
    let remap = ColorRemap {
        foreground: Rgb8::new(10, 200, 10),
        background: Rgb8::new(0, 0, 90),
    };
    let marker_fg = FrameBuffer::filled(3, 2, Rgba8::new(254, 254, 254, 255));
    let out = alpha_blend(&[marker_fg.clone()], C, Rgb8::BLACK, Some(remap)).unwrap();
    assert_eq!(out.pixel(0, 0), [254, 254, 254, 255]);

    let marker_bg = FrameBuffer::filled(3, 2, Rgba8::new(1, 1, 1, 255));
    let out = alpha_blend(&[marker_fg.clone(), marker_fg], C, Rgb8::BLACK, Some(remap)).unwrap();
    assert_eq!(out.pixel(1, 1), [10, 200, 10, 255]);
    let base = FrameBuffer::filled(3, 2, Rgba8::new(0, 0, 0, 255));
    let out = alpha_blend(&[base, marker_bg], C, Rgb8::BLACK, Some(remap)).unwrap();
    assert_eq!(out.pixel(1, 1), [0, 0, 90, 255]);
}

proptest! {
    #[test]
    fn transparent_layer_is_identity(
        base in proptest::collection::vec(any::<u8>(), 3 * 2 * 4),
        junk in proptest::collection::vec(any::<u8>(), 3 * 2 * 4),
    ) {
        let mut base = base;
        for px in base.chunks_exact_mut(4) {
            px[3] = 255;
        }
        let mut top = junk;
        for px in top.chunks_exact_mut(4) {
            px[3] = 0;
        }
        let base = FrameBuffer::new(3, 2, base).unwrap();
        let top = FrameBuffer::new(3, 2, top).unwrap();
        let once = alpha_blend(std::slice::from_ref(&base), C, Rgb8::BLACK, None).unwrap();
        let twice = alpha_blend(&[base.clone(), top], C, Rgb8::BLACK, None).unwrap();
        prop_assert_eq!(once.data(), twice.data());
        prop_assert_eq!(once.data(), base.data());
    }
}
