use super::*;
use crate::foundation::core::Rgba8;

const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);

#[test]
fn contain_top_right_with_padding() {
    let src = FrameBuffer::filled(2, 1, RED);
    let out = contain(&src, Canvas::new(6, 3), Anchor::TopRight, Padding::new(1, 1, 0, 0));
    assert_eq!((out.width(), out.height()), (6, 3));
    assert_eq!(out.pixel(3, 1), RED.to_array());
    assert_eq!(out.pixel(4, 1), RED.to_array());
    assert_eq!(out.pixel(5, 1)[3], 0);
    assert_eq!(out.pixel(3, 0)[3], 0);
}

#[test]
fn contain_crops_oversized_input() {
    let src = FrameBuffer::filled(10, 10, RED);
    let out = contain(&src, Canvas::new(4, 4), Anchor::TopLeft, Padding::new(1, 0, 0, 1));
    assert_eq!(out.pixel(0, 0)[3], 0);
    assert_eq!(out.pixel(3, 3), RED.to_array());
}

#[test]
fn contain_centers() {
    let src = FrameBuffer::filled(2, 2, RED);
    let out = contain(&src, Canvas::new(4, 4), Anchor::Center, Padding::ZERO);
    assert_eq!(out.pixel(1, 1), RED.to_array());
    assert_eq!(out.pixel(0, 0)[3], 0);
    assert_eq!(out.pixel(3, 3)[3], 0);
}

#[test]
fn vstack_requires_matching_widths() {
    let a = FrameBuffer::filled(3, 1, RED);
    let b = FrameBuffer::transparent(3, 2);
    let s = vstack(&[a.clone(), b]).unwrap();
    assert_eq!(s.height(), 3);
    assert_eq!(s.pixel(0, 0), RED.to_array());
    assert!(vstack(&[a, FrameBuffer::transparent(2, 1)]).is_err());
    assert!(vstack(&[]).is_err());
}

#[test]
fn hstack_interleaves_rows() {
    let a = FrameBuffer::filled(1, 2, RED);
    let b = FrameBuffer::transparent(2, 2);
    let s = hstack(&[a, b]).unwrap();
    assert_eq!((s.width(), s.height()), (3, 2));
    assert_eq!(s.pixel(0, 1), RED.to_array());
    assert_eq!(s.pixel(1, 1)[3], 0);
}

#[test]
fn crop_rows_keeps_top() {
    let fb = FrameBuffer::from_fn(1, 4, |_, y| [y as u8, 0, 0, 255]);
    let c = crop_rows(&fb, 2);
    assert_eq!(c.height(), 2);
    assert_eq!(c.pixel(0, 1)[0], 1);
    assert_eq!(crop_rows(&fb, 0).height(), 0);
}

#[test]
fn scale_alpha_halves() {
    let fb = FrameBuffer::filled(1, 1, RED);
    assert_eq!(scale_alpha(&fb, 0.5).pixel(0, 0), [255, 0, 0, 128]);
    assert_eq!(scale_alpha(&fb, 0.0).pixel(0, 0)[3], 0);
    assert_eq!(scale_alpha(&fb, 1.0), fb);
}

#[test]
fn fit_cover_crops_wide_images() {
    let img = image::RgbaImage::from_fn(40, 10, |x, _| {
        if x < 10 || x >= 30 {
            image::Rgba([0, 0, 255, 255])
        } else {
            image::Rgba([255, 0, 0, 255])
        }
    });
    let fb = fit_cover(&img, Canvas::new(4, 2)).unwrap();
    assert_eq!((fb.width(), fb.height()), (4, 2));
    // The 2:1 center crop keeps columns 10..30, which are all red.
    assert_eq!(fb.pixel(0, 0), [255, 0, 0, 255]);
    assert_eq!(fb.pixel(3, 1), [255, 0, 0, 255]);
}
