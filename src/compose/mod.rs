//! Blending layers into the displayed frame.

pub mod blend;
pub mod compositor;
pub mod palette;

pub use blend::{BACKGROUND_MARKER, ColorRemap, FOREGROUND_MARKER, alpha_blend};
pub use compositor::{Compositor, CompositorSettings};
pub use palette::{ColorSampler, dominant_colors};
