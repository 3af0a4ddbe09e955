mod glyphs;
mod metrics;
mod slots;
mod wrap;

pub use glyphs::{substitute_glyphs, GLYPH_SUBSTITUTIONS};
pub use metrics::FontMetrics;
pub use slots::SlotLayout;
pub use wrap::{FittedText, TextLayout, MIN_SCALE_TENTHS};
