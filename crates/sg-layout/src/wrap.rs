use sg_core::LayoutConfig;

use crate::metrics::FontMetrics;

/// Smallest scale tried by [`TextLayout::fit`], in tenths.
pub const MIN_SCALE_TENTHS: u32 = 1;
const FULL_SCALE_TENTHS: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct FittedText {
    pub lines: Vec<String>,
    pub scale: f64,
    /// The text still exceeds the line budget at the minimum scale.
    pub overlong: bool,
}

/// Greedy word wrap by advance width.
#[derive(Debug, Clone)]
pub struct TextLayout {
    metrics: FontMetrics,
    max_width_px: u32,
    scale_directive: String,
}

impl TextLayout {
    pub fn new(metrics: FontMetrics, config: &LayoutConfig) -> Self {
        Self {
            metrics,
            max_width_px: config.max_width_px,
            scale_directive: config.scale_directive.clone(),
        }
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub fn max_width_px(&self) -> u32 {
        self.max_width_px
    }

    /// Wraps `text` into lines no wider than the maximum width once scaled.
    /// Always returns at least one line; a scaled result carries the scale
    /// directive at the start of its first line.
    pub fn wrap(&self, text: &str, scale: f64) -> Vec<String> {
        let separator = self.metrics.advance(' ');
        let limit = f64::from(self.max_width_px);

        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0u32;

        for word in text.split_whitespace() {
            let word_width = self.metrics.text_width(word);
            let added = if current.is_empty() {
                word_width
            } else {
                word_width + separator
            };

            if !current.is_empty() && scale * f64::from(current_width + added) > limit {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_width;
                continue;
            }

            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_width += added;
        }

        if !current.is_empty() || lines.is_empty() {
            lines.push(current);
        }

        if !is_full_scale(scale) {
            let directive = self.scale_directive(scale);
            lines[0].insert_str(0, &directive);
        }

        lines
    }

    /// Shrinks the scale in steps of 0.1 until the text fits in `max_lines`.
    pub fn fit(&self, text: &str, max_lines: usize) -> FittedText {
        let mut attempt = Vec::new();
        for tenths in (MIN_SCALE_TENTHS..=FULL_SCALE_TENTHS).rev() {
            let scale = f64::from(tenths) / 10.0;
            attempt = self.wrap(text, scale);
            if attempt.len() <= max_lines {
                return FittedText {
                    lines: attempt,
                    scale,
                    overlong: false,
                };
            }
        }

        FittedText {
            lines: attempt,
            scale: f64::from(MIN_SCALE_TENTHS) / 10.0,
            overlong: true,
        }
    }

    fn scale_directive(&self, scale: f64) -> String {
        let percent = (scale * 100.0).round() as u32;
        self.scale_directive
            .replace("{percent}", &percent.to_string())
    }
}

fn is_full_scale(scale: f64) -> bool {
    (scale - 1.0).abs() < f64::EPSILON
}


#[cfg(test)]
pub(crate) use wrap_tests::monospace;
