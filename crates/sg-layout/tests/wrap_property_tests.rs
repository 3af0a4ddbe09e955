use std::collections::HashMap;

use proptest::prelude::*;
use sg_core::LayoutConfig;
use sg_layout::{FontMetrics, TextLayout};

fn layout(max_width_px: u32) -> TextLayout {
    let advances = ('a'..='z')
        .enumerate()
        .map(|(index, ch)| (ch, 6 + (index as u32 % 7) * 3))
        .chain([(' ', 5)])
        .collect::<HashMap<_, _>>();
    let config = LayoutConfig {
        max_width_px,
        ..LayoutConfig::default()
    };
    TextLayout::new(FontMetrics::new(advances, 0), &config)
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(("[a-z]{1,12}", "[ \n\t]{1,3}"), 0..24).prop_map(|parts| {
        parts
            .into_iter()
            .map(|(word, gap)| format!("{}{}", word, gap))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn wrapped_lines_rejoin_to_normalized_text(text in text_strategy(), width in 20u32..400) {
        let layout = layout(width);
        let lines = layout.wrap(&text, 1.0);
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        prop_assert!(!lines.is_empty());
        prop_assert_eq!(lines.join(" "), normalized);
    }

    #[test]
    fn multi_word_lines_respect_the_width(text in text_strategy(), width in 20u32..400) {
        let layout = layout(width);
        for line in layout.wrap(&text, 1.0) {
            if line.contains(' ') {
                prop_assert!(layout.metrics().text_width(&line) <= width);
            }
        }
    }

    #[test]
    fn fit_either_meets_budget_or_is_flagged(text in text_strategy(), width in 20u32..200) {
        let layout = layout(width);
        let fitted = layout.fit(&text, 3);
        if fitted.overlong {
            prop_assert_eq!(fitted.scale, 0.1);
            prop_assert!(fitted.lines.len() > 3);
        } else {
            prop_assert!(fitted.lines.len() <= 3);
            prop_assert!(fitted.scale >= 0.1);
        }
    }
}

#[test]
fn five_line_body_fits_after_scale_search() {
    let layout = layout(120);
    let text = "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo";
    assert!(layout.wrap(text, 1.0).len() >= 5);

    let fitted = layout.fit(text, 3);
    assert!(!fitted.overlong);
    assert!(fitted.lines.len() <= 3);
    assert!(fitted.scale < 1.0);
}

#[test]
fn empty_text_wraps_to_single_empty_line_for_any_width() {
    for width in [1, 50, 1500] {
        assert_eq!(layout(width).wrap("", 1.0), vec![String::new()]);
    }
}
