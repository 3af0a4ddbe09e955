use crate::wrap::TextLayout;

/// Text laid out into the fixed display slots of a branching dialogue call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotLayout {
    pub slots: Vec<String>,
    /// More wrapped lines than display slots; the surplus was merged.
    pub overlong: bool,
}

impl TextLayout {
    /// Wraps at full scale, pads to `logical_slots` entries, then merges
    /// everything from the last display slot onward into that slot.
    pub fn layout_slots(
        &self,
        text: &str,
        logical_slots: usize,
        display_slots: usize,
    ) -> SlotLayout {
        let display_slots = display_slots.max(1);
        let mut lines = self.wrap(text, 1.0);
        if lines.len() < logical_slots {
            lines.resize(logical_slots, String::new());
        }

        let keep = display_slots - 1;
        let surplus: Vec<String> = lines
            .split_off(keep.min(lines.len()))
            .into_iter()
            .filter(|line| !line.is_empty())
            .collect();
        let overlong = surplus.len() > 1;
        lines.push(surplus.join(" "));
        lines.resize(display_slots, String::new());

        SlotLayout {
            slots: lines,
            overlong,
        }
    }
}
