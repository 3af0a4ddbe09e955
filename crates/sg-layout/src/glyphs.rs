/// Characters the target font has no glyph for, with their closest stand-in.
/// `ー` is the katakana long vowel mark.
pub const GLYPH_SUBSTITUTIONS: &[(char, char)] =
    &[('—', 'ー'), ('é', 'e'), ('è', 'e'), ('à', 'a')];

pub fn substitute_glyphs(text: &str) -> String {
    text.chars()
        .map(|ch| {
            GLYPH_SUBSTITUTIONS
                .iter()
                .find(|(from, _)| *from == ch)
                .map_or(ch, |(_, to)| *to)
        })
        .collect()
}
