use std::collections::HashMap;

use sg_core::NotationConfig;
use sg_layout::FontMetrics;
use sg_parser::{extract_script, InstructionLine};

use super::*;

const SCRIPT: &str = r#".tag "SCRIPT_0077"
.code_start

000100          sure1: call fn_EB4C, "Cardia"
000110                 call fn_E340, "Well\x2c then. \"Fine\"."
000120                 call fn_15C0, "sure2"
000130                 return

000200          sure2: call fn_3B78C, =5001, "Yes.", "", "", =5002, "No.", "", ""
000208                 return
000210                 call fn_54B4C, =5003, "Go", "", "", "", =5004, "Stay", "", "", ""
000218                 return
000220                 call fn_E340, "One more line."
000230                 return
"#;

fn rewriter() -> Rewriter {
    let advances: HashMap<char, u32> = (' '..='~').map(|ch| (ch, 10)).collect();
    Rewriter::new(
        &NotationConfig::default(),
        FontMetrics::new(advances, 10),
        SpeakerTable::default(),
    )
}

/// Instruction text of each line with the address column removed.
fn instruction_texts(lines: &[impl AsRef<str>]) -> Vec<String> {
    lines
        .iter()
        .map(|line| {
            let trimmed = line.as_ref().trim();
            if trimmed.is_empty() || trimmed.starts_with('.') {
                return trimmed.to_string();
            }
            InstructionLine::parse(trimmed)
                .expect("line should parse")
                .instruction_text()
        })
        .collect()
}

#[test]
fn rewriting_extracted_records_reproduces_the_script() {
    let lines: Vec<&str> = SCRIPT.lines().collect();
    let batch = extract_script(&NotationConfig::default(), 77, &lines).expect("script parses");
    assert_eq!(batch.dialogue.len(), 4);

    let outcome = rewriter()
        .rewrite_script(77, &lines, batch.dialogue)
        .expect("rewrite should succeed");

    assert_eq!(outcome.rewritten, 4);
    assert!(outcome.warnings.is_empty());
    assert_eq!(instruction_texts(&outcome.lines), instruction_texts(&lines));
}

#[test]
fn round_trip_differs_only_in_normalized_characters() {
    let lines = vec![
        r#"000100          sure1: call fn_E340, "Hi, Café — you""#,
        "000110                 return",
    ];
    let batch = extract_script(&NotationConfig::default(), 5, &lines).expect("script parses");
    let outcome = rewriter()
        .rewrite_script(5, &lines, batch.dialogue)
        .expect("rewrite should succeed");

    assert_eq!(
        outcome.lines[0],
        r#"sure1: call fn_E340, "Hi\x2c Cafe ー you""#
    );
    assert_eq!(outcome.lines[1], lines[1]);
    assert_eq!(
        outcome.warnings,
        vec![RewriteWarning::MissingGlyphs {
            address: 0x100,
            glyphs: vec!['ー'],
        }]
    );
}

#[test]
fn translated_records_replace_text_but_keep_structure() {
    let lines: Vec<&str> = SCRIPT.lines().collect();
    let mut records = extract_script(&NotationConfig::default(), 77, &lines)
        .expect("script parses")
        .dialogue;
    for record in &mut records {
        record.body = format!("[fr] {}", record.body);
        if let Some(variant) = record.variant_body.as_mut() {
            variant.insert_str(0, "[fr] ");
        }
    }
    let speakers: SpeakerTable = [("Cardia".to_string(), "Kardia".to_string())]
        .into_iter()
        .collect();
    let advances: HashMap<char, u32> = (' '..='~').map(|ch| (ch, 10)).collect();
    let rewriter = Rewriter::new(
        &NotationConfig::default(),
        FontMetrics::new(advances, 10),
        speakers,
    );

    let outcome = rewriter
        .rewrite_script(77, &lines, records)
        .expect("rewrite should succeed");
    let texts = instruction_texts(&outcome.lines);

    assert!(texts.contains(&r#"sure1: call fn_EB4C, "Kardia""#.to_string()));
    assert!(texts.contains(
        &r#"sure2: call fn_3B78C, =5001, "[fr] Yes.", "", "", =5002, "[fr] No.", "", """#
            .to_string()
    ));
    assert!(texts.contains(
        &r#"call fn_54B4C, =5003, "[fr] Go", "", "", "", =5004, "[fr] Stay", "", "", """#
            .to_string()
    ));
    assert!(texts.contains(&r#"call fn_E340, "[fr] One more line.""#.to_string()));
    assert_eq!(outcome.lines.len(), lines.len());
}

#[test]
fn speaker_set_after_the_first_line_round_trips() {
    let lines = vec![
        r#"000100          sure1: call fn_E340, "Hm.""#,
        r#"000110                 call fn_EB4C, "Van""#,
        "000120                 return",
    ];
    let batch = extract_script(&NotationConfig::default(), 5, &lines).expect("script parses");
    assert_eq!(batch.dialogue[0].address, 0x100);
    assert_eq!(batch.dialogue[0].speaker.as_deref(), Some("Van"));

    let outcome = rewriter()
        .rewrite_script(5, &lines, batch.dialogue)
        .expect("rewrite should succeed");
    assert_eq!(instruction_texts(&outcome.lines), instruction_texts(&lines));
    assert!(outcome.warnings.is_empty());
}

#[test]
fn speaker_between_lines_stays_and_every_line_is_replaced() {
    let lines = vec![
        r#"000100          sure1: call fn_E340, "Hm.""#,
        r#"000110                 call fn_EB4C, "Van""#,
        r#"000120                 call fn_E340, "Right.""#,
        "000130                 return",
    ];
    let batch = extract_script(&NotationConfig::default(), 5, &lines).expect("script parses");
    assert_eq!(batch.dialogue.len(), 1);
    let mut record = batch.dialogue[0].clone();
    record.body = "Well then.".to_string();

    let speakers: SpeakerTable = [("Van".to_string(), "Vann".to_string())]
        .into_iter()
        .collect();
    let advances: HashMap<char, u32> = (' '..='~').map(|ch| (ch, 10)).collect();
    let rewriter = Rewriter::new(
        &NotationConfig::default(),
        FontMetrics::new(advances, 10),
        speakers,
    );
    let outcome = rewriter
        .rewrite_script(5, &lines, vec![record])
        .expect("rewrite should succeed");

    assert_eq!(
        outcome.lines,
        vec![
            r#"sure1: call fn_E340, "Well then.""#.to_string(),
            r#"000110                 call fn_EB4C, "Vann""#.to_string(),
            "000130                 return".to_string(),
        ]
    );
}

#[test]
fn untranslated_speaker_keeps_raw_byte_escapes() {
    let lines = vec![
        r#"000100          sure1: call fn_EB4C, "Ab\X8Fc""#,
        r#"000110                 call fn_E340, "Hi.""#,
        "000120                 return",
    ];
    let batch = extract_script(&NotationConfig::default(), 5, &lines).expect("script parses");
    assert_eq!(batch.dialogue[0].speaker.as_deref(), Some(r"Ab\X8Fc"));

    let outcome = rewriter()
        .rewrite_script(5, &lines, batch.dialogue.clone())
        .expect("rewrite should succeed");
    assert_eq!(outcome.lines[0], lines[0]);

    let speakers: SpeakerTable = [("Cardia".to_string(), "Kardia".to_string())]
        .into_iter()
        .collect();
    let advances: HashMap<char, u32> = (' '..='~').map(|ch| (ch, 10)).collect();
    let outcome = Rewriter::new(
        &NotationConfig::default(),
        FontMetrics::new(advances, 10),
        speakers,
    )
    .rewrite_script(5, &lines, batch.dialogue)
    .expect("rewrite should succeed");
    assert_eq!(outcome.lines[0], lines[0]);
    assert_eq!(outcome.warnings.len(), 1);
}
