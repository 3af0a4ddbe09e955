use std::fmt;

use sg_core::{
    DialogueRecord, LayoutConfig, NotationConfig, ScriptId, ScriptLocation, StoryError,
};
use sg_layout::{substitute_glyphs, FontMetrics, TextLayout};
use sg_parser::{leading_address, BranchArity, InstructionLine, Opcode, OpcodeTable, Operand};

use crate::emit::{append_line, branching_line, splice_literal};
use crate::speakers::SpeakerTable;

/// Recoverable problems found while rewriting; the line is still emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteWarning {
    /// Text exceeds its line budget even at the minimum scale.
    Overlong { address: u32 },
    MissingGlyphs { address: u32, glyphs: Vec<char> },
    UnknownSpeaker { address: u32, name: String },
}

impl fmt::Display for RewriteWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteWarning::Overlong { address } => {
                write!(f, "{:06X}: text does not fit its lines", address)
            }
            RewriteWarning::MissingGlyphs { address, glyphs } => {
                let glyphs: String = glyphs.iter().collect();
                write!(f, "{:06X}: font has no glyph for {:?}", address, glyphs)
            }
            RewriteWarning::UnknownSpeaker { address, name } => {
                write!(f, "{:06X}: no translation for speaker {:?}", address, name)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub lines: Vec<String>,
    pub rewritten: usize,
    pub warnings: Vec<RewriteWarning>,
}

/// Re-emits the dialogue sites of a script with translated text.
#[derive(Debug, Clone)]
pub struct Rewriter {
    opcodes: OpcodeTable,
    layout: TextLayout,
    layout_config: LayoutConfig,
    speakers: SpeakerTable,
}

struct ScriptPass<'a> {
    rewriter: &'a Rewriter,
    script_id: ScriptId,
    lines: Vec<String>,
    cursor: usize,
    warnings: Vec<RewriteWarning>,
}

impl Rewriter {
    pub fn new(config: &NotationConfig, metrics: FontMetrics, speakers: SpeakerTable) -> Self {
        Self {
            opcodes: OpcodeTable::new(&config.mnemonics),
            layout: TextLayout::new(metrics, &config.layout),
            layout_config: config.layout.clone(),
            speakers,
        }
    }

    /// Rewrites every record's site in one forward pass over `lines`.
    /// Records are sorted by address first; each must be found after the
    /// previous one.
    pub fn rewrite_script<S: AsRef<str>>(
        &self,
        script_id: ScriptId,
        lines: &[S],
        mut records: Vec<DialogueRecord>,
    ) -> Result<RewriteOutcome, StoryError> {
        records.sort_by_key(|record| record.address);

        let mut pass = ScriptPass {
            rewriter: self,
            script_id,
            lines: lines.iter().map(|line| line.as_ref().to_string()).collect(),
            cursor: 0,
            warnings: Vec::new(),
        };
        for record in &records {
            pass.rewrite_record(record)?;
        }

        Ok(RewriteOutcome {
            lines: pass.lines,
            rewritten: records.len(),
            warnings: pass.warnings,
        })
    }
}

impl ScriptPass<'_> {
    fn location(&self, address: u32, index: usize) -> ScriptLocation {
        ScriptLocation::address(self.script_id, address).with_line(index + 1)
    }

    fn warn(&mut self, warning: RewriteWarning) {
        tracing::warn!(script_id = self.script_id, "{}", warning);
        self.warnings.push(warning);
    }

    fn parse(&self, index: usize, address: u32) -> Result<InstructionLine, StoryError> {
        InstructionLine::parse(&self.lines[index]).map_err(|error| {
            StoryError::at(error.code, error.message, self.location(address, index))
        })
    }

    fn rewrite_record(&mut self, record: &DialogueRecord) -> Result<(), StoryError> {
        let address = record.address;
        let start = self.seek_address(address)?;
        let (site, site_line, opcode) = self.seek_dialogue(start, address)?;
        let end = self.span_end(site, address)?;

        self.substitute_speaker(record, start, end)?;

        match opcode {
            Opcode::Branching(arity) => self.rewrite_branching(record, site, &site_line, arity),
            _ => self.rewrite_sequential(record, site, end, &site_line),
        }
    }

    fn not_found(&self, address: u32, detail: &str) -> StoryError {
        StoryError::at(
            "REWRITE_SITE_NOT_FOUND",
            detail,
            ScriptLocation::address(self.script_id, address),
        )
    }

    fn seek_address(&mut self, address: u32) -> Result<usize, StoryError> {
        while self.cursor < self.lines.len() {
            if leading_address(&self.lines[self.cursor]) == Some(address) {
                return Ok(self.cursor);
            }
            self.cursor += 1;
        }
        Err(self.not_found(address, "no instruction at this address after the previous site"))
    }

    /// Finds the dialogue-emitting instruction at or after `start`, staying
    /// inside the chunk.
    fn seek_dialogue(
        &mut self,
        start: usize,
        address: u32,
    ) -> Result<(usize, InstructionLine, Opcode), StoryError> {
        let mut index = start;
        while index < self.lines.len() {
            let text = self.lines[index].trim();
            if text.is_empty() {
                break;
            }
            if !text.starts_with('.') {
                let line = self.parse(index, address)?;
                let opcode = self.rewriter.opcodes.classify(&line.mnemonic);
                if opcode.emits_dialogue() {
                    self.cursor = index;
                    return Ok((index, line, opcode));
                }
            }
            index += 1;
        }
        Err(self.not_found(address, "no dialogue instruction follows this address"))
    }

    /// End (exclusive) of the dialogue span that starts at `site`: the first
    /// flush instruction or the chunk end.
    fn span_end(&self, site: usize, address: u32) -> Result<usize, StoryError> {
        let mut index = site + 1;
        while index < self.lines.len() {
            let text = self.lines[index].trim();
            if text.is_empty() {
                break;
            }
            if !text.starts_with('.') {
                let line = self.parse(index, address)?;
                let opcode = self.rewriter.opcodes.classify(&line.mnemonic);
                if !opcode.emits_dialogue() && opcode != Opcode::SetSpeaker {
                    break;
                }
            }
            index += 1;
        }
        Ok(index)
    }

    /// Substitutes every Set-speaker line in `start..end`. The parser keeps a
    /// speaker set anywhere before the flush, so the whole span is searched.
    fn substitute_speaker(
        &mut self,
        record: &DialogueRecord,
        start: usize,
        end: usize,
    ) -> Result<(), StoryError> {
        let mut speaker_lines = Vec::new();
        for index in start..end {
            if self.lines[index].trim_start().starts_with('.') {
                continue;
            }
            let line = self.parse(index, record.address)?;
            if self.rewriter.opcodes.classify(&line.mnemonic) == Opcode::SetSpeaker {
                speaker_lines.push((index, line));
            }
        }

        match (speaker_lines.is_empty(), record.speaker.is_some()) {
            (true, false) => return Ok(()),
            (false, true) => {}
            (found_none, _) => {
                let detail = if found_none {
                    "record has a speaker but the script sets none"
                } else {
                    "script sets a speaker but the record has none"
                };
                return Err(StoryError::at(
                    "REWRITE_SPEAKER_MISMATCH",
                    detail,
                    self.location(record.address, start),
                ));
            }
        }

        for (index, line) in speaker_lines {
            let (name, span) = match (line.first_str(), line.first_str_span()) {
                (Some(name), Some(span)) => (name.to_string(), span),
                _ => {
                    return Err(StoryError::at(
                        "REWRITE_SPEAKER_MISMATCH",
                        "speaker instruction has no name operand",
                        self.location(record.address, index),
                    ))
                }
            };

            let rewriter = self.rewriter;
            match rewriter.speakers.translate(&name) {
                Some(translated) => {
                    self.lines[index] = splice_literal(&self.lines[index], span, translated);
                }
                // Untranslated names keep their original literal bytes.
                None if !rewriter.speakers.is_empty() => {
                    self.warn(RewriteWarning::UnknownSpeaker {
                        address: record.address,
                        name,
                    });
                }
                None => {}
            }
        }
        Ok(())
    }

    fn check_glyphs(&mut self, address: u32, texts: &[&str]) {
        let metrics = self.rewriter.layout.metrics();
        let mut glyphs: Vec<char> = texts
            .iter()
            .flat_map(|text| metrics.missing_glyphs(text))
            .collect();
        glyphs.sort_unstable();
        glyphs.dedup();
        if !glyphs.is_empty() {
            self.warn(RewriteWarning::MissingGlyphs { address, glyphs });
        }
    }

    fn rewrite_branching(
        &mut self,
        record: &DialogueRecord,
        site: usize,
        site_line: &InstructionLine,
        arity: BranchArity,
    ) -> Result<(), StoryError> {
        let fields = arity.fields();
        let voices = voice_operands(site_line, fields).ok_or_else(|| {
            StoryError::at(
                "REWRITE_OPERAND_LAYOUT",
                format!(
                    "{} does not have the voice, {} texts, voice, {} texts layout",
                    site_line.mnemonic, fields, fields
                ),
                self.location(record.address, site),
            )
        })?;

        let body = substitute_glyphs(&record.body);
        let variant = record
            .variant_body
            .as_deref()
            .map(substitute_glyphs)
            .unwrap_or_else(|| body.clone());
        self.check_glyphs(record.address, &[&body, &variant]);

        let slots = self.rewriter.layout_config.branching_slots.max(fields);
        let layout = &self.rewriter.layout;
        let body_slots = layout.layout_slots(&body, slots, fields);
        let variant_slots = layout.layout_slots(&variant, slots, fields);
        if body_slots.overlong || variant_slots.overlong {
            self.warn(RewriteWarning::Overlong {
                address: record.address,
            });
        }

        self.lines[site] = branching_line(
            site_line.label.as_deref(),
            &site_line.mnemonic,
            voices,
            &body_slots.slots,
            &variant_slots.slots,
        );
        self.cursor = site + 1;
        Ok(())
    }

    /// Replaces the Append lines of the run `site..end` with the fitted body.
    /// Set-speaker lines inside the run stay, after the emitted text.
    fn rewrite_sequential(
        &mut self,
        record: &DialogueRecord,
        site: usize,
        end: usize,
        site_line: &InstructionLine,
    ) -> Result<(), StoryError> {
        if record.variant_body.is_some() {
            return Err(StoryError::at(
                "REWRITE_VARIANT_ON_SEQUENTIAL",
                "record has a variant body but the site is a sequential dialogue",
                self.location(record.address, site),
            ));
        }

        let mut label: Option<String> = None;
        let mut kept = Vec::new();
        let mut run_end = site;
        while run_end < end {
            if self.lines[run_end].trim_start().starts_with('.') {
                kept.push(self.lines[run_end].clone());
                run_end += 1;
                continue;
            }
            let line = self.parse(run_end, record.address)?;
            match self.rewriter.opcodes.classify(&line.mnemonic) {
                Opcode::AppendLine => {}
                Opcode::SetSpeaker => {
                    kept.push(self.lines[run_end].clone());
                    run_end += 1;
                    continue;
                }
                _ => break,
            }
            if let Some(found) = line.label {
                if label.is_some() {
                    return Err(StoryError::at(
                        "REWRITE_DUPLICATE_LABEL",
                        format!("second label {} inside one dialogue run", found),
                        self.location(record.address, run_end),
                    ));
                }
                label = Some(found);
            }
            run_end += 1;
        }

        let body = substitute_glyphs(&record.body);
        self.check_glyphs(record.address, &[&body]);
        let fitted = self
            .rewriter
            .layout
            .fit(&body, self.rewriter.layout_config.dialogue_max_lines);
        if fitted.overlong {
            self.warn(RewriteWarning::Overlong {
                address: record.address,
            });
        }

        let mut emitted: Vec<String> = fitted
            .lines
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let label = if index == 0 { label.as_deref() } else { None };
                append_line(label, &site_line.mnemonic, text)
            })
            .collect();
        emitted.extend(kept);
        let count = emitted.len();
        self.lines.splice(site..run_end, emitted);
        self.cursor = site + count;
        Ok(())
    }
}

/// Raw voice-over tokens of a branching call laid out as
/// `VOX_A, text×fields, VOX_B, text×fields`.
fn voice_operands(line: &InstructionLine, fields: usize) -> Option<(&str, &str)> {
    if line.operands.len() != fields * 2 + 2 {
        return None;
    }
    let is_text = |operand: &Operand| match operand {
        Operand::Str { .. } => true,
        Operand::Int { raw, .. } => raw == "=0",
        Operand::Other(_) => false,
    };
    let first = line.operands[0].raw_int()?;
    let second = line.operands[fields + 1].raw_int()?;
    let texts_ok = line.operands[1..=fields]
        .iter()
        .chain(&line.operands[fields + 2..])
        .all(is_text);
    texts_ok.then_some((first, second))
}

#[cfg(test)]
mod rewrite_tests {
    use std::collections::HashMap;

    use super::*;

    fn rewriter(max_width_px: u32, speakers: &[(&str, &str)]) -> Rewriter {
        let advances: HashMap<char, u32> = (' '..='~').map(|ch| (ch, 10)).collect();
        let mut config = NotationConfig::default();
        config.layout.max_width_px = max_width_px;
        Rewriter::new(
            &config,
            FontMetrics::new(advances, 10),
            speakers
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        )
    }

    fn record(
        address: u32,
        speaker: Option<&str>,
        body: &str,
        variant: Option<&str>,
    ) -> DialogueRecord {
        DialogueRecord {
            script_id: 7,
            address,
            thread: "sure1".to_string(),
            speaker: speaker.map(str::to_string),
            body: body.to_string(),
            variant_body: variant.map(str::to_string),
        }
    }

    #[test]
    fn sequential_site_is_replaced_and_speaker_substituted() {
        let lines = [
            r#"000100          sure1: call fn_EB4C, "Cardia""#,
            r#"000110                 call fn_E340, "Old line one""#,
            r#"000120                 call fn_E340, "Old line two""#,
            "000130                 return",
        ];
        let outcome = rewriter(200, &[("Cardia", "Kardia")])
            .rewrite_script(
                7,
                &lines,
                vec![record(0x100, Some("Cardia"), "Brand new words here", None)],
            )
            .expect("rewrite should succeed");

        assert_eq!(
            outcome.lines,
            vec![
                r#"000100          sure1: call fn_EB4C, "Kardia""#.to_string(),
                r#"call fn_E340, "Brand new words here""#.to_string(),
                "000130                 return".to_string(),
            ]
        );
        assert_eq!(outcome.rewritten, 1);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn sequential_label_moves_to_first_emitted_line_and_scale_is_applied() {
        let lines = [
            r#"000100          sure1: call fn_E340, "x""#,
            "000110                 return",
        ];
        let body = "aaaa bbbb cccc dddd eeee ffff gggg hhhh";
        let outcome = rewriter(100, &[])
            .rewrite_script(7, &lines, vec![record(0x100, None, body, None)])
            .expect("rewrite should succeed");

        assert!(outcome.lines[0].starts_with(r#"sure1: call fn_E340, "<scale="#));
        assert!(outcome.lines.len() <= 4);
        assert_eq!(
            outcome.lines.last().map(String::as_str),
            Some("000110                 return")
        );
    }

    #[test]
    fn branching_site_keeps_voices_and_label() {
        let lines = [
            r#"000300          sure3: call fn_3BB24, =8003, "Yes.", =0, =0, =8004, "No.", =0, =0"#,
            "000310                 return",
        ];
        let outcome = rewriter(100, &[])
            .rewrite_script(7, &lines, vec![record(0x300, None, "Oui, oui.", Some("Non."))])
            .expect("rewrite should succeed");
        assert_eq!(
            outcome.lines[0],
            r#"sure3: call fn_3BB24, =8003, "Oui\x2c oui.", "", "", =8004, "Non.", "", """#
        );
    }

    #[test]
    fn branching_without_variant_repeats_the_body() {
        let lines = [r#"000300 call fn_3B78C, =1, "a", "b", "c", =2, "d", "e", "f""#];
        let outcome = rewriter(100, &[])
            .rewrite_script(7, &lines, vec![record(0x300, None, "Same", None)])
            .expect("rewrite should succeed");
        assert_eq!(
            outcome.lines[0],
            r#"call fn_3B78C, =1, "Same", "", "", =2, "Same", "", """#
        );
    }

    #[test]
    fn missing_site_is_fatal() {
        let lines = ["000100 call fn_E340, \"a\""];
        let error = rewriter(100, &[])
            .rewrite_script(7, &lines, vec![record(0x200, None, "b", None)])
            .expect_err("missing site should fail");
        assert_eq!(error.code, "REWRITE_SITE_NOT_FOUND");
        assert_eq!(error.location, Some(ScriptLocation::address(7, 0x200)));
    }

    #[test]
    fn speaker_presence_must_agree() {
        let lines = [
            r#"000100 sure1: call fn_EB4C, "Cardia""#,
            r#"000110 call fn_E340, "a""#,
        ];
        let error = rewriter(100, &[])
            .rewrite_script(7, &lines, vec![record(0x100, None, "b", None)])
            .expect_err("speaker mismatch should fail");
        assert_eq!(error.code, "REWRITE_SPEAKER_MISMATCH");

        let lines = [r#"000110 call fn_E340, "a""#];
        let error = rewriter(100, &[])
            .rewrite_script(7, &lines, vec![record(0x110, Some("Cardia"), "b", None)])
            .expect_err("speaker mismatch should fail");
        assert_eq!(error.code, "REWRITE_SPEAKER_MISMATCH");
    }

    #[test]
    fn variant_on_sequential_site_is_fatal() {
        let lines = [r#"000110 call fn_E340, "a""#];
        let error = rewriter(100, &[])
            .rewrite_script(7, &lines, vec![record(0x110, None, "b", Some("c"))])
            .expect_err("variant should fail");
        assert_eq!(error.code, "REWRITE_VARIANT_ON_SEQUENTIAL");
    }

    #[test]
    fn two_labels_in_one_run_are_fatal() {
        let lines = [
            r#"000110 sure1: call fn_E340, "a""#,
            r#"000120 local_1: call fn_E340, "b""#,
        ];
        let error = rewriter(100, &[])
            .rewrite_script(7, &lines, vec![record(0x110, None, "c", None)])
            .expect_err("duplicate label should fail");
        assert_eq!(error.code, "REWRITE_DUPLICATE_LABEL");
    }

    #[test]
    fn unknown_speaker_and_missing_glyphs_are_warnings() {
        let lines = [
            r#"000100 sure1: call fn_EB4C, "Lupin""#,
            r#"000110 call fn_E340, "a""#,
        ];
        let outcome = rewriter(500, &[("Cardia", "Kardia")])
            .rewrite_script(7, &lines, vec![record(0x100, Some("Lupin"), "Ça va ☺", None)])
            .expect("rewrite should succeed");
        assert_eq!(outcome.lines[0], r#"000100 sure1: call fn_EB4C, "Lupin""#);
        assert_eq!(
            outcome.warnings,
            vec![
                RewriteWarning::UnknownSpeaker {
                    address: 0x100,
                    name: "Lupin".to_string(),
                },
                RewriteWarning::MissingGlyphs {
                    address: 0x100,
                    glyphs: vec!['Ç', '☺'],
                },
            ]
        );
    }

    #[test]
    fn records_are_sorted_before_the_forward_scan() {
        let lines = [
            r#"000100 call fn_E340, "a""#,
            "000108 return",
            r#"000110 call fn_E340, "b""#,
        ];
        let outcome = rewriter(100, &[])
            .rewrite_script(
                7,
                &lines,
                vec![record(0x110, None, "second", None), record(0x100, None, "first", None)],
            )
            .expect("rewrite should succeed");
        assert_eq!(
            outcome.lines,
            vec![
                r#"call fn_E340, "first""#.to_string(),
                "000108 return".to_string(),
                r#"call fn_E340, "second""#.to_string(),
            ]
        );
    }
}
