use sg_core::{
    normalize_variant, DialogueRecord, EdgeRecord, Node, NotationConfig, ScriptBatch, ScriptId,
    ScriptLocation, StoryError,
};

use crate::chunk::{split_chunks, SourceLine};
use crate::line::{leading_address, InstructionLine, Operand};
use crate::opcode::{BranchArity, Opcode, OpcodeTable};

/// Speaker and text collected across instructions until a flush boundary.
#[derive(Debug, Default)]
struct DialogueAccumulator {
    address: Option<u32>,
    speaker: Option<String>,
    body: String,
    variant: Option<String>,
}

impl DialogueAccumulator {
    fn start_at(&mut self, address: u32) {
        self.address.get_or_insert(address);
    }

    fn flush(&mut self, script_id: ScriptId, thread: &str) -> Option<DialogueRecord> {
        if self.body.is_empty() {
            return None;
        }
        let pending = std::mem::take(self);
        Some(DialogueRecord {
            script_id,
            address: pending.address.expect("pending body always has a start address"),
            thread: thread.to_string(),
            speaker: pending.speaker,
            body: pending.body,
            variant_body: pending.variant,
        })
    }
}

struct ThreadScan<'a> {
    script_id: ScriptId,
    thread: &'a str,
    prefix: &'a str,
    opcodes: &'a OpcodeTable,
}

/// Extracts dialogue and branch edges from the lines of one script file.
pub fn extract_script<S: AsRef<str>>(
    config: &NotationConfig,
    script_id: ScriptId,
    lines: &[S],
) -> Result<ScriptBatch, StoryError> {
    let opcodes = OpcodeTable::new(&config.mnemonics);
    let mut batch = ScriptBatch::new(script_id);

    for chunk in split_chunks(lines) {
        let head = &chunk.lines[0];
        let opener = parse_line(script_id, head)?;
        let thread = match (opener.address, opener.label.as_deref()) {
            (Some(_), Some(label)) if label.starts_with(&config.thread_prefix) => label,
            _ => {
                tracing::debug!(script_id, line = head.number, "skipping non-thread chunk");
                continue;
            }
        };

        let scan = ThreadScan {
            script_id,
            thread,
            prefix: &config.thread_prefix,
            opcodes: &opcodes,
        };
        scan.run(&chunk.lines, &mut batch)?;
    }

    Ok(batch)
}

impl ThreadScan<'_> {
    fn run(&self, lines: &[SourceLine<'_>], batch: &mut ScriptBatch) -> Result<(), StoryError> {
        let mut pending = DialogueAccumulator::default();

        for source in lines {
            let line = parse_line(self.script_id, source)?;
            let address = line.address.ok_or_else(|| {
                StoryError::at(
                    "PARSE_MISSING_ADDRESS",
                    format!("instruction in thread {} has no address", self.thread),
                    ScriptLocation::script(self.script_id).with_line(source.number),
                )
            })?;
            let location =
                ScriptLocation::address(self.script_id, address).with_line(source.number);
            let opcode = self.opcodes.classify(&line.mnemonic);

            match opcode {
                Opcode::SetSpeaker => {
                    pending.start_at(address);
                    pending.speaker = Some(required_literal(&line, location)?.to_string());
                }
                Opcode::AppendLine => {
                    pending.start_at(address);
                    pending.body.push_str(required_literal(&line, location)?.trim());
                }
                Opcode::Branching(arity) => {
                    pending.start_at(address);
                    let (body, variant) = branching_payloads(&line, arity, location)?;
                    pending.variant = normalize_variant(&body, Some(variant));
                    pending.body = body;
                }
                Opcode::Jump | Opcode::ChoiceJump | Opcode::Other => {
                    if let Some(record) = pending.flush(self.script_id, self.thread) {
                        batch.dialogue.push(record);
                    }
                }
            }

            match opcode {
                Opcode::Jump => {
                    let (head, _) = self.branch_target(&line, location, false)?;
                    batch.push_edge(EdgeRecord::unconditional(self.tail(), head));
                }
                Opcode::ChoiceJump => {
                    let (head, target_index) = self.branch_target(&line, location, true)?;
                    let choice = line
                        .operands
                        .iter()
                        .enumerate()
                        .filter(|(index, _)| *index != target_index)
                        .find_map(|(_, operand)| operand.as_str())
                        .ok_or_else(|| {
                            StoryError::at(
                                "PARSE_MISSING_CHOICE",
                                format!("{} carries no choice text", line.mnemonic),
                                location,
                            )
                        })?;
                    batch.push_edge(EdgeRecord::choice(self.tail(), head, choice));
                }
                _ => {
                    if line.branch_target_index(self.prefix).is_some() {
                        return Err(StoryError::at(
                            "PARSE_UNEXPECTED_BRANCH_TARGET",
                            format!(
                                "{} references a thread but is not a known jump instruction",
                                line.mnemonic
                            ),
                            location,
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    fn tail(&self) -> Node {
        Node::new(self.script_id, self.thread)
    }

    /// Resolves the target thread of a jump. The script id is the `=N`
    /// operand directly before the target label; it defaults to the current
    /// script unless `require_script` is set.
    fn branch_target(
        &self,
        line: &InstructionLine,
        location: ScriptLocation,
        require_script: bool,
    ) -> Result<(Node, usize), StoryError> {
        let index = line.branch_target_index(self.prefix).ok_or_else(|| {
            StoryError::at(
                "PARSE_MISSING_BRANCH_TARGET",
                format!("{} has no \"{}N\" target", line.mnemonic, self.prefix),
                location,
            )
        })?;
        let thread = line.operands[index]
            .as_str()
            .expect("branch target is a string operand");

        let script = index
            .checked_sub(1)
            .and_then(|previous| line.operands[previous].as_int());
        let script_id = match (script, require_script) {
            (Some(script_id), _) => script_id,
            (None, false) => self.script_id,
            (None, true) => {
                return Err(StoryError::at(
                    "PARSE_MISSING_TARGET_SCRIPT",
                    format!("{} has no target script id before \"{}\"", line.mnemonic, thread),
                    location,
                ))
            }
        };

        Ok((Node::new(script_id, thread), index))
    }
}

fn parse_line(script_id: ScriptId, source: &SourceLine<'_>) -> Result<InstructionLine, StoryError> {
    InstructionLine::parse(source.text).map_err(|error| {
        let mut location = ScriptLocation::script(script_id).with_line(source.number);
        location.address = leading_address(source.text);
        StoryError::at(error.code, error.message, location)
    })
}

fn required_literal(line: &InstructionLine, location: ScriptLocation) -> Result<&str, StoryError> {
    line.first_str().ok_or_else(|| {
        StoryError::at(
            "PARSE_MISSING_LITERAL",
            format!("{} has no string operand", line.mnemonic),
            location,
        )
    })
}

/// Collects the text slots of a branching call. The authoring shorthand `=0`
/// stands for an empty slot; other integers are voice-over ids.
fn branching_payloads(
    line: &InstructionLine,
    arity: BranchArity,
    location: ScriptLocation,
) -> Result<(String, String), StoryError> {
    let payloads: Vec<&str> = line
        .operands
        .iter()
        .filter_map(|operand| match operand {
            Operand::Str { value, .. } => Some(value.trim()),
            Operand::Int { raw, .. } if raw == "=0" => Some(""),
            _ => None,
        })
        .collect();

    let fields = arity.fields();
    if payloads.len() != fields * 2 {
        return Err(StoryError::at(
            "PARSE_OPERAND_COUNT",
            format!(
                "{} expects {} text fields, found {}",
                line.mnemonic,
                fields * 2,
                payloads.len()
            ),
            location,
        ));
    }

    Ok((payloads[..fields].concat(), payloads[fields..].concat()))
}

#[cfg(test)]
mod extract_tests {
    use super::*;

    fn extract(lines: &[&str]) -> Result<ScriptBatch, StoryError> {
        extract_script(&NotationConfig::default(), 120, lines)
    }

    #[test]
    fn speaker_and_lines_flush_into_one_record() {
        let batch = extract(&[
            r#"000100          sure1: call fn_EB4C, "Lupin""#,
            r#"000110                 call fn_E340, " Good evening, ""#,
            r#"000120                 call fn_E340, "my lady. ""#,
            r#"000130                 call fn_9999, =1"#,
        ])
        .expect("script should parse");
        assert_eq!(
            batch.dialogue,
            vec![DialogueRecord {
                script_id: 120,
                address: 0x100,
                thread: "sure1".to_string(),
                speaker: Some("Lupin".to_string()),
                body: "Good evening,my lady.".to_string(),
                variant_body: None,
            }]
        );
    }

    #[test]
    fn speaker_after_first_line_keeps_earlier_start_address() {
        let batch = extract(&[
            r#"000100 sure2: call fn_E340, "Hm.""#,
            r#"000110 call fn_EB4C, "Van""#,
            r#"000120 return"#,
        ])
        .expect("script should parse");
        assert_eq!(batch.dialogue[0].address, 0x100);
        assert_eq!(batch.dialogue[0].speaker.as_deref(), Some("Van"));
    }

    #[test]
    fn pending_text_without_flush_is_discarded_at_chunk_end() {
        let batch = extract(&[r#"000100 sure1: call fn_E340, "dangling""#]).expect("parse");
        assert!(batch.dialogue.is_empty());
    }

    #[test]
    fn branching_dialogue_splits_body_and_variant() {
        let batch = extract(&[
            r#"000200 sure3: call fn_3B78C, =101, "A", "B", =0, =102, "C", "D", """#,
            r#"000210 return"#,
            "",
            r#"000300 sure4: call fn_54B4C, =5, "x", "y", "", "", =6, "x", "y", "", """#,
            r#"000310 return"#,
        ])
        .expect("script should parse");
        assert_eq!(batch.dialogue.len(), 2);
        assert_eq!(batch.dialogue[0].body, "AB");
        assert_eq!(batch.dialogue[0].variant_body.as_deref(), Some("CD"));
        assert_eq!(batch.dialogue[1].body, "xy");
        assert_eq!(batch.dialogue[1].variant_body, None);
    }

    #[test]
    fn branching_dialogue_rejects_wrong_field_count() {
        let error = extract(&[r#"000200 sure3: call fn_3BB24, =1, "A", "B", =2, "C""#])
            .expect_err("field count should fail");
        assert_eq!(error.code, "PARSE_OPERAND_COUNT");
        assert_eq!(
            error.location,
            Some(ScriptLocation::address(120, 0x200).with_line(1))
        );
    }

    #[test]
    fn jumps_produce_edges_with_default_script() {
        let batch = extract(&[
            r#"000100 sure1: call fn_15C0, "sure2""#,
            r#"000110 call fn_1608, =300, "sure1""#,
            r#"000120 call fn_15C0, "sure2""#,
            r#"000130 call fn_F794, "Stay", =120, "sure5""#,
            r#"000140 call fn_54F3C, "Stay", =120, "sure5""#,
        ])
        .expect("script should parse");

        let tail = Node::new(120, "sure1");
        assert_eq!(
            batch.edges,
            vec![
                EdgeRecord::unconditional(tail.clone(), Node::new(120, "sure2")),
                EdgeRecord::unconditional(tail.clone(), Node::new(300, "sure1")),
                EdgeRecord::choice(tail.clone(), Node::new(120, "sure5"), "Stay"),
                EdgeRecord::choice(tail, Node::new(120, "sure5"), "Stay"),
            ]
        );
    }

    #[test]
    fn choice_jump_requires_script_and_choice() {
        let error = extract(&[r#"000100 sure1: call fn_F794, "Go", "sure2""#])
            .expect_err("missing script should fail");
        assert_eq!(error.code, "PARSE_MISSING_TARGET_SCRIPT");

        let error = extract(&[r#"000100 sure1: call fn_F794, =4, "sure2""#])
            .expect_err("missing choice should fail");
        assert_eq!(error.code, "PARSE_MISSING_CHOICE");
    }

    #[test]
    fn unknown_instruction_with_branch_target_is_rejected() {
        let error = extract(&[r#"000100 sure1: call fn_AAAA, =4, "sure2""#])
            .expect_err("unknown jump should fail");
        assert_eq!(error.code, "PARSE_UNEXPECTED_BRANCH_TARGET");
        assert!(error.message.contains("script 120 @ 000100"));
    }

    #[test]
    fn chunks_outside_threads_are_ignored() {
        let batch = extract(&[
            r#"000100 fn_E340: call fn_AAAA, =4, "sure2""#,
            r#"000110 call fn_E340, "not dialogue""#,
            r#"000120 return"#,
            "",
            r#"call fn_E340, "no address""#,
        ])
        .expect("non-thread chunks are skipped");
        assert!(batch.is_empty());
    }

    #[test]
    fn instruction_without_address_inside_thread_is_rejected() {
        let error = extract(&[r#"000100 sure1: return"#, r#"call fn_E340, "x""#])
            .expect_err("missing address should fail");
        assert_eq!(error.code, "PARSE_MISSING_ADDRESS");
    }
}
