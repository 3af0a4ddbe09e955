use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use sg_core::StoryError;

use crate::escape::unescape_literal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A quoted literal, decoded. `span` covers the quotes inside the raw line.
    Str { value: String, span: Range<usize> },
    /// `=N`, `=ABCDh` or `@=N`; `raw` keeps the exact spelling.
    Int { value: u32, raw: String },
    Other(String),
}

impl Operand {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Operand::Str { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<u32> {
        match self {
            Operand::Int { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn raw_int(&self) -> Option<&str> {
        match self {
            Operand::Int { raw, .. } => Some(raw),
            _ => None,
        }
    }

    fn parse_bare(token: &str) -> Self {
        let body = token.strip_prefix('@').unwrap_or(token);
        let value = body.strip_prefix('=').and_then(|digits| {
            match digits.strip_suffix('h') {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => digits.parse::<u32>().ok(),
            }
        });
        match value {
            Some(value) => Operand::Int {
                value,
                raw: token.to_string(),
            },
            None => Operand::Other(token.to_string()),
        }
    }
}

/// One instruction line of a disassembled script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionLine {
    pub raw: String,
    pub address: Option<u32>,
    pub label: Option<String>,
    pub mnemonic: String,
    pub operands: Vec<Operand>,
    /// Base64 junk after ` ! `, kept so the line can be reproduced.
    pub junk: Option<String>,
}

fn prefix_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^(?:([0-9A-F]{6})(?: +|$))?(?:([!-~]+):(?: +|$))?").expect("prefix regex")
    })
}

/// Leading address of a raw line, if it has one.
pub fn leading_address(raw: &str) -> Option<u32> {
    let trimmed = raw.trim_start();
    let digits = trimmed.get(..6)?;
    if !digits.bytes().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b)) {
        return None;
    }
    match trimmed.as_bytes().get(6) {
        None | Some(b' ') => u32::from_str_radix(digits, 16).ok(),
        _ => None,
    }
}

impl InstructionLine {
    pub fn parse(raw: &str) -> Result<Self, StoryError> {
        let leading = raw.len() - raw.trim_start().len();
        let trimmed = raw.trim();

        let caps = prefix_regex()
            .captures(trimmed)
            .expect("prefix regex matches any input");
        let address = caps
            .get(1)
            .map(|m| u32::from_str_radix(m.as_str(), 16).expect("six hex digits"));
        let label = caps.get(2).map(|m| m.as_str().to_string());
        let prefix_end = caps.get(0).map(|m| m.end()).unwrap_or(0);

        let body = &trimmed[prefix_end..];
        let body_offset = leading + prefix_end;
        let (mnemonic, operands, junk) = match body.find(',') {
            Some(comma) => {
                let (operands, junk) =
                    tokenize_operands(&body[comma + 1..], body_offset + comma + 1)?;
                (body[..comma].trim().to_string(), operands, junk)
            }
            None => match body.split_once(" ! ") {
                Some((mnemonic, junk)) => (
                    mnemonic.trim().to_string(),
                    Vec::new(),
                    Some(junk.trim().to_string()),
                ),
                None => (body.trim().to_string(), Vec::new(), None),
            },
        };

        Ok(Self {
            raw: raw.to_string(),
            address,
            label,
            mnemonic,
            operands,
            junk,
        })
    }

    pub fn first_str(&self) -> Option<&str> {
        self.operands.iter().find_map(Operand::as_str)
    }

    pub fn first_str_span(&self) -> Option<Range<usize>> {
        self.operands.iter().find_map(|operand| match operand {
            Operand::Str { span, .. } => Some(span.clone()),
            _ => None,
        })
    }

    /// Index of the quoted operand naming a branch target thread (`"<prefix><digits>"`).
    pub fn branch_target_index(&self, prefix: &str) -> Option<usize> {
        self.operands.iter().position(|operand| {
            operand.as_str().is_some_and(|value| {
                value
                    .strip_prefix(prefix)
                    .is_some_and(|digits| {
                        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
                    })
            })
        })
    }

    /// The text portion of the line: everything after the address prefix.
    pub fn instruction_text(&self) -> String {
        let trimmed = self.raw.trim();
        match self.address {
            Some(_) => trimmed[6..].trim_start().to_string(),
            None => trimmed.to_string(),
        }
    }
}

fn tokenize_operands(
    text: &str,
    offset: usize,
) -> Result<(Vec<Operand>, Option<String>), StoryError> {
    let bytes = text.as_bytes();
    let mut operands = Vec::new();
    let mut index = 0usize;

    loop {
        while index < bytes.len() && bytes[index] == b' ' {
            index += 1;
        }
        if index >= bytes.len() {
            return Ok((operands, None));
        }
        if bytes[index] == b'!' && (index == 0 || bytes[index - 1] == b' ') {
            return Ok((operands, Some(text[index + 1..].trim().to_string())));
        }

        if bytes[index] == b'"' {
            let start = index;
            index += 1;
            loop {
                match bytes.get(index) {
                    None => {
                        return Err(StoryError::new(
                            "PARSE_UNTERMINATED_LITERAL",
                            format!("Unterminated string literal in operands: {}", text.trim()),
                        ))
                    }
                    Some(b'\\') => index += 2,
                    Some(b'"') => break,
                    Some(_) => index += 1,
                }
            }
            let end = index + 1;
            operands.push(Operand::Str {
                value: unescape_literal(&text[start + 1..index]),
                span: offset + start..offset + end,
            });
            index = end;
        } else {
            let start = index;
            while index < bytes.len() && bytes[index] != b',' {
                if bytes[index] == b' ' && bytes.get(index + 1) == Some(&b'!') {
                    break;
                }
                index += 1;
            }
            operands.push(Operand::parse_bare(text[start..index].trim()));
        }

        while index < bytes.len() && bytes[index] == b' ' {
            index += 1;
        }
        match bytes.get(index) {
            None => return Ok((operands, None)),
            Some(b',') => index += 1,
            Some(b'!') => return Ok((operands, Some(text[index + 1..].trim().to_string()))),
            Some(_) => {
                return Err(StoryError::new(
                    "PARSE_OPERAND_SEPARATOR",
                    format!("Expected ',' between operands: {}", text.trim()),
                ))
            }
        }
    }
}

#[cfg(test)]
mod line_tests {
    use super::*;

    #[test]
    fn parse_reads_address_label_mnemonic_and_operands() {
        let raw = r#"0001A0          sure1: call fn_EB4C, "Cardia", =12, [local_10]"#;
        let line = InstructionLine::parse(raw).expect("line should parse");
        assert_eq!(line.address, Some(0x1A0));
        assert_eq!(line.label.as_deref(), Some("sure1"));
        assert_eq!(line.mnemonic, "call fn_EB4C");
        assert_eq!(line.operands.len(), 3);
        assert_eq!(line.first_str(), Some("Cardia"));
        assert_eq!(line.operands[1].as_int(), Some(12));
        assert_eq!(line.operands[2], Operand::Other("[local_10]".to_string()));

        let span = line.first_str_span().expect("string span");
        assert_eq!(&raw[span], "\"Cardia\"");
    }

    #[test]
    fn parse_handles_unlabelled_and_operandless_lines() {
        let line =
            InstructionLine::parse("000200                 return").expect("line should parse");
        assert_eq!(line.address, Some(0x200));
        assert_eq!(line.label, None);
        assert_eq!(line.mnemonic, "return");
        assert!(line.operands.is_empty());
    }

    #[test]
    fn quoted_commas_and_escapes_stay_inside_one_operand() {
        let line = InstructionLine::parse(r#"000010 call fn_E340, "Well, \"fine\"\x2c ok""#)
            .expect("line should parse");
        assert_eq!(line.operands.len(), 1);
        assert_eq!(line.first_str(), Some("Well, \"fine\", ok"));
    }

    #[test]
    fn hex_and_typed_ints_are_recognised() {
        let line = InstructionLine::parse("000010 raw 5, =1A2B3C4Dh, @=7, 10").expect("parse");
        assert_eq!(line.operands[0].as_int(), Some(0x1A2B3C4D));
        assert_eq!(line.operands[0].raw_int(), Some("=1A2B3C4Dh"));
        assert_eq!(line.operands[1].as_int(), Some(7));
        assert_eq!(line.operands[2], Operand::Other("10".to_string()));
    }

    #[test]
    fn junk_suffix_is_split_off() {
        let line = InstructionLine::parse(r#"000010 call fn_E340, "a" ! QUJD"#).expect("parse");
        assert_eq!(line.operands.len(), 1);
        assert_eq!(line.junk.as_deref(), Some("QUJD"));
    }

    #[test]
    fn unterminated_literal_is_an_error() {
        let error =
            InstructionLine::parse(r#"000010 call fn_E340, "open"#).expect_err("should fail");
        assert_eq!(error.code, "PARSE_UNTERMINATED_LITERAL");
    }

    #[test]
    fn branch_target_requires_prefix_and_digits() {
        let line = InstructionLine::parse(r#"000010 call fn_15C0, =40, "sure12""#).expect("parse");
        assert_eq!(line.branch_target_index("sure"), Some(1));
        let line = InstructionLine::parse(r#"000010 call fn_15C0, "surely""#).expect("parse");
        assert_eq!(line.branch_target_index("sure"), None);
    }

    #[test]
    fn instruction_text_strips_address_and_padding() {
        let line = InstructionLine::parse(r#"000010          call fn_E340, "a""#).expect("parse");
        assert_eq!(line.instruction_text(), r#"call fn_E340, "a""#);
        let line = InstructionLine::parse(r#"000010   sure1: call fn_E340, "a""#).expect("parse");
        assert_eq!(line.instruction_text(), r#"sure1: call fn_E340, "a""#);
    }

    #[test]
    fn leading_address_requires_six_upper_hex_digits() {
        assert_eq!(leading_address("  00ABCD call x"), Some(0xABCD));
        assert_eq!(leading_address("00abcd call x"), None);
        assert_eq!(leading_address("sure1: call x"), None);
        assert_eq!(leading_address("0000100 call x"), None);
    }
}
