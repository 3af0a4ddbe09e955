/// A trimmed, non-comment source line with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

/// A run of non-blank lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub lines: Vec<SourceLine<'a>>,
}

/// Splits a script into chunks at blank lines. Comment lines (`.` prefix)
/// are dropped without ending the current chunk.
pub fn split_chunks<S: AsRef<str>>(lines: &[S]) -> Vec<Chunk<'_>> {
    let mut chunks = Vec::new();
    let mut current = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let text = line.as_ref().trim();
        if text.starts_with('.') {
            continue;
        }
        if text.is_empty() {
            if !current.is_empty() {
                chunks.push(Chunk {
                    lines: std::mem::take(&mut current),
                });
            }
            continue;
        }
        current.push(SourceLine {
            number: index + 1,
            text,
        });
    }

    if !current.is_empty() {
        chunks.push(Chunk { lines: current });
    }

    chunks
}

#[cfg(test)]
mod chunk_tests {
    use super::*;

    #[test]
    fn blank_lines_split_and_comments_vanish() {
        let lines = vec![
            ".tag \"x\"",
            ".code_start",
            "",
            "000010 sure1: return",
            ". note",
            "000020 return",
            "   ",
            "",
            "000030 other: return",
        ];
        let chunks = split_chunks(&lines);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].lines.len(), 2);
        assert_eq!(chunks[0].lines[1].number, 6);
        assert_eq!(chunks[1].lines[0].text, "000030 other: return");
    }

    #[test]
    fn empty_input_has_no_chunks() {
        let lines: Vec<String> = Vec::new();
        assert!(split_chunks(&lines).is_empty());
    }
}
