use sg_parser::quote_literal;

fn head(label: Option<&str>, mnemonic: &str) -> String {
    match label {
        Some(label) => format!("{}: {}", label, mnemonic),
        None => mnemonic.to_string(),
    }
}

/// `[label: ]MNEMONIC, VOX_A, "…"×n, VOX_B, "…"×n`
pub(crate) fn branching_line(
    label: Option<&str>,
    mnemonic: &str,
    voices: (&str, &str),
    body: &[String],
    variant: &[String],
) -> String {
    let mut operands = Vec::with_capacity(body.len() + variant.len() + 2);
    operands.push(voices.0.to_string());
    operands.extend(body.iter().map(|slot| quote_literal(slot)));
    operands.push(voices.1.to_string());
    operands.extend(variant.iter().map(|slot| quote_literal(slot)));
    format!("{}, {}", head(label, mnemonic), operands.join(", "))
}

pub(crate) fn append_line(label: Option<&str>, mnemonic: &str, text: &str) -> String {
    format!("{}, {}", head(label, mnemonic), quote_literal(text))
}

/// Replaces the byte range of one quoted operand, leaving the rest of the line intact.
pub(crate) fn splice_literal(raw: &str, span: std::ops::Range<usize>, text: &str) -> String {
    format!("{}{}{}", &raw[..span.start], quote_literal(text), &raw[span.end..])
}
