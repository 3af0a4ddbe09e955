mod chunk;
mod escape;
mod extract;
mod line;
mod opcode;

pub use chunk::{split_chunks, Chunk, SourceLine};
pub use escape::{escape_literal, quote_literal, unescape_literal};
pub use extract::extract_script;
pub use line::{leading_address, InstructionLine, Operand};
pub use opcode::{BranchArity, Opcode, OpcodeTable};
