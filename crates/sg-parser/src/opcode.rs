use std::collections::HashMap;

use sg_core::MnemonicTable;

/// Field arity of a branching dialogue call: text payloads per half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchArity {
    Three,
    Four,
}

impl BranchArity {
    pub fn fields(self) -> usize {
        match self {
            BranchArity::Three => 3,
            BranchArity::Four => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    SetSpeaker,
    AppendLine,
    Branching(BranchArity),
    Jump,
    ChoiceJump,
    Other,
}

impl Opcode {
    /// Instructions that put dialogue text on screen.
    pub fn emits_dialogue(self) -> bool {
        matches!(self, Opcode::AppendLine | Opcode::Branching(_))
    }
}

#[derive(Debug, Clone)]
pub struct OpcodeTable {
    by_mnemonic: HashMap<String, Opcode>,
}

impl OpcodeTable {
    pub fn new(mnemonics: &MnemonicTable) -> Self {
        let groups = [
            (&mnemonics.set_speaker, Opcode::SetSpeaker),
            (&mnemonics.append_line, Opcode::AppendLine),
            (&mnemonics.branching3, Opcode::Branching(BranchArity::Three)),
            (&mnemonics.branching4, Opcode::Branching(BranchArity::Four)),
            (&mnemonics.jump, Opcode::Jump),
            (&mnemonics.choice_jump, Opcode::ChoiceJump),
        ];

        let mut by_mnemonic = HashMap::new();
        for (names, opcode) in groups {
            for name in names {
                by_mnemonic.insert(name.clone(), opcode);
            }
        }
        Self { by_mnemonic }
    }

    pub fn classify(&self, mnemonic: &str) -> Opcode {
        self.by_mnemonic
            .get(mnemonic)
            .copied()
            .unwrap_or(Opcode::Other)
    }
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self::new(&MnemonicTable::default())
    }
}
