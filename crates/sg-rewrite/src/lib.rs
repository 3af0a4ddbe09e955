mod emit;
mod rewrite;
mod speakers;

pub use rewrite::{RewriteOutcome, RewriteWarning, Rewriter};
pub use speakers::SpeakerTable;

#[cfg(test)]
mod tests;
