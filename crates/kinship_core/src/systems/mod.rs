/// Emotional contagion: neighbor scan, proposals, reduction and decay
pub mod contagion;

pub use contagion::{ContagionProposal, ContagionSystem};
