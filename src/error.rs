use crate::mnemonic::Field;

/// Fatal translation errors. Each carries the 1-based source line.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("line {line}: address {value} does not fit in 15 bits and is not bound as a symbol")]
    AddressOutOfRange { line: usize, value: String },
    #[error("line {line}: unknown {field} mnemonic `{mnemonic}`")]
    UnknownMnemonic {
        line: usize,
        field: Field,
        mnemonic: String,
    },
    #[error("line {line}: malformed instruction `{text}`")]
    MalformedInstruction { line: usize, text: String },
}

impl AsmError {
    pub fn line(&self) -> usize {
        match self {
            AsmError::AddressOutOfRange { line, .. }
            | AsmError::UnknownMnemonic { line, .. }
            | AsmError::MalformedInstruction { line, .. } => *line,
        }
    }
}
