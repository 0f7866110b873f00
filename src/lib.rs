pub mod assembler;
pub mod driver;
pub mod encode;
pub mod error;
pub mod mnemonic;
pub mod resolve;
pub mod source;
pub mod symbols;

pub use assembler::{Assembled, Assembler, Resolved};
pub use driver::{DriverConfig, DriverError};
pub use encode::{Encoder, Word};
pub use error::AsmError;
pub use mnemonic::{Field, MnemonicMap};
pub use symbols::SymbolTable;
