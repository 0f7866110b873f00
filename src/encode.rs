use std::fmt;

use tracing::debug;

use crate::error::AsmError;
use crate::mnemonic::{Field, MnemonicMap, NULL};
use crate::source::SourceLine;
use crate::symbols::{Address, SymbolTable, FIRST_VARIABLE, MAX_ADDRESS};

/// Opcode bit plus the two unused bits that are always set in a C-instruction.
const C_PREFIX: u16 = 0b111 << 13;
const COMP_SHIFT: u16 = 6;
const DEST_SHIFT: u16 = 3;

/// One encoded 16-bit instruction. Displays as 16 binary digits, MSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Word(pub u16);

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016b}", self.0)
    }
}

/// Pass 2: turns label-free instruction lines into words, allocating RAM
/// for variables on their first reference.
pub struct Encoder<'m> {
    map: &'m MnemonicMap,
    symbols: SymbolTable,
    next_variable: Address,
}

impl<'m> Encoder<'m> {
    pub fn new(map: &'m MnemonicMap, symbols: SymbolTable) -> Self {
        Self {
            map,
            symbols,
            next_variable: FIRST_VARIABLE,
        }
    }

    pub fn encode(&mut self, line: &SourceLine) -> Result<Word, AsmError> {
        match line.text.strip_prefix('@') {
            Some(value) => self.a_instruction(value, line),
            None => self.c_instruction(line),
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }

    fn a_instruction(&mut self, value: &str, line: &SourceLine) -> Result<Word, AsmError> {
        debug!(line = line.number, "A instruction: {}", line.text);
        let value = value.trim();
        if value.is_empty() {
            return Err(AsmError::MalformedInstruction {
                line: line.number,
                text: line.text.clone(),
            });
        }
        let address = if value.bytes().all(|b| b.is_ascii_digit()) {
            match value.parse::<Address>() {
                Ok(addr) => addr,
                // wider than any address; only a symbol of that name can save it
                Err(_) => self.fallback(value, line.number)?,
            }
        } else {
            self.variable(value)
        };
        let address = if address > MAX_ADDRESS {
            self.fallback(&address.to_string(), line.number)?
        } else {
            address
        };
        Ok(Word(address as u16))
    }

    /// Resolves an unrepresentable address through a symbol named by its
    /// decimal text.
    fn fallback(&self, text: &str, line: usize) -> Result<Address, AsmError> {
        self.symbols
            .lookup(text)
            .filter(|&addr| addr <= MAX_ADDRESS)
            .ok_or_else(|| AsmError::AddressOutOfRange {
                line,
                value: text.to_string(),
            })
    }

    fn variable(&mut self, name: &str) -> Address {
        if let Some(addr) = self.symbols.lookup(name) {
            return addr;
        }
        let addr = self.next_variable;
        self.symbols.store(name, addr);
        self.next_variable += 1;
        debug!(symbol = name, address = addr, "allocated variable");
        addr
    }

    fn c_instruction(&self, line: &SourceLine) -> Result<Word, AsmError> {
        debug!(line = line.number, "C instruction: {}", line.text);
        let text = line.text.as_str();
        let (dest, rest) = match text.split_once('=') {
            Some((d, r)) => (Some(d), r),
            None => (None, text),
        };
        let (comp, jump) = match rest.split_once(';') {
            Some((c, j)) => (c, Some(j)),
            None => (rest, None),
        };
        if dest.is_none() && jump.is_none() {
            return Err(AsmError::MalformedInstruction {
                line: line.number,
                text: line.text.clone(),
            });
        }
        let comp = self.fragment(Field::Comp, comp, line.number)?;
        let dest = self.fragment(Field::Dest, dest.unwrap_or(NULL), line.number)?;
        let jump = self.fragment(Field::Jump, jump.unwrap_or(NULL), line.number)?;
        Ok(Word(C_PREFIX | comp << COMP_SHIFT | dest << DEST_SHIFT | jump))
    }

    fn fragment(&self, field: Field, mnemonic: &str, line: usize) -> Result<u16, AsmError> {
        let mnemonic = mnemonic.trim();
        self.map
            .lookup(field, mnemonic)
            .ok_or_else(|| AsmError::UnknownMnemonic {
                line,
                field,
                mnemonic: mnemonic.to_string(),
            })
    }
}
