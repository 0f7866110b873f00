use crate::encode::{Encoder, Word};
use crate::error::AsmError;
use crate::mnemonic::MnemonicMap;
use crate::resolve::resolve_labels;
use crate::source::{clean, SourceLine};
use crate::symbols::SymbolTable;

/// Translation context for one source file. Owns the symbol table and hands
/// it from pass 1 to pass 2; nothing is shared between files except the
/// read-only mnemonic map.
pub struct Assembler<'m> {
    map: &'m MnemonicMap,
    symbols: SymbolTable,
}

/// Output of pass 1: the label-free program, ready to be encoded.
pub struct Resolved<'m> {
    pub instructions: Vec<SourceLine>,
    encoder: Encoder<'m>,
}

/// A fully encoded program.
#[derive(Debug, Clone)]
pub struct Assembled {
    pub words: Vec<Word>,
    pub symbols: SymbolTable,
}

impl<'m> Assembler<'m> {
    pub fn new(map: &'m MnemonicMap) -> Self {
        Self {
            map,
            symbols: SymbolTable::new(),
        }
    }

    /// Runs pass 1 over cleaned lines.
    pub fn resolve(mut self, lines: Vec<SourceLine>) -> Result<Resolved<'m>, AsmError> {
        let instructions = resolve_labels(lines, &mut self.symbols)?;
        Ok(Resolved {
            instructions,
            encoder: Encoder::new(self.map, self.symbols),
        })
    }

    /// Both passes over raw source text.
    pub fn assemble(self, text: &str) -> Result<Assembled, AsmError> {
        self.resolve(clean(text))?.encode_all()
    }
}

impl<'m> Resolved<'m> {
    /// Symbols after pass 1 (predefined plus labels).
    pub fn symbols(&self) -> &SymbolTable {
        self.encoder.symbols()
    }

    /// Runs pass 2, handing each word to `sink` in program order. Stops at the
    /// first error from either the encoder or the sink.
    pub fn encode_each<E, F>(self, mut sink: F) -> Result<SymbolTable, E>
    where
        E: From<AsmError>,
        F: FnMut(Word) -> Result<(), E>,
    {
        let Resolved {
            instructions,
            mut encoder,
        } = self;
        for line in &instructions {
            sink(encoder.encode(line)?)?;
        }
        Ok(encoder.into_symbols())
    }

    pub fn encode_all(self) -> Result<Assembled, AsmError> {
        let mut words = Vec::with_capacity(self.instructions.len());
        let symbols = self.encode_each(|w| {
            words.push(w);
            Ok::<_, AsmError>(())
        })?;
        Ok(Assembled { words, symbols })
    }
}

impl Assembled {
    /// One 16-digit line per word, each terminated by a newline.
    pub fn to_text(&self) -> String {
        self.words.iter().map(|w| format!("{w}\n")).collect()
    }
}
