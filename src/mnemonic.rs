use std::collections::HashMap;
use std::fmt;

/// The built-in Hack field table, in the textual `KEY <field> BITS` format.
pub const DEFAULT_MAP: &str = include_str!("default.map");

/// Mnemonic used for an omitted destination or jump.
pub const NULL: &str = "null";

/// C-instruction fields, in the order they are packed after the opcode bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Comp,
    Dest,
    Jump,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Comp, Field::Dest, Field::Jump];

    pub fn name(self) -> &'static str {
        match self {
            Field::Comp => "comp",
            Field::Dest => "dest",
            Field::Jump => "jmp",
        }
    }

    /// Tag that marks an entry for this field in the table text.
    pub fn tag(self) -> &'static str {
        match self {
            Field::Comp => "<comp>",
            Field::Dest => "<dest>",
            Field::Jump => "<jmp>",
        }
    }

    /// Width in bits: `comp` carries the `a` bit plus six `c` bits.
    pub fn width(self) -> usize {
        match self {
            Field::Comp => 7,
            Field::Dest | Field::Jump => 3,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("line {line}: no mnemonic before the {field} tag")]
    MissingKey { line: usize, field: Field },
    #[error("line {line}: `{bits}` is not a bit string")]
    NotBinary { line: usize, bits: String },
    #[error("line {line}: {field} fragment `{bits}` must be {expected} bits wide")]
    Width {
        line: usize,
        field: Field,
        bits: String,
        expected: usize,
    },
}

/// Three immutable mnemonic -> bit fragment tables, one per [`Field`].
#[derive(Debug, Clone, Default)]
pub struct MnemonicMap {
    comp: HashMap<String, u16>,
    dest: HashMap<String, u16>,
    jump: HashMap<String, u16>,
}

impl MnemonicMap {
    /// The standard Hack table.
    pub fn hack() -> Result<Self, MapError> {
        Self::parse(DEFAULT_MAP)
    }

    /// Parses `KEY <field> BITS` lines. Lines without a field tag are ignored.
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let mut map = Self::default();
        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let Some((field, pos)) = Field::ALL
                .iter()
                .find_map(|&f| raw.find(f.tag()).map(|p| (f, p)))
            else {
                continue;
            };
            let key = raw[..pos].trim();
            if key.is_empty() {
                return Err(MapError::MissingKey { line, field });
            }
            let bits: String = raw[pos + field.tag().len()..].split_whitespace().collect();
            if bits.is_empty() || !bits.bytes().all(|b| b == b'0' || b == b'1') {
                return Err(MapError::NotBinary { line, bits });
            }
            if bits.len() != field.width() {
                return Err(MapError::Width {
                    line,
                    field,
                    bits,
                    expected: field.width(),
                });
            }
            let value = u16::from_str_radix(&bits, 2)
                .map_err(|_| MapError::NotBinary { line, bits: bits.clone() })?;
            map.table_mut(field).insert(key.to_string(), value);
        }
        Ok(map)
    }

    pub fn lookup(&self, field: Field, mnemonic: &str) -> Option<u16> {
        self.table(field).get(mnemonic).copied()
    }

    pub fn len(&self, field: Field) -> usize {
        self.table(field).len()
    }

    fn table(&self, field: Field) -> &HashMap<String, u16> {
        match field {
            Field::Comp => &self.comp,
            Field::Dest => &self.dest,
            Field::Jump => &self.jump,
        }
    }

    fn table_mut(&mut self, field: Field) -> &mut HashMap<String, u16> {
        match field {
            Field::Comp => &mut self.comp,
            Field::Dest => &mut self.dest,
            Field::Jump => &mut self.jump,
        }
    }
}
