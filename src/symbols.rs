use serde::Serialize;
use std::collections::BTreeMap;

pub type Address = u32;

/// Largest address an A-instruction can carry: bit 15 is the opcode, 15 bits remain.
pub const MAX_ADDRESS: Address = (1 << 15) - 1;

/// First RAM slot handed out to variables (R0..R15 come before it).
pub const FIRST_VARIABLE: Address = 16;

const NAMED: &[(&str, Address)] = &[
    ("SP", 0),
    ("LCL", 1),
    ("ARG", 2),
    ("THIS", 3),
    ("THAT", 4),
    ("SCREEN", 16384),
    ("KBD", 24576),
];

const REGISTERS: Address = 16;

/// Returns the architecture-defined address for `name`, if it is one of the
/// predefined symbols.
pub fn predefined(name: &str) -> Option<Address> {
    if let Some(&(_, addr)) = NAMED.iter().find(|(n, _)| *n == name) {
        return Some(addr);
    }
    let idx = name.strip_prefix('R')?.parse::<Address>().ok()?;
    // "R07" parses to 7 but is not a register name
    (idx < REGISTERS && format!("R{idx}") == name).then_some(idx)
}

/// Symbol name to address mapping for one translation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SymbolTable {
    table: BTreeMap<String, Address>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        let mut table = BTreeMap::new();
        for &(name, addr) in NAMED {
            table.insert(name.to_string(), addr);
        }
        for i in 0..REGISTERS {
            table.insert(format!("R{i}"), i);
        }
        Self { table }
    }
}

impl SymbolTable {
    /// A table holding only the 23 predefined symbols.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites `name`. Range checks belong to the encoder.
    pub fn store(&mut self, name: impl Into<String>, address: Address) {
        self.table.insert(name.into(), address);
    }

    pub fn lookup(&self, name: &str) -> Option<Address> {
        self.table.get(name).copied()
    }

    /// Binds `name` only if it is not bound yet and returns the address it
    /// resolves to afterwards.
    pub fn bind_if_absent(&mut self, name: &str, address: Address) -> Address {
        if let Some(existing) = self.lookup(name) {
            return existing;
        }
        self.table.insert(name.to_string(), address);
        address
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Symbols in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Address)> {
        self.table.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
