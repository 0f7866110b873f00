use tracing::debug;

use crate::error::AsmError;
use crate::source::SourceLine;
use crate::symbols::{predefined, Address, SymbolTable};

/// Pass 1: removes `(name)` lines and binds each label to the address of the
/// instruction that follows it. A name that is already bound (predefined, or
/// an earlier definition) keeps its first binding.
pub fn resolve_labels(
    lines: Vec<SourceLine>,
    symbols: &mut SymbolTable,
) -> Result<Vec<SourceLine>, AsmError> {
    let mut instructions = Vec::with_capacity(lines.len());
    // address the next real instruction will occupy
    let mut next: Address = 0;
    for line in lines {
        let Some(rest) = line.text.strip_prefix('(') else {
            instructions.push(line);
            next += 1;
            continue;
        };
        let name = rest
            .strip_suffix(')')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AsmError::MalformedInstruction {
                line: line.number,
                text: line.text.clone(),
            })?;
        let bound = symbols.bind_if_absent(name, next);
        if bound == next {
            debug!(label = name, address = next, "bound label");
        } else if predefined(name).is_some() {
            debug!(label = name, address = bound, "label names a predefined symbol, keeping it");
        } else {
            debug!(label = name, address = bound, "label already bound, keeping first binding");
        }
    }
    Ok(instructions)
}
