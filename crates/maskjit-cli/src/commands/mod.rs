//! Subcommand implementations

pub mod bindings;
pub mod config;
pub mod method;
pub mod op;
pub mod pack;
pub mod unify;

use maskjit_types::Type;

/// Parse every operand type named on the command line
pub fn parse_types(names: &[String]) -> anyhow::Result<Vec<Type>> {
    let types = names
        .iter()
        .map(|name| name.parse::<Type>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(types)
}
