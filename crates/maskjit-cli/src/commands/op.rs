//! `maskjit op`: Type an operator application.

use maskjit_types::NumericPromotion;
use maskjit_typing::{OpKey, OperatorTable, RuleContext, Signature, TypingConfig};

use super::parse_types;
use crate::output::StyledOutput;

/// Operation named `op` taking `arity` operands
pub fn parse_key(op: &str, arity: usize) -> anyhow::Result<OpKey> {
    let key = match (op, arity) {
        ("is", 2) => OpKey::Is,
        ("len", 1) => OpKey::Len,
        ("bool", 1) => OpKey::Truth,
        ("Masked", 2) => OpKey::MaskedCtor,
        (_, 1) => OpKey::Unary(op.parse()?),
        (_, 2) => OpKey::Binary(op.parse()?),
        _ => anyhow::bail!("`{}` takes one or two operand types, got {}", op, arity),
    };
    Ok(key)
}

/// Resolve the signature of `op` over the named operand types
pub fn resolve(config: &TypingConfig, op: &str, operands: &[String]) -> anyhow::Result<Signature> {
    let types = parse_types(operands)?;
    let key = parse_key(op, types.len())?;
    let cx = RuleContext::new(&NumericPromotion, config);
    Ok(OperatorTable::global().resolve(&cx, key, &types)?)
}

pub fn execute(
    out: &mut StyledOutput,
    config: &TypingConfig,
    op: &str,
    operands: &[String],
) -> anyhow::Result<()> {
    let sig = resolve(config, op, operands)?;
    out.plain(&format!("{} ", op));
    out.info(&sig.to_string());
    out.newline();
    Ok(())
}
