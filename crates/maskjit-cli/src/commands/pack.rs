//! `maskjit pack`: Normalize a function result type.

use maskjit_types::{NumericPromotion, Type};
use maskjit_typing::{OpKey, OperatorTable, RuleContext, TypingConfig};

use crate::output::StyledOutput;

pub fn execute(out: &mut StyledOutput, config: &TypingConfig, ty: &str) -> anyhow::Result<()> {
    let ty: Type = ty.parse()?;
    let cx = RuleContext::new(&NumericPromotion, config);
    let sig = OperatorTable::global().resolve(&cx, OpKey::Pack, &[ty])?;
    out.success(&sig.ret.to_string());
    out.newline();
    Ok(())
}
