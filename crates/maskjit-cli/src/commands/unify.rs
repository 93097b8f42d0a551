//! `maskjit unify`: Common type at a control-flow join.

use maskjit_types::{classify_conversion, NumericPromotion, Type, Unifier};

use crate::output::StyledOutput;

pub fn execute(out: &mut StyledOutput, a: &str, b: &str) -> anyhow::Result<()> {
    let a: Type = a.parse()?;
    let b: Type = b.parse()?;
    let unified = Unifier::new(&NumericPromotion).unify(&a, &b)?;

    out.field("type", &unified.to_string());
    for (side, ty) in [("left", &a), ("right", &b)] {
        let conversion = classify_conversion(&NumericPromotion, ty, &unified)?;
        out.field(side, &format!("{} ({})", ty, conversion));
    }
    Ok(())
}
