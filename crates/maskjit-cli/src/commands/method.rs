//! `maskjit method`: Type a bound method call.

use maskjit_types::{NumericPromotion, Type};
use maskjit_typing::{resolve_attribute, Attribute, RuleContext, TypingConfig};

use super::parse_types;
use crate::output::StyledOutput;

pub fn execute(
    out: &mut StyledOutput,
    config: &TypingConfig,
    receiver: &str,
    name: &str,
    args: &[String],
) -> anyhow::Result<()> {
    let recv: Type = receiver.parse()?;
    let args = parse_types(args)?;
    let cx = RuleContext::new(&NumericPromotion, config);

    match resolve_attribute(&cx, &recv, name)? {
        Attribute::Member(ty) => {
            anyhow::ensure!(args.is_empty(), "`{}` is an attribute, not a method", name);
            out.field(name, &ty.to_string());
        }
        Attribute::Method(method) => {
            let sig = method.signature(&cx, &recv, &args)?;
            out.field(name, &sig.to_string());
            out.field("lowers to", &method.binding().to_string());
        }
    }
    Ok(())
}
