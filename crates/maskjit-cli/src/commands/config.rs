//! `maskjit config`: Print the effective configuration.

use maskjit_typing::TypingConfig;

use crate::output::StyledOutput;

pub fn execute(out: &mut StyledOutput, config: &TypingConfig) -> anyhow::Result<()> {
    out.plain(&config.to_toml()?);
    Ok(())
}
