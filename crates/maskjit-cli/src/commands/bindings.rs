//! `maskjit bindings`: List the foreign string routines.

use maskjit_ffi::{OWNED_STRING_SIZE, STRING_BINDINGS, STRING_VIEW_SIZE};

use crate::output::StyledOutput;

pub fn execute(out: &mut StyledOutput) -> anyhow::Result<()> {
    for binding in STRING_BINDINGS {
        out.info(&format!("{:<22}", binding.name));
        out.plain(&binding.to_string());
        out.newline();
    }

    out.newline();
    out.field("string_view", &format!("{} bytes", STRING_VIEW_SIZE));
    out.field("owned_string", &format!("{} bytes", OWNED_STRING_SIZE));
    Ok(())
}
