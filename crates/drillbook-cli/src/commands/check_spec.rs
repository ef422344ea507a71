//! The `drillbook check-spec` command.

use anyhow::Result;

use drillbook_core::range_spec::OperandSpec;

pub fn execute(spec: &str) -> Result<()> {
    match OperandSpec::parse(spec) {
        Ok(accepted) => {
            println!("Accepted: {accepted}");
            for component in accepted.spec().components() {
                println!("  {component}");
            }
            println!("{} distinct operand value(s)", accepted.distinct_values());
            Ok(())
        }
        Err(e) if e.is_constraint() => anyhow::bail!("rejected: {e}"),
        Err(e) => anyhow::bail!("syntax error: {e}"),
    }
}
