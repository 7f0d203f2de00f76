use gate_core::UserProfile;

use crate::cli::GlobalFlags;
use crate::output::output;

pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&schemars::schema_for!(UserProfile), flags.format)
}
