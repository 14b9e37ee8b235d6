use super::{hook_load_output::HookLoadOutput, hook_resolve_id_output::HookResolveIdOutput};

pub type HookNoopReturn = anyhow::Result<()>;
/// `Ok(None)` leaves the decision to the next plugin, then to the host.
pub type HookResolveIdReturn = anyhow::Result<Option<HookResolveIdOutput>>;
/// `Ok(None)` lets the host read the file itself.
pub type HookLoadReturn = anyhow::Result<Option<HookLoadOutput>>;
