//! When steps for request dispatch BDD scenarios.

use super::world::{DispatchWorld, run_async, signing_key_message};
use rstest_bdd_macros::when;

#[when(r#"a signing key request is dispatched to "{backend_id}""#)]
fn dispatch_signing_key(world: &mut DispatchWorld, backend_id: String) {
    let message = signing_key_message(&backend_id);
    world.last_reply = Some(run_async(world.adapter.dispatch(message)));
}

#[when(r#"a signing key request to "{backend_id}" is left pending"#)]
fn leave_request_pending(world: &mut DispatchWorld, backend_id: String) -> Result<(), eyre::Report> {
    let gated = world
        .gated
        .clone()
        .ok_or_else(|| eyre::eyre!("no gated backend in scenario world"))?;
    let adapter = world.adapter.clone();
    let message = signing_key_message(&backend_id);
    world.pending = Some(tokio::spawn(async move { adapter.dispatch(message).await }));
    run_async(gated.entered());
    Ok(())
}

#[when(r#"the manager "{id}" is erased"#)]
fn erase_manager(world: &mut DispatchWorld, id: String) {
    world.last_erase = Some(world.liaison.erase_manager(&id));
}
