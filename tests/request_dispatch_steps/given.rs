//! Given steps for request dispatch BDD scenarios.

use super::world::DispatchWorld;
use crate::test_helpers::GatedBackend;
use credential_liaison::manager::services::RegisterManagerRequest;
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a gated backend registered as "{id}""#)]
fn gated_backend_registered(world: &mut DispatchWorld, id: String) -> Result<(), eyre::Report> {
    let backend = GatedBackend::new();
    world
        .liaison
        .register_manager(RegisterManagerRequest::external(id, "Gated"), backend.clone())
        .wrap_err("register gated backend for scenario")?;
    world.gated = Some(backend);
    Ok(())
}
