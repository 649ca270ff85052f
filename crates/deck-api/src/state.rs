use std::sync::Arc;

use deck_core::{
    AccessController, AccountService, ClientDirectory, IdentityProvider, ImageStore,
    MutationService,
};

/// Shared application state available to all handlers via `State<AppState>`.
/// Cheap to clone; every member sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub access: Arc<AccessController>,
    pub presentations: Arc<MutationService>,
    pub accounts: Arc<AccountService>,
    pub clients: Arc<ClientDirectory>,
    /// Direct uploads bypass the presentation services.
    pub images: Arc<dyn ImageStore>,
    pub identity: Arc<dyn IdentityProvider>,
}
