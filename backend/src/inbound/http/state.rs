//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the domain's driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AuthOps, CartOps, CatalogAdmin, CatalogQuery, CheckoutOps, ReviewOps};
use crate::domain::{Error, Identity};

use super::session::SessionContext;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn AuthOps>,
    pub catalog: Arc<dyn CatalogQuery>,
    pub catalog_admin: Arc<dyn CatalogAdmin>,
    pub carts: Arc<dyn CartOps>,
    pub checkout: Arc<dyn CheckoutOps>,
    pub reviews: Arc<dyn ReviewOps>,
}

impl HttpState {
    /// Resolve the session into an acting identity.
    ///
    /// A missing session yields a guest; a session naming a vanished or
    /// deactivated account is an authentication failure.
    pub async fn identity(&self, session: &SessionContext) -> Result<Identity, Error> {
        match session.user_id()? {
            Some(user_id) => self.auth.identity_for(user_id).await,
            None => Ok(Identity::guest()),
        }
    }

    /// Resolve the session into an authenticated identity or fail with 401.
    pub async fn require_identity(&self, session: &SessionContext) -> Result<Identity, Error> {
        let user_id = session.require_user_id()?;
        self.auth.identity_for(user_id).await
    }
}
