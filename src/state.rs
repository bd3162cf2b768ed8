use std::sync::Arc;

use crate::config::AuthSettings;
use crate::mail::{AuthEmail, Mailer};
use crate::store::Store;

/// Shared application state, registered once as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub mailer: Arc<dyn Mailer>,
    pub emails: Arc<AuthEmail>,
    pub auth: AuthSettings,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        mailer: Arc<dyn Mailer>,
        auth: AuthSettings,
        mail_from: &str,
    ) -> Self {
        let emails = Arc::new(AuthEmail::new(mail_from, auth.token_ttl_minutes));
        Self {
            store,
            mailer,
            emails,
            auth,
        }
    }
}
