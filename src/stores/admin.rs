use super::{settle, Loading};
use crate::{
    api::types::AdminUser,
    gateway::{ApiRequest, Gateway},
};
use tracing::instrument;

/// Admin user listing. Access is enforced by the API; the route guard only
/// hides the page from non-admins.
#[derive(Debug)]
pub struct AdminStore {
    gateway: Gateway,
    loading: Loading,
}

impl AdminStore {
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            loading: Loading::default(),
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    #[instrument(skip(self))]
    pub async fn get_all_users(&self) -> Option<Vec<AdminUser>> {
        let _loading = self.loading.start();
        let result = self
            .gateway
            .send_json::<Option<Vec<AdminUser>>>(ApiRequest::get("/admin/users"))
            .await
            .map(Option::unwrap_or_default);
        settle("get all users", result)
    }
}
