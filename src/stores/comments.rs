use super::{settle, Loading};
use crate::{
    api::types::{Comment, CommentInput, MessageResponse},
    gateway::{ApiRequest, Gateway},
};
use tracing::instrument;

#[derive(Debug)]
pub struct CommentsStore {
    gateway: Gateway,
    loading: Loading,
}

impl CommentsStore {
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

    #[instrument(skip(self, input))]
    pub async fn create_comment(
        &self,
        post_id: i64,
        input: &CommentInput,
    ) -> Option<MessageResponse> {
        let _loading = self.loading.start();
        let result = match ApiRequest::post(format!("/comments/{post_id}")).json(input) {
            Ok(request) => self.gateway.send_json(request).await,
            Err(err) => Err(err),
        };
        settle("create comment", result)
    }

    #[instrument(skip(self))]
    pub async fn get_comments_by_post_id(&self, post_id: i64) -> Option<Vec<Comment>> {
        let _loading = self.loading.start();
        let result = self
            .gateway
            .send_json::<Option<Vec<Comment>>>(ApiRequest::get(format!("/comments/{post_id}")))
            .await
            .map(Option::unwrap_or_default);
        settle("get comments by post id", result)
    }

    /// Soft delete through `POST /comments/delete/{id}`, the path the web
    /// frontend calls. The backend router only defines `POST /comments/{id}`.
    #[instrument(skip(self))]
    pub async fn soft_delete_comment(&self, comment_id: i64) -> Option<MessageResponse> {
        let _loading = self.loading.start();
        let result = self
            .gateway
            .send_json(ApiRequest::post(format!("/comments/delete/{comment_id}")))
            .await;
        settle("delete comment", result)
    }

    #[instrument(skip(self, input))]
    pub async fn update_comment(
        &self,
        comment_id: i64,
        input: &CommentInput,
    ) -> Option<MessageResponse> {
        let _loading = self.loading.start();
        let result = match ApiRequest::put(format!("/comments/{comment_id}")).json(input) {
            Ok(request) => self.gateway.send_json(request).await,
            Err(err) => Err(err),
        };
        settle("update comment", result)
    }
}
