use super::{settle, Loading};
use crate::{
    api::types::{MessageResponse, Post, PostInput},
    gateway::{ApiRequest, Gateway},
};
use tracing::instrument;

#[derive(Debug)]
pub struct PostsStore {
    gateway: Gateway,
    loading: Loading,
}

impl PostsStore {
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
    pub async fn create_post(&self, input: &PostInput) -> Option<MessageResponse> {
        let _loading = self.loading.start();
        let result = match ApiRequest::post("/posts").json(input) {
            Ok(request) => self.gateway.send_json(request).await,
            Err(err) => Err(err),
        };
        settle("create post", result)
    }

    #[instrument(skip(self))]
    pub async fn get_posts_by_user_id(&self, user_id: i64) -> Option<Vec<Post>> {
        let _loading = self.loading.start();
        let result = self
            .gateway
            .send_json::<Option<Vec<Post>>>(ApiRequest::get(format!("/posts/u/{user_id}")))
            .await
            .map(Option::unwrap_or_default);
        settle("get posts by user id", result)
    }

    #[instrument(skip(self))]
    pub async fn get_all_posts(&self) -> Option<Vec<Post>> {
        let _loading = self.loading.start();
        let result = self
            .gateway
            .send_json::<Option<Vec<Post>>>(ApiRequest::get("/posts"))
            .await
            .map(Option::unwrap_or_default);
        settle("get all posts", result)
    }

    #[instrument(skip(self))]
    pub async fn get_post_by_id(&self, post_id: i64) -> Option<Post> {
        let _loading = self.loading.start();
        let result = self
            .gateway
            .send_json(ApiRequest::get(format!("/posts/{post_id}")))
            .await;
        settle("get post by id", result)
    }

    /// Soft delete through `POST /posts/{id}`, the path the web frontend
    /// calls. The backend router does not define it.
    #[instrument(skip(self))]
    pub async fn delete_post(&self, post_id: i64) -> Option<Post> {
        let _loading = self.loading.start();
        let result = self
            .gateway
            .send_json(ApiRequest::post(format!("/posts/{post_id}")))
            .await;
        settle("delete post", result)
    }

    #[instrument(skip(self, input))]
    pub async fn update_post(&self, post_id: i64, input: &PostInput) -> Option<MessageResponse> {
        let _loading = self.loading.start();
        let result = match ApiRequest::put(format!("/posts/{post_id}")).json(input) {
            Ok(request) => self.gateway.send_json(request).await,
            Err(err) => Err(err),
        };
        settle("update post", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::testing::{can_bind_localhost, gateway_for};
    use anyhow::Result;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn post_json(id: i64, content: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": 4,
            "content": content,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn create_post_sends_content_with_bearer() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/posts"))
            .and(header("Authorization", "Bearer access"))
            .and(body_json(json!({"content": "first"})))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"message": "new post is created successfully"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = PostsStore::new(gateway_for(&server).await?);
        let created = store
            .create_post(&PostInput {
                content: "first".to_string(),
            })
            .await;

        assert_eq!(
            created.and_then(|m| m.message).as_deref(),
            Some("new post is created successfully")
        );
        assert!(!store.is_loading());
        Ok(())
    }

    #[tokio::test]
    async fn listing_endpoints_decode_posts() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/posts"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([post_json(1, "a"), post_json(2, "b")])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/posts/u/4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_json(2, "b")])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/posts/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(post_json(2, "b")))
            .mount(&server)
            .await;

        let store = PostsStore::new(gateway_for(&server).await?);

        assert_eq!(store.get_all_posts().await.map(|p| p.len()), Some(2));
        assert_eq!(
            store.get_posts_by_user_id(4).await.map(|p| p.len()),
            Some(1)
        );
        let post = store.get_post_by_id(2).await;
        assert_eq!(post.map(|p| p.content), Some("b".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn delete_uses_post_and_update_uses_put() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/posts/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(post_json(7, "gone")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/posts/7"))
            .and(body_json(json!({"content": "edited"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let store = PostsStore::new(gateway_for(&server).await?);

        assert_eq!(store.delete_post(7).await.map(|p| p.id), Some(7));
        let updated = store
            .update_post(
                7,
                &PostInput {
                    content: "edited".to_string(),
                },
            )
            .await;
        assert!(updated.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn failures_return_none() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/posts/99"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "post not found"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&server)
            .await;

        let store = PostsStore::new(gateway_for(&server).await?);

        assert!(store.get_post_by_id(99).await.is_none());
        assert!(store.get_all_posts().await.is_none());
        assert!(!store.is_loading());
        Ok(())
    }
}
