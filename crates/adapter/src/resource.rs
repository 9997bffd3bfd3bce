use domain::{ApiError, Entity, QueuedOperation};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use storage::{QueueStore, SnapshotCache};
use tracing::{error, info, warn};

use crate::error::ClientError;
use crate::traits::{ApiRequest, ApiResponse, Method, Transport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome<E> {
    Created(E),
    Queued,
}

impl<E> CreateOutcome<E> {
    pub fn is_queued(&self) -> bool {
        matches!(self, CreateOutcome::Queued)
    }
}

pub struct ResourceClient<E> {
    transport: Arc<dyn Transport>,
    cache: SnapshotCache,
    queue: Arc<QueueStore>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for ResourceClient<E> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            cache: self.cache.clone(),
            queue: self.queue.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> ResourceClient<E> {
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: SnapshotCache,
        queue: Arc<QueueStore>,
    ) -> Self {
        Self {
            transport,
            cache,
            queue,
            _entity: PhantomData,
        }
    }

    pub async fn list(&self) -> Vec<E> {
        let collection = E::COLLECTION;
        match self.fetch_all().await {
            Ok(entities) => {
                if let Err(e) = self.cache.store(collection, &entities).await {
                    error!("Failed to cache {} snapshot: {:?}", collection, e);
                }
                entities
            }
            Err(e) => {
                warn!("Failed to fetch {}, loading cache: {}", collection, e);
                self.cache.load(collection).await
            }
        }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<E, ClientError> {
        let path = E::COLLECTION.item_path(id);
        let entity: E = self
            .request(ApiRequest::new(Method::Get, path))
            .await
            .and_then(|resp| resp.json())
            .map_err(|e| {
                warn!("Failed to fetch {} {}: {}", E::COLLECTION, id, e);
                e
            })?;
        Ok(entity)
    }

    pub async fn create(&self, entity: E) -> Result<CreateOutcome<E>, ClientError> {
        let body = serde_json::to_value(&entity)?;
        let path = E::COLLECTION.create_path();

        match self.send_json(Method::Post, path, body).await {
            Ok(created) => Ok(CreateOutcome::Created(created)),
            Err(e) => {
                warn!(
                    "Offline? {} {} added to sync queue: {}",
                    E::COLLECTION,
                    entity.id(),
                    e
                );
                let pending = self.queue.enqueue(QueuedOperation::create(entity)).await?;
                info!("{} operation(s) waiting for sync", pending);
                Ok(CreateOutcome::Queued)
            }
        }
    }

    pub async fn update(&self, entity: &E) -> Result<E, ClientError> {
        let body = serde_json::to_value(entity)?;
        let path = E::COLLECTION.item_path(entity.id());
        Ok(self.send_json(Method::Put, path, body).await?)
    }

    pub async fn remove(&self, id: &str) -> Result<(), ClientError> {
        let path = E::COLLECTION.item_path(id);
        self.request(ApiRequest::new(Method::Delete, path)).await?;
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<E>, ApiError> {
        self.request(ApiRequest::new(Method::Get, E::COLLECTION.path()))
            .await?
            .json()
    }

    async fn send_json(&self, method: Method, path: String, body: Value) -> Result<E, ApiError> {
        self.request(ApiRequest::new(method, path).with_body(body))
            .await?
            .json()
    }

    async fn request(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let path = request.path.clone();
        let resp = self.transport.send(request).await?;
        if !resp.is_success() {
            return Err(ApiError::from_status(resp.status, &path, resp.body));
        }
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{echo, CountingStore, ScriptedTransport};
    use domain::{Comment, Post, QueuedEntity};
    use storage::MemoryStore;

    fn post(id: &str) -> Post {
        Post {
            id: id.into(),
            title: format!("Post {id}"),
            author: "Ada".into(),
            content: "Lorem ipsum".into(),
            date: "2024-03-01T09:00:00Z".into(),
            published: Some(true),
        }
    }

    fn client<E: Entity>(
        transport: Arc<ScriptedTransport>,
    ) -> (ResourceClient<E>, Arc<QueueStore>) {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(QueueStore::new(store.clone()));
        let client = ResourceClient::new(transport, SnapshotCache::new(store), queue.clone());
        (client, queue)
    }

    fn serve_posts(
        posts: Vec<Post>,
    ) -> impl FnMut(&ApiRequest) -> Result<ApiResponse, ApiError> + Send {
        move |_| Ok(ApiResponse::new(200, serde_json::to_string(&posts).unwrap()))
    }

    #[tokio::test]
    async fn list_falls_back_to_last_snapshot() {
        let transport = Arc::new(ScriptedTransport::new(serve_posts(vec![
            post("1"),
            post("2"),
        ])));
        let (posts, _) = client::<Post>(transport.clone());

        let online = posts.list().await;
        assert_eq!(online, vec![post("1"), post("2")]);

        transport.go_offline();
        assert_eq!(posts.list().await, online);

        transport.set_responder(|_| Ok(ApiResponse::new(503, "maintenance")));
        assert_eq!(posts.list().await, online);
    }

    #[tokio::test]
    async fn list_without_snapshot_is_empty_when_offline() {
        let transport = Arc::new(ScriptedTransport::offline());
        let (posts, _) = client::<Post>(transport);
        assert!(posts.list().await.is_empty());
    }

    #[tokio::test]
    async fn unparseable_list_body_keeps_previous_snapshot() {
        let transport = Arc::new(ScriptedTransport::new(serve_posts(vec![post("1")])));
        let (posts, _) = client::<Post>(transport.clone());
        posts.list().await;

        transport.set_responder(|_| Ok(ApiResponse::new(200, "<html>captive portal</html>")));
        assert_eq!(posts.list().await, vec![post("1")]);
    }

    #[tokio::test]
    async fn single_fetch_does_not_touch_snapshot() {
        let transport = Arc::new(ScriptedTransport::new(serve_posts(vec![post("1")])));
        let (posts, _) = client::<Post>(transport.clone());
        posts.list().await;

        transport.set_responder(|_| {
            Ok(ApiResponse::new(
                200,
                serde_json::to_string(&post("9")).unwrap(),
            ))
        });
        assert_eq!(posts.get_by_id("9").await.unwrap(), post("9"));

        transport.go_offline();
        assert_eq!(posts.list().await, vec![post("1")]);
    }

    #[tokio::test]
    async fn get_by_id_propagates_errors() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Ok(ApiResponse::new(404, "Not Found"))
        }));
        let (posts, _) = client::<Post>(transport.clone());

        let err = posts.get_by_id("missing").await.unwrap_err();
        assert_eq!(
            err.api(),
            Some(&ApiError::NotFound("/api/posts/missing".into()))
        );

        transport.go_offline();
        let err = posts.get_by_id("1").await.unwrap_err();
        assert!(err.api().is_some_and(ApiError::is_network));
    }

    #[tokio::test]
    async fn create_returns_server_copy_when_online() {
        let transport = Arc::new(ScriptedTransport::new(echo(201)));
        let (posts, queue) = client::<Post>(transport.clone());

        let outcome = posts.create(post("1")).await.unwrap();
        assert_eq!(outcome, CreateOutcome::Created(post("1")));
        assert!(queue.load().await.is_empty());

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::Post);
        assert_eq!(sent.path, "/api/posts/");
    }

    #[tokio::test]
    async fn create_failure_appends_exactly_one_operation() {
        let transport = Arc::new(ScriptedTransport::offline());
        let (comments, queue) = client::<Comment>(transport);
        queue
            .enqueue(QueuedOperation::create(post("earlier")))
            .await
            .unwrap();

        let comment = Comment::draft("p1", "Bo", "Written offline");
        let outcome = comments.create(comment.clone()).await.unwrap();
        assert!(outcome.is_queued());

        let pending = queue.load().await;
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[1].url, "/api/comments/");
        assert_eq!(pending[1].payload, QueuedEntity::Comment(comment));
    }

    #[tokio::test]
    async fn rejected_create_is_queued_too() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Ok(ApiResponse::new(500, "boom"))
        }));
        let (posts, queue) = client::<Post>(transport);

        assert!(posts.create(post("1")).await.unwrap().is_queued());
        assert_eq!(queue.load().await.len(), 1);
    }

    #[tokio::test]
    async fn create_reports_unreadable_queue_instead_of_dropping_it() {
        let store = Arc::new(CountingStore::new());
        let queue = Arc::new(QueueStore::new(store.clone()));
        let posts: ResourceClient<Post> = ResourceClient::new(
            Arc::new(ScriptedTransport::offline()),
            SnapshotCache::new(store.clone()),
            queue.clone(),
        );
        for id in ["p0", "p1", "p2"] {
            assert!(posts.create(post(id)).await.unwrap().is_queued());
        }

        store.fail_reads(true);
        let err = posts.create(post("p3")).await.unwrap_err();
        assert!(matches!(err, ClientError::Storage(_)));

        store.fail_reads(false);
        let ids: Vec<_> = queue
            .load()
            .await
            .iter()
            .map(|op| op.payload.id().to_string())
            .collect();
        assert_eq!(ids, ["p0", "p1", "p2"]);
    }

    #[tokio::test]
    async fn update_and_remove_are_never_queued() {
        let transport = Arc::new(ScriptedTransport::offline());
        let (posts, queue) = client::<Post>(transport.clone());

        assert!(posts.update(&post("1")).await.is_err());
        assert!(posts.remove("1").await.is_err());
        assert!(queue.load().await.is_empty());

        transport.set_responder(|_| Ok(ApiResponse::new(500, "boom")));
        let err = posts.remove("1").await.unwrap_err();
        assert!(matches!(
            err.api(),
            Some(ApiError::ServerError { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn update_puts_to_item_path() {
        let transport = Arc::new(ScriptedTransport::new(echo(200)));
        let (posts, _) = client::<Post>(transport.clone());

        let mut p = post("7");
        p.published = Some(false);
        assert_eq!(posts.update(&p).await.unwrap(), p);

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::Put);
        assert_eq!(sent.path, "/api/posts/7");
    }
}
