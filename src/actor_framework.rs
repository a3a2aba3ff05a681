use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// 1. THE ABSTRACTION (Traits and DTOs)
// =============================================================================

/// Errors shared by every resource actor and its clients.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Rejected: {0}")]
    Rejected(String),
    #[error("Actor communication error: {0}")]
    Channel(String),
}

/// Trait that any domain entity must implement to be managed by ResourceActor
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;

    /// Construct the full Entity from a freshly allocated ID and the params.
    /// Validation failures surface as [`FrameworkError::Rejected`].
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, FrameworkError>;

    fn on_update(&mut self, patch: Self::Patch) -> Result<(), FrameworkError>;
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Actor loop; stops when the last client is dropped.
    pub async fn run(mut self) {
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let id = (self.next_id_fn)();
                    let result = T::from_create_params(id.clone(), params).map(|item| {
                        self.store.insert(id, item.clone());
                        item
                    });
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Update {
                    id,
                    patch,
                    respond_to,
                } => {
                    let result = match self.store.get_mut(&id) {
                        Some(item) => item.on_update(patch).map(|()| item.clone()),
                        None => Err(FrameworkError::NotFound(id.to_string())),
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::List { respond_to } => {
                    let items: Vec<T> = self.store.values().cloned().collect();
                    let _ = respond_to.send(Ok(items));
                }
            }
        }
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Create { params, respond_to })
            .await
            .map_err(|_| FrameworkError::Channel("Actor closed".to_string()))?;
        response
            .await
            .map_err(|_| FrameworkError::Channel("Actor dropped".to_string()))?
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Get { id, respond_to })
            .await
            .map_err(|_| FrameworkError::Channel("Actor closed".to_string()))?;
        response
            .await
            .map_err(|_| FrameworkError::Channel("Actor dropped".to_string()))?
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Update {
                id,
                patch,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::Channel("Actor closed".to_string()))?;
        response
            .await
            .map_err(|_| FrameworkError::Channel("Actor dropped".to_string()))?
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::List { respond_to })
            .await
            .map_err(|_| FrameworkError::Channel("Actor closed".to_string()))?;
        response
            .await
            .map_err(|_| FrameworkError::Channel("Actor dropped".to_string()))?
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    // --- Domain Definition ---

    #[derive(Clone, Debug, PartialEq)]
    struct Shelf {
        id: String,
        label: String,
        capacity: u32,
    }

    #[derive(Debug)]
    struct ShelfCreate {
        label: String,
        capacity: u32,
    }

    #[derive(Debug)]
    struct ShelfPatch {
        label: Option<String>,
    }

    impl Entity for Shelf {
        type Id = String;
        type CreateParams = ShelfCreate;
        type Patch = ShelfPatch;

        fn from_create_params(id: String, params: ShelfCreate) -> Result<Self, FrameworkError> {
            if params.label.is_empty() {
                return Err(FrameworkError::Rejected("Label required".to_string()));
            }
            Ok(Self {
                id,
                label: params.label,
                capacity: params.capacity,
            })
        }

        fn on_update(&mut self, patch: ShelfPatch) -> Result<(), FrameworkError> {
            if let Some(label) = patch.label {
                self.label = label;
            }
            Ok(())
        }
    }

    // --- Tests ---

    fn start_actor() -> ResourceClient<Shelf> {
        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || {
            let id = counter.fetch_add(1, Ordering::SeqCst);
            format!("shelf_{}", id)
        };
        let (actor, client) = ResourceActor::new(10, next_id);
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_resource_actor_lifecycle() {
        let client = start_actor();

        // 1. Create
        let shelf = client
            .create(ShelfCreate {
                label: "Dry goods".into(),
                capacity: 40,
            })
            .await
            .unwrap();
        assert_eq!(shelf.id, "shelf_1");
        assert_eq!(shelf.capacity, 40);

        // 2. Update
        let updated = client
            .update(
                shelf.id.clone(),
                ShelfPatch {
                    label: Some("Cold storage".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.label, "Cold storage");

        // 3. Get reflects the update
        let fetched = client.get(shelf.id.clone()).await.unwrap().unwrap();
        assert_eq!(fetched, updated);

        // 4. List
        let all = client.list().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_create_validation_is_rejected() {
        let client = start_actor();

        let result = client
            .create(ShelfCreate {
                label: String::new(),
                capacity: 10,
            })
            .await;
        assert_eq!(
            result,
            Err(FrameworkError::Rejected("Label required".to_string()))
        );

        // Nothing was stored
        assert!(client.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let client = start_actor();

        let result = client
            .update("shelf_99".to_string(), ShelfPatch { label: None })
            .await;
        assert_eq!(
            result,
            Err(FrameworkError::NotFound("shelf_99".to_string()))
        );
    }
}
