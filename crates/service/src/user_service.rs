use std::sync::Arc;

use models::{user::CreateUserRequest, User, UserList, UserStore};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{errors::ServiceError, repository::UserRepository, storage::UserFileStore};

/// User operations on top of a whole-store repository.
///
/// Every mutation is one load → mutate → save unit under the write guard, so
/// concurrent requests can neither mint the same id nor overwrite each other.
/// Queries load under the read guard.
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    lock: RwLock<()>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo, lock: RwLock::new(()) }
    }

    pub fn file_backed(store: UserFileStore) -> Self {
        Self::new(Arc::new(store))
    }

    /// All users keyed by id.
    pub async fn list_users(&self) -> Result<UserList, ServiceError> {
        self.read(|store| store.list).await
    }

    /// Look up one user; `None` when the id is unknown.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, ServiceError> {
        self.read(|mut store| store.list.remove(id)).await
    }

    pub async fn user_exists(&self, id: &str) -> Result<bool, ServiceError> {
        self.read(|store| store.contains(id)).await
    }

    /// Mint the next id, store the user, return the id.
    pub async fn create_user(&self, input: CreateUserRequest) -> Result<String, ServiceError> {
        self.transact(move |store| {
            let id = store
                .next_id()
                .ok_or_else(|| ServiceError::storage("mint user id", "increment exhausted"))?;
            store.list.insert(id.clone(), User::new(input.display_name, input.email));
            Ok(id)
        })
        .await
    }

    /// Replace `display_name` only; `email` and `created_at` are kept.
    pub async fn update_display_name(&self, id: &str, display_name: String) -> Result<(), ServiceError> {
        self.transact(move |store| {
            let user = store.list.get_mut(id).ok_or_else(|| ServiceError::not_found("user"))?;
            user.display_name = display_name;
            Ok(())
        })
        .await
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ServiceError> {
        self.transact(move |store| {
            store.list.remove(id).map(|_| ()).ok_or_else(|| ServiceError::not_found("user"))
        })
        .await
    }

    async fn read<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(UserStore) -> T + Send,
    {
        let _guard = self.lock.read().await;
        let store = self.repo.load().await?;
        Ok(f(store))
    }

    // Nothing is saved when `f` fails.
    async fn transact<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut UserStore) -> Result<T, ServiceError> + Send,
        T: Send,
    {
        let _guard = self.lock.write().await;
        let mut store = self.repo.load().await?;
        let out = f(&mut store)?;
        self.repo.save(&store).await?;
        debug!(increment = store.increment, users = store.list.len(), "store transaction committed");
        Ok(out)
    }
}
