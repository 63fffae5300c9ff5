use async_trait::async_trait;
use models::UserStore;

use crate::errors::ServiceError;

/// Persistence seam for the user store.
/// Implementations always read and write the whole aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn load(&self) -> Result<UserStore, ServiceError>;
    async fn save(&self, store: &UserStore) -> Result<(), ServiceError>;
}

/// In-memory repository for tests; `fail_saves` makes every save error out.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    #[derive(Default)]
    pub struct MockUserRepository {
        store: Mutex<UserStore>,
        fail_saves: AtomicBool,
        saves: AtomicUsize,
    }

    impl MockUserRepository {
        pub fn with_store(store: UserStore) -> Self {
            Self { store: Mutex::new(store), ..Default::default() }
        }

        pub fn fail_saves(&self, fail: bool) {
            self.fail_saves.store(fail, Ordering::SeqCst);
        }

        pub fn save_count(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }

        pub async fn snapshot(&self) -> UserStore {
            self.store.lock().await.clone()
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn load(&self) -> Result<UserStore, ServiceError> {
            Ok(self.store.lock().await.clone())
        }

        async fn save(&self, store: &UserStore) -> Result<(), ServiceError> {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(ServiceError::storage("save", "simulated write failure"));
            }
            *self.store.lock().await = store.clone();
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
