//! Data types shared by the storage, service and HTTP layers.
//! - `user`: a single user record and the request/response bodies around it.
//! - `store`: the persisted aggregate (counter + id → user map).

pub mod store;
pub mod user;

pub use store::{UserList, UserStore};
pub use user::User;
