//! Service layer for the user records API.
//! - `storage`: the JSON file holding the whole user store.
//! - `repository`: the persistence seam the service talks to.
//! - `user_service`: list/get/create/update/delete as atomic store transactions.

pub mod errors;
pub mod repository;
pub mod runtime;
pub mod storage;
pub mod user_service;

pub use errors::ServiceError;
pub use user_service::UserService;
