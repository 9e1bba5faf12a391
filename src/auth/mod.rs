//! Authentication core: credential storage, password hashing, and the
//! token service.

pub mod password;
pub mod store;
pub mod token;
