//! Repository abstractions for data access.

pub mod transaction;
pub mod user;

pub use transaction::TransactionRepository;
pub use user::UserRepository;
