//! Database layer (MongoDB).

pub mod mongo;

pub use mongo::MongoDb;

/// Collection names as constants.
pub mod collections {
    /// Feed documents, one per Spotify user.
    pub const USERS: &str = "users";
}
