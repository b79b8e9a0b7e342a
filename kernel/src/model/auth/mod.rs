pub mod event;

/// Opaque bearer token handed to clients and stored in the
/// key value store with a TTL.
pub struct AccessToken(pub String);
