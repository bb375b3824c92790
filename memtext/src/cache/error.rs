/// Outcome of a store operation that did not store anything.
///
/// None of these are failures of the server, each one maps to a defined
/// protocol reply.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CacheError {
    NotFound,
    KeyExists,
    NotStored,
}

impl CacheError {
    pub fn to_static_string(&self) -> &'static str {
        match self {
            CacheError::NotFound => "NOT FOUND",
            CacheError::KeyExists => "EXISTS",
            CacheError::NotStored => "NOT STORED",
        }
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
