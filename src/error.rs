use thiserror::Error;

/// Errors returned by fallible tree operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// An entry with an equal key is already in the tree. The tree was not modified.
    #[error("an entry with an equal key is already present")]
    DuplicateKey,
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
