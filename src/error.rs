use thiserror::Error;

/// Errors surfaced by [`XFastTrie`](crate::XFastTrie).
///
/// Duplicate keys are not errors: [`XFastTrie::insert`](crate::XFastTrie::insert)
/// reports them through its `inserted` flag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The requested key is not present.
    #[error("key does not exist")]
    NotFound,

    /// The key has bits set above the configured width.
    #[error("key {key} does not fit in {width} bits")]
    KeyOutOfRange { key: u128, width: u32 },

    /// The configured width is zero or wider than the key type.
    #[error("invalid key width {width}, expected 1..={max}")]
    InvalidWidth { width: u32, max: u32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
