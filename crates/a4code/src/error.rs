/// Errors surfaced by parsing and rendering.
///
/// End of input is never an error: unterminated tags close implicitly and the
/// pull stream simply stops yielding.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot unread: no byte was read since the last unread")]
    Unread,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
