use std::io;

/// Failure of an [`encode`](crate::encode) or [`decode`](crate::decode) pass.
///
/// Processing stops at the first failure. Output written before it is not
/// rolled back.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Reading the source stream failed.
    #[error("input error: {0}")]
    Input(#[source] io::Error),

    /// Writing the destination stream failed.
    #[error("output error: {0}")]
    Output(#[source] io::Error),

    /// The source ended inside a frame.
    #[error("unexpected end of stream: {remaining} byte(s) of the last frame missing")]
    TruncatedStream { remaining: usize },
}

pub type Result<T> = std::result::Result<T, CodecError>;
