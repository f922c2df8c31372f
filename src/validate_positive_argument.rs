use crate::stream_dsl_error::StreamDslError;

/// Rejects zero where a stage requires a strictly positive size or count.
///
/// # Errors
///
/// Returns [`StreamDslError::InvalidArgument`] naming the offending argument
/// when `value == 0`.
pub const fn validate_positive_argument(name: &'static str, value: usize) -> Result<usize, StreamDslError> {
  if value == 0 {
    return Err(StreamDslError::InvalidArgument { name, value, reason: "must be greater than zero" });
  }
  Ok(value)
}
