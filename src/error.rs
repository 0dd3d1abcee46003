use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Typed errors surfaced by the pipeline's own contracts.
///
/// Only encoding gets a typed variant: a record that cannot be
/// represented is fatal to the single publish attempt that hit it,
/// never retried, and callers distinguish it from transport trouble.
/// Everything else — broker connectivity, delivery failures after the
/// client's retries, startup problems — flows through `anyhow` with
/// context, the way the Kafka layer reports them.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Encoding error: {0}")]
    Encoding(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_error_display() {
        let bad_json = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        let err = AppError::Encoding(bad_json);
        assert!(err.to_string().starts_with("Encoding error:"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_every_variant_is_produced_by_the_codec() {
        // The enum carries no variants the pipeline never constructs;
        // the one variant comes straight out of encode()
        struct Unserializable;
        impl serde::Serialize for Unserializable {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("cannot represent"))
            }
        }

        let err = crate::codec::encode(&Unserializable).unwrap_err();
        assert!(matches!(err, AppError::Encoding(_)));
    }
}
