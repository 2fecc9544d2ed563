//! Redis error mapping to StoreError.

use kvsync_core::store::StoreError;

/// Maps Redis errors to StoreError.
pub fn map_redis_error(err: redis::RedisError) -> StoreError {
    if err.is_connection_refusal() || err.is_timeout() || err.is_connection_dropped() {
        StoreError::ConnectionFailed(err.to_string())
    } else {
        StoreError::Remote(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_refusal_is_connection_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = map_redis_error(redis::RedisError::from(io));
        assert!(matches!(err, StoreError::ConnectionFailed(_)));
    }

    #[test]
    fn test_response_error_is_remote() {
        let err = map_redis_error(redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "wrong type",
        )));
        assert!(matches!(err, StoreError::Remote(_)));
    }
}
