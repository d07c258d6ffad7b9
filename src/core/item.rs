//! Named byte ranges produced by container unpacking
//!
//! Payloads are either available up front or supplied by a deferred
//! producer, so that items filtered out by the path patterns never pay
//! their decoding cost.

use anyhow::Result;

/// Deferred payload producer, invoked at most once
pub type DataProducer = Box<dyn FnOnce() -> Result<Vec<u8>>>;

enum Payload {
    Eager(Vec<u8>),
    Deferred(DataProducer),
}

/// One named byte range discovered inside a container
pub struct UnpackResult {
    /// Item path, forward-slash separated
    pub path: String,
    payload: Payload,
}

impl UnpackResult {
    /// Create an item whose payload is already in memory
    pub fn new(path: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            payload: Payload::Eager(data),
        }
    }

    /// Create an item whose payload is produced on first access
    pub fn deferred<F>(path: impl Into<String>, producer: F) -> Self
    where
        F: FnOnce() -> Result<Vec<u8>> + 'static,
    {
        Self {
            path: path.into(),
            payload: Payload::Deferred(Box::new(producer)),
        }
    }

    /// Materialize the payload, caching it for subsequent calls
    pub fn get_data(&mut self) -> Result<&[u8]> {
        match std::mem::replace(&mut self.payload, Payload::Eager(Vec::new())) {
            Payload::Eager(data) => self.payload = Payload::Eager(data),
            Payload::Deferred(producer) => self.payload = Payload::Eager(producer()?),
        }
        match &self.payload {
            Payload::Eager(data) => Ok(data),
            Payload::Deferred(_) => unreachable!("payload was just materialized"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_eager_payload() {
        let mut item = UnpackResult::new("a/b", b"data".to_vec());
        assert_eq!(item.get_data().unwrap(), b"data");
    }

    #[test]
    fn test_deferred_payload_materializes_once() {
        let calls = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&calls);
        let mut item = UnpackResult::deferred("a/b", move || {
            counter.set(counter.get() + 1);
            Ok(b"lazy".to_vec())
        });

        assert_eq!(calls.get(), 0);
        assert_eq!(item.get_data().unwrap(), b"lazy");
        assert_eq!(item.get_data().unwrap(), b"lazy");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_deferred_payload_error_propagates() {
        let mut item =
            UnpackResult::deferred("broken", || anyhow::bail!("decoder exploded"));
        assert!(item.get_data().is_err());
    }
}
