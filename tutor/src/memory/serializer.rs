//! Serializer for checkpoint state (state <-> bytes). Used by persistent checkpointers.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::memory::checkpointer::CheckpointError;

/// Converts state to and from bytes for storage.
pub trait Serializer<S>: Send + Sync {
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError>;
    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError>;
}

/// JSON encoding via serde_json. Any `Serialize + DeserializeOwned` state works.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializer;

impl<S> Serializer<S> for JsonSerializer
where
    S: Serialize + DeserializeOwned,
{
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError> {
        serde_json::to_vec(state).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError> {
        serde_json::from_slice(bytes).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Counter {
        n: u32,
    }

    #[test]
    fn corrupt_bytes_are_serialization_errors() {
        let r: Result<Counter, _> = JsonSerializer.deserialize(b"{not json");
        assert!(matches!(r, Err(CheckpointError::Serialization(_))));
    }

    #[test]
    fn json_serializer_writes_plain_json() {
        let bytes = Serializer::<Counter>::serialize(&JsonSerializer, &Counter { n: 7 }).unwrap();
        assert_eq!(bytes, br#"{"n":7}"#);
    }
}
