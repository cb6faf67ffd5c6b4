use std::error::Error;
use std::fmt;

/// Error type for the data protector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectError {
    /// Master key missing, too short, or not valid base64.
    InvalidKey(String),
    /// Ciphertext too short or not in the expected layout.
    Malformed,
    /// Encryption failed.
    Encrypt,
    /// Authentication / decryption failed (wrong key, wrong purpose, tampered).
    Decrypt,
}

impl fmt::Display for ProtectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtectError::InvalidKey(msg) => write!(f, "invalid protection key: {}", msg),
            ProtectError::Malformed => write!(f, "protected payload is malformed"),
            ProtectError::Encrypt => write!(f, "encryption failed"),
            ProtectError::Decrypt => write!(f, "decryption failed"),
        }
    }
}

impl Error for ProtectError {}

/// Error type for state store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Callers may not write to the reserved meta partition.
    ReservedPartition(String),
    /// A value could not be serialized or deserialized.
    Serde {
        partition: String,
        key: String,
        message: String,
    },
    /// The whole store could not be encoded.
    Encode(String),
    /// The data protector failed.
    Protect(ProtectError),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::ReservedPartition(name) => {
                write!(f, "partition {} is reserved", name)
            }
            StateError::Serde {
                partition,
                key,
                message,
            } => write!(f, "state value {}/{}: {}", partition, key, message),
            StateError::Encode(msg) => write!(f, "state encode failed: {}", msg),
            StateError::Protect(e) => write!(f, "state protection failed: {}", e),
        }
    }
}

impl Error for StateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StateError::Protect(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProtectError> for StateError {
    fn from(err: ProtectError) -> Self {
        StateError::Protect(err)
    }
}
