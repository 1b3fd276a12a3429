//! Error type shared by every bridge operation

use crate::interop::TypeTag;
use std::fmt;

/// Failures crossing the native/managed boundary.
///
/// Two families exist: resolution failures (a class, method, field or
/// string cannot be produced for the given handle and descriptor) and
/// uninitialized-dependency failures (no VM, no attached environment).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteropError {
    /// No VM has been registered with [`crate::set_java_vm`]
    Uninitialized,
    /// A different VM was already registered
    VmAlreadySet,
    /// `AttachCurrentThread` returned a non-zero status
    AttachFailed { code: i32 },
    /// A required handle was null
    NullHandle,
    ClassNotFound,
    MethodNotFound { name: String, signature: String },
    FieldNotFound { name: String, signature: String },
    InvalidSignature { signature: String },
    InvalidName { name: String },
    ArgumentMismatch { expected: String, found: String },
    ReturnMismatch { expected: TypeTag, found: TypeTag },
    InvalidFieldType(TypeTag),
    /// The managed callee raised an exception (already described and cleared)
    JavaException,
    /// The runtime returned no character buffer for a string
    StringUnavailable,
}

impl InteropError {
    /// Whether this failure comes from name/descriptor resolution
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            Self::ClassNotFound
                | Self::MethodNotFound { .. }
                | Self::FieldNotFound { .. }
                | Self::InvalidSignature { .. }
                | Self::ArgumentMismatch { .. }
                | Self::ReturnMismatch { .. }
                | Self::InvalidFieldType(_)
        )
    }
}

impl fmt::Display for InteropError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Java VM has not been set"),
            Self::VmAlreadySet => write!(f, "A different Java VM is already set"),
            Self::AttachFailed { code } => {
                write!(f, "AttachCurrentThread failed, returned {}", code)
            }
            Self::NullHandle => write!(f, "Null handle"),
            Self::ClassNotFound => write!(f, "Could not find class for object"),
            Self::MethodNotFound { name, signature } => {
                write!(f, "Could not find method: {} {}", name, signature)
            }
            Self::FieldNotFound { name, signature } => {
                write!(f, "Could not find field: {} {}", name, signature)
            }
            Self::InvalidSignature { signature } => {
                write!(f, "Malformed signature: {:?}", signature)
            }
            Self::InvalidName { name } => write!(f, "Invalid name: {:?}", name),
            Self::ArgumentMismatch { expected, found } => {
                write!(f, "Argument mismatch: expected ({}), found ({})", expected, found)
            }
            Self::ReturnMismatch { expected, found } => {
                write!(f, "Return type mismatch: expected {:?}, found {:?}", expected, found)
            }
            Self::InvalidFieldType(tag) => write!(f, "Invalid field type ({})", *tag as u8),
            Self::JavaException => write!(f, "Java exception raised during call"),
            Self::StringUnavailable => write!(f, "Could not get string characters"),
        }
    }
}

impl std::error::Error for InteropError {}

pub type Result<T> = std::result::Result<T, InteropError>;
