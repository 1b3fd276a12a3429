//! Interoperability - call into a Java VM through the JNI function table
//!
//! Design: the return type of a call picks its entry point at compile time;
//! arguments are typed values lowered into a stack buffer.
//!
//! Architecture:
//! - `types.rs` - `TypeTag`, `ReturnKind`, `JValue`
//! - `signature.rs` - method descriptor parsing and building
//! - `env.rs` - `RuntimeEnv`, the seam over the function table
//! - `abi.rs` - `AttachedEnv`, the seam bound to the real table
//! - `call.rs` - typed dispatch (instance and static, by name or id)
//! - `marshal.rs` - string buffers and field reads
//! - `vm.rs` - VM registration and thread attach

mod types;
mod signature;
mod env;
mod abi;
mod call;
mod marshal;
mod vm;

pub use types::{JValue, ReturnKind, TypeTag};
pub use signature::{field_descriptor, method_descriptor, MethodSignature};
pub use env::RuntimeEnv;
pub use abi::AttachedEnv;
pub use call::{
    call_method, call_method_id_a, call_static_method, call_static_method_id_a, get_method_id,
    try_call_method, try_call_static_method, JniReturn,
};
pub use marshal::{get_field, string_to_owned, try_get_field, Utf16Chars, Utf8Chars};
pub use vm::{java_vm, jni_env, set_java_vm, string_from_java, JniContext, VmSlot};

/// Get interop statistics
pub fn stats() -> InteropStats {
    stats::snapshot()
}

/// Interop statistics for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteropStats {
    pub calls_made: usize,
    pub resolution_failures: usize,
    pub strings_pinned: usize,
    pub strings_released: usize,
}

impl InteropStats {
    /// String buffers currently pinned
    pub fn strings_outstanding(&self) -> usize {
        self.strings_pinned.saturating_sub(self.strings_released)
    }
}

pub(crate) mod stats {
    use super::InteropStats;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static CALLS: AtomicUsize = AtomicUsize::new(0);
    static FAILURES: AtomicUsize = AtomicUsize::new(0);
    static PINNED: AtomicUsize = AtomicUsize::new(0);
    static RELEASED: AtomicUsize = AtomicUsize::new(0);

    #[inline]
    pub fn record_call() {
        CALLS.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_failure() {
        FAILURES.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_pin() {
        PINNED.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_release() {
        RELEASED.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot() -> InteropStats {
        InteropStats {
            calls_made: CALLS.load(Ordering::Relaxed),
            resolution_failures: FAILURES.load(Ordering::Relaxed),
            strings_pinned: PINNED.load(Ordering::Relaxed),
            strings_released: RELEASED.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod fake;
