//! jni-bridge - typed call dispatch over the Java Native Interface
//!
//! Native code uses this crate to invoke instance and static methods on
//! objects owned by a Java VM, read their fields, borrow string characters
//! and classify runtime type names. The VM is registered once and every
//! operation takes the calling thread's environment explicitly.

pub mod config;
pub mod error;
pub mod ffi;
pub mod interop;
pub mod logging;

pub use config::BridgeConfig;
pub use error::{InteropError, Result};
pub use interop::{
    call_method, call_method_id_a, call_static_method, call_static_method_id_a, field_descriptor,
    get_field, get_method_id, java_vm, jni_env, method_descriptor, set_java_vm, stats,
    string_from_java, string_to_owned, try_call_method, try_call_static_method, try_get_field,
    AttachedEnv, InteropStats, JValue, JniContext, JniReturn, MethodSignature, ReturnKind,
    RuntimeEnv, TypeTag, Utf16Chars, Utf8Chars,
};
pub use logging::LogConfig;

/// Load configuration from the environment and initialize logging
pub fn init() {
    ffi::jni_bridge_init();
}
