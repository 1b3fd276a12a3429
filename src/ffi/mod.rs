//! C FFI - stable entry points for native binding code
//!
//! Design: the classification utilities and VM registration exported with
//! a C ABI. Type tags cross the boundary as their ordinals.

use crate::interop::{self, TypeTag};
use crate::logging::{self, debug, info, warn, LogConfig};
use crate::{config, BridgeConfig};
use jni_sys::{jint, JavaVM, JNI_ERR, JNI_OK, JNI_VERSION_1_6};
use std::ffi::{c_void, CStr};
use std::os::raw::c_char;

/// Called by the VM when this library is loaded with `System.loadLibrary`
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "system" fn JNI_OnLoad(vm: *mut JavaVM, _reserved: *mut c_void) -> jint {
    jni_bridge_init();
    match interop::set_java_vm(vm) {
        Ok(()) => JNI_VERSION_1_6,
        Err(err) => {
            warn!(error = %err, "JNI_OnLoad could not register the VM");
            JNI_ERR
        }
    }
}

/// Initialize logging and configuration from the environment
#[no_mangle]
pub extern "C" fn jni_bridge_init() {
    let (config, load_error) = match BridgeConfig::from_env() {
        Ok(config) => (config, None),
        Err(err) => {
            let fallback = BridgeConfig {
                log: LogConfig::from_env(),
                ..BridgeConfig::default()
            };
            (fallback, Some(err))
        }
    };

    logging::init_with_config(config.log.clone());
    if let Some(err) = load_error {
        warn!(error = %err, "using default configuration");
    }
    config::install(config);
    info!("jni-bridge initialized");
}

/// Register the VM. Returns `JNI_OK` or `JNI_ERR`.
#[no_mangle]
pub unsafe extern "C" fn jni_bridge_set_java_vm(vm: *mut JavaVM) -> jint {
    match interop::set_java_vm(vm) {
        Ok(()) => JNI_OK,
        Err(err) => {
            warn!(error = %err, "could not register the VM");
            JNI_ERR
        }
    }
}

/// Classify a NUL-terminated reflective class name. Null or non-UTF-8
/// names are invalid.
#[no_mangle]
pub unsafe extern "C" fn jni_bridge_type_from_class_name(name: *const c_char) -> u8 {
    if name.is_null() {
        return TypeTag::Invalid.ordinal();
    }
    match CStr::from_ptr(name).to_str() {
        Ok(name) => TypeTag::from_class_name(name).ordinal(),
        Err(_) => {
            debug!("class name is not UTF-8");
            TypeTag::Invalid.ordinal()
        }
    }
}

/// Classify a single signature code
#[no_mangle]
pub extern "C" fn jni_bridge_type_from_primitive(code: c_char) -> u8 {
    TypeTag::from_primitive_code(code as u8 as char).ordinal()
}

/// Static NUL-terminated signature encoding for a tag ordinal; unknown
/// ordinals yield the empty string
#[no_mangle]
pub extern "C" fn jni_bridge_signature_from_type(ordinal: u8) -> *const c_char {
    let encoded: &'static [u8] = match TypeTag::from_ordinal(ordinal) {
        Some(TypeTag::Void) => b"V\0",
        Some(TypeTag::Object) => b"L\0",
        Some(TypeTag::Boolean) => b"Z\0",
        Some(TypeTag::Byte) => b"B\0",
        Some(TypeTag::Char) => b"C\0",
        Some(TypeTag::Short) => b"S\0",
        Some(TypeTag::Int) => b"I\0",
        Some(TypeTag::Long) => b"J\0",
        Some(TypeTag::Float) => b"F\0",
        Some(TypeTag::Double) => b"D\0",
        Some(TypeTag::Array) => b"[\0",
        Some(TypeTag::Invalid) | None => b"\0",
    };
    encoded.as_ptr() as *const c_char
}
