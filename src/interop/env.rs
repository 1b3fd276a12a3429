//! The slice of the JNI function table this crate dispatches through
//!
//! `AttachedEnv` binds it to a live VM; tests bind it to a recording fake.

use super::types::ReturnKind;
use jni_sys::{jchar, jclass, jfieldID, jmethodID, jobject, jsize, jstring, jvalue};
use std::ffi::CStr;
use std::os::raw::c_char;

/// Per-thread view of the managed runtime.
///
/// Resolution methods return null handles on failure, exactly like the
/// underlying table; a failed lookup usually leaves an exception pending.
///
/// # Safety
/// Implementors must uphold JNI semantics for every method: handles passed
/// in are only valid for the runtime that produced them, and returned
/// local references belong to the caller.
pub unsafe trait RuntimeEnv {
    /// `GetObjectClass`. Returns a local reference.
    unsafe fn get_object_class(&self, obj: jobject) -> jclass;

    unsafe fn get_method_id(&self, cls: jclass, name: &CStr, sig: &CStr) -> jmethodID;

    unsafe fn get_static_method_id(&self, cls: jclass, name: &CStr, sig: &CStr) -> jmethodID;

    unsafe fn get_field_id(&self, cls: jclass, name: &CStr, sig: &CStr) -> jfieldID;

    unsafe fn delete_local_ref(&self, obj: jobject);

    /// `Call<kind>MethodA`. The union member matching `kind` is set.
    unsafe fn call_method_a(
        &self,
        obj: jobject,
        mid: jmethodID,
        kind: ReturnKind,
        args: &[jvalue],
    ) -> jvalue;

    /// `CallStatic<kind>MethodA`
    unsafe fn call_static_method_a(
        &self,
        cls: jclass,
        mid: jmethodID,
        kind: ReturnKind,
        args: &[jvalue],
    ) -> jvalue;

    /// `Get<kind>Field`. `kind` is never `Void`.
    unsafe fn get_field(&self, obj: jobject, fid: jfieldID, kind: ReturnKind) -> jvalue;

    unsafe fn get_string_utf_chars(&self, s: jstring) -> *const c_char;

    unsafe fn release_string_utf_chars(&self, s: jstring, chars: *const c_char);

    unsafe fn get_string_chars(&self, s: jstring) -> *const jchar;

    unsafe fn get_string_length(&self, s: jstring) -> jsize;

    unsafe fn release_string_chars(&self, s: jstring, chars: *const jchar);

    fn exception_check(&self) -> bool;

    /// Print the pending exception to the runtime's error stream
    fn exception_describe(&self);

    fn exception_clear(&self);
}
