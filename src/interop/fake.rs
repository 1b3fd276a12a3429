//! Recording in-memory runtime used by the interop tests
//!
//! Mirrors JNI behaviour where it matters to callers: failed lookups return
//! null and leave an exception pending, `GetObjectClass` hands out a local
//! reference that must be deleted, and string buffers must be released
//! exactly once.

use super::env::RuntimeEnv;
use super::types::{JValue, ReturnKind};
use jni_sys::{jchar, jclass, jfieldID, jmethodID, jobject, jsize, jstring, jvalue};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// One dispatched call as seen by the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedCall {
    pub target: usize,
    pub mid: usize,
    pub kind: ReturnKind,
    pub is_static: bool,
    pub arg_count: usize,
}

struct Method {
    kind: ReturnKind,
    result: JValue,
    throws: bool,
}

#[derive(Default)]
struct State {
    next_id: usize,
    class_names: HashMap<String, usize>,
    classes: HashMap<usize, usize>,
    method_ids: HashMap<(usize, String, String, bool), usize>,
    methods: HashMap<usize, Method>,
    field_ids: HashMap<(usize, String, String), usize>,
    fields: HashMap<usize, JValue>,
    strings: HashMap<usize, String>,
    utf8_pins: HashMap<usize, (usize, CString)>,
    utf16_pins: HashMap<usize, (usize, Vec<u16>)>,
    live_local_refs: isize,
    pending_exception: bool,
    describes: usize,
    clears: usize,
    calls: Vec<RecordedCall>,
}

impl State {
    fn fresh_id(&mut self) -> usize {
        self.next_id += 0x10;
        0x1000 + self.next_id
    }
}

#[derive(Default)]
pub struct FakeEnv {
    state: RefCell<State>,
}

impl FakeEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(&self, name: &str) -> jclass {
        let mut state = self.state.borrow_mut();
        if let Some(&id) = state.class_names.get(name) {
            return id as jclass;
        }
        let id = state.fresh_id();
        state.class_names.insert(name.to_string(), id);
        id as jclass
    }

    /// New instance of `class`
    pub fn object(&self, class: &str) -> jobject {
        let cls = self.class(class) as usize;
        let mut state = self.state.borrow_mut();
        let id = state.fresh_id();
        state.classes.insert(id, cls);
        id as jobject
    }

    pub fn define_method(&self, cls: jclass, name: &str, sig: &str, result: JValue) -> jmethodID {
        self.insert_method(cls, name, sig, false, result, false)
    }

    pub fn define_static_method(&self, cls: jclass, name: &str, sig: &str, result: JValue) -> jmethodID {
        self.insert_method(cls, name, sig, true, result, false)
    }

    /// Method that raises an exception when called and returns `result`
    pub fn define_throwing_method(&self, cls: jclass, name: &str, sig: &str, result: JValue) -> jmethodID {
        self.insert_method(cls, name, sig, false, result, true)
    }

    fn insert_method(
        &self,
        cls: jclass,
        name: &str,
        sig: &str,
        is_static: bool,
        result: JValue,
        throws: bool,
    ) -> jmethodID {
        let kind = result
            .tag()
            .return_kind()
            .expect("method result must have a return kind");
        let mut state = self.state.borrow_mut();
        let mid = state.fresh_id();
        state
            .method_ids
            .insert((cls as usize, name.to_string(), sig.to_string(), is_static), mid);
        state.methods.insert(mid, Method { kind, result, throws });
        mid as jmethodID
    }

    pub fn define_field(&self, cls: jclass, name: &str, sig: &str, value: JValue) -> jfieldID {
        let mut state = self.state.borrow_mut();
        let fid = state.fresh_id();
        state
            .field_ids
            .insert((cls as usize, name.to_string(), sig.to_string()), fid);
        state.fields.insert(fid, value);
        fid as jfieldID
    }

    pub fn string(&self, text: &str) -> jstring {
        let cls = self.class("java.lang.String") as usize;
        let mut state = self.state.borrow_mut();
        let id = state.fresh_id();
        state.classes.insert(id, cls);
        state.strings.insert(id, text.to_string());
        id as jstring
    }

    pub fn raise(&self) {
        self.state.borrow_mut().pending_exception = true;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.borrow().calls.clone()
    }

    pub fn live_local_refs(&self) -> isize {
        self.state.borrow().live_local_refs
    }

    pub fn pending_exception(&self) -> bool {
        self.state.borrow().pending_exception
    }

    pub fn describes(&self) -> usize {
        self.state.borrow().describes
    }

    pub fn clears(&self) -> usize {
        self.state.borrow().clears
    }

    pub fn pinned_strings(&self) -> usize {
        let state = self.state.borrow();
        state.utf8_pins.len() + state.utf16_pins.len()
    }

    fn lookup_method(&self, cls: jclass, name: &CStr, sig: &CStr, is_static: bool) -> jmethodID {
        let mut state = self.state.borrow_mut();
        let key = (
            cls as usize,
            name.to_str().unwrap().to_string(),
            sig.to_str().unwrap().to_string(),
            is_static,
        );
        match state.method_ids.get(&key) {
            Some(&mid) => mid as jmethodID,
            None => {
                // NoSuchMethodError
                state.pending_exception = true;
                std::ptr::null_mut()
            }
        }
    }

    fn invoke(&self, target: jobject, mid: jmethodID, kind: ReturnKind, is_static: bool, args: &[jvalue]) -> jvalue {
        let mut state = self.state.borrow_mut();
        let method = state.methods.get(&(mid as usize)).expect("unknown method id");
        assert_eq!(method.kind, kind, "method dispatched through the wrong entry point");

        let (result, throws) = (method.result, method.throws);
        state.calls.push(RecordedCall {
            target: target as usize,
            mid: mid as usize,
            kind,
            is_static,
            arg_count: args.len(),
        });
        if throws {
            state.pending_exception = true;
        }
        result.to_raw()
    }
}

unsafe impl RuntimeEnv for FakeEnv {
    unsafe fn get_object_class(&self, obj: jobject) -> jclass {
        let mut state = self.state.borrow_mut();
        match state.classes.get(&(obj as usize)).copied() {
            Some(cls) => {
                state.live_local_refs += 1;
                cls as jclass
            }
            None => std::ptr::null_mut(),
        }
    }

    unsafe fn get_method_id(&self, cls: jclass, name: &CStr, sig: &CStr) -> jmethodID {
        self.lookup_method(cls, name, sig, false)
    }

    unsafe fn get_static_method_id(&self, cls: jclass, name: &CStr, sig: &CStr) -> jmethodID {
        self.lookup_method(cls, name, sig, true)
    }

    unsafe fn get_field_id(&self, cls: jclass, name: &CStr, sig: &CStr) -> jfieldID {
        let mut state = self.state.borrow_mut();
        let key = (
            cls as usize,
            name.to_str().unwrap().to_string(),
            sig.to_str().unwrap().to_string(),
        );
        match state.field_ids.get(&key) {
            Some(&fid) => fid as jfieldID,
            None => {
                // NoSuchFieldError
                state.pending_exception = true;
                std::ptr::null_mut()
            }
        }
    }

    unsafe fn delete_local_ref(&self, _obj: jobject) {
        self.state.borrow_mut().live_local_refs -= 1;
    }

    unsafe fn call_method_a(&self, obj: jobject, mid: jmethodID, kind: ReturnKind, args: &[jvalue]) -> jvalue {
        self.invoke(obj, mid, kind, false, args)
    }

    unsafe fn call_static_method_a(&self, cls: jclass, mid: jmethodID, kind: ReturnKind, args: &[jvalue]) -> jvalue {
        self.invoke(cls, mid, kind, true, args)
    }

    unsafe fn get_field(&self, _obj: jobject, fid: jfieldID, kind: ReturnKind) -> jvalue {
        let state = self.state.borrow();
        let value = state.fields[&(fid as usize)];
        assert_eq!(value.tag().return_kind(), Some(kind), "field read through the wrong entry point");
        value.to_raw()
    }

    unsafe fn get_string_utf_chars(&self, s: jstring) -> *const c_char {
        let mut state = self.state.borrow_mut();
        let Some(text) = state.strings.get(&(s as usize)) else {
            return std::ptr::null();
        };
        let buffer = CString::new(text.as_str()).unwrap();
        let ptr = buffer.as_ptr();
        state.utf8_pins.insert(ptr as usize, (s as usize, buffer));
        ptr
    }

    unsafe fn release_string_utf_chars(&self, s: jstring, chars: *const c_char) {
        let mut state = self.state.borrow_mut();
        match state.utf8_pins.remove(&(chars as usize)) {
            Some((owner, _)) => assert_eq!(owner, s as usize, "buffer released against another string"),
            None => panic!("double release of string buffer {:p}", chars),
        }
    }

    unsafe fn get_string_chars(&self, s: jstring) -> *const jchar {
        let mut state = self.state.borrow_mut();
        let Some(text) = state.strings.get(&(s as usize)) else {
            return std::ptr::null();
        };
        let mut buffer: Vec<u16> = Vec::with_capacity(text.len() + 1);
        buffer.extend(text.encode_utf16());
        let ptr = buffer.as_ptr();
        state.utf16_pins.insert(ptr as usize, (s as usize, buffer));
        ptr
    }

    unsafe fn get_string_length(&self, s: jstring) -> jsize {
        let state = self.state.borrow();
        state
            .strings
            .get(&(s as usize))
            .map_or(0, |text| text.encode_utf16().count() as jsize)
    }

    unsafe fn release_string_chars(&self, s: jstring, chars: *const jchar) {
        let mut state = self.state.borrow_mut();
        match state.utf16_pins.remove(&(chars as usize)) {
            Some((owner, _)) => assert_eq!(owner, s as usize, "buffer released against another string"),
            None => panic!("double release of string buffer {:p}", chars),
        }
    }

    fn exception_check(&self) -> bool {
        self.state.borrow().pending_exception
    }

    fn exception_describe(&self) {
        self.state.borrow_mut().describes += 1;
    }

    fn exception_clear(&self) {
        let mut state = self.state.borrow_mut();
        state.pending_exception = false;
        state.clears += 1;
    }
}
