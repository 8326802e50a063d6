//! FFI bindings for the Promille engine
//!
//! This module provides C-compatible functions for calling the engine from
//! the mobile host. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using
//! `promille_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::pipeline::{snapshot_from_json, PromilleProcessor};
use crate::ENGINE_VERSION;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert a C string to a Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert a Rust string to a C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Evaluate collaborator JSON and return a snapshot JSON payload.
///
/// `activity_json`, `profile_json`, and `as_of` may be NULL; a NULL `as_of`
/// means "now".
///
/// # Safety
/// - `drinks_json` and `user_id` must be valid null-terminated C strings.
/// - `activity_json`, `profile_json`, and `as_of` must each be NULL or a
///   valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with
///   `promille_free_string`.
/// - Returns NULL on error; call `promille_last_error` to get the message.
#[no_mangle]
pub unsafe extern "C" fn promille_snapshot(
    drinks_json: *const c_char,
    activity_json: *const c_char,
    profile_json: *const c_char,
    user_id: *const c_char,
    as_of: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let drinks_str = match cstr_to_string(drinks_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid drinks_json string pointer");
            return ptr::null_mut();
        }
    };

    let user_str = match cstr_to_string(user_id) {
        Some(s) => s,
        None => {
            set_last_error("Invalid user_id string pointer");
            return ptr::null_mut();
        }
    };

    let activity_str = cstr_to_string(activity_json);
    let profile_str = cstr_to_string(profile_json);
    let as_of_str = cstr_to_string(as_of);

    match snapshot_from_json(
        &drinks_str,
        activity_str.as_deref(),
        profile_str.as_deref(),
        &user_str,
        as_of_str.as_deref(),
    ) {
        Ok(payload) => string_to_cstr(&payload),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a PromilleProcessor
pub struct PromilleProcessorHandle {
    processor: PromilleProcessor,
}

/// Create a new processor with default configuration.
///
/// # Safety
/// - Returns a pointer to a newly allocated processor.
/// - Must be freed with `promille_processor_free`.
#[no_mangle]
pub unsafe extern "C" fn promille_processor_new() -> *mut PromilleProcessorHandle {
    clear_last_error();
    let handle = Box::new(PromilleProcessorHandle {
        processor: PromilleProcessor::new(),
    });
    Box::into_raw(handle)
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by
///   `promille_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn promille_processor_free(processor: *mut PromilleProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Evaluate collaborator JSON with a stateful processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by
///   `promille_processor_new`.
/// - `drinks_json` and `user_id` must be valid null-terminated C strings;
///   `activity_json`, `profile_json`, and `as_of` must each be NULL or a
///   valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with
///   `promille_free_string`.
/// - Returns NULL on error; call `promille_last_error` to get the message.
#[no_mangle]
pub unsafe extern "C" fn promille_processor_snapshot(
    processor: *mut PromilleProcessorHandle,
    drinks_json: *const c_char,
    activity_json: *const c_char,
    profile_json: *const c_char,
    user_id: *const c_char,
    as_of: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    let drinks_str = match cstr_to_string(drinks_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid drinks_json string pointer");
            return ptr::null_mut();
        }
    };

    let user_str = match cstr_to_string(user_id) {
        Some(s) => s,
        None => {
            set_last_error("Invalid user_id string pointer");
            return ptr::null_mut();
        }
    };

    let activity_str = cstr_to_string(activity_json);
    let profile_str = cstr_to_string(profile_json);
    let as_of_str = cstr_to_string(as_of);

    match handle.processor.snapshot_json(
        &drinks_str,
        activity_str.as_deref(),
        profile_str.as_deref(),
        &user_str,
        as_of_str.as_deref(),
    ) {
        Ok(payload) => string_to_cstr(&payload),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Get the last error message for the current thread.
///
/// # Safety
/// - The returned pointer is valid until the next engine call on this
///   thread; do not free it.
/// - Returns NULL when no error is recorded.
#[no_mangle]
pub unsafe extern "C" fn promille_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(err) => err.as_ptr(),
        None => ptr::null(),
    })
}

/// Free a string returned by the engine.
///
/// # Safety
/// - `ptr` must be a string returned by this library, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn promille_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the engine version.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with
///   `promille_free_string`.
#[no_mangle]
pub unsafe extern "C" fn promille_version() -> *mut c_char {
    string_to_cstr(ENGINE_VERSION)
}
