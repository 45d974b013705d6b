//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Request contexts and responses cross the boundary as opaque handles; C
//! never sees their layout. Results are small `#[repr(C)]` envelopes holding
//! an error code, an owned C string message and the payload. Conversion
//! functions live here to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use httpssni_core::{HttpsError, ReadResult, RequestContext, ResponseHandle, StreamError};

/// Opaque handle to a `RequestContext`.
pub struct FfiHttpsCtx {
    pub(crate) inner: RequestContext,
}

/// Opaque handle to a live response. Owns the connection until
/// `httpssni_response_close` or `httpssni_response_free`.
pub struct FfiHttpResponse {
    pub(crate) inner: ResponseHandle,
}

/// Called once per response header. Return false to stop iterating.
pub type FfiHeaderVisitor =
    extern "C" fn(name: *const c_char, value: *const c_char, user_data: *mut c_void) -> bool;

/// Error codes returned in `FfiRequestResult`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidRequest = 1,
    Timeout = 2,
    Transport = 3,
    NullArg = 4,
    Panic = 5,
}

/// Result envelope for `httpssni_ctx_perform_request`.
///
/// On success `error_code` is `Ok`, `error_message` is null and `response`
/// is a handle the caller now owns. On failure `response` is null and
/// `error_message` is a human-readable C string.
#[repr(C)]
pub struct FfiRequestResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub response: *mut FfiHttpResponse,
}

impl FfiRequestResult {
    pub(crate) fn ok(response: ResponseHandle) -> *mut Self {
        let response = Box::into_raw(Box::new(FfiHttpResponse { inner: response }));
        Box::into_raw(Box::new(FfiRequestResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            response,
        }))
    }

    pub(crate) fn from_error(err: HttpsError) -> *mut Self {
        let error_code = match &err {
            HttpsError::InvalidRequest(_) => FfiErrorCode::InvalidRequest,
            HttpsError::Timeout(_) => FfiErrorCode::Timeout,
            HttpsError::Transport(_) => FfiErrorCode::Transport,
        };
        Self::failed(error_code, &err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failed(FfiErrorCode::NullArg, &format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failed(FfiErrorCode::Panic, msg)
    }

    fn failed(error_code: FfiErrorCode, msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiRequestResult {
            error_code,
            error_message: c_string(msg),
            response: std::ptr::null_mut(),
        }))
    }
}

/// Result of one body read.
///
/// `buf` holds exactly `len` bytes (null when `len` is 0). `error_message`
/// is null while the body may still yield data; once set, stop reading.
/// `eof` distinguishes a clean end of body from a failure.
#[repr(C)]
pub struct FfiReadResult {
    pub buf: *mut u8,
    pub len: usize,
    pub eof: bool,
    pub error_message: *mut c_char,
}

impl FfiReadResult {
    pub(crate) fn from_core(result: ReadResult) -> *mut Self {
        let eof = result.is_eof();
        let error_message = match &result.error {
            Some(err) => c_string(&err.to_string()),
            None => std::ptr::null_mut(),
        };
        let len = result.bytes.len();
        let buf = if len == 0 {
            std::ptr::null_mut()
        } else {
            Box::into_raw(result.bytes.into_boxed_slice()) as *mut u8
        };
        Box::into_raw(Box::new(FfiReadResult {
            buf,
            len,
            eof,
            error_message,
        }))
    }

    pub(crate) fn failed(msg: &str) -> *mut Self {
        Self::from_core(ReadResult {
            bytes: Vec::new(),
            error: Some(StreamError::Io(msg.to_string())),
        })
    }
}

/// Owned C string. Interior NULs cannot be represented and are dropped.
pub(crate) fn c_string(s: &str) -> *mut c_char {
    CString::new(s.replace('\0', ""))
        .unwrap_or_default()
        .into_raw()
}
