//! C-ABI wrapper around `httpssni-core`.
//!
//! # Overview
//! Exposes request contexts and streaming responses through `extern "C"`
//! functions so any language with a C FFI can issue HTTPS requests whose
//! dial target differs from the TLS/`Host` identity.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Contexts and responses are opaque handles; setters mirror the core
//!   `RequestContext` 1:1.
//! - Fallible calls return a heap-allocated result envelope carrying an
//!   error code and message; the caller frees it with the matching
//!   `httpssni_free_*` function.
//! - A response handle owns its connection. `httpssni_response_close`
//!   releases the connection, `httpssni_response_free` releases the handle
//!   (closing it first if needed).

pub mod types;

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use httpssni_core::RequestContext;

use types::*;

/// Borrow a C string as `&str`. Invalid UTF-8 reads as empty.
///
/// # Safety
/// `s` must be non-null and point to a NUL-terminated string that outlives
/// the returned reference.
unsafe fn str_arg<'a>(s: *const c_char) -> &'a str {
    unsafe { CStr::from_ptr(s) }.to_str().unwrap_or("")
}

/// Copy `len` bytes from `ptr`. Null reads as empty.
///
/// # Safety
/// Unless null, `ptr` must be valid for `len` bytes.
unsafe fn bytes_arg(ptr: *const u8, len: usize) -> Vec<u8> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec()
}

// ---------------------------------------------------------------------------
// Context lifecycle
// ---------------------------------------------------------------------------

/// Create a request context.
///
/// `host_path` is the logical `host[:port]/path?query` (port defaults to
/// 443); `addr` is the host or IP the connection is actually opened to.
/// Returns null if any argument is null or if an internal panic occurs.
/// The caller must free the returned pointer with `httpssni_ctx_free`.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_ctx_new(
    method: *const c_char,
    host_path: *const c_char,
    addr: *const c_char,
) -> *mut FfiHttpsCtx {
    catch_unwind(|| {
        if method.is_null() || host_path.is_null() || addr.is_null() {
            return std::ptr::null_mut();
        }
        let (method, host_path, addr) =
            unsafe { (str_arg(method), str_arg(host_path), str_arg(addr)) };
        let inner = RequestContext::new(method, host_path, addr);
        Box::into_raw(Box::new(FfiHttpsCtx { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a context created by `httpssni_ctx_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_ctx_free(ctx: *mut FfiHttpsCtx) {
    if !ctx.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(ctx) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Context setters (null context is a no-op)
// ---------------------------------------------------------------------------

/// Disable certificate and hostname verification for this context.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_ctx_set_skip_verify(ctx: *mut FfiHttpsCtx, skip: bool) {
    if ctx.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        unsafe { &mut *ctx }.inner.set_skip_verify(skip);
    }));
}

/// Set a request header, replacing any previous value for the name.
/// Ignored if `name` or `value` is null.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_ctx_set_header(
    ctx: *mut FfiHttpsCtx,
    name: *const c_char,
    value: *const c_char,
) {
    if ctx.is_null() || name.is_null() || value.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let ctx = unsafe { &mut *ctx };
        unsafe { ctx.inner.set_header(str_arg(name), str_arg(value)) };
    }));
}

/// Set the request body to a copy of `len` bytes at `body`.
/// Ignored if `body` is null.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_ctx_set_body(ctx: *mut FfiHttpsCtx, body: *const u8, len: usize) {
    if ctx.is_null() || body.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let bytes = unsafe { bytes_arg(body, len) };
        unsafe { &mut *ctx }.inner.set_body(bytes);
    }));
}

/// Bound the whole request, body reads included, to `seconds`.
/// Zero or negative disables the timeout.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_ctx_set_timeout(ctx: *mut FfiHttpsCtx, seconds: i64) {
    if ctx.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let seconds = u64::try_from(seconds).unwrap_or(0);
        unsafe { &mut *ctx }.inner.set_timeout(seconds);
    }));
}

/// Trust the DER certificate at `der` for this context. Once any root is
/// added, the default WebPKI roots are no longer used.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_ctx_add_root_certificate(
    ctx: *mut FfiHttpsCtx,
    der: *const u8,
    len: usize,
) {
    if ctx.is_null() || der.is_null() || len == 0 {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let der = unsafe { bytes_arg(der, len) };
        unsafe { &mut *ctx }.inner.add_root_certificate(der);
    }));
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Execute the request described by `ctx`. Blocks until headers arrive, the
/// request fails, or the timeout expires.
///
/// The returned envelope must be freed with `httpssni_free_request_result`.
/// On success the `response` it carries is owned by the caller and must be
/// released separately with `httpssni_response_free`.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_ctx_perform_request(ctx: *const FfiHttpsCtx) -> *mut FfiRequestResult {
    catch_unwind(AssertUnwindSafe(|| {
        if ctx.is_null() {
            return FfiRequestResult::null_arg("ctx");
        }
        let ctx = unsafe { &*ctx };
        match ctx.inner.execute() {
            Ok(response) => FfiRequestResult::ok(response),
            Err(e) => FfiRequestResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| {
        tracing::warn!("panic in httpssni_ctx_perform_request");
        FfiRequestResult::panic("panic in httpssni_ctx_perform_request")
    })
}

// ---------------------------------------------------------------------------
// Response accessors
// ---------------------------------------------------------------------------

/// HTTP status code, or -1 if `resp` is null.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_response_status(resp: *const FfiHttpResponse) -> i32 {
    if resp.is_null() {
        return -1;
    }
    i32::from(unsafe { &*resp }.inner.status())
}

/// Declared body length; -1 when unknown or if `resp` is null.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_response_content_length(resp: *const FfiHttpResponse) -> i64 {
    if resp.is_null() {
        return -1;
    }
    unsafe { &*resp }.inner.content_length()
}

/// Protocol version string such as `HTTP/1.1`. Null if `resp` is null.
/// Free with `httpssni_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_response_proto(resp: *const FfiHttpResponse) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if resp.is_null() {
            return std::ptr::null_mut();
        }
        c_string(unsafe { &*resp }.inner.protocol())
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Value of header `name`, or an empty string when absent. Null only if an
/// argument is null. Free with `httpssni_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_response_get_header(
    resp: *const FfiHttpResponse,
    name: *const c_char,
) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if resp.is_null() || name.is_null() {
            return std::ptr::null_mut();
        }
        let resp = unsafe { &*resp };
        c_string(resp.inner.get_header(unsafe { str_arg(name) }))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Call `visitor` for each response header in unspecified order, stopping
/// as soon as it returns false. The strings passed to `visitor` are only
/// valid for the duration of that call.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_response_for_each_header(
    resp: *const FfiHttpResponse,
    visitor: Option<FfiHeaderVisitor>,
    user_data: *mut c_void,
) {
    let Some(visitor) = visitor else {
        return;
    };
    if resp.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        unsafe { &*resp }.inner.for_each_header(|name, value| {
            let name = CString::new(name).unwrap_or_default();
            let value = CString::new(value.replace('\0', "")).unwrap_or_default();
            visitor(name.as_ptr(), value.as_ptr(), user_data)
        });
    }));
}

/// Read up to `max_size` body bytes. Free the result with
/// `httpssni_free_read_result`.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_response_read(
    resp: *mut FfiHttpResponse,
    max_size: usize,
) -> *mut FfiReadResult {
    catch_unwind(AssertUnwindSafe(|| {
        if resp.is_null() {
            return FfiReadResult::failed("null argument: resp");
        }
        FfiReadResult::from_core(unsafe { &mut *resp }.inner.read(max_size))
    }))
    .unwrap_or_else(|_| FfiReadResult::failed("panic in httpssni_response_read"))
}

/// Release the response's connection. Returns 0 on success, -1 on failure
/// (including a null `resp`). Closing twice is allowed.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_response_close(resp: *mut FfiHttpResponse) -> i32 {
    if resp.is_null() {
        return -1;
    }
    catch_unwind(AssertUnwindSafe(|| {
        if unsafe { &mut *resp }.inner.close() {
            0
        } else {
            -1
        }
    }))
    .unwrap_or(-1)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a response handle, closing its connection if still open.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_response_free(resp: *mut FfiHttpResponse) {
    if resp.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let mut resp = unsafe { Box::from_raw(resp) };
        resp.inner.close();
    }));
}

/// Free an envelope returned by `httpssni_ctx_perform_request`. Does not
/// free the response it points to. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_free_request_result(result: *mut FfiRequestResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
    }));
}

/// Free a result returned by `httpssni_response_read`. Safe to call with
/// null.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_free_read_result(result: *mut FfiReadResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.buf.is_null() {
            let slice = std::ptr::slice_from_raw_parts_mut(result.buf, result.len);
            drop(unsafe { Box::from_raw(slice) });
        }
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
    }));
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn httpssni_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::ffi::CString;

    use mock_server::{EchoReport, TlsIdentity};

    const LOGICAL_HOST: &str = "sni.test";

    fn take_string(s: *mut c_char) -> String {
        assert!(!s.is_null());
        let out = unsafe { CStr::from_ptr(s) }.to_str().unwrap().to_string();
        httpssni_free_string(s);
        out
    }

    /// Start the TLS mock server on a background runtime. Returns the port and
    /// the certificate the server presents.
    fn start_server() -> (u16, TlsIdentity) {
        let identity = TlsIdentity::self_signed(&[LOGICAL_HOST]).unwrap();
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = std_listener.local_addr().unwrap().port();
        std_listener.set_nonblocking(true).unwrap();

        let server_identity = identity.clone();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener, &server_identity).await
            })
            .unwrap();
        });
        (port, identity)
    }

    fn new_ctx(method: &str, host_path: &str, addr: &str) -> *mut FfiHttpsCtx {
        let method = CString::new(method).unwrap();
        let host_path = CString::new(host_path).unwrap();
        let addr = CString::new(addr).unwrap();
        httpssni_ctx_new(method.as_ptr(), host_path.as_ptr(), addr.as_ptr())
    }

    /// Context for `path` on the mock server, trusting its certificate.
    fn server_ctx(port: u16, identity: &TlsIdentity, method: &str, path: &str) -> *mut FfiHttpsCtx {
        let ctx = new_ctx(method, &format!("{LOGICAL_HOST}:{port}{path}"), "127.0.0.1");
        let der = identity.certificate_der();
        httpssni_ctx_add_root_certificate(ctx, der.as_ptr(), der.len());
        ctx
    }

    /// Run `ctx` and return the response, asserting success.
    fn perform(ctx: *mut FfiHttpsCtx) -> *mut FfiHttpResponse {
        let result = httpssni_ctx_perform_request(ctx);
        assert!(!result.is_null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(r.error_message.is_null());
        let response = r.response;
        assert!(!response.is_null());
        httpssni_free_request_result(result);
        response
    }

    /// Drain the body through `httpssni_response_read` in `chunk`-sized reads.
    fn read_all(resp: *mut FfiHttpResponse, chunk: usize) -> Vec<u8> {
        let mut body = Vec::new();
        loop {
            let result = httpssni_response_read(resp, chunk);
            let r = unsafe { &*result };
            assert!(r.len <= chunk);
            if r.len > 0 {
                body.extend_from_slice(unsafe { std::slice::from_raw_parts(r.buf, r.len) });
            }
            let done = !r.error_message.is_null();
            if done {
                assert!(r.eof);
            }
            httpssni_free_read_result(result);
            if done {
                return body;
            }
        }
    }

    extern "C" fn collect_headers(
        name: *const c_char,
        value: *const c_char,
        user_data: *mut c_void,
    ) -> bool {
        let seen = unsafe { &mut *(user_data as *mut HashMap<String, String>) };
        let name = unsafe { CStr::from_ptr(name) }.to_str().unwrap().to_string();
        let value = unsafe { CStr::from_ptr(value) }.to_str().unwrap().to_string();
        assert!(seen.insert(name, value).is_none(), "header visited twice");
        true
    }

    extern "C" fn stop_immediately(
        _name: *const c_char,
        _value: *const c_char,
        user_data: *mut c_void,
    ) -> bool {
        let visits = unsafe { &mut *(user_data as *mut u32) };
        *visits += 1;
        false
    }

    #[test]
    fn ctx_new_and_free() {
        let ctx = new_ctx("GET", "example.com/", "127.0.0.1");
        assert!(!ctx.is_null());
        httpssni_ctx_free(ctx);
    }

    #[test]
    fn ctx_new_null_returns_null() {
        let method = CString::new("GET").unwrap();
        let ctx = httpssni_ctx_new(method.as_ptr(), std::ptr::null(), method.as_ptr());
        assert!(ctx.is_null());
    }

    #[test]
    fn ctx_free_null_is_safe() {
        httpssni_ctx_free(std::ptr::null_mut());
    }

    #[test]
    fn setters_update_the_context() {
        let ctx = new_ctx("POST", "example.com/", "127.0.0.1");
        let name = CString::new("X-Token").unwrap();
        let value = CString::new("abc").unwrap();
        let body = b"payload";

        httpssni_ctx_set_skip_verify(ctx, true);
        httpssni_ctx_set_header(ctx, name.as_ptr(), value.as_ptr());
        httpssni_ctx_set_body(ctx, body.as_ptr(), body.len());
        httpssni_ctx_set_timeout(ctx, 12);

        let spec = unsafe { &*ctx }.inner.spec();
        assert!(spec.skip_verify());
        assert_eq!(spec.headers().get("x-token"), Some("abc"));
        assert_eq!(spec.body(), Some(&body[..]));
        assert_eq!(spec.timeout_secs(), 12);

        httpssni_ctx_set_timeout(ctx, -5);
        assert_eq!(unsafe { &*ctx }.inner.spec().timeout_secs(), 0);
        httpssni_ctx_free(ctx);
    }

    #[test]
    fn setters_ignore_null_arguments() {
        httpssni_ctx_set_skip_verify(std::ptr::null_mut(), true);
        httpssni_ctx_set_timeout(std::ptr::null_mut(), 1);

        let ctx = new_ctx("GET", "example.com/", "127.0.0.1");
        httpssni_ctx_set_header(ctx, std::ptr::null(), std::ptr::null());
        httpssni_ctx_set_body(ctx, std::ptr::null(), 10);
        httpssni_ctx_add_root_certificate(ctx, std::ptr::null(), 10);
        let spec = unsafe { &*ctx }.inner.spec();
        assert!(spec.headers().is_empty());
        assert!(spec.body().is_none());
        assert!(spec.root_certificates().is_empty());
        httpssni_ctx_free(ctx);
    }

    #[test]
    fn perform_null_ctx_returns_null_arg() {
        let result = httpssni_ctx_perform_request(std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        assert!(r.response.is_null());
        let msg = unsafe { CStr::from_ptr(r.error_message) }.to_str().unwrap();
        assert_eq!(msg, "null argument: ctx");
        httpssni_free_request_result(result);
    }

    #[test]
    fn perform_invalid_method_returns_invalid_request() {
        let ctx = new_ctx("BAD METHOD", "example.com/", "192.0.2.1");
        let result = httpssni_ctx_perform_request(ctx);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::InvalidRequest);
        assert!(r.response.is_null());
        assert!(!r.error_message.is_null());
        httpssni_free_request_result(result);
        httpssni_ctx_free(ctx);
    }

    #[test]
    fn response_functions_tolerate_null() {
        assert_eq!(httpssni_response_status(std::ptr::null()), -1);
        assert_eq!(httpssni_response_content_length(std::ptr::null()), -1);
        assert!(httpssni_response_proto(std::ptr::null()).is_null());
        assert!(httpssni_response_get_header(std::ptr::null(), std::ptr::null()).is_null());
        httpssni_response_for_each_header(std::ptr::null(), None, std::ptr::null_mut());
        assert_eq!(httpssni_response_close(std::ptr::null_mut()), -1);
        httpssni_response_free(std::ptr::null_mut());

        let result = httpssni_response_read(std::ptr::null_mut(), 16);
        let r = unsafe { &*result };
        assert_eq!(r.len, 0);
        assert!(!r.eof);
        assert!(!r.error_message.is_null());
        httpssni_free_read_result(result);
    }

    #[test]
    fn free_functions_accept_null() {
        httpssni_free_request_result(std::ptr::null_mut());
        httpssni_free_read_result(std::ptr::null_mut());
        httpssni_free_string(std::ptr::null_mut());
    }

    #[test]
    fn echo_round_trip_through_the_c_surface() {
        let (port, identity) = start_server();
        let ctx = server_ctx(port, &identity, "POST", "/echo");
        let name = CString::new("X-Custom").unwrap();
        let value = CString::new("abc").unwrap();
        httpssni_ctx_set_header(ctx, name.as_ptr(), value.as_ptr());
        httpssni_ctx_set_body(ctx, b"hello".as_ptr(), 5);

        let resp = perform(ctx);
        assert_eq!(httpssni_response_status(resp), 200);
        assert_eq!(take_string(httpssni_response_proto(resp)), "HTTP/1.1");

        let report: EchoReport = serde_json::from_slice(&read_all(resp, 64)).unwrap();
        assert_eq!(report.server_name.as_deref(), Some(LOGICAL_HOST));
        assert_eq!(report.host, Some(format!("{LOGICAL_HOST}:{port}")));
        assert_eq!(report.headers.get("x-custom").map(String::as_str), Some("abc"));
        assert_eq!(report.body, "hello");

        assert_eq!(httpssni_response_close(resp), 0);
        assert_eq!(httpssni_response_close(resp), 0);
        httpssni_response_free(resp);
        httpssni_ctx_free(ctx);
    }

    #[test]
    fn headers_through_the_c_surface() {
        let (port, identity) = start_server();
        let ctx = server_ctx(port, &identity, "GET", "/headers");
        let resp = perform(ctx);

        let content_type = CString::new("Content-Type").unwrap();
        let absent = CString::new("X-Absent").unwrap();
        assert_eq!(
            take_string(httpssni_response_get_header(resp, content_type.as_ptr())),
            "text/plain"
        );
        assert_eq!(take_string(httpssni_response_get_header(resp, absent.as_ptr())), "");

        let mut seen: HashMap<String, String> = HashMap::new();
        httpssni_response_for_each_header(
            resp,
            Some(collect_headers),
            &mut seen as *mut HashMap<String, String> as *mut c_void,
        );
        assert_eq!(seen.len(), unsafe { &*resp }.inner.headers().len());
        assert_eq!(seen.get("X-Multi").map(String::as_str), Some("first"));

        let mut visits: u32 = 0;
        httpssni_response_for_each_header(
            resp,
            Some(stop_immediately),
            &mut visits as *mut u32 as *mut c_void,
        );
        assert_eq!(visits, 1);

        httpssni_response_free(resp);
        httpssni_ctx_free(ctx);
    }

    #[test]
    fn body_reads_through_the_c_surface() {
        let (port, identity) = start_server();
        let ctx = server_ctx(port, &identity, "GET", "/bytes/5000");
        let resp = perform(ctx);
        assert_eq!(httpssni_response_content_length(resp), 5000);

        assert_eq!(read_all(resp, 333), mock_server::pattern(5000));

        let again = httpssni_response_read(resp, 333);
        let r = unsafe { &*again };
        assert_eq!(r.len, 0);
        assert!(r.eof);
        httpssni_free_read_result(again);

        assert_eq!(httpssni_response_close(resp), 0);
        let closed = httpssni_response_read(resp, 333);
        let r = unsafe { &*closed };
        assert_eq!(r.len, 0);
        assert!(!r.eof);
        let msg = unsafe { CStr::from_ptr(r.error_message) }.to_str().unwrap();
        assert_eq!(msg, "read on closed response body");
        httpssni_free_read_result(closed);

        httpssni_response_free(resp);
        httpssni_ctx_free(ctx);
    }

    #[test]
    fn untrusted_certificate_fails_unless_verification_skipped() {
        let (port, _identity) = start_server();
        let ctx = new_ctx("GET", &format!("{LOGICAL_HOST}:{port}/echo"), "127.0.0.1");

        let result = httpssni_ctx_perform_request(ctx);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Transport);
        assert!(r.response.is_null());
        let msg = unsafe { CStr::from_ptr(r.error_message) }.to_str().unwrap();
        assert!(!msg.is_empty());
        httpssni_free_request_result(result);

        httpssni_ctx_set_skip_verify(ctx, true);
        let resp = perform(ctx);
        assert_eq!(httpssni_response_status(resp), 200);
        httpssni_response_free(resp);
        httpssni_ctx_free(ctx);
    }
}
