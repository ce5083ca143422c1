//! FFI bindings for the library.
//!
//! Every call blocks the calling thread until the operation completes, so
//! hosts should call them off their UI thread. Strings returned through
//! `out` parameters are owned by the caller and must be released with
//! `cm_string_free`.

use std::ffi::{CStr, CString, c_char, c_void};
use std::sync::LazyLock;

use codemate_ollama_model::{OllamaConfigBuilder, OllamaProvider};
use tokio::runtime::{Builder as RuntimeBuilder, Runtime};

use crate::{Session, SessionBuilder, SessionError};

static TOKIO_RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
    RuntimeBuilder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .build()
        .unwrap()
});

/// Error codes returned by the C APIs.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// No error occurred.
    Ok = 0,
    /// Invalid parameters or strings.
    Invalid = 1,
    /// Another operation is still in flight.
    Busy = 2,
    /// There was nothing to do, e.g. a blank message or undo on an empty
    /// conversation.
    Empty = 3,
}

impl From<SessionError> for ErrorCode {
    #[inline]
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Busy => ErrorCode::Busy,
        }
    }
}

/// Reads an optional string argument. Null means "use the default".
///
/// # Safety
///
/// `ptr` must be null or point to a nul-terminated string.
unsafe fn optional_str<'a>(ptr: *const c_char) -> Result<Option<&'a str>, ()> {
    if ptr.is_null() {
        return Ok(None);
    }
    // SAFETY: Assume the caller has provided the valid pointer.
    unsafe { CStr::from_ptr(ptr) }.to_str().map(Some).map_err(|_| ())
}

/// Hands `s` over to the caller through `out`.
///
/// # Safety
///
/// `out` must be a valid pointer that points to a pointer.
unsafe fn write_string(out: *mut *mut c_char, s: String) -> ErrorCode {
    let Ok(s) = CString::new(s) else {
        return ErrorCode::Invalid;
    };
    // SAFETY: Assume `out` is valid and properly aligned.
    unsafe { out.write(s.into_raw()) };
    ErrorCode::Ok
}

/// Borrows the session behind `session`.
///
/// # Safety
///
/// `session` must be null or a pointer returned from `cm_session_new` that
/// hasn't been freed.
unsafe fn session_ref<'a>(session: *mut c_void) -> Option<&'a Session> {
    // SAFETY: Assume the caller has provided the valid pointer.
    unsafe { (session as *const Session).as_ref() }
}

/// Creates a session talking to an Ollama server.
///
/// `base_url` and `model` may be null to use the defaults. Returns null if
/// either string isn't valid UTF-8.
///
/// The caller must free the session with `cm_session_free`, or the
/// resources will be leaked.
///
/// # Safety
///
/// Non-null strings passed to this function must contain a valid nul
/// terminator at the end of the string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cm_session_new(
    base_url: *const c_char,
    model: *const c_char,
) -> *mut c_void {
    // SAFETY: Assume the caller has provided the valid pointers.
    let (Ok(base_url), Ok(model)) =
        (unsafe { (optional_str(base_url), optional_str(model)) })
    else {
        return std::ptr::null_mut();
    };

    let mut config = OllamaConfigBuilder::new();
    if let Some(base_url) = base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(model) = model {
        config = config.with_model(model);
    }
    let model_provider = OllamaProvider::new(config.build());
    let session = SessionBuilder::with_model_provider(model_provider).build();
    Box::into_raw(Box::new(session)) as _
}

/// Frees a session created by `cm_session_new`.
///
/// # Safety
///
/// `session` must be null or a valid pointer returned from
/// `cm_session_new`, and no other call may be using it.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cm_session_free(session: *mut c_void) {
    if session.is_null() {
        return;
    }
    // SAFETY: Assume the caller has provided the valid pointer.
    drop(unsafe { Box::from_raw(session as *mut Session) });
}

/// Sends a message and waits until the turn completes.
///
/// A failed request still returns `Ok`, the failure is recorded in the
/// transcript. Returns `Empty` for a blank message.
///
/// # Safety
///
/// `session` must be a valid pointer returned from `cm_session_new`.
/// String pointed by `text` must contain a valid nul terminator at the end
/// of the string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cm_session_submit(
    session: *mut c_void,
    text: *const c_char,
) -> ErrorCode {
    // SAFETY: Assume the caller has provided the valid pointers.
    let (Some(session), Ok(Some(text))) =
        (unsafe { (session_ref(session), optional_str(text)) })
    else {
        return ErrorCode::Invalid;
    };

    match TOKIO_RUNTIME.block_on(session.submit(text)) {
        Ok(Some(_)) => ErrorCode::Ok,
        Ok(None) => ErrorCode::Empty,
        Err(err) => err.into(),
    }
}

/// Sends the last message again, replacing its outcome.
///
/// Returns `Empty` if the conversation is empty.
///
/// # Safety
///
/// `session` must be a valid pointer returned from `cm_session_new`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cm_session_retry(session: *mut c_void) -> ErrorCode {
    // SAFETY: Assume the caller has provided the valid pointer.
    let Some(session) = (unsafe { session_ref(session) }) else {
        return ErrorCode::Invalid;
    };

    match TOKIO_RUNTIME.block_on(session.retry()) {
        Ok(Some(_)) => ErrorCode::Ok,
        Ok(None) => ErrorCode::Empty,
        Err(err) => err.into(),
    }
}

/// Removes the last turn.
///
/// On `Ok`, `out` is set to the removed message so the host can put it back
/// into its input box. Returns `Empty` if the conversation is empty.
///
/// # Safety
///
/// `session` must be a valid pointer returned from `cm_session_new`. `out`
/// must be a valid pointer that points to a pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cm_session_undo(
    session: *mut c_void,
    out: *mut *mut c_char,
) -> ErrorCode {
    // SAFETY: Assume the caller has provided the valid pointer.
    let Some(session) = (unsafe { session_ref(session) }) else {
        return ErrorCode::Invalid;
    };
    if out.is_null() {
        return ErrorCode::Invalid;
    }

    match session.undo() {
        // SAFETY: `out` is checked above.
        Ok(Some(text)) => unsafe { write_string(out, text) },
        Ok(None) => ErrorCode::Empty,
        Err(err) => err.into(),
    }
}

/// Forgets the whole conversation.
///
/// # Safety
///
/// `session` must be a valid pointer returned from `cm_session_new`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cm_session_clear(session: *mut c_void) -> ErrorCode {
    // SAFETY: Assume the caller has provided the valid pointer.
    let Some(session) = (unsafe { session_ref(session) }) else {
        return ErrorCode::Invalid;
    };

    match session.clear() {
        Ok(()) => ErrorCode::Ok,
        Err(err) => err.into(),
    }
}

/// Exports the transcript as a JSON array of turns.
///
/// Each turn looks like
/// `{"user_text": "...", "outcome": {"type": "reply", "text": "..."}}`, or
/// with `{"type": "failed", "kind": "server", "message": "..."}` as the
/// outcome.
///
/// # Safety
///
/// `session` must be a valid pointer returned from `cm_session_new`. `out`
/// must be a valid pointer that points to a pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cm_session_transcript_json(
    session: *mut c_void,
    out: *mut *mut c_char,
) -> ErrorCode {
    // SAFETY: Assume the caller has provided the valid pointer.
    let Some(session) = (unsafe { session_ref(session) }) else {
        return ErrorCode::Invalid;
    };
    if out.is_null() {
        return ErrorCode::Invalid;
    }

    let turns = match session.turns() {
        Ok(turns) => turns,
        Err(err) => return err.into(),
    };
    let Ok(json) = serde_json::to_string(&turns) else {
        return ErrorCode::Invalid;
    };
    // SAFETY: `out` is checked above.
    unsafe { write_string(out, json) }
}

/// Frees a string returned by the other functions.
///
/// # Safety
///
/// `s` must be null or a string returned through an `out` parameter of this
/// library, and must not be freed twice.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cm_string_free(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    // SAFETY: Assume the caller has provided the valid pointer.
    drop(unsafe { CString::from_raw(s) });
}
