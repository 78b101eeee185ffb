//! Runtime selection for delivery tasks.

use beacon_core::DispatchError;
use std::sync::OnceLock;
use tokio::runtime::{Builder, Handle, Runtime};

static DEFAULT: OnceLock<Runtime> = OnceLock::new();

/// Pick the runtime deliveries are spawned on.
///
/// An explicit handle wins, then the runtime the caller is running in.
/// Outside any runtime a process-wide multi-thread runtime is started on
/// first use and shared by every dispatcher built that way.
pub(crate) fn resolve(configured: Option<Handle>) -> Result<Handle, DispatchError> {
    if let Some(handle) = configured {
        return Ok(handle);
    }
    if let Ok(handle) = Handle::try_current() {
        return Ok(handle);
    }
    default_runtime()
}

fn default_runtime() -> Result<Handle, DispatchError> {
    if let Some(runtime) = DEFAULT.get() {
        return Ok(runtime.handle().clone());
    }
    let runtime = Builder::new_multi_thread()
        .thread_name("beacon-delivery")
        .enable_time()
        .build()
        .map_err(DispatchError::Runtime)?;
    // A racing caller may have won; its runtime is kept and ours dropped.
    // Dropping is fine here since no runtime is current on this thread.
    if DEFAULT.set(runtime).is_ok() {
        tracing::debug!("started default delivery runtime");
    }
    DEFAULT
        .get()
        .map(|runtime| runtime.handle().clone())
        .ok_or_else(|| DispatchError::Runtime(std::io::Error::other("default runtime unavailable")))
}
