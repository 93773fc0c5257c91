//! # ets2-tracker-plugin
//!
//! Telemetry plugin for Euro Truck Simulator 2. Build as a `cdylib` and drop
//! the library into the game's `bin/<platform>/plugins` directory.
//!
//! The game calls [`scs_telemetry_init`] once after loading the library and
//! [`scs_telemetry_shutdown`] before unloading it. Everything in between
//! happens in callbacks registered at init; see [`plugin`].

pub mod host_log;
pub mod plugin;
pub mod sdk;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use ets2_tracker_core::{SystemClock, TrackerConfig};

use crate::plugin::{LoadedPlugin, Plugin, result_code};
use crate::sdk::*;

/// The loaded plugin between init and shutdown
static PLUGIN: AtomicPtr<Plugin<SystemClock>> = AtomicPtr::new(ptr::null_mut());

/// Telemetry API entry point.
///
/// # Safety
///
/// Called by the game with a valid (or null) parameter block.
#[unsafe(no_mangle)]
pub unsafe extern "system" fn scs_telemetry_init(
    version: scs_u32_t,
    params: *const scs_telemetry_init_params_v100_t,
) -> scs_result_t {
    // SAFETY: forwarded from the host
    unsafe { init_with(version, params, TrackerConfig::from_env()) }
}

unsafe fn init_with(
    version: scs_u32_t,
    params: *const scs_telemetry_init_params_v100_t,
    config: TrackerConfig,
) -> scs_result_t {
    if !PLUGIN.load(Ordering::Acquire).is_null() {
        return SCS_RESULT_ALREADY_REGISTERED;
    }

    let loaded = catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: the host's parameter block, checked for null inside
        unsafe { LoadedPlugin::load(version, params, config, SystemClock) }
    }));

    match loaded {
        Ok(Ok(plugin)) => {
            PLUGIN.store(plugin.into_raw(), Ordering::Release);
            SCS_RESULT_OK
        }
        Ok(Err(e)) => result_code(&e),
        Err(_) => SCS_RESULT_GENERIC_ERROR,
    }
}

/// Telemetry API exit point. Frees the plugin; a no-op without a prior init.
///
/// # Safety
///
/// Called by the game after it stopped delivering callbacks.
#[unsafe(no_mangle)]
pub unsafe extern "system" fn scs_telemetry_shutdown() -> scs_result_t {
    let raw = PLUGIN.swap(ptr::null_mut(), Ordering::AcqRel);
    // SAFETY: stored by `scs_telemetry_init` and swapped out exactly once
    if let Some(plugin) = unsafe { LoadedPlugin::from_raw(raw) } {
        let _ = catch_unwind(AssertUnwindSafe(move || drop(plugin)));
    }
    SCS_RESULT_OK
}
