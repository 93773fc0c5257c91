//! Load-lifetime plugin context and host callbacks.
//!
//! [`LoadedPlugin::load`] validates the host, allocates one [`Plugin`] and
//! hands its address to the host as the context of every event callback.
//! Channel callbacks get the address of the state field they feed instead,
//! so a channel update is a single store.
//!
//! The host never runs two callbacks at once; the handlers rely on that and
//! take no locks.

use std::ffi::{CString, c_void};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::ptr::{NonNull, addr_of_mut};

use ets2_tracker_core::{
    Attribute, AttributeValue, Channel, Clock, Error, Publisher, Result, TelemetryState,
    TrackerConfig,
};
use strum::IntoEnumIterator;
use tracing::{Dispatch, debug, info, warn};

use crate::host_log::host_dispatch;
use crate::sdk::*;

/// Per-load plugin state
pub struct Plugin<C: Clock> {
    state: TelemetryState,
    publisher: Publisher,
    clock: C,
    dispatch: Dispatch,
}

impl<C: Clock> Plugin<C> {
    fn new(config: &TrackerConfig, clock: C, dispatch: Dispatch) -> Self {
        Self {
            state: TelemetryState::new(),
            publisher: Publisher::new(config),
            clock,
            dispatch,
        }
    }

    pub fn state(&self) -> &TelemetryState {
        &self.state
    }

    fn frame_start(&mut self) {
        let now = self.clock.now();
        tracing::dispatcher::with_default(&self.dispatch, || {
            self.publisher.tick(&mut self.state, now);
        });
    }

    fn configuration<'a>(&mut self, attributes: impl IntoIterator<Item = Attribute<'a>>) {
        tracing::dispatcher::with_default(&self.dispatch, || {
            self.state.apply_configuration(attributes);
        });
    }

    fn gameplay<'a>(&mut self, event_id: &str, attributes: impl IntoIterator<Item = Attribute<'a>>) {
        let now = self.clock.now();
        tracing::dispatcher::with_default(&self.dispatch, || {
            self.state.apply_gameplay_event(event_id, attributes, now);
        });
    }
}

/// Owner of a registered [`Plugin`].
///
/// The plugin lives at a fixed heap address for as long as the host may call
/// back into it; dropping the handle frees it.
pub struct LoadedPlugin<C: Clock> {
    ptr: NonNull<Plugin<C>>,
}

impl<C: Clock> LoadedPlugin<C> {
    /// Validate the host and register all callbacks.
    ///
    /// # Safety
    ///
    /// `params` must be null or point to valid init parameters for the
    /// duration of the call. The returned handle must outlive every callback
    /// the host makes with the registered contexts.
    pub unsafe fn load(
        version: scs_u32_t,
        params: *const scs_telemetry_init_params_v100_t,
        config: TrackerConfig,
        clock: C,
    ) -> Result<Self> {
        // SAFETY: null or valid per the caller's contract
        let params = unsafe { params.as_ref() };

        if version < MIN_TELEMETRY_VERSION {
            if let Some(params) = params {
                let dispatch = host_dispatch(params.common.log);
                tracing::dispatcher::with_default(&dispatch, || {
                    warn!(
                        "Telemetry API {}.{:02} is too old",
                        version >> 16,
                        version & 0xffff
                    );
                });
            }
            return Err(Error::UnsupportedVersion {
                found: version,
                minimum: MIN_TELEMETRY_VERSION,
            });
        }

        let Some(params) = params else {
            return Err(Error::InvalidParameter("init params"));
        };

        let dispatch = host_dispatch(params.common.log);
        let _guard = tracing::dispatcher::set_default(&dispatch);

        let (Some(register_for_event), Some(register_for_channel)) =
            (params.register_for_event, params.register_for_channel)
        else {
            return Err(Error::InvalidParameter("registration functions"));
        };

        // SAFETY: the game strings are valid during init
        if let Some(game) = unsafe { c_str(params.common.game_name) } {
            info!(
                "Loading in {} (telemetry {}.{:02})",
                game.to_string_lossy(),
                version >> 16,
                version & 0xffff
            );
        }

        let plugin = Box::new(Plugin::new(&config, clock, dispatch.clone()));
        // SAFETY: Box::into_raw never returns null
        let ptr = unsafe { NonNull::new_unchecked(Box::into_raw(plugin)) };
        let loaded = Self { ptr };

        // SAFETY: `ptr` is live and the registration functions come from the host
        unsafe { loaded.register(register_for_event, register_for_channel) };

        if let Err(e) = loaded.publisher().ensure_output_dir() {
            debug!("Could not create output directory: {}", e);
        }
        info!("Publishing to {}", loaded.publisher().path().display());

        Ok(loaded)
    }

    unsafe fn register(
        &self,
        register_for_event: unsafe extern "system" fn(
            scs_event_t,
            scs_telemetry_event_callback_t,
            scs_context_t,
        ) -> scs_result_t,
        register_for_channel: unsafe extern "system" fn(
            scs_string_t,
            scs_u32_t,
            scs_value_type_t,
            scs_u32_t,
            scs_telemetry_channel_callback_t,
            scs_context_t,
        ) -> scs_result_t,
    ) {
        let raw = self.ptr.as_ptr();
        let context = raw.cast::<c_void>();

        let events: [(scs_event_t, &str, scs_telemetry_event_callback_t); 3] = [
            (
                SCS_TELEMETRY_EVENT_FRAME_START,
                "frame start",
                Some(on_frame_start::<C>),
            ),
            (
                SCS_TELEMETRY_EVENT_CONFIGURATION,
                "configuration",
                Some(on_configuration::<C>),
            ),
            (
                SCS_TELEMETRY_EVENT_GAMEPLAY,
                "gameplay",
                Some(on_gameplay::<C>),
            ),
        ];

        for (event, what, callback) in events {
            // SAFETY: host-provided function, context outlives the registration
            let code = unsafe { register_for_event(event, callback, context) };
            if code != SCS_RESULT_OK {
                warn!(
                    "{}",
                    Error::Registration {
                        what: format!("{} event", what),
                        code
                    }
                );
            }
        }

        for channel in Channel::iter() {
            // SAFETY: fields of a live plugin; no reference to it is held here
            let slot: *mut f32 = unsafe {
                match channel {
                    Channel::Odometer => addr_of_mut!((*raw).state.odometer),
                    Channel::Speed => addr_of_mut!((*raw).state.speed),
                    Channel::NavigationDistance => addr_of_mut!((*raw).state.trip_distance),
                }
            };
            let Ok(name) = CString::new(channel.name()) else {
                continue;
            };

            // SAFETY: host-provided function; `name` lives through the call
            let code = unsafe {
                register_for_channel(
                    name.as_ptr(),
                    SCS_U32_NIL,
                    SCS_VALUE_TYPE_FLOAT,
                    SCS_TELEMETRY_CHANNEL_FLAG_NONE,
                    Some(store_float),
                    slot.cast::<c_void>(),
                )
            };
            if code != SCS_RESULT_OK {
                warn!(
                    "{}",
                    Error::Registration {
                        what: format!("channel {}", channel.name()),
                        code
                    }
                );
            }
        }
    }

    fn publisher(&self) -> &Publisher {
        // SAFETY: live until drop; shared access only
        unsafe { &self.ptr.as_ref().publisher }
    }

    /// Current state, for inspection between callbacks
    pub fn state(&self) -> &TelemetryState {
        // SAFETY: live until drop; callbacks are not running while `&self` is used
        unsafe { self.ptr.as_ref().state() }
    }

    pub fn into_raw(self) -> *mut Plugin<C> {
        let ptr = self.ptr.as_ptr();
        std::mem::forget(self);
        ptr
    }

    /// # Safety
    ///
    /// `ptr` must come from [`into_raw`](Self::into_raw) and not have been
    /// reclaimed already.
    pub unsafe fn from_raw(ptr: *mut Plugin<C>) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }
}

impl<C: Clock> Drop for LoadedPlugin<C> {
    fn drop(&mut self) {
        // SAFETY: allocated with Box::into_raw in `load`, reclaimed exactly once
        let plugin = unsafe { Box::from_raw(self.ptr.as_ptr()) };
        tracing::dispatcher::with_default(&plugin.dispatch, || info!("Unloading"));
    }
}

/// Result code reported to the host for a failed load
pub fn result_code(err: &Error) -> scs_result_t {
    match err {
        Error::UnsupportedVersion { .. } => SCS_RESULT_UNSUPPORTED,
        Error::InvalidParameter(_) => SCS_RESULT_INVALID_PARAMETER,
        _ => SCS_RESULT_GENERIC_ERROR,
    }
}

/// Run a handler body without letting a panic unwind into the host
fn guarded(f: impl FnOnce()) {
    let _ = catch_unwind(AssertUnwindSafe(f));
}

/// Decode one host attribute; entries without a readable name are skipped
///
/// # Safety
///
/// `entry` must be a valid attribute whose strings live for `'a`.
unsafe fn attribute<'a>(entry: &'a scs_named_value_t) -> Option<Attribute<'a>> {
    // SAFETY: see function contract
    let name = unsafe { c_str(entry.name) }?.to_str().ok()?;
    let value = &entry.value;

    // SAFETY: the union member read matches `type_`
    let decoded = unsafe {
        match value.type_ {
            SCS_VALUE_TYPE_BOOL => AttributeValue::Bool(value.value.value_bool != 0),
            SCS_VALUE_TYPE_S32 => AttributeValue::Int(i64::from(value.value.value_s32)),
            SCS_VALUE_TYPE_U32 => AttributeValue::UInt(u64::from(value.value.value_u32)),
            SCS_VALUE_TYPE_U64 => AttributeValue::UInt(value.value.value_u64),
            SCS_VALUE_TYPE_S64 => AttributeValue::Int(value.value.value_s64),
            SCS_VALUE_TYPE_FLOAT => AttributeValue::Float(f64::from(value.value.value_float)),
            SCS_VALUE_TYPE_DOUBLE => AttributeValue::Float(value.value.value_double),
            SCS_VALUE_TYPE_STRING => match c_str(value.value.value_string) {
                Some(s) => AttributeValue::String(s.to_string_lossy()),
                None => AttributeValue::Unsupported,
            },
            _ => AttributeValue::Unsupported,
        }
    };

    Some(Attribute::new(name, decoded))
}

/// Channel callback: store a float into the bound field
unsafe extern "system" fn store_float(
    _name: scs_string_t,
    _index: scs_u32_t,
    value: *const scs_value_t,
    context: scs_context_t,
) {
    // SAFETY: host passes a valid value or null
    let Some(value) = (unsafe { value.as_ref() }) else {
        return;
    };
    let slot = context.cast::<f32>();
    if slot.is_null() || value.type_ != SCS_VALUE_TYPE_FLOAT {
        return;
    }
    // SAFETY: `slot` is a field of the live plugin registered in `load`
    unsafe { *slot = value.value.value_float };
}

unsafe extern "system" fn on_frame_start<C: Clock>(
    _event: scs_event_t,
    _event_info: *const c_void,
    context: scs_context_t,
) {
    // SAFETY: context is the plugin registered in `load`
    let Some(plugin) = (unsafe { context.cast::<Plugin<C>>().as_mut() }) else {
        return;
    };
    guarded(|| plugin.frame_start());
}

unsafe extern "system" fn on_configuration<C: Clock>(
    _event: scs_event_t,
    event_info: *const c_void,
    context: scs_context_t,
) {
    // SAFETY: context is the plugin registered in `load`
    let Some(plugin) = (unsafe { context.cast::<Plugin<C>>().as_mut() }) else {
        return;
    };
    // SAFETY: configuration events carry scs_telemetry_configuration_t
    let Some(info) = (unsafe { event_info.cast::<scs_telemetry_configuration_t>().as_ref() })
    else {
        return;
    };

    guarded(|| {
        // SAFETY: the attribute array is terminated and lives through the callback
        let attributes =
            unsafe { NamedValues::new(info.attributes) }.filter_map(|e| unsafe { attribute(e) });
        plugin.configuration(attributes);
    });
}

unsafe extern "system" fn on_gameplay<C: Clock>(
    _event: scs_event_t,
    event_info: *const c_void,
    context: scs_context_t,
) {
    // SAFETY: context is the plugin registered in `load`
    let Some(plugin) = (unsafe { context.cast::<Plugin<C>>().as_mut() }) else {
        return;
    };
    // SAFETY: gameplay events carry scs_telemetry_gameplay_event_t
    let Some(info) = (unsafe { event_info.cast::<scs_telemetry_gameplay_event_t>().as_ref() })
    else {
        return;
    };

    guarded(|| {
        // SAFETY: id and attributes live through the callback
        let Some(id) = (unsafe { c_str(info.id) }) else {
            return;
        };
        let id = id.to_string_lossy();
        let attributes =
            unsafe { NamedValues::new(info.attributes) }.filter_map(|e| unsafe { attribute(e) });
        plugin.gameplay(&id, attributes);
    });
}
