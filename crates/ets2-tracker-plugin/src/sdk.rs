//! SCS telemetry SDK ABI.
//!
//! Only the subset the tracker uses is declared. Layouts follow the SDK
//! headers (`scssdk.h`, `scssdk_value.h`, `scssdk_telemetry*.h`); all
//! callbacks use the platform's system calling convention (`SCSAPI`).

#![allow(non_camel_case_types)]

use std::ffi::{CStr, c_char, c_void};

pub type scs_u8_t = u8;
pub type scs_u32_t = u32;
pub type scs_s32_t = i32;
pub type scs_u64_t = u64;
pub type scs_s64_t = i64;
pub type scs_float_t = f32;
pub type scs_double_t = f64;
pub type scs_string_t = *const c_char;
pub type scs_context_t = *mut c_void;
pub type scs_timestamp_t = u64;

pub type scs_result_t = scs_s32_t;
pub type scs_value_type_t = scs_u32_t;
pub type scs_event_t = scs_u32_t;
pub type scs_log_type_t = scs_s32_t;

/// Packs a major/minor pair the way `SCS_MAKE_VERSION` does
pub const fn make_version(major: u32, minor: u32) -> u32 {
    (major << 16) | minor
}

pub const SCS_TELEMETRY_VERSION_1_00: scs_u32_t = make_version(1, 0);
pub const SCS_TELEMETRY_VERSION_1_01: scs_u32_t = make_version(1, 1);

/// Oldest telemetry API the plugin accepts
pub const MIN_TELEMETRY_VERSION: scs_u32_t = SCS_TELEMETRY_VERSION_1_00;

/// Array index for non-indexed channels
pub const SCS_U32_NIL: scs_u32_t = u32::MAX;

pub const SCS_RESULT_OK: scs_result_t = 0;
pub const SCS_RESULT_UNSUPPORTED: scs_result_t = -1;
pub const SCS_RESULT_INVALID_PARAMETER: scs_result_t = -2;
pub const SCS_RESULT_ALREADY_REGISTERED: scs_result_t = -3;
pub const SCS_RESULT_NOT_FOUND: scs_result_t = -4;
pub const SCS_RESULT_UNSUPPORTED_TYPE: scs_result_t = -5;
pub const SCS_RESULT_NOT_NOW: scs_result_t = -6;
pub const SCS_RESULT_GENERIC_ERROR: scs_result_t = -7;

pub const SCS_VALUE_TYPE_INVALID: scs_value_type_t = 0;
pub const SCS_VALUE_TYPE_BOOL: scs_value_type_t = 1;
pub const SCS_VALUE_TYPE_S32: scs_value_type_t = 2;
pub const SCS_VALUE_TYPE_U32: scs_value_type_t = 3;
pub const SCS_VALUE_TYPE_U64: scs_value_type_t = 4;
pub const SCS_VALUE_TYPE_FLOAT: scs_value_type_t = 5;
pub const SCS_VALUE_TYPE_DOUBLE: scs_value_type_t = 6;
pub const SCS_VALUE_TYPE_FVECTOR: scs_value_type_t = 7;
pub const SCS_VALUE_TYPE_DVECTOR: scs_value_type_t = 8;
pub const SCS_VALUE_TYPE_EULER: scs_value_type_t = 9;
pub const SCS_VALUE_TYPE_FPLACEMENT: scs_value_type_t = 10;
pub const SCS_VALUE_TYPE_DPLACEMENT: scs_value_type_t = 11;
pub const SCS_VALUE_TYPE_STRING: scs_value_type_t = 12;
pub const SCS_VALUE_TYPE_S64: scs_value_type_t = 13;

pub const SCS_LOG_TYPE_MESSAGE: scs_log_type_t = 0;
pub const SCS_LOG_TYPE_WARNING: scs_log_type_t = 1;
pub const SCS_LOG_TYPE_ERROR: scs_log_type_t = 2;

pub const SCS_TELEMETRY_EVENT_INVALID: scs_event_t = 0;
pub const SCS_TELEMETRY_EVENT_FRAME_START: scs_event_t = 1;
pub const SCS_TELEMETRY_EVENT_FRAME_END: scs_event_t = 2;
pub const SCS_TELEMETRY_EVENT_PAUSED: scs_event_t = 3;
pub const SCS_TELEMETRY_EVENT_STARTED: scs_event_t = 4;
pub const SCS_TELEMETRY_EVENT_CONFIGURATION: scs_event_t = 5;
pub const SCS_TELEMETRY_EVENT_GAMEPLAY: scs_event_t = 6;

pub const SCS_TELEMETRY_CHANNEL_FLAG_NONE: scs_u32_t = 0;

#[repr(C)]
#[derive(Clone, Copy)]
pub struct scs_value_fvector_t {
    pub x: scs_float_t,
    pub y: scs_float_t,
    pub z: scs_float_t,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct scs_value_dvector_t {
    pub x: scs_double_t,
    pub y: scs_double_t,
    pub z: scs_double_t,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct scs_value_euler_t {
    pub heading: scs_float_t,
    pub pitch: scs_float_t,
    pub roll: scs_float_t,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct scs_value_fplacement_t {
    pub position: scs_value_fvector_t,
    pub orientation: scs_value_euler_t,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct scs_value_dplacement_t {
    pub position: scs_value_dvector_t,
    pub orientation: scs_value_euler_t,
    pub _padding: scs_u32_t,
}

/// Payload of [`scs_value_t`], discriminated by its `type_` field
#[repr(C)]
#[derive(Clone, Copy)]
pub union scs_value_payload_t {
    pub value_bool: scs_u8_t,
    pub value_s32: scs_s32_t,
    pub value_u32: scs_u32_t,
    pub value_u64: scs_u64_t,
    pub value_s64: scs_s64_t,
    pub value_float: scs_float_t,
    pub value_double: scs_double_t,
    pub value_fvector: scs_value_fvector_t,
    pub value_dvector: scs_value_dvector_t,
    pub value_euler: scs_value_euler_t,
    pub value_fplacement: scs_value_fplacement_t,
    pub value_dplacement: scs_value_dplacement_t,
    pub value_string: scs_string_t,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct scs_value_t {
    pub type_: scs_value_type_t,
    pub _padding: scs_u32_t,
    pub value: scs_value_payload_t,
}

/// Attribute entry; arrays of these end with a null `name`
#[repr(C)]
#[derive(Clone, Copy)]
pub struct scs_named_value_t {
    pub name: scs_string_t,
    pub index: scs_u32_t,
    #[cfg(target_pointer_width = "64")]
    pub _padding: scs_u32_t,
    pub value: scs_value_t,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct scs_telemetry_frame_start_t {
    pub flags: scs_u32_t,
    pub _padding: scs_u32_t,
    pub render_time: scs_timestamp_t,
    pub simulation_time: scs_timestamp_t,
    pub paused_simulation_time: scs_timestamp_t,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct scs_telemetry_configuration_t {
    pub id: scs_string_t,
    pub attributes: *const scs_named_value_t,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct scs_telemetry_gameplay_event_t {
    pub id: scs_string_t,
    pub attributes: *const scs_named_value_t,
}

pub type scs_log_t = Option<unsafe extern "system" fn(scs_log_type_t, scs_string_t)>;

pub type scs_telemetry_event_callback_t =
    Option<unsafe extern "system" fn(scs_event_t, *const c_void, scs_context_t)>;

pub type scs_telemetry_channel_callback_t = Option<
    unsafe extern "system" fn(scs_string_t, scs_u32_t, *const scs_value_t, scs_context_t),
>;

pub type scs_telemetry_register_for_event_t = Option<
    unsafe extern "system" fn(
        scs_event_t,
        scs_telemetry_event_callback_t,
        scs_context_t,
    ) -> scs_result_t,
>;

pub type scs_telemetry_unregister_from_event_t =
    Option<unsafe extern "system" fn(scs_event_t) -> scs_result_t>;

pub type scs_telemetry_register_for_channel_t = Option<
    unsafe extern "system" fn(
        scs_string_t,
        scs_u32_t,
        scs_value_type_t,
        scs_u32_t,
        scs_telemetry_channel_callback_t,
        scs_context_t,
    ) -> scs_result_t,
>;

pub type scs_telemetry_unregister_from_channel_t =
    Option<unsafe extern "system" fn(scs_string_t, scs_u32_t, scs_value_type_t) -> scs_result_t>;

#[repr(C)]
#[derive(Clone, Copy)]
pub struct scs_sdk_init_params_v100_t {
    pub game_name: scs_string_t,
    pub game_id: scs_string_t,
    pub game_version: scs_u32_t,
    #[cfg(target_pointer_width = "64")]
    pub _padding: scs_u32_t,
    pub log: scs_log_t,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct scs_telemetry_init_params_v100_t {
    pub common: scs_sdk_init_params_v100_t,
    pub register_for_event: scs_telemetry_register_for_event_t,
    pub unregister_from_event: scs_telemetry_unregister_from_event_t,
    pub register_for_channel: scs_telemetry_register_for_channel_t,
    pub unregister_from_channel: scs_telemetry_unregister_from_channel_t,
}

/// Borrow a host string. Null pointers read as `None`.
///
/// # Safety
///
/// A non-null `s` must point to a NUL-terminated string that stays valid for `'a`.
pub unsafe fn c_str<'a>(s: scs_string_t) -> Option<&'a CStr> {
    if s.is_null() {
        None
    } else {
        // SAFETY: non-null and NUL-terminated per the caller's contract
        Some(unsafe { CStr::from_ptr(s) })
    }
}

/// Iterator over a null-name-terminated attribute array
pub struct NamedValues<'a> {
    current: *const scs_named_value_t,
    _marker: std::marker::PhantomData<&'a scs_named_value_t>,
}

impl<'a> NamedValues<'a> {
    /// # Safety
    ///
    /// `attributes` must be null or point to an array terminated by an entry
    /// with a null `name`, valid for `'a`.
    pub unsafe fn new(attributes: *const scs_named_value_t) -> Self {
        Self {
            current: attributes,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<'a> Iterator for NamedValues<'a> {
    type Item = &'a scs_named_value_t;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_null() {
            return None;
        }
        // SAFETY: the array is terminated and valid for 'a (see `new`)
        let entry = unsafe { &*self.current };
        if entry.name.is_null() {
            self.current = std::ptr::null();
            return None;
        }
        // SAFETY: the terminator has not been reached yet
        self.current = unsafe { self.current.add(1) };
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_versions() {
        assert_eq!(SCS_TELEMETRY_VERSION_1_00, 0x0001_0000);
        assert_eq!(SCS_TELEMETRY_VERSION_1_01, 0x0001_0001);
    }

    #[test]
    fn test_value_layout() {
        // dplacement is the largest member: 24 + 12 + 4 bytes
        assert_eq!(size_of::<scs_value_payload_t>(), 40);
        assert_eq!(size_of::<scs_value_t>(), 48);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_named_value_layout_x64() {
        assert_eq!(size_of::<scs_named_value_t>(), 64);
        assert_eq!(size_of::<scs_sdk_init_params_v100_t>(), 32);
        assert_eq!(size_of::<scs_telemetry_init_params_v100_t>(), 64);
    }

    #[test]
    fn test_named_values_stops_at_terminator() {
        let terminator = scs_named_value_t {
            name: std::ptr::null(),
            index: SCS_U32_NIL,
            #[cfg(target_pointer_width = "64")]
            _padding: 0,
            value: scs_value_t {
                type_: SCS_VALUE_TYPE_INVALID,
                _padding: 0,
                value: scs_value_payload_t { value_u64: 0 },
            },
        };
        let mut first = terminator;
        first.name = c"cargo".as_ptr();

        let entries = [first, terminator];
        let names: Vec<_> = unsafe { NamedValues::new(entries.as_ptr()) }
            .map(|e| unsafe { c_str(e.name) }.unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["cargo"]);
    }

    #[test]
    fn test_named_values_null_array() {
        assert_eq!(unsafe { NamedValues::new(std::ptr::null()) }.count(), 0);
    }
}
