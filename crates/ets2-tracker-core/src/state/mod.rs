//! Telemetry state store.
//!
//! [`TelemetryState`] holds the latest value of every published field. The
//! host-facing handlers live here as methods so that they can be exercised
//! without a running game:
//!
//! - **Channels**: float values written straight into their bound field
//! - **Configuration**: job attributes copied in, `job_active` re-derived
//! - **Gameplay events**: `player.fined` raises the fine flag
//!
//! Clearing the fine flag is the publisher's job (see [`crate::snapshot`]).

mod fine;
mod fixed_string;

pub use fine::*;
pub use fixed_string::*;

use std::borrow::Cow;
use std::time::Instant;

use strum::{EnumIter, IntoStaticStr};
use tracing::debug;

/// Attribute and event names used by the telemetry SDK
pub mod names {
    pub const CONFIG_CARGO: &str = "cargo";
    pub const CONFIG_INCOME: &str = "income";
    pub const CONFIG_SOURCE_CITY: &str = "source_city";
    pub const CONFIG_DESTINATION_CITY: &str = "destination_city";

    pub const GAMEPLAY_EVENT_FINED: &str = "player.fined";
    pub const FINE_AMOUNT: &str = "fine.amount";
    pub const FINE_OFFENCE: &str = "fine.offence";
}

/// Float channels the tracker subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum Channel {
    #[strum(serialize = "truck.odometer")]
    Odometer,
    #[strum(serialize = "truck.speed")]
    Speed,
    #[strum(serialize = "truck.navigation.distance")]
    NavigationDistance,
}

impl Channel {
    /// SDK channel name
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Decoded value of a named attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue<'a> {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(Cow<'a, str>),
    /// Vector, placement and other types the tracker never reads
    Unsupported,
}

impl AttributeValue<'_> {
    /// Integer view of numeric values. Floats and strings are rejected.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            AttributeValue::Int(v) => Some(v),
            AttributeValue::UInt(v) => Some(i64::try_from(v).unwrap_or(i64::MAX)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Named attribute as delivered with configuration and gameplay events
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute<'a> {
    pub name: Cow<'a, str>,
    pub value: AttributeValue<'a>,
}

impl<'a> Attribute<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>, value: AttributeValue<'a>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn string(name: &'a str, value: &'a str) -> Self {
        Self::new(name, AttributeValue::String(Cow::Borrowed(value)))
    }

    pub fn int(name: &'a str, value: i64) -> Self {
        Self::new(name, AttributeValue::Int(value))
    }

    pub fn uint(name: &'a str, value: u64) -> Self {
        Self::new(name, AttributeValue::UInt(value))
    }
}

/// Latest known telemetry values
#[derive(Debug, Clone, Default)]
pub struct TelemetryState {
    pub odometer: f32,
    /// Meters per second as reported by the host
    pub speed: f32,
    /// Meters left to the navigation target
    pub trip_distance: f32,
    job_active: bool,
    pub cargo: FixedString,
    pub source: FixedString,
    pub destination: FixedString,
    pub income: i64,
    pub fine: FineState,
}

impl TelemetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a job is in progress. Derived from `destination` on every
    /// configuration update.
    pub fn job_active(&self) -> bool {
        self.job_active
    }

    /// Field a channel is bound to
    pub fn channel_slot(&mut self, channel: Channel) -> &mut f32 {
        match channel {
            Channel::Odometer => &mut self.odometer,
            Channel::Speed => &mut self.speed,
            Channel::NavigationDistance => &mut self.trip_distance,
        }
    }

    pub fn set_channel(&mut self, channel: Channel, value: f32) {
        *self.channel_slot(channel) = value;
    }

    /// Copy recognized job attributes and re-derive `job_active`.
    ///
    /// Unknown attributes and attributes with an unexpected value type are
    /// skipped.
    pub fn apply_configuration<'a, I>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = Attribute<'a>>,
    {
        for attr in attributes {
            match attr.name.as_ref() {
                names::CONFIG_CARGO => {
                    if let Some(value) = attr.value.as_str() {
                        self.cargo.set(value);
                    }
                }
                names::CONFIG_INCOME => {
                    if let Some(value) = attr.value.as_i64() {
                        self.income = value;
                    }
                }
                names::CONFIG_SOURCE_CITY => {
                    if let Some(value) = attr.value.as_str() {
                        self.source.set(value);
                    }
                }
                names::CONFIG_DESTINATION_CITY => {
                    if let Some(value) = attr.value.as_str() {
                        self.destination.set(value);
                    }
                }
                _ => {}
            }
        }

        let was_active = self.job_active;
        self.job_active = !self.destination.is_empty();

        if was_active != self.job_active {
            debug!(
                "Job {}: {} -> {} ({})",
                if self.job_active { "started" } else { "ended" },
                self.source,
                self.destination,
                self.cargo
            );
        }
    }

    /// Record a gameplay event. Only `player.fined` has an effect.
    pub fn apply_gameplay_event<'a, I>(&mut self, event_id: &str, attributes: I, now: Instant)
    where
        I: IntoIterator<Item = Attribute<'a>>,
    {
        if event_id != names::GAMEPLAY_EVENT_FINED {
            return;
        }

        self.fine.trigger(now);

        for attr in attributes {
            match attr.name.as_ref() {
                names::FINE_AMOUNT => {
                    if let Some(value) = attr.value.as_i64() {
                        self.fine.amount = value;
                    }
                }
                names::FINE_OFFENCE => {
                    if let Some(value) = attr.value.as_str() {
                        self.fine.offence.set(value);
                    }
                }
                _ => {}
            }
        }

        debug!("Fine received: {} ({})", self.fine.amount, self.fine.offence);
    }
}
