//! Actuator drivers.

pub mod relays;
