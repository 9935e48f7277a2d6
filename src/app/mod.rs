//! Application core: pure domain logic, zero I/O.
//!
//! Gesture handling, rate-of-change auto activation, speed arbitration and
//! settings persistence for the hood fan.  All interaction with hardware
//! happens through **port traits** defined in [`ports`], keeping this layer
//! fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
