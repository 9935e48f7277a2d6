//! Fan speed control: relay encoding and the speed arbitration core.

pub mod relay;
pub mod speed;
