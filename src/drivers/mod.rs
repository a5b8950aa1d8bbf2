//! Device drivers and one-shot hardware initialisation.

pub mod ads1115;
pub mod hw_init;
pub mod watchdog;
