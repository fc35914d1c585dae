//! GPU independent core of the ge3d engine.
//!
//! Everything in here can be used and tested without a window or graphics context: object
//! transforms, the resource cache, instance dirty tracking, cameras, lights and the
//! engine configuration.

pub mod binding;
pub mod cache;
pub mod camera;
pub mod config;
pub mod input;
pub mod instances;
pub mod light;
pub mod model;
