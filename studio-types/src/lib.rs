//! Core type definitions for Plugin Studio.
//!
//! Defines the universal types the layout engine, model, and registry crates
//! depend on:
//! - [`PageId`] / [`InstanceId`] — identifier newtypes
//! - [`DeviceType`] / [`Breakpoint`] — responsive breakpoints and column grids
//! - [`ChangeOrigin`] — classifies why a layout mutation occurred

mod device;
mod ids;
mod origin;

pub use device::{Breakpoint, ColumnCounts, DeviceType};
pub use ids::{InstanceId, PageId};
pub use origin::ChangeOrigin;
