//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged with the perception and
//! actuation sides of the vehicle.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod per;
pub mod steer;
