//! Spindle power mapping
//!
//! Snapmaker CNC toolheads take `M3 P<percent>` instead of an RPM.

use crate::error::{ConfigurationError, ConfigResult};
use crate::profile::MachineProfile;

/// Map a requested RPM to a power percentage within the profile's range
pub fn spindle_power(rpm: f64, profile: &MachineProfile) -> f64 {
    let power = rpm / profile.max_spindle_rpm * profile.max_spindle_power;
    power.clamp(profile.min_spindle_power, profile.max_spindle_power)
}

/// Power mapper bound to the export's active profile
#[derive(Debug, Clone, Copy)]
pub struct SpindlePowerMapper<'a> {
    profile: Option<&'a MachineProfile>,
}

impl<'a> SpindlePowerMapper<'a> {
    pub fn new(profile: Option<&'a MachineProfile>) -> Self {
        Self { profile }
    }

    /// Power percentage for `rpm`; fails when no profile was resolved
    pub fn power_for(&self, rpm: f64) -> ConfigResult<f64> {
        let profile = self.profile.ok_or(ConfigurationError::MissingProfile)?;
        Ok(spindle_power(rpm, profile))
    }
}
