//! Electric machine (generator/motor) acting on a vane shaft.

use crate::error::{SimError, SimResult};

/// Time shape of the reaction moment over one stroke.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum MomentProfile {
    /// The assigned moment is applied for the whole stroke.
    #[default]
    Constant,
    /// Ramped engagement over a nominal stroke period `T`:
    ///
    /// ```text
    /// |M(t)| = g * t          for t < T/2
    /// |M(t)| = g * T - g * t  otherwise
    /// ```
    ///
    /// The sign follows the assigned moment so paired machines still oppose
    /// each other.
    Triangular { gradient_nm_s: f64, period_s: f64 },
}

impl MomentProfile {
    pub fn validate(&self) -> SimResult<()> {
        match *self {
            MomentProfile::Constant => Ok(()),
            MomentProfile::Triangular {
                gradient_nm_s,
                period_s,
            } => {
                if !gradient_nm_s.is_finite() {
                    return Err(SimError::InvalidArg {
                        what: "moment gradient must be finite",
                    });
                }
                if !(period_s.is_finite() && period_s > 0.0) {
                    return Err(SimError::InvalidArg {
                        what: "moment ramp period must be positive",
                    });
                }
                Ok(())
            }
        }
    }
}

/// Reaction moment source mounted on a shaft.
///
/// The engine assigns the moment once per configuration from the net gas work
/// of a stroke; see [`crate::Engine::required_reaction_moment`].
#[derive(Clone, Debug, Default)]
pub struct ElectricMachine {
    /// Assigned reaction moment (N·m), signed
    moment: f64,
    profile: MomentProfile,
}

impl ElectricMachine {
    pub fn new(profile: MomentProfile) -> SimResult<Self> {
        profile.validate()?;
        Ok(Self {
            moment: 0.0,
            profile,
        })
    }

    pub fn set_moment(&mut self, moment: f64) {
        self.moment = moment;
    }

    /// Assigned moment, independent of the profile.
    pub fn moment(&self) -> f64 {
        self.moment
    }

    pub fn profile(&self) -> MomentProfile {
        self.profile
    }

    /// Moment delivered `elapsed` seconds into the stroke.
    pub fn moment_at(&self, elapsed: f64) -> f64 {
        match self.profile {
            MomentProfile::Constant => self.moment,
            MomentProfile::Triangular {
                gradient_nm_s,
                period_s,
            } => {
                let magnitude = if elapsed < period_s / 2.0 {
                    gradient_nm_s * elapsed
                } else {
                    gradient_nm_s * period_s - gradient_nm_s * elapsed
                };
                if self.moment == 0.0 {
                    0.0
                } else {
                    self.moment.signum() * magnitude
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_profile_ignores_time() {
        let mut machine = ElectricMachine::default();
        machine.set_moment(691.4);
        assert_eq!(machine.moment_at(0.0), 691.4);
        assert_eq!(machine.moment_at(0.02), 691.4);
    }

    #[test]
    fn triangular_profile_peaks_at_half_period() {
        let mut machine = ElectricMachine::new(MomentProfile::Triangular {
            gradient_nm_s: 1000.0,
            period_s: 0.02,
        })
        .unwrap();
        machine.set_moment(-1.0);

        assert!(machine.moment_at(0.0).abs() < 1e-12);
        assert!((machine.moment_at(0.005) + 5.0).abs() < 1e-12);
        assert!((machine.moment_at(0.01) + 10.0).abs() < 1e-12);
        assert!((machine.moment_at(0.015) + 5.0).abs() < 1e-12);
        assert!(machine.moment_at(0.02).abs() < 1e-12);
    }

    #[test]
    fn triangular_profile_requires_positive_period() {
        let result = ElectricMachine::new(MomentProfile::Triangular {
            gradient_nm_s: 10.0,
            period_s: 0.0,
        });
        assert!(result.is_err());
    }
}
