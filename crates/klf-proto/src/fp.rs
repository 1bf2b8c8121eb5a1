//! Functional-parameter values.
//!
//! Actuator command arguments are 16-bit codes with a symbolic layer on top:
//! a relative position, a percentage band, or one of four sentinel values.
//! [`FunctionalParameter::to_raw`] produces the wire encoding.

/// Full-travel relative scale: `Relative(1.0)` encodes to this.
const RELATIVE_MAX: u16 = 0xC800;
/// Lower bound of the percentage band.
const PERCENT_BASE: u16 = 0xC900;
/// Upper bound of the percentage band.
const PERCENT_MAX: u16 = 0xD0D0;

/// Symbolic 16-bit actuator parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FunctionalParameter {
    /// Relative position in `[0, 1]` over the actuator's full travel.
    Relative(f64),
    /// Percentage point value in `[0, 1]` mapped into the percent band.
    Percent(f64),
    /// Use the actuator's target value.
    Target,
    /// Use the actuator's current value.
    Current,
    /// Use the actuator's default value.
    Default,
    /// Leave the parameter untouched.
    Ignore,
}

impl FunctionalParameter {
    /// Wire encoding of the parameter.
    ///
    /// `Relative` and `Percent` inputs are clamped to `[0, 1]` and rounded to
    /// the nearest code.
    #[must_use]
    pub fn to_raw(self) -> u16 {
        match self {
            Self::Relative(p) => (p.clamp(0.0, 1.0) * f64::from(RELATIVE_MAX)).round() as u16,
            Self::Percent(p) => {
                let span = f64::from(PERCENT_MAX - PERCENT_BASE);
                (p.clamp(0.0, 1.0) * span).round() as u16 + PERCENT_BASE
            },
            Self::Target => 0xD100,
            Self::Current => 0xD200,
            Self::Default => 0xD300,
            Self::Ignore => 0xD400,
        }
    }

    /// Interpret a raw code from the relative scale as a position, if it is
    /// on that scale.
    #[must_use]
    pub fn relative_from_raw(raw: u16) -> Option<f64> {
        (raw <= RELATIVE_MAX).then(|| f64::from(raw) / f64::from(RELATIVE_MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::FunctionalParameter as Fp;

    #[test]
    fn boundary_encodings() {
        assert_eq!(Fp::Relative(0.0).to_raw(), 0x0000);
        assert_eq!(Fp::Relative(1.0).to_raw(), 0xC800);
        assert_eq!(Fp::Relative(0.5).to_raw(), 0x6400);
        assert_eq!(Fp::Percent(0.0).to_raw(), 0xC900);
        assert_eq!(Fp::Percent(1.0).to_raw(), 0xD0D0);
        assert_eq!(Fp::Target.to_raw(), 0xD100);
        assert_eq!(Fp::Current.to_raw(), 0xD200);
        assert_eq!(Fp::Default.to_raw(), 0xD300);
        assert_eq!(Fp::Ignore.to_raw(), 0xD400);
    }

    #[test]
    fn out_of_range_inputs_clamp() {
        assert_eq!(Fp::Relative(-0.5).to_raw(), 0x0000);
        assert_eq!(Fp::Relative(1.5).to_raw(), 0xC800);
        assert_eq!(Fp::Percent(2.0).to_raw(), 0xD0D0);
    }

    #[test]
    fn relative_scale_is_monotone() {
        let mut last = 0;
        for step in 0..=100 {
            let raw = Fp::Relative(f64::from(step) / 100.0).to_raw();
            assert!(raw >= last);
            last = raw;
        }
    }

    #[test]
    fn relative_round_trip() {
        assert_eq!(Fp::relative_from_raw(0x6400), Some(0.5));
        assert_eq!(Fp::relative_from_raw(0xC800), Some(1.0));
        assert_eq!(Fp::relative_from_raw(0xD200), None);
    }
}
