//! Named parameters, their domains, and update commands.

use crate::error::{Result, SimError};
use std::collections::BTreeMap;

/// Named real-valued parameters, as supplied by a scenario file or a reset.
pub type ParameterSet = BTreeMap<String, f64>;

/// Values a parameter may take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Domain {
    /// Strictly greater than zero (masses, spring constants).
    Positive,
    /// Zero or greater.
    NonNegative,
    /// Inclusive range.
    Range { min: f64, max: f64 },
    /// 0 (off) or 1 (on).
    Flag,
    /// Index into a fixed list of named options.
    Choice(&'static [&'static str]),
}

impl Domain {
    /// Check a candidate value, returning the reason on failure.
    pub fn check(&self, value: f64) -> std::result::Result<(), String> {
        if !value.is_finite() {
            return Err("must be a finite number".into());
        }
        match *self {
            Domain::Positive if value <= 0.0 => Err("must be > 0".into()),
            Domain::NonNegative if value < 0.0 => Err("must be >= 0".into()),
            Domain::Range { min, max } if value < min || value > max => {
                Err(format!("must be within [{min}, {max}]"))
            }
            Domain::Flag if value != 0.0 && value != 1.0 => Err("must be 0 or 1".into()),
            Domain::Choice(options)
                if value.fract() != 0.0 || value < 0.0 || value >= options.len() as f64 =>
            {
                Err(format!("must be a whole number in 0..{}", options.len()))
            }
            _ => Ok(()),
        }
    }

    /// Name of the option `value` selects, for `Choice` domains.
    pub fn option_label(&self, value: f64) -> Option<&'static str> {
        match *self {
            Domain::Choice(options) if value >= 0.0 && value.fract() == 0.0 => {
                options.get(value as usize).copied()
            }
            _ => None,
        }
    }
}

/// When a parameter change is observed by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Read by the equations of motion on the next tick.
    Live,
    /// Only used when the state is initialised by a reset.
    Initial,
}

/// Static description of one parameter of a simulation kind.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub default: f64,
    pub domain: Domain,
    /// Slider range offered by the presentation layer.
    pub slider: (f64, f64),
    pub effect: Effect,
}

impl ParamSpec {
    pub fn validate(&self, value: f64) -> Result<()> {
        self.domain
            .check(value)
            .map_err(|reason| SimError::invalid(self.name, reason))
    }
}

/// Look up a spec by name, failing with `InvalidParameter` for unknown names.
pub fn find_spec<'a>(specs: &'a [ParamSpec], name: &str) -> Result<&'a ParamSpec> {
    specs
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| SimError::invalid(name, "unknown parameter"))
}

/// A single parameter edit forwarded from the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterUpdate {
    pub name: String,
    pub value: f64,
}

impl ParameterUpdate {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl std::str::FromStr for ParameterUpdate {
    type Err = SimError;

    /// Parse `name=value`, as given on the command line.
    fn from_str(s: &str) -> Result<Self> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| SimError::Config(format!("expected name=value, got '{s}'")))?;
        let name = name.trim();
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| SimError::invalid(name, format!("'{}' is not a number", value.trim())))?;
        Ok(Self::new(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero_and_negative() {
        assert!(Domain::Positive.check(0.0).is_err());
        assert!(Domain::Positive.check(-5.0).is_err());
        assert!(Domain::Positive.check(1e-9).is_ok());
    }

    #[test]
    fn every_domain_rejects_nan() {
        for d in [
            Domain::Positive,
            Domain::NonNegative,
            Domain::Range { min: -1.0, max: 1.0 },
            Domain::Flag,
            Domain::Choice(&["a", "b", "c"]),
        ] {
            assert!(d.check(f64::NAN).is_err(), "{d:?} accepted NaN");
        }
    }

    #[test]
    fn choice_requires_whole_index() {
        let d = Domain::Choice(&["red", "green", "blue", "black"]);
        assert!(d.check(3.0).is_ok());
        assert!(d.check(4.0).is_err());
        assert!(d.check(1.5).is_err());
    }

    #[test]
    fn choice_labels_come_from_the_domain() {
        let d = Domain::Choice(&["low", "high"]);
        assert_eq!(d.option_label(1.0), Some("high"));
        assert_eq!(d.option_label(2.0), None);
        assert_eq!(d.option_label(0.5), None);
        assert_eq!(Domain::Flag.option_label(0.0), None);
    }

    #[test]
    fn parse_update_from_cli_form() {
        let u: ParameterUpdate = "mass1 = 2.5".parse().unwrap();
        assert_eq!(u, ParameterUpdate::new("mass1", 2.5));
        assert!("mass1".parse::<ParameterUpdate>().is_err());
        assert!("mass1=heavy".parse::<ParameterUpdate>().is_err());
    }
}
