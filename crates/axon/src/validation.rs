//! Pre-flight checks run before a command is issued.
//!
//! Only what can be decided without asking the kernel lives here: argument
//! shape and the deprecation table. Parameter names and value types are the
//! kernel's to judge; this layer never second-guesses it.

use crate::advisory::Advisory;
use crate::error::UsageError;
use crate::params::{ParamMap, ParamValue};

/// Kernel models scheduled for removal, with suggested replacements.
///
/// Kept in step with the kernel's release notes. The kernel keeps serving
/// these models, so every entry is advisory only.
const DEPRECATED_MODELS: &[(&str, Option<&str>)] = &[
    ("iaf_psc_alpha_canon", Some("iaf_psc_alpha_ps")),
    ("spike_detector", Some("spike_recorder")),
];

/// Collapse the name/value short form into a one-entry mapping.
///
/// The short form exists for the common "set one number" case; anything
/// structured must use the mapping form, so a non-scalar here is a usage
/// error rather than a silently nested write.
pub(crate) fn single_param(name: &str, value: ParamValue) -> Result<ParamMap, UsageError> {
    if !value.is_scalar() {
        return Err(UsageError::NonScalarShorthand {
            name: name.to_string(),
        });
    }
    Ok(ParamMap::from([(name.to_string(), value)]))
}

/// Advisory to emit before copying from `model`, if it is deprecated.
pub(crate) fn deprecation_for(model: &str) -> Option<Advisory> {
    DEPRECATED_MODELS
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(name, replacement)| Advisory::deprecated_model(name, *replacement))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_shorthand_becomes_a_one_entry_map() {
        let params = single_param("tau_m", ParamValue::Float(15.0)).unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("tau_m"), Some(&ParamValue::Float(15.0)));
    }

    #[test]
    fn nested_shorthand_is_rejected() {
        let err = single_param("events", ParamValue::Map(ParamMap::new())).unwrap_err();
        assert_eq!(
            err,
            UsageError::NonScalarShorthand {
                name: "events".to_string()
            }
        );
    }

    #[test]
    fn deprecated_models_get_an_advisory() {
        let advisory = deprecation_for("iaf_psc_alpha_canon").unwrap();
        assert_eq!(advisory.model, "iaf_psc_alpha_canon");
        assert!(advisory.message.contains("iaf_psc_alpha_ps"));
    }

    #[test]
    fn current_models_get_none() {
        assert!(deprecation_for("iaf_psc_alpha").is_none());
    }
}
