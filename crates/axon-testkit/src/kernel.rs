//! The stub kernel: a registry with real stack discipline.
//!
//! [`StubKernel::apply`] consumes operands from the top of the stack the way
//! the kernel's interpreter does, so argument-order mistakes in the client
//! surface as faults here instead of passing silently.

use std::collections::{BTreeMap, BTreeSet};

use axon::bridge::protocol::op;
use axon::params::{ParamMap, ParamValue};

use crate::catalog;

/// Fault classes the stub reports, rendered in the kernel's error style.
///
/// These strings travel back to the client verbatim inside error frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KernelFault {
    #[error("UnknownCommand: {op}")]
    UnknownCommand { op: String },
    #[error("StackUnderflow: {op}")]
    StackUnderflow { op: String },
    #[error("UnconsumedOperands: {op} left {count} values on the stack")]
    UnconsumedOperands { op: String, count: usize },
    #[error("ArgumentType: {op} expected {expected}")]
    ArgumentType { op: String, expected: &'static str },
    #[error("UnknownModel: {name}")]
    UnknownModel { name: String },
    #[error("NewModelNameExists: {name}")]
    NameExists { name: String },
    #[error("UnaccessedDictionaryEntry in {model}: {names}")]
    UnknownParameters { model: String, names: String },
    #[error("TypeMismatch in {model}: parameter {name} expects {expected}, got {found}")]
    ParameterType {
        model: String,
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// An in-memory model registry with node and synapse partitions.
#[derive(Debug, Default, Clone)]
pub struct StubKernel {
    nodes: BTreeMap<String, ParamMap>,
    synapses: BTreeMap<String, ParamMap>,
    rules: BTreeSet<String>,
}

impl StubKernel {
    /// A kernel with no models at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A kernel preloaded with the built-in catalog.
    pub fn with_builtins() -> Self {
        let mut kernel = Self::default();
        for (name, defaults) in catalog::node_models() {
            kernel.register_node_model(name, defaults);
        }
        for (name, defaults) in catalog::synapse_models() {
            kernel.register_synapse_model(name, defaults);
        }
        for rule in catalog::connection_rules() {
            kernel.register_rule(*rule);
        }
        kernel
    }

    pub fn register_node_model(&mut self, name: impl Into<String>, defaults: ParamMap) {
        self.nodes.insert(name.into(), defaults);
    }

    pub fn register_synapse_model(&mut self, name: impl Into<String>, defaults: ParamMap) {
        self.synapses.insert(name.into(), defaults);
    }

    pub fn register_rule(&mut self, name: impl Into<String>) {
        self.rules.insert(name.into());
    }

    /// Current defaults of a model, searching nodes before synapses.
    pub fn defaults(&self, model: &str) -> Option<&ParamMap> {
        self.nodes.get(model).or_else(|| self.synapses.get(model))
    }

    /// Run one command against the registry.
    ///
    /// `args` is the operand stack with the last argument on top. Every
    /// handler must consume exactly its own operands; anything left over is
    /// a fault, mirroring the interpreter's stack hygiene checks.
    pub fn apply(&mut self, op: &str, args: Vec<ParamValue>) -> Result<Vec<ParamValue>, KernelFault> {
        let mut stack = args;
        let results = match op {
            op::NODE_MODELS => text_stack(self.nodes.keys()),
            op::SYNAPSE_MODELS => text_stack(self.synapses.keys()),
            op::CONNECTION_RULES => text_stack(self.rules.iter()),
            op::GET_DEFAULTS => {
                let model = pop_text(&mut stack, op)?;
                let defaults = self
                    .defaults(&model)
                    .ok_or(KernelFault::UnknownModel { name: model })?;
                vec![ParamValue::Map(defaults.clone())]
            }
            op::SET_DEFAULTS => {
                let updates = pop_map(&mut stack, op)?;
                let model = pop_text(&mut stack, op)?;
                self.set_model_defaults(&model, updates)?;
                Vec::new()
            }
            op::COPY_MODEL => {
                let overrides = pop_map(&mut stack, op)?;
                let new_name = pop_text(&mut stack, op)?;
                let existing = pop_text(&mut stack, op)?;
                self.copy_model(&existing, &new_name, overrides)?;
                Vec::new()
            }
            other => {
                return Err(KernelFault::UnknownCommand {
                    op: other.to_string(),
                });
            }
        };
        if !stack.is_empty() {
            return Err(KernelFault::UnconsumedOperands {
                op: op.to_string(),
                count: stack.len(),
            });
        }
        Ok(results)
    }

    fn set_model_defaults(&mut self, model: &str, updates: ParamMap) -> Result<(), KernelFault> {
        if let Some(defaults) = self.nodes.get_mut(model) {
            return apply_updates(model, defaults, updates);
        }
        if let Some(defaults) = self.synapses.get_mut(model) {
            return apply_updates(model, defaults, updates);
        }
        Err(KernelFault::UnknownModel {
            name: model.to_string(),
        })
    }

    fn copy_model(
        &mut self,
        existing: &str,
        new_name: &str,
        overrides: ParamMap,
    ) -> Result<(), KernelFault> {
        // Name availability comes first, before the source lookup.
        if self.nodes.contains_key(new_name) || self.synapses.contains_key(new_name) {
            return Err(KernelFault::NameExists {
                name: new_name.to_string(),
            });
        }
        if let Some(defaults) = self.nodes.get(existing) {
            let mut copied = defaults.clone();
            apply_updates(new_name, &mut copied, overrides)?;
            self.nodes.insert(new_name.to_string(), copied);
            return Ok(());
        }
        if let Some(defaults) = self.synapses.get(existing) {
            let mut copied = defaults.clone();
            apply_updates(new_name, &mut copied, overrides)?;
            self.synapses.insert(new_name.to_string(), copied);
            return Ok(());
        }
        Err(KernelFault::UnknownModel {
            name: existing.to_string(),
        })
    }
}

/// Merge `updates` into `defaults`, validating names and types first so a
/// rejected update leaves the map exactly as it was.
fn apply_updates(
    model: &str,
    defaults: &mut ParamMap,
    updates: ParamMap,
) -> Result<(), KernelFault> {
    let unknown: Vec<String> = updates
        .keys()
        .filter(|name| !defaults.contains_key(name.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(KernelFault::UnknownParameters {
            model: model.to_string(),
            names: unknown.join(", "),
        });
    }
    let mut staged = Vec::with_capacity(updates.len());
    for (name, value) in updates {
        // Every name survived the unknown check above, so the slot exists.
        let coerced = coerce(model, &name, &defaults[&name], value)?;
        staged.push((name, coerced));
    }
    for (name, value) in staged {
        defaults.insert(name, value);
    }
    Ok(())
}

/// Integer literals are accepted where a float is stored; everything else
/// must match the stored kind exactly.
fn coerce(
    model: &str,
    name: &str,
    current: &ParamValue,
    value: ParamValue,
) -> Result<ParamValue, KernelFault> {
    match (current, value) {
        (ParamValue::Float(_), ParamValue::Int(int)) => Ok(ParamValue::Float(int as f64)),
        (current, value) if current.kind() == value.kind() => Ok(value),
        (current, value) => Err(KernelFault::ParameterType {
            model: model.to_string(),
            name: name.to_string(),
            expected: current.kind(),
            found: value.kind(),
        }),
    }
}

fn text_stack<'a>(names: impl Iterator<Item = &'a String>) -> Vec<ParamValue> {
    names.map(|name| ParamValue::Text(name.clone())).collect()
}

fn pop_text(stack: &mut Vec<ParamValue>, op: &str) -> Result<String, KernelFault> {
    match stack.pop() {
        Some(ParamValue::Text(text)) => Ok(text),
        Some(_) => Err(KernelFault::ArgumentType {
            op: op.to_string(),
            expected: "text",
        }),
        None => Err(KernelFault::StackUnderflow { op: op.to_string() }),
    }
}

fn pop_map(stack: &mut Vec<ParamValue>, op: &str) -> Result<ParamMap, KernelFault> {
    match stack.pop() {
        Some(ParamValue::Map(map)) => Ok(map),
        Some(_) => Err(KernelFault::ArgumentType {
            op: op.to_string(),
            expected: "map",
        }),
        None => Err(KernelFault::StackUnderflow { op: op.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(name: &str) -> ParamValue {
        ParamValue::Text(name.to_string())
    }

    #[test]
    fn listings_report_both_partitions_separately() {
        let mut kernel = StubKernel::with_builtins();

        let nodes = kernel.apply(op::NODE_MODELS, vec![]).unwrap();
        assert!(nodes.contains(&text("iaf_psc_alpha")));
        assert!(!nodes.contains(&text("static_synapse")));

        let synapses = kernel.apply(op::SYNAPSE_MODELS, vec![]).unwrap();
        assert!(synapses.contains(&text("static_synapse")));
        assert!(!synapses.contains(&text("iaf_psc_alpha")));
    }

    #[test]
    fn get_defaults_returns_one_map() {
        let mut kernel = StubKernel::with_builtins();
        let results = kernel
            .apply(op::GET_DEFAULTS, vec![text("iaf_psc_alpha")])
            .unwrap();
        assert_eq!(results.len(), 1);
        match &results[0] {
            ParamValue::Map(map) => assert_eq!(map.get("tau_m"), Some(&ParamValue::Float(10.0))),
            other => panic!("expected a map, got {other:?}"),
        }
    }

    #[test]
    fn missing_operands_underflow() {
        let mut kernel = StubKernel::with_builtins();
        let fault = kernel.apply(op::GET_DEFAULTS, vec![]).unwrap_err();
        assert_eq!(
            fault,
            KernelFault::StackUnderflow {
                op: "get_defaults".to_string()
            }
        );
    }

    #[test]
    fn leftover_operands_fault() {
        let mut kernel = StubKernel::with_builtins();
        let fault = kernel
            .apply(
                op::NODE_MODELS,
                vec![text("iaf_psc_alpha")],
            )
            .unwrap_err();
        assert_eq!(
            fault,
            KernelFault::UnconsumedOperands {
                op: "node_models".to_string(),
                count: 1,
            }
        );
    }

    #[test]
    fn wrong_operand_kind_faults() {
        let mut kernel = StubKernel::with_builtins();
        let fault = kernel
            .apply(op::GET_DEFAULTS, vec![ParamValue::Int(3)])
            .unwrap_err();
        assert_eq!(
            fault,
            KernelFault::ArgumentType {
                op: "get_defaults".to_string(),
                expected: "text",
            }
        );
    }

    #[test]
    fn set_defaults_widens_integer_literals_into_float_slots() {
        let mut kernel = StubKernel::with_builtins();
        let updates = ParamMap::from([("tau_m".to_string(), ParamValue::Int(15))]);
        kernel
            .apply(op::SET_DEFAULTS, vec![text("iaf_psc_alpha"), ParamValue::Map(updates)])
            .unwrap();
        assert_eq!(
            kernel.defaults("iaf_psc_alpha").unwrap().get("tau_m"),
            Some(&ParamValue::Float(15.0))
        );
    }

    #[test]
    fn rejected_updates_leave_the_model_untouched() {
        let mut kernel = StubKernel::with_builtins();
        let before = kernel.defaults("voltmeter").unwrap().clone();

        // One valid entry, one with the wrong type: nothing may stick.
        let updates = ParamMap::from([
            ("interval".to_string(), ParamValue::Float(5.0)),
            ("record_to".to_string(), ParamValue::Int(1)),
        ]);
        let fault = kernel
            .apply(op::SET_DEFAULTS, vec![text("voltmeter"), ParamValue::Map(updates)])
            .unwrap_err();
        assert!(matches!(fault, KernelFault::ParameterType { .. }));
        assert_eq!(kernel.defaults("voltmeter").unwrap(), &before);
    }

    #[test]
    fn unknown_parameter_names_are_rejected() {
        let mut kernel = StubKernel::with_builtins();
        let updates = ParamMap::from([("tau_q".to_string(), ParamValue::Float(1.0))]);
        let fault = kernel
            .apply(op::SET_DEFAULTS, vec![text("iaf_psc_alpha"), ParamValue::Map(updates)])
            .unwrap_err();
        assert_eq!(
            fault.to_string(),
            "UnaccessedDictionaryEntry in iaf_psc_alpha: tau_q"
        );
    }

    #[test]
    fn unknown_names_take_precedence_over_type_mismatches() {
        let mut kernel = StubKernel::with_builtins();
        let before = kernel.defaults("iaf_psc_alpha").unwrap().clone();

        // "C_m" exists but carries the wrong kind; "tau_q" does not exist.
        // The unknown name is the fault reported, and nothing sticks.
        let updates = ParamMap::from([
            ("C_m".to_string(), ParamValue::Bool(true)),
            ("tau_q".to_string(), ParamValue::Float(1.0)),
        ]);
        let fault = kernel
            .apply(op::SET_DEFAULTS, vec![text("iaf_psc_alpha"), ParamValue::Map(updates)])
            .unwrap_err();
        assert_eq!(
            fault,
            KernelFault::UnknownParameters {
                model: "iaf_psc_alpha".to_string(),
                names: "tau_q".to_string(),
            }
        );
        assert_eq!(kernel.defaults("iaf_psc_alpha").unwrap(), &before);
    }

    #[test]
    fn copy_checks_name_availability_before_the_source() {
        let mut kernel = StubKernel::with_builtins();
        let fault = kernel
            .apply(
                op::COPY_MODEL,
                vec![
                    text("no_such_model"),
                    text("voltmeter"),
                    ParamValue::Map(ParamMap::new()),
                ],
            )
            .unwrap_err();
        assert_eq!(
            fault,
            KernelFault::NameExists {
                name: "voltmeter".to_string()
            }
        );
    }

    #[test]
    fn copies_stay_in_their_source_partition() {
        let mut kernel = StubKernel::with_builtins();
        kernel
            .apply(
                op::COPY_MODEL,
                vec![
                    text("static_synapse"),
                    text("my_synapse"),
                    ParamValue::Map(ParamMap::new()),
                ],
            )
            .unwrap();
        assert!(kernel.synapses.contains_key("my_synapse"));
        assert!(!kernel.nodes.contains_key("my_synapse"));
    }
}
