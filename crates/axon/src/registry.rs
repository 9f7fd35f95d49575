//! Model registry operations.
//!
//! [`ModelRegistry`] is the client-facing surface over the registry
//! commands. Each method maps to exactly one kernel command, except
//! `models` with [`ModelKind::All`] which queries both partitions. The
//! registry holds no model state of its own; every answer reflects the
//! kernel at the moment the command ran.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::advisory::{AdvisorySink, LogSink};
use crate::bridge::protocol::op;
use crate::channel::{CommandChannel, KernelChannel};
use crate::error::{ChannelError, RegistryError, Result, UsageError};
use crate::params::{self, ParamMap, ParamValue};
use crate::transport::ConnectOptions;
use crate::validation;

/// Which partition of the model registry to list.
///
/// Parsing is strict so that a mistyped selector fails before anything is
/// sent to the kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModelKind {
    #[default]
    All,
    Nodes,
    Synapses,
}

impl ModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::All => "all",
            ModelKind::Nodes => "nodes",
            ModelKind::Synapses => "synapses",
        }
    }

    fn includes_nodes(self) -> bool {
        matches!(self, ModelKind::All | ModelKind::Nodes)
    }

    fn includes_synapses(self) -> bool {
        matches!(self, ModelKind::All | ModelKind::Synapses)
    }
}

impl FromStr for ModelKind {
    type Err = UsageError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all" => Ok(ModelKind::All),
            "nodes" => Ok(ModelKind::Nodes),
            "synapses" => Ok(ModelKind::Synapses),
            other => Err(UsageError::InvalidKind {
                given: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client facade over one command channel.
///
/// Generic over the channel so tests can substitute a scripted mock for the
/// socket-backed [`KernelChannel`]. Advisories (currently only deprecation
/// notices) go to the configured sink and never affect the return value.
pub struct ModelRegistry<C> {
    channel: C,
    advisories: Arc<dyn AdvisorySink>,
}

impl ModelRegistry<KernelChannel> {
    /// Connect to a kernel and wrap the channel in a registry.
    pub async fn connect(options: &ConnectOptions) -> Result<Self> {
        let channel = KernelChannel::connect(options).await?;
        Ok(Self::new(channel))
    }
}

impl<C: CommandChannel> ModelRegistry<C> {
    pub fn new(channel: C) -> Self {
        Self::with_advisory_sink(channel, Arc::new(LogSink))
    }

    pub fn with_advisory_sink(channel: C, advisories: Arc<dyn AdvisorySink>) -> Self {
        Self {
            channel,
            advisories,
        }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// List model names, sorted ascending.
    ///
    /// `filter` keeps only names containing the given substring. Duplicate
    /// names are preserved as the kernel reports them.
    pub async fn models(&mut self, kind: ModelKind, filter: Option<&str>) -> Result<Vec<String>> {
        let mut names = Vec::new();
        if kind.includes_nodes() {
            names.extend(self.fetch_names(op::NODE_MODELS).await?);
        }
        if kind.includes_synapses() {
            names.extend(self.fetch_names(op::SYNAPSE_MODELS).await?);
        }
        if let Some(needle) = filter {
            names.retain(|name| name.contains(needle));
        }
        names.sort();
        Ok(names)
    }

    /// List connection rule names, sorted ascending.
    pub async fn connection_rules(&mut self) -> Result<Vec<String>> {
        let mut rules = self.fetch_names(op::CONNECTION_RULES).await?;
        rules.sort();
        Ok(rules)
    }

    /// Fetch the full default parameter map of a model.
    pub async fn get_defaults(&mut self, model: &str) -> Result<ParamMap> {
        let values = self
            .channel
            .execute(op::GET_DEFAULTS, vec![ParamValue::Text(model.to_string())])
            .await?;
        match Self::single(values)? {
            ParamValue::Map(map) => Ok(map),
            other => Err(protocol_violation(format!(
                "get_defaults returned {}, expected a map",
                other.kind()
            ))),
        }
    }

    /// Fetch a model's defaults rendered as a JSON document.
    pub async fn get_defaults_json(&mut self, model: &str) -> Result<String> {
        let defaults = self.get_defaults(model).await?;
        Ok(params::to_json(&defaults))
    }

    /// Overwrite the named parameters in a model's defaults.
    ///
    /// Parameters not mentioned keep their current values. The kernel
    /// validates names and types; a rejection leaves the model untouched.
    pub async fn set_defaults(&mut self, model: &str, params: ParamMap) -> Result<()> {
        tracing::debug!(model, params = params.len(), "Writing model defaults");
        let values = self
            .channel
            .execute(
                op::SET_DEFAULTS,
                vec![ParamValue::Text(model.to_string()), ParamValue::Map(params)],
            )
            .await?;
        Self::none(values)
    }

    /// Set a single scalar default, shorthand for a one-entry
    /// [`set_defaults`](Self::set_defaults) call.
    pub async fn set_default(
        &mut self,
        model: &str,
        name: &str,
        value: impl Into<ParamValue>,
    ) -> Result<()> {
        let params = validation::single_param(name, value.into())?;
        self.set_defaults(model, params).await
    }

    /// Register `new_name` as a copy of `existing`, with `overrides` applied
    /// on top of the source defaults.
    ///
    /// Copying a deprecated model emits an advisory and proceeds.
    pub async fn copy_model(
        &mut self,
        existing: &str,
        new_name: &str,
        overrides: Option<ParamMap>,
    ) -> Result<()> {
        if let Some(advisory) = validation::deprecation_for(existing) {
            self.advisories.emit(advisory);
        }
        tracing::debug!(existing, new_name, "Copying model");
        let values = self
            .channel
            .execute(
                op::COPY_MODEL,
                vec![
                    ParamValue::Text(existing.to_string()),
                    ParamValue::Text(new_name.to_string()),
                    ParamValue::Map(overrides.unwrap_or_default()),
                ],
            )
            .await?;
        Self::none(values)
    }

    /// Run a listing command and collect the returned names.
    async fn fetch_names(&mut self, op: &str) -> Result<Vec<String>> {
        let values = self.channel.execute(op, vec![]).await?;
        values
            .into_iter()
            .map(|value| match value {
                ParamValue::Text(name) => Ok(name),
                other => Err(protocol_violation(format!(
                    "{op} returned {}, expected text",
                    other.kind()
                ))),
            })
            .collect()
    }

    fn single(mut values: Vec<ParamValue>) -> Result<ParamValue> {
        if values.len() == 1 {
            Ok(values.remove(0))
        } else {
            Err(protocol_violation(format!(
                "expected one result value, got {}",
                values.len()
            )))
        }
    }

    fn none(values: Vec<ParamValue>) -> Result<()> {
        if values.is_empty() {
            Ok(())
        } else {
            Err(protocol_violation(format!(
                "expected no result values, got {}",
                values.len()
            )))
        }
    }
}

fn protocol_violation(message: String) -> RegistryError {
    ChannelError::Protocol(message).into()
}
