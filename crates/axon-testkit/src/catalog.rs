//! Built-in catalog the stub kernel ships with.
//!
//! A small cross-section of model families: integrate-and-fire neurons,
//! a conductance model, rate models, stimulators, recorders, and the common
//! synapse types. Parameter kinds are deliberately mixed (floats, ints,
//! text, bools) so type handling gets exercised end to end.

use axon::params::{ParamMap, ParamValue};

fn params(entries: Vec<(&str, ParamValue)>) -> ParamMap {
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

pub(crate) fn node_models() -> Vec<(&'static str, ParamMap)> {
    vec![
        (
            "iaf_psc_alpha",
            params(vec![
                ("C_m", 250.0.into()),
                ("E_L", (-70.0).into()),
                ("I_e", 0.0.into()),
                ("t_ref", 2.0.into()),
                ("tau_m", 10.0.into()),
                ("tau_syn_ex", 2.0.into()),
                ("tau_syn_in", 2.0.into()),
                ("V_reset", (-70.0).into()),
                ("V_th", (-55.0).into()),
            ]),
        ),
        (
            "iaf_psc_exp",
            params(vec![
                ("C_m", 250.0.into()),
                ("E_L", (-70.0).into()),
                ("I_e", 0.0.into()),
                ("t_ref", 2.0.into()),
                ("tau_m", 10.0.into()),
                ("tau_syn_ex", 2.0.into()),
                ("tau_syn_in", 2.0.into()),
                ("V_reset", (-70.0).into()),
                ("V_th", (-55.0).into()),
            ]),
        ),
        (
            // Deprecated alias kept registered; the client side owns the
            // deprecation notice.
            "iaf_psc_alpha_canon",
            params(vec![
                ("C_m", 250.0.into()),
                ("E_L", (-70.0).into()),
                ("I_e", 0.0.into()),
                ("t_ref", 2.0.into()),
                ("tau_m", 10.0.into()),
                ("tau_syn", 2.0.into()),
                ("V_reset", (-70.0).into()),
                ("V_th", (-55.0).into()),
            ]),
        ),
        (
            "hh_psc_alpha",
            params(vec![
                ("C_m", 100.0.into()),
                ("E_K", (-77.0).into()),
                ("E_L", (-54.402).into()),
                ("E_Na", 50.0.into()),
                ("g_K", 3600.0.into()),
                ("g_L", 30.0.into()),
                ("g_Na", 12000.0.into()),
                ("I_e", 0.0.into()),
                ("tau_syn_ex", 0.2.into()),
                ("tau_syn_in", 2.0.into()),
                ("V_m", (-65.0).into()),
            ]),
        ),
        (
            "threshold_lin_rate_ipn",
            params(vec![
                ("g", 1.0.into()),
                ("mean", 0.0.into()),
                ("sigma", 0.0.into()),
                ("tau", 10.0.into()),
                ("theta", 0.0.into()),
            ]),
        ),
        // A model with no parameters at all.
        ("parrot_neuron", ParamMap::new()),
        (
            "dc_generator",
            params(vec![
                ("amplitude", 0.0.into()),
                ("origin", 0.0.into()),
                ("start", 0.0.into()),
                ("stop", 1e15.into()),
            ]),
        ),
        (
            "voltmeter",
            params(vec![
                ("interval", 1.0.into()),
                ("record_to", "memory".into()),
                ("time_in_steps", false.into()),
            ]),
        ),
        (
            "spike_recorder",
            params(vec![
                ("n_events", ParamValue::Int(0)),
                ("origin", 0.0.into()),
                ("record_to", "memory".into()),
                ("time_in_steps", false.into()),
            ]),
        ),
    ]
}

pub(crate) fn synapse_models() -> Vec<(&'static str, ParamMap)> {
    vec![
        (
            "bernoulli_synapse",
            params(vec![
                ("delay", 1.0.into()),
                ("p_transmit", 1.0.into()),
                ("weight", 1.0.into()),
            ]),
        ),
        (
            "static_synapse",
            params(vec![("delay", 1.0.into()), ("weight", 1.0.into())]),
        ),
        (
            "stdp_synapse",
            params(vec![
                ("alpha", 1.0.into()),
                ("delay", 1.0.into()),
                ("lambda", 0.01.into()),
                ("mu_minus", 1.0.into()),
                ("mu_plus", 1.0.into()),
                ("tau_plus", 20.0.into()),
                ("weight", 1.0.into()),
                ("Wmax", 100.0.into()),
            ]),
        ),
    ]
}

pub(crate) fn connection_rules() -> &'static [&'static str] {
    &[
        "all_to_all",
        "fixed_indegree",
        "fixed_outdegree",
        "fixed_total_number",
        "one_to_one",
        "pairwise_bernoulli",
        "symmetric_pairwise_bernoulli",
    ]
}
