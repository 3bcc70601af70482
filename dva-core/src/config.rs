//! Campaign configuration: JSON document parsing and semantic validation.
//! Mirrors the reference crate's `validate_args`/`validate_args_or_exit`
//! split between a pure `Result`-returning validator and a CLI-facing exit
//! wrapper.

use std::collections::HashMap;

use dva_model::{MainParams, MassTargets, MassWeights, N_DVA, N_MASS, PAIRS};
use serde::{Deserialize, Serialize};

use crate::error::DvaError;

/// One entry of the 48-wide DVA parameter specification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub low: f64,
    pub high: f64,
    #[serde(default)]
    pub fixed: bool,
}

impl ParameterSpec {
    pub fn is_fixed(&self) -> bool {
        self.fixed || (self.low - self.high).abs() < f64::EPSILON
    }
}

/// Frequency sweep grid specification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FrequencySpec {
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

/// Wire-format main-system parameters, converted to [`dva_model::MainParams`]
/// after validation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MainParamsSpec {
    pub mu: f64,
    pub lambda_main: [f64; N_MASS],
    pub nu_main: [f64; N_MASS],
    pub a_low: f64,
    pub a_up: f64,
    pub f1: f64,
    pub f2: f64,
    pub omega_dc: f64,
    pub zeta_dc: f64,
}

impl From<MainParamsSpec> for MainParams {
    fn from(s: MainParamsSpec) -> Self {
        MainParams {
            mu: s.mu,
            lambda_main: s.lambda_main,
            nu_main: s.nu_main,
            a_low: s.a_low,
            a_up: s.a_up,
            f1: s.f1,
            f2: s.f2,
            omega_dc: s.omega_dc,
            zeta_dc: s.zeta_dc,
        }
    }
}

/// A full optimization/analysis campaign document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    pub main_params: MainParamsSpec,
    pub parameters: Vec<ParameterSpec>,
    /// Per-mass target maps, keyed by the recognized feature names
    /// (`peak_value_1..4`, `peak_position_1..5`, `bandwidth_i_j`, `slope_i_j`, `area_under_curve`).
    pub targets: Vec<HashMap<String, f64>>,
    /// Per-mass weight maps, parallel to `targets`.
    pub weights: Vec<HashMap<String, f64>>,
    pub frequency: FrequencySpec,
    #[serde(default)]
    pub sparsity_alpha: f64,
}

/// Parse a named feature key against a mass's target/weight map, falling
/// back to `None`/`0.0` when the key is absent.
fn lookup(map: &HashMap<String, f64>, key: &str) -> Option<f64> {
    map.get(key).copied()
}

/// Convert one mass's raw JSON target map into the typed [`MassTargets`].
pub fn parse_mass_targets(map: &HashMap<String, f64>) -> MassTargets {
    let mut t = MassTargets::default();
    for k in 0..4 {
        t.peak_values[k] = lookup(map, &format!("peak_value_{}", k + 1));
    }
    for k in 0..5 {
        t.peak_positions[k] = lookup(map, &format!("peak_position_{}", k + 1));
    }
    for (slot, (i, j)) in PAIRS.iter().enumerate() {
        t.bandwidths[slot] = lookup(map, &format!("bandwidth_{i}_{j}"));
        t.slopes[slot] = lookup(map, &format!("slope_{i}_{j}"));
    }
    t.area_under_curve = lookup(map, "area_under_curve");
    t
}

/// Convert one mass's raw JSON weight map into the typed [`MassWeights`]
/// (missing keys default to weight `0.0`, i.e. untargeted).
pub fn parse_mass_weights(map: &HashMap<String, f64>) -> MassWeights {
    let mut w = MassWeights::default();
    for k in 0..4 {
        w.peak_values[k] = lookup(map, &format!("peak_value_{}", k + 1)).unwrap_or(0.0);
    }
    for k in 0..5 {
        w.peak_positions[k] = lookup(map, &format!("peak_position_{}", k + 1)).unwrap_or(0.0);
    }
    for (slot, (i, j)) in PAIRS.iter().enumerate() {
        w.bandwidths[slot] = lookup(map, &format!("bandwidth_{i}_{j}")).unwrap_or(0.0);
        w.slopes[slot] = lookup(map, &format!("slope_{i}_{j}")).unwrap_or(0.0);
    }
    w.area_under_curve = lookup(map, "area_under_curve").unwrap_or(0.0);
    w
}

/// Parse a campaign document from a JSON string.
pub fn parse_campaign(json: &str) -> Result<Campaign, DvaError> {
    serde_json::from_str(json).map_err(|e| DvaError::InvalidInput(format!("malformed campaign JSON: {e}")))
}

/// Pure semantic validation of a parsed campaign. Returns bound vectors and
/// typed target/weight arrays ready for the fitness function and engines.
pub fn validate_campaign(
    campaign: &Campaign,
) -> Result<(MainParams, Vec<(f64, f64)>, [MassTargets; N_MASS], [MassWeights; N_MASS]), DvaError> {
    if campaign.parameters.len() != N_DVA {
        return Err(DvaError::InvalidInput(format!(
            "expected {N_DVA} parameter specs, got {}",
            campaign.parameters.len()
        )));
    }
    if campaign.targets.len() != N_MASS || campaign.weights.len() != N_MASS {
        return Err(DvaError::InvalidInput(format!(
            "expected {N_MASS} target/weight maps, got {}/{}",
            campaign.targets.len(),
            campaign.weights.len()
        )));
    }

    let mut bounds = Vec::with_capacity(N_DVA);
    for p in &campaign.parameters {
        if !p.low.is_finite() || !p.high.is_finite() {
            return Err(DvaError::InvalidInput(format!("non-finite bound on parameter {}", p.name)));
        }
        if p.low > p.high {
            return Err(DvaError::InvalidInput(format!(
                "parameter {} has low ({}) > high ({})",
                p.name, p.low, p.high
            )));
        }
        bounds.push((p.low, p.high));
    }

    if campaign.frequency.points < 2 {
        return Err(DvaError::InvalidInput("frequency.points must be >= 2".to_string()));
    }
    if campaign.frequency.start >= campaign.frequency.end {
        return Err(DvaError::InvalidInput("frequency.start must be < frequency.end".to_string()));
    }

    let main: MainParams = campaign.main_params.into();
    if main.omega_dc <= 0.0 {
        return Err(DvaError::InvalidInput("main_params.omega_dc must be > 0".to_string()));
    }
    if !(0.0..1.0).contains(&main.zeta_dc) {
        return Err(DvaError::InvalidInput("main_params.zeta_dc must be in [0, 1)".to_string()));
    }

    let targets: [MassTargets; N_MASS] = std::array::from_fn(|i| parse_mass_targets(&campaign.targets[i]));
    let weights: [MassWeights; N_MASS] = std::array::from_fn(|i| parse_mass_weights(&campaign.weights[i]));

    Ok((main, bounds, targets, weights))
}

/// CLI-facing wrapper: validate and, on failure, print a `❌`-prefixed
/// message to stderr and exit with code 2 (matching the reference crate's
/// `validate_args_or_exit` convention).
pub fn validate_campaign_or_exit(
    campaign: &Campaign,
) -> (MainParams, Vec<(f64, f64)>, [MassTargets; N_MASS], [MassWeights; N_MASS]) {
    match validate_campaign(campaign) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("\u{274c} {e}");
            std::process::exit(e.exit_code());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_campaign() -> Campaign {
        let parameters = (0..N_DVA)
            .map(|i| ParameterSpec {
                name: format!("p{i}"),
                low: 0.0001,
                high: 2.5,
                fixed: false,
            })
            .collect();
        let mut target0 = HashMap::new();
        target0.insert("peak_value_1".to_string(), 1.0);
        target0.insert("bandwidth_1_2".to_string(), 5.0);
        let mut weight0 = HashMap::new();
        weight0.insert("peak_value_1".to_string(), 1.0);
        weight0.insert("bandwidth_1_2".to_string(), 0.5);

        Campaign {
            main_params: MainParamsSpec {
                mu: 1.0,
                lambda_main: [1.0, 1.0, 0.5, 0.5, 0.5],
                nu_main: [0.75; 5],
                a_low: 0.05,
                a_up: 0.05,
                f1: 100.0,
                f2: 100.0,
                omega_dc: 5000.0,
                zeta_dc: 0.01,
            },
            parameters,
            targets: vec![target0, HashMap::new(), HashMap::new(), HashMap::new(), HashMap::new()],
            weights: vec![weight0, HashMap::new(), HashMap::new(), HashMap::new(), HashMap::new()],
            frequency: FrequencySpec { start: 0.0, end: 10000.0, points: 1200 },
            sparsity_alpha: 0.0,
        }
    }

    #[test]
    fn parse_mass_targets_recognizes_named_keys() {
        let mut map = HashMap::new();
        map.insert("peak_value_2".to_string(), 3.0);
        map.insert("bandwidth_2_3".to_string(), 7.0);
        map.insert("area_under_curve".to_string(), 9.0);
        let t = parse_mass_targets(&map);
        assert_eq!(t.peak_values[1], Some(3.0));
        assert_eq!(t.bandwidths[3], Some(7.0));
        assert_eq!(t.area_under_curve, Some(9.0));
        assert_eq!(t.peak_values[0], None);
    }

    #[test]
    fn validate_campaign_accepts_well_formed_document() {
        let campaign = sample_campaign();
        let (main, bounds, targets, _weights) = validate_campaign(&campaign).unwrap();
        assert_eq!(bounds.len(), N_DVA);
        assert_eq!(main.mu, 1.0);
        assert_eq!(targets[0].peak_values[0], Some(1.0));
    }

    #[test]
    fn validate_campaign_rejects_inverted_bounds() {
        let mut campaign = sample_campaign();
        campaign.parameters[0].low = 3.0;
        campaign.parameters[0].high = 1.0;
        assert!(matches!(validate_campaign(&campaign), Err(DvaError::InvalidInput(_))));
    }

    #[test]
    fn validate_campaign_rejects_equal_frequency_bounds() {
        let mut campaign = sample_campaign();
        campaign.frequency.start = 10.0;
        campaign.frequency.end = 10.0;
        assert!(matches!(validate_campaign(&campaign), Err(DvaError::InvalidInput(_))));
    }

    #[test]
    fn validate_campaign_rejects_wrong_parameter_count() {
        let mut campaign = sample_campaign();
        campaign.parameters.pop();
        assert!(matches!(validate_campaign(&campaign), Err(DvaError::InvalidInput(_))));
    }

    #[test]
    fn roundtrip_through_json() {
        let campaign = sample_campaign();
        let json = serde_json::to_string(&campaign).unwrap();
        let parsed = parse_campaign(&json).unwrap();
        assert_eq!(parsed, campaign);
    }

    #[test]
    fn parse_campaign_rejects_malformed_json() {
        assert!(matches!(parse_campaign("{not json"), Err(DvaError::InvalidInput(_))));
    }
}
