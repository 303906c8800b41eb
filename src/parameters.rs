//! User-adjustable maintenance thresholds and unit costs.
//!
//! Threshold values are trusted: they are not range-checked, and nonsensical values simply yield
//! a nonsensical (but deterministic) classification.
use crate::category::MaintenanceCategory;
use crate::units::MoneyPerSquareMetre;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Thresholds triggering road reconstruction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconstructionThresholds {
    /// Minimum IRI
    pub iri: f64,
    /// Minimum rut depth
    pub rut: f64,
    /// Maximum PSCI
    pub psci: f64,
}

impl Default for ReconstructionThresholds {
    fn default() -> Self {
        Self {
            iri: 12.0,
            rut: 40.0,
            psci: 2.0,
        }
    }
}

/// Thresholds triggering a structural overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayThresholds {
    /// Minimum IRI
    pub iri: f64,
    /// Minimum rut depth
    pub rut: f64,
    /// Maximum PSCI
    pub psci: f64,
}

impl Default for OverlayThresholds {
    fn default() -> Self {
        Self {
            iri: 7.0,
            rut: 20.0,
            psci: 4.0,
        }
    }
}

/// Thresholds triggering surface restoration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RestorationThresholds {
    /// PSCI at or below which restoration is always required
    pub psci_a: f64,
    /// PSCI at or below which restoration is required if roughness is also high
    pub psci_b: f64,
    /// Minimum IRI accompanying `psci_b`
    pub iri: f64,
    /// Secondary PSCI at or below which restoration is required
    pub psci_c: f64,
}

impl Default for RestorationThresholds {
    fn default() -> Self {
        Self {
            psci_a: 5.0,
            psci_b: 6.0,
            iri: 6.0,
            psci_c: 7.0,
        }
    }
}

/// Thresholds triggering restoration of skid resistance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SkidResistanceThresholds {
    /// PSCI at or below which skid resistance is always restored
    pub psci_a: f64,
    /// PSCI at or below which skid resistance is restored if CSC is also low
    pub psci_b: f64,
    /// Maximum CSC accompanying `psci_b`
    pub csc: f64,
    /// PSCI at or below which skid resistance is restored if texture depth is also low
    pub psci_c: f64,
    /// Maximum MPD accompanying `psci_c`
    pub mpd: f64,
}

impl Default for SkidResistanceThresholds {
    fn default() -> Self {
        Self {
            psci_a: 7.0,
            psci_b: 8.0,
            csc: 0.35,
            psci_c: 9.0,
            mpd: 0.7,
        }
    }
}

/// The full set of thresholds used to classify segments
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaintenanceParameters {
    /// Road reconstruction rule
    pub reconstruction: ReconstructionThresholds,
    /// Structural overlay rule
    pub overlay: OverlayThresholds,
    /// Surface restoration rule
    pub restoration: RestorationThresholds,
    /// Restoration of skid resistance rule
    pub skid_resistance: SkidResistanceThresholds,
}

/// Names of the individual thresholds, for per-field updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
#[allow(missing_docs)]
pub enum ParameterKey {
    ReconstructionIri,
    ReconstructionRut,
    ReconstructionPsci,
    OverlayIri,
    OverlayRut,
    OverlayPsci,
    RestorationPsciA,
    RestorationPsciB,
    RestorationIri,
    RestorationPsciC,
    SkidPsciA,
    SkidPsciB,
    SkidCsc,
    SkidPsciC,
    SkidMpd,
}

impl MaintenanceParameters {
    fn field(&self, key: ParameterKey) -> &f64 {
        match key {
            ParameterKey::ReconstructionIri => &self.reconstruction.iri,
            ParameterKey::ReconstructionRut => &self.reconstruction.rut,
            ParameterKey::ReconstructionPsci => &self.reconstruction.psci,
            ParameterKey::OverlayIri => &self.overlay.iri,
            ParameterKey::OverlayRut => &self.overlay.rut,
            ParameterKey::OverlayPsci => &self.overlay.psci,
            ParameterKey::RestorationPsciA => &self.restoration.psci_a,
            ParameterKey::RestorationPsciB => &self.restoration.psci_b,
            ParameterKey::RestorationIri => &self.restoration.iri,
            ParameterKey::RestorationPsciC => &self.restoration.psci_c,
            ParameterKey::SkidPsciA => &self.skid_resistance.psci_a,
            ParameterKey::SkidPsciB => &self.skid_resistance.psci_b,
            ParameterKey::SkidCsc => &self.skid_resistance.csc,
            ParameterKey::SkidPsciC => &self.skid_resistance.psci_c,
            ParameterKey::SkidMpd => &self.skid_resistance.mpd,
        }
    }

    fn field_mut(&mut self, key: ParameterKey) -> &mut f64 {
        match key {
            ParameterKey::ReconstructionIri => &mut self.reconstruction.iri,
            ParameterKey::ReconstructionRut => &mut self.reconstruction.rut,
            ParameterKey::ReconstructionPsci => &mut self.reconstruction.psci,
            ParameterKey::OverlayIri => &mut self.overlay.iri,
            ParameterKey::OverlayRut => &mut self.overlay.rut,
            ParameterKey::OverlayPsci => &mut self.overlay.psci,
            ParameterKey::RestorationPsciA => &mut self.restoration.psci_a,
            ParameterKey::RestorationPsciB => &mut self.restoration.psci_b,
            ParameterKey::RestorationIri => &mut self.restoration.iri,
            ParameterKey::RestorationPsciC => &mut self.restoration.psci_c,
            ParameterKey::SkidPsciA => &mut self.skid_resistance.psci_a,
            ParameterKey::SkidPsciB => &mut self.skid_resistance.psci_b,
            ParameterKey::SkidCsc => &mut self.skid_resistance.csc,
            ParameterKey::SkidPsciC => &mut self.skid_resistance.psci_c,
            ParameterKey::SkidMpd => &mut self.skid_resistance.mpd,
        }
    }

    /// Get a single threshold
    pub fn get(&self, key: ParameterKey) -> f64 {
        *self.field(key)
    }

    /// Replace a single threshold, leaving the others untouched
    pub fn set(&mut self, key: ParameterKey, value: f64) {
        *self.field_mut(key) = value;
    }

    /// Iterate over every threshold with its name
    pub fn iter(&self) -> impl Iterator<Item = (ParameterKey, f64)> + '_ {
        ParameterKey::iter().map(|key| (key, self.get(key)))
    }
}

/// Cost per square metre of each treatment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CostInputs {
    /// Road reconstruction
    pub rr: f64,
    /// Structural overlay
    pub so: f64,
    /// Surface restoration
    pub sr: f64,
    /// Restoration of skid resistance
    pub rs: f64,
    /// Routine maintenance
    pub rm: f64,
}

impl Default for CostInputs {
    fn default() -> Self {
        Self {
            rr: 60.0,
            so: 40.0,
            sr: 15.0,
            rs: 5.0,
            rm: 1.0,
        }
    }
}

impl CostInputs {
    fn field(&self, category: MaintenanceCategory) -> &f64 {
        match category {
            MaintenanceCategory::RoadReconstruction => &self.rr,
            MaintenanceCategory::StructuralOverlay => &self.so,
            MaintenanceCategory::SurfaceRestoration => &self.sr,
            MaintenanceCategory::SkidResistance => &self.rs,
            MaintenanceCategory::RoutineMaintenance => &self.rm,
        }
    }

    fn field_mut(&mut self, category: MaintenanceCategory) -> &mut f64 {
        match category {
            MaintenanceCategory::RoadReconstruction => &mut self.rr,
            MaintenanceCategory::StructuralOverlay => &mut self.so,
            MaintenanceCategory::SurfaceRestoration => &mut self.sr,
            MaintenanceCategory::SkidResistance => &mut self.rs,
            MaintenanceCategory::RoutineMaintenance => &mut self.rm,
        }
    }

    /// The unit cost of treating a segment in `category`
    pub fn cost_per_square_metre(&self, category: MaintenanceCategory) -> MoneyPerSquareMetre {
        MoneyPerSquareMetre(*self.field(category))
    }

    /// Replace the unit cost for one category
    pub fn set(&mut self, category: MaintenanceCategory, value: f64) {
        *self.field_mut(category) = value;
    }
}

/// Apply a `name=value` override to either the thresholds or the costs.
///
/// Threshold names are those of [`ParameterKey`] (e.g. `overlay_iri`); costs are named by
/// category code prefixed with `cost_` (e.g. `cost_rr`).
pub fn apply_override(
    parameters: &mut MaintenanceParameters,
    costs: &mut CostInputs,
    assignment: &str,
) -> Result<()> {
    let (name, value) = assignment
        .split_once('=')
        .with_context(|| format!("Override must have the form name=value: {assignment}"))?;
    let (name, value) = (name.trim(), value.trim());
    let value: f64 = value
        .parse()
        .with_context(|| format!("Invalid value for {name}: {value}"))?;

    if let Some(code) = name.strip_prefix("cost_") {
        let category = MaintenanceCategory::iter()
            .find(|category| category.code() == code)
            .with_context(|| format!("Unknown cost: {name}"))?;
        costs.set(category, value);
    } else {
        let key: ParameterKey = name
            .parse()
            .with_context(|| format!("Unknown parameter: {name}"))?;
        parameters.set(key, value);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::rstest;

    #[test]
    fn test_parameter_key_names() {
        assert_eq!(ParameterKey::RestorationPsciA.to_string(), "restoration_psci_a");
        assert_eq!(
            "skid_mpd".parse::<ParameterKey>().unwrap(),
            ParameterKey::SkidMpd
        );
        assert_eq!(ParameterKey::iter().count(), 15);
    }

    #[test]
    fn test_set_single_parameter() {
        let mut params = MaintenanceParameters::default();
        params.set(ParameterKey::OverlayRut, 25.0);
        assert_eq!(params.overlay.rut, 25.0);
        assert_eq!(params.get(ParameterKey::OverlayRut), 25.0);
        assert_eq!(params.overlay.iri, 7.0);
    }

    #[test]
    fn test_get_matches_set() {
        let mut params = MaintenanceParameters::default();
        for (i, key) in ParameterKey::iter().enumerate() {
            params.set(key, 100.0 + i as f64);
        }
        for (i, (key, value)) in params.iter().enumerate() {
            assert_eq!(value, 100.0 + i as f64, "{key}");
        }

        let mut costs = CostInputs::default();
        for (i, category) in MaintenanceCategory::iter().enumerate() {
            costs.set(category, 10.0 * (i + 1) as f64);
        }
        for (i, category) in MaintenanceCategory::iter().enumerate() {
            assert_eq!(
                costs.cost_per_square_metre(category),
                MoneyPerSquareMetre(10.0 * (i + 1) as f64)
            );
        }
    }

    #[test]
    fn test_cost_per_square_metre() {
        let mut costs = CostInputs::default();
        assert_eq!(
            costs.cost_per_square_metre(MaintenanceCategory::RoadReconstruction),
            MoneyPerSquareMetre(60.0)
        );
        costs.set(MaintenanceCategory::RoutineMaintenance, 2.5);
        assert_eq!(costs.rm, 2.5);
    }

    #[rstest]
    #[case("overlay_iri=8", ParameterKey::OverlayIri, 8.0)]
    #[case(" skid_csc = 0.4 ", ParameterKey::SkidCsc, 0.4)]
    fn test_apply_parameter_override(
        #[case] assignment: &str,
        #[case] key: ParameterKey,
        #[case] expected: f64,
    ) {
        let mut params = MaintenanceParameters::default();
        let mut costs = CostInputs::default();
        apply_override(&mut params, &mut costs, assignment).unwrap();
        assert_eq!(params.get(key), expected);
        assert_eq!(costs, CostInputs::default());
    }

    #[test]
    fn test_apply_cost_override() {
        let mut params = MaintenanceParameters::default();
        let mut costs = CostInputs::default();
        apply_override(&mut params, &mut costs, "cost_so=45").unwrap();
        assert_eq!(costs.so, 45.0);
        assert_eq!(params, MaintenanceParameters::default());
    }

    #[rstest]
    #[case("overlay_iri", "Override must have the form name=value: overlay_iri")]
    #[case("overlay_iri=x", "Invalid value for overlay_iri: x")]
    #[case("foo=1", "Unknown parameter: foo")]
    #[case("cost_xx=1", "Unknown cost: cost_xx")]
    fn test_apply_override_invalid(#[case] assignment: &str, #[case] msg: &str) {
        let mut params = MaintenanceParameters::default();
        let mut costs = CostInputs::default();
        assert_error!(apply_override(&mut params, &mut costs, assignment), msg);
    }

    #[test]
    fn test_deserialise_partial() {
        let params: MaintenanceParameters = toml::from_str("[overlay]\niri = 9").unwrap();
        assert_eq!(params.overlay.iri, 9.0);
        assert_eq!(params.overlay.rut, 20.0);
        assert_eq!(params.reconstruction, ReconstructionThresholds::default());
    }
}
