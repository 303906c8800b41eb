//! The maintenance decision table.
//!
//! Each rule pairs a category with a disjunction of clauses, where each clause is a conjunction
//! of threshold comparisons. The rules are held in priority order. Both the direct classifier and
//! the remote query predicates are derived from this one table, so they cannot disagree.
use crate::category::MaintenanceCategory;
use crate::parameters::MaintenanceParameters;
use crate::segment::{Field, RoadSegment};
use std::fmt;

/// Direction of a threshold comparison. Both are inclusive of the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Measurement is greater than or equal to the threshold
    AtLeast,
    /// Measurement is less than or equal to the threshold
    AtMost,
}

impl Comparison {
    /// The operator as written in a query expression
    pub fn operator(self) -> &'static str {
        match self {
            Self::AtLeast => ">=",
            Self::AtMost => "<=",
        }
    }

    /// Apply the comparison to raw values
    pub fn holds(self, measured: f64, threshold: f64) -> bool {
        match self {
            Self::AtLeast => measured >= threshold,
            Self::AtMost => measured <= threshold,
        }
    }
}

/// A single comparison of a measurement against a threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    /// The measurement compared
    pub field: Field,
    /// The comparison direction
    pub comparison: Comparison,
    /// The threshold value
    pub value: f64,
}

impl Threshold {
    /// Whether `segment` meets this threshold
    pub fn is_met(&self, segment: &RoadSegment) -> bool {
        self.comparison.holds(self.field.value(segment), self.value)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.comparison.operator(), self.value)
    }
}

fn at_least(field: Field, value: f64) -> Threshold {
    Threshold {
        field,
        comparison: Comparison::AtLeast,
        value,
    }
}

fn at_most(field: Field, value: f64) -> Threshold {
    Threshold {
        field,
        comparison: Comparison::AtMost,
        value,
    }
}

/// A conjunction of thresholds
pub type Clause = Vec<Threshold>;

/// A category together with the condition which triggers it
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// The category assigned when the condition holds
    pub category: MaintenanceCategory,
    /// Disjunction of clauses
    pub clauses: Vec<Clause>,
}

impl Rule {
    /// Whether the rule's own condition holds for `segment`, ignoring higher-priority rules
    pub fn is_triggered(&self, segment: &RoadSegment) -> bool {
        self.clauses
            .iter()
            .any(|clause| clause.iter().all(|threshold| threshold.is_met(segment)))
    }
}

/// The ordered list of rules. Segments meeting no rule receive
/// [`MaintenanceCategory::RoutineMaintenance`].
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTable {
    rules: Vec<Rule>,
}

impl DecisionTable {
    /// Build the decision table for the given thresholds
    pub fn new(params: &MaintenanceParameters) -> Self {
        let rec = &params.reconstruction;
        let ovl = &params.overlay;
        let res = &params.restoration;
        let skid = &params.skid_resistance;

        let rules = vec![
            Rule {
                category: MaintenanceCategory::RoadReconstruction,
                clauses: vec![
                    vec![at_least(Field::Iri, rec.iri)],
                    vec![at_least(Field::Rut, rec.rut)],
                    vec![at_most(Field::Psci, rec.psci)],
                ],
            },
            Rule {
                category: MaintenanceCategory::StructuralOverlay,
                clauses: vec![
                    vec![at_least(Field::Iri, ovl.iri)],
                    vec![at_least(Field::Rut, ovl.rut)],
                    vec![at_most(Field::Psci, ovl.psci)],
                ],
            },
            Rule {
                category: MaintenanceCategory::SurfaceRestoration,
                clauses: vec![
                    vec![at_most(Field::Psci, res.psci_a)],
                    vec![at_most(Field::Psci, res.psci_b), at_least(Field::Iri, res.iri)],
                    vec![at_most(Field::Psci, res.psci_c)],
                ],
            },
            Rule {
                category: MaintenanceCategory::SkidResistance,
                clauses: vec![
                    vec![at_most(Field::Psci, skid.psci_a)],
                    vec![at_most(Field::Psci, skid.psci_b), at_most(Field::Csc, skid.csc)],
                    vec![at_most(Field::Psci, skid.psci_c), at_most(Field::Mpd, skid.mpd)],
                ],
            },
        ];

        Self { rules }
    }

    /// The rules in priority order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The rule for `category`, or `None` for the fallback category
    pub fn rule(&self, category: MaintenanceCategory) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.category == category)
    }

    /// The rules which take priority over `category`.
    ///
    /// For the fallback category this is every rule.
    pub fn rules_before(&self, category: MaintenanceCategory) -> &[Rule] {
        let end = self
            .rules
            .iter()
            .position(|rule| rule.category == category)
            .unwrap_or(self.rules.len());
        &self.rules[..end]
    }
}
