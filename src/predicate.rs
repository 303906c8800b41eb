//! Boolean filter expressions equivalent to the classifier, for evaluation by a remote
//! attribute-query backend.
//!
//! Category predicates are derived mechanically from the [`DecisionTable`]: the predicate for a
//! category is the conjunction of the negated conditions of every higher-priority rule and the
//! category's own condition. Routine maintenance is the conjunction of all four negations. The
//! five predicates are therefore mutually exclusive and exhaustive, and agree with
//! [`DecisionTable::classify`] for every segment.
use crate::category::MaintenanceCategory;
use crate::parameters::MaintenanceParameters;
use crate::region::{RegionFilter, RegionID};
use crate::rules::{Clause, DecisionTable, Rule, Threshold};
use crate::segment::{Field, RoadSegment};
use indexmap::IndexMap;
use serde::Deserialize;
use strum::IntoEnumIterator;

/// The survey year whose condition fields are queried by default
pub const DEFAULT_SURVEY_YEAR: u32 = 2018;

/// Names of the attribute fields in the remote dataset
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSchema {
    /// Region (local authority) code field
    pub region: String,
    /// Roughness field
    pub iri: String,
    /// Rut depth field
    pub rut: String,
    /// Surface condition field
    pub psci: String,
    /// Skid resistance field
    pub csc: String,
    /// Texture depth field
    pub mpd: String,
    /// Measured feature length field, in metres
    pub length: String,
}

impl FieldSchema {
    /// The road survey schema, with condition fields for the given survey year
    pub fn for_survey_year(year: u32) -> Self {
        Self {
            region: "LA".into(),
            iri: format!("AIRI_{year}"),
            rut: format!("LRUT_{year}"),
            psci: format!("PSCI_Class_{year}"),
            csc: format!("CSC_Class_{year}"),
            mpd: format!("MPD_{year}"),
            length: "Shape_Length".into(),
        }
    }

    /// The remote name of a condition field
    pub fn field_name(&self, field: Field) -> &str {
        match field {
            Field::Iri => &self.iri,
            Field::Rut => &self.rut,
            Field::Psci => &self.psci,
            Field::Csc => &self.csc,
            Field::Mpd => &self.mpd,
        }
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self::for_survey_year(DEFAULT_SURVEY_YEAR)
    }
}

/// A boolean expression over segment attributes
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Holds for every segment
    True,
    /// A threshold comparison on a condition field
    Compare(Threshold),
    /// The segment lies in the given region
    RegionEq(RegionID),
    /// The segment lies in one of the given regions
    RegionIn(Vec<RegionID>),
    /// Negation
    Not(Box<Predicate>),
    /// Conjunction
    And(Vec<Predicate>),
    /// Disjunction
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Evaluate the predicate against an in-memory segment
    pub fn evaluate(&self, segment: &RoadSegment) -> bool {
        match self {
            Self::True => true,
            Self::Compare(threshold) => threshold.is_met(segment),
            Self::RegionEq(region) => segment.region == *region,
            Self::RegionIn(regions) => regions.contains(&segment.region),
            Self::Not(inner) => !inner.evaluate(segment),
            Self::And(terms) => terms.iter().all(|term| term.evaluate(segment)),
            Self::Or(terms) => terms.iter().any(|term| term.evaluate(segment)),
        }
    }

    /// Render the predicate as a SQL-like `WHERE` expression using the given field names.
    ///
    /// Conjunctions and disjunctions are always parenthesised; numbers are written in their
    /// shortest round-trip form (e.g. `12`, `0.35`).
    pub fn to_sql(&self, schema: &FieldSchema) -> String {
        match self {
            Self::True => "1=1".into(),
            Self::Compare(threshold) => format!(
                "{} {} {}",
                schema.field_name(threshold.field),
                threshold.comparison.operator(),
                threshold.value
            ),
            Self::RegionEq(region) => format!("{} = {}", schema.region, quote(region.as_str())),
            Self::RegionIn(regions) => {
                let list: Vec<_> = regions.iter().map(|r| quote(r.as_str())).collect();
                format!("{} IN ({})", schema.region, list.join(", "))
            }
            Self::Not(inner) => match inner.as_ref() {
                Self::And(_) | Self::Or(_) => format!("NOT {}", inner.to_sql(schema)),
                _ => format!("NOT ({})", inner.to_sql(schema)),
            },
            Self::And(terms) => join_terms(terms, " AND ", schema),
            Self::Or(terms) => join_terms(terms, " OR ", schema),
        }
    }
}

fn join_terms(terms: &[Predicate], separator: &str, schema: &FieldSchema) -> String {
    let rendered: Vec<_> = terms.iter().map(|term| term.to_sql(schema)).collect();
    format!("({})", rendered.join(separator))
}

/// Quote a string literal, doubling any embedded single quotes
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn clause_predicate(clause: &Clause) -> Predicate {
    match clause.as_slice() {
        [threshold] => Predicate::Compare(*threshold),
        thresholds => Predicate::And(thresholds.iter().copied().map(Predicate::Compare).collect()),
    }
}

/// The rule's own condition, ignoring higher-priority rules
pub fn rule_predicate(rule: &Rule) -> Predicate {
    Predicate::Or(rule.clauses.iter().map(clause_predicate).collect())
}

impl DecisionTable {
    /// The predicate selecting exactly the segments [`DecisionTable::classify`] assigns to
    /// `category`
    pub fn category_predicate(&self, category: MaintenanceCategory) -> Predicate {
        let mut terms: Vec<_> = self
            .rules_before(category)
            .iter()
            .map(|rule| Predicate::Not(Box::new(rule_predicate(rule))))
            .collect();

        match self.rule(category) {
            None => Predicate::And(terms),
            Some(rule) if terms.is_empty() => rule_predicate(rule),
            Some(rule) => {
                terms.push(rule_predicate(rule));
                Predicate::And(terms)
            }
        }
    }
}

/// Build the predicate for one category from the thresholds
pub fn build_category_predicate(
    params: &MaintenanceParameters,
    category: MaintenanceCategory,
) -> Predicate {
    DecisionTable::new(params).category_predicate(category)
}

/// Build the predicates for all five categories, in priority order
pub fn build_all_category_predicates(
    params: &MaintenanceParameters,
) -> IndexMap<MaintenanceCategory, Predicate> {
    let table = DecisionTable::new(params);
    MaintenanceCategory::iter()
        .map(|category| (category, table.category_predicate(category)))
        .collect()
}

/// Build the predicate selecting segments in the filtered regions.
///
/// "All" and an empty selection select everything; one region is an equality test; several
/// regions are a set-membership test.
pub fn build_region_predicate(filter: &RegionFilter) -> Predicate {
    match filter {
        RegionFilter::All => Predicate::True,
        RegionFilter::Regions(regions) => match regions.len() {
            0 => Predicate::True,
            1 => Predicate::RegionEq(regions[0].clone()),
            _ => Predicate::RegionIn(regions.iter().cloned().collect()),
        },
    }
}

/// Intersect a region predicate with an optional category predicate
pub fn combine(region: Predicate, category: Option<Predicate>) -> Predicate {
    match (region, category) {
        (region, None) => region,
        (Predicate::True, Some(category)) => category,
        (region, Some(category)) => Predicate::And(vec![region, category]),
    }
}

/// Build the combined predicate for a region filter and, optionally, one category
pub fn build_combined_predicate(
    params: &MaintenanceParameters,
    filter: &RegionFilter,
    category: Option<MaintenanceCategory>,
) -> Predicate {
    combine(
        build_region_predicate(filter),
        category.map(|category| build_category_predicate(params, category)),
    )
}
