//! Tariff table columns for electricity comparatifs.
//!
//! A single table maps the segmentation class (and, for C5, the meter
//! parameter) to the rate components shown in the table. Bare component codes
//! and unit-labeled headers are both derived from it, so they stay in step.

use serde::Serialize;

pub const PRICE_UNIT: &str = "€/MWh";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RateComponent {
    Hph,
    Hch,
    Hpe,
    Hce,
    Pointe,
    Hp,
    Hc,
    Base,
}

impl RateComponent {
    pub const ALL: [RateComponent; 8] = [
        RateComponent::Hph,
        RateComponent::Hch,
        RateComponent::Hpe,
        RateComponent::Hce,
        RateComponent::Pointe,
        RateComponent::Hp,
        RateComponent::Hc,
        RateComponent::Base,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            RateComponent::Hph => "HPH",
            RateComponent::Hch => "HCH",
            RateComponent::Hpe => "HPE",
            RateComponent::Hce => "HCE",
            RateComponent::Pointe => "POINTE",
            RateComponent::Hp => "HP",
            RateComponent::Hc => "HC",
            RateComponent::Base => "BASE",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL.into_iter().find(|c| c.code().eq_ignore_ascii_case(code))
    }

    pub fn header(&self) -> String {
        format!("{} {}", self.code(), PRICE_UNIT)
    }
}

/// Row key of the column table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaKey {
    C1,
    C2,
    C3,
    C4,
    C5Base,
    C5C4,
    C5Hp,
    Fallback,
}

use RateComponent::*;

const FIVE_SLOTS: &[RateComponent] = &[Hph, Hch, Hpe, Hce, Pointe];
const FOUR_SLOTS: &[RateComponent] = &[Hph, Hch, Hpe, Hce];
const PEAK_OFF_PEAK: &[RateComponent] = &[Hp, Hc];
const SINGLE_RATE: &[RateComponent] = &[Base];

const COLUMN_TABLE: &[(SchemaKey, &[RateComponent])] = &[
    (SchemaKey::C1, FIVE_SLOTS),
    (SchemaKey::C2, FIVE_SLOTS),
    (SchemaKey::C3, FIVE_SLOTS),
    (SchemaKey::C4, FOUR_SLOTS),
    (SchemaKey::C5Base, SINGLE_RATE),
    (SchemaKey::C5C4, FOUR_SLOTS),
    (SchemaKey::C5Hp, PEAK_OFF_PEAK),
    (SchemaKey::Fallback, PEAK_OFF_PEAK),
];

fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_uppercase()
}

impl SchemaKey {
    pub fn resolve(segmentation: &str, meter_param: &str) -> Self {
        match normalize(segmentation).as_str() {
            "C1" => SchemaKey::C1,
            "C2" => SchemaKey::C2,
            "C3" => SchemaKey::C3,
            "C4" => SchemaKey::C4,
            "C5" => match normalize(meter_param).as_str() {
                "C5BASE" => SchemaKey::C5Base,
                "C5C4" => SchemaKey::C5C4,
                "C5HP" => SchemaKey::C5Hp,
                _ => SchemaKey::Fallback,
            },
            _ => SchemaKey::Fallback,
        }
    }

    pub fn components(self) -> &'static [RateComponent] {
        COLUMN_TABLE
            .iter()
            .find(|(key, _)| *key == self)
            .map(|(_, components)| *components)
            .unwrap_or(PEAK_OFF_PEAK)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    pub key: SchemaKey,
    pub tarif_type: Option<String>,
    pub components: Vec<RateComponent>,
    pub labels: Vec<String>,
}

impl ColumnSchema {
    fn from_key(key: SchemaKey, tarif_type: Option<String>) -> Self {
        let components = key.components().to_vec();
        let labels = components.iter().map(RateComponent::header).collect();
        Self {
            key,
            tarif_type,
            components,
            labels,
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Position of a component code in this schema, for ordering chart series.
    pub fn position(&self, code: &str) -> Option<usize> {
        let component = RateComponent::from_code(code)?;
        self.components.iter().position(|c| *c == component)
    }
}

/// Resolves the rate components for a tariff table. All inputs are trimmed and
/// matched case-insensitively; `tarif_type` is carried along for the table
/// caption but never changes the selected components.
pub fn resolve_columns(segmentation: &str, tarif_type: &str, meter_param: &str) -> ColumnSchema {
    let key = SchemaKey::resolve(segmentation, meter_param);
    let tarif_type = Some(tarif_type.trim().to_string()).filter(|t| !t.is_empty());
    ColumnSchema::from_key(key, tarif_type)
}
