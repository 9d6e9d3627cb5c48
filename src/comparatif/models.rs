use crate::comparatif::columns::ColumnSchema;
use crate::utils::{json_decimal, json_text};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Untyped property mapping sent by the CRM.
pub type RawComparatifInput = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnergyType {
    Gas,
    Electricity,
}

impl EnergyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyType::Gas => "GAS",
            EnergyType::Electricity => "ELECTRICITY",
        }
    }

    /// Fields that must be present and non-empty for this energy type.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            EnergyType::Gas => &["pce", "gasProfile", "routingRate"],
            EnergyType::Electricity => &["pdl", "segmentation"],
        }
    }

    /// Fields owned by the other energy type; they must be absent or empty.
    pub fn forbidden_fields(&self) -> &'static [&'static str] {
        match self {
            EnergyType::Gas => EnergyType::Electricity.required_fields(),
            EnergyType::Electricity => EnergyType::Gas.required_fields(),
        }
    }

    pub fn chart_title(energy_type: Option<EnergyType>) -> &'static str {
        match energy_type {
            Some(EnergyType::Gas) => "Évolution Gaz",
            Some(EnergyType::Electricity) => "Évolution Électricité",
            None => "Évolution des Prix",
        }
    }
}

impl FromStr for EnergyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GAS" => Ok(EnergyType::Gas),
            "ELECTRICITY" => Ok(EnergyType::Electricity),
            other => Err(format!("unsupported energy type '{}'", other)),
        }
    }
}

impl fmt::Display for EnergyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupplierKind {
    Current,
    Regular,
}

impl SupplierKind {
    pub fn from_type_fournisseur(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some(s) if s.trim().eq_ignore_ascii_case("CURRENT") => SupplierKind::Current,
            _ => SupplierKind::Regular,
        }
    }
}

/// One supplier's quoted rate set. The upstream attributes are kept as sent;
/// only the supplier kind and the cost are lifted into typed fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRateRecord {
    #[serde(skip)]
    pub kind: SupplierKind,
    #[serde(skip)]
    pub cost: Option<Decimal>,
    pub is_current: bool,
    pub is_best_offer: bool,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl ProviderRateRecord {
    pub fn from_attributes(mut attributes: Map<String, Value>) -> Self {
        // Derived flags are ours to compute
        attributes.remove("isBestOffer");
        attributes.remove("isCurrent");

        let kind = SupplierKind::from_type_fournisseur(attributes.get("typeFournisseur"));
        let cost = attributes.get("coutHTVA").and_then(json_decimal);
        Self {
            kind,
            cost,
            is_current: kind == SupplierKind::Current,
            is_best_offer: false,
            attributes,
        }
    }

    pub fn supplier(&self) -> String {
        json_text(self.attributes.get("fournisseur")).unwrap_or_default()
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Case-insensitive lookup, used for rate components ("HPH" vs "hph").
    pub fn field_ignore_case(&self, name: &str) -> Option<&Value> {
        self.attributes
            .get(name)
            .or_else(|| {
                self.attributes
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GasComparatif {
    pub pce: String,
    pub gas_profile: String,
    pub routing_rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectricityComparatif {
    pub pdl: String,
    pub segmentation: String,
    pub tarif_type: Option<String>,
    pub meter_param: Option<String>,
    pub columns: ColumnSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnergyDetails {
    Gas(GasComparatif),
    Electricity(ElectricityComparatif),
}

impl EnergyDetails {
    pub fn energy_type(&self) -> EnergyType {
        match self {
            EnergyDetails::Gas(_) => EnergyType::Gas,
            EnergyDetails::Electricity(_) => EnergyType::Electricity,
        }
    }

    pub fn delivery_point(&self) -> &str {
        match self {
            EnergyDetails::Gas(gas) => &gas.pce,
            EnergyDetails::Electricity(elec) => &elec.pdl,
        }
    }
}

/// Savings indicators formatted for display; `None` hides the indicator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsIndicators {
    pub ratio: Option<String>,
    pub difference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalComparatif {
    pub id: Option<String>,
    pub title: String,
    pub created_on: String,
    pub energy_type: EnergyType,
    #[serde(flatten)]
    pub energy: EnergyDetails,
    pub current_supplier: Option<String>,
    pub contract_start: String,
    pub contract_expiry: String,
    #[serde(rename = "ratioHTVA")]
    pub ratio_htva: Option<Value>,
    #[serde(rename = "differenceHTVA")]
    pub difference_htva: Option<Value>,
    pub savings: SavingsIndicators,
    pub comparatif_rate: Vec<ProviderRateRecord>,
}

impl CanonicalComparatif {
    pub fn columns(&self) -> Option<&ColumnSchema> {
        match &self.energy {
            EnergyDetails::Electricity(elec) => Some(&elec.columns),
            EnergyDetails::Gas(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn record(value: Value) -> ProviderRateRecord {
        match value {
            Value::Object(map) => ProviderRateRecord::from_attributes(map),
            _ => panic!("object expected"),
        }
    }

    #[test]
    fn test_energy_type_parsing() {
        assert_eq!(" gas ".parse::<EnergyType>().unwrap(), EnergyType::Gas);
        assert_eq!("ELECTRICITY".parse::<EnergyType>().unwrap(), EnergyType::Electricity);
        assert!("WATER".parse::<EnergyType>().is_err());
        assert_eq!(EnergyType::Gas.forbidden_fields(), &["pdl", "segmentation"]);
    }

    #[test]
    fn test_rate_record_lifts_kind_and_cost() {
        let current = record(json!({"fournisseur": "EDF", "typeFournisseur": "current", "coutHTVA": "1 200,50"}));
        assert_eq!(current.kind, SupplierKind::Current);
        assert_eq!(current.cost, Some(dec!(1200.50)));
        assert_eq!(current.supplier(), "EDF");

        let regular = record(json!({"fournisseur": "Ekwateur", "typeFournisseur": "ALTERNATIVE", "coutHTVA": null}));
        assert_eq!(regular.kind, SupplierKind::Regular);
        assert_eq!(regular.cost, None);
    }

    #[test]
    fn test_rate_record_serializes_attributes_flat() {
        let rec = record(json!({"fournisseur": "Engie", "rate2": 42.1, "HPH": 101}));
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["fournisseur"], "Engie");
        assert_eq!(value["rate2"], 42.1);
        assert_eq!(value["isBestOffer"], false);
        assert_eq!(rec.field_ignore_case("hph"), Some(&json!(101)));
    }
}
