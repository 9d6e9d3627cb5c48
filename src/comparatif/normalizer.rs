use crate::comparatif::columns::{resolve_columns, ColumnSchema};
use crate::comparatif::models::{
    CanonicalComparatif, ElectricityComparatif, EnergyDetails, EnergyType, GasComparatif,
    ProviderRateRecord, RawComparatifInput, SavingsIndicators,
};
use crate::comparatif::paginator::best_offer_index;
use crate::http::ApiError;
use crate::utils::{format_epoch_millis, is_blank, json_decimal, json_text, mask_identifier, DateZone};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

pub const MISSING_DATE: &str = "-";

/// Attributes every rate item must carry, whatever the energy type.
const COMMON_RATE_FIELDS: &[&str] = &[
    "partnerPhoto",
    "abonnement",
    "partCee",
    "cta",
    "rate3",
    "rate4",
    "rate5",
    "rate6",
    "rate7",
];

const GAS_RATE_FIELDS: &[&str] = &["rate2", "ticgn"];

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub title: String,
    pub zone: DateZone,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            title: "Contexte global".to_string(),
            zone: DateZone::Utc,
        }
    }
}

/// Validates a raw comparatif and builds its canonical form. Pure: the same
/// input and options always give the same output.
pub fn normalize(
    raw: &RawComparatifInput,
    options: &NormalizeOptions,
) -> Result<CanonicalComparatif, ApiError> {
    let created_on = parse_created_on(raw.get("createdOn"), options.zone)?;
    let energy_type = parse_energy_type(raw.get("energyType"))?;

    for field in energy_type.required_fields() {
        if is_unset(raw.get(*field)) {
            return Err(ApiError::validation(
                *field,
                format!("missing required {} field", energy_type),
            ));
        }
    }

    for field in energy_type.forbidden_fields() {
        if !is_unset(raw.get(*field)) {
            return Err(ApiError::validation(
                *field,
                format!("not allowed for {} energyType", energy_type),
            ));
        }
    }

    let energy = match energy_type {
        EnergyType::Gas => EnergyDetails::Gas(GasComparatif {
            pce: text(raw, "pce"),
            gas_profile: text(raw, "gasProfile"),
            routing_rate: text(raw, "routingRate"),
        }),
        EnergyType::Electricity => {
            let segmentation = text(raw, "segmentation");
            let tarif_type = json_text(raw.get("tarifType"));
            let meter_param = json_text(raw.get("meterParam"));
            let columns = resolve_columns(
                &segmentation,
                tarif_type.as_deref().unwrap_or_default(),
                meter_param.as_deref().unwrap_or_default(),
            );
            EnergyDetails::Electricity(ElectricityComparatif {
                pdl: text(raw, "pdl"),
                segmentation: segmentation.to_ascii_uppercase(),
                tarif_type,
                meter_param,
                columns,
            })
        }
    };

    let columns = match &energy {
        EnergyDetails::Electricity(elec) => Some(&elec.columns),
        EnergyDetails::Gas(_) => None,
    };
    let mut rates = parse_rates(raw.get("comparatifRate"), energy_type, columns)?;

    if let Some(best) = best_offer_index(&rates) {
        rates[best].is_best_offer = true;
    }

    let current_supplier = json_text(raw.get("currentSupplier")).or_else(|| {
        rates
            .iter()
            .find(|r| r.is_current)
            .map(ProviderRateRecord::supplier)
            .filter(|s| !s.is_empty())
    });

    let ratio_htva = raw.get("ratioHTVA").filter(|v| !is_blank(Some(v))).cloned();
    let difference_htva = raw.get("differenceHTVA").filter(|v| !is_blank(Some(v))).cloned();
    let savings = SavingsIndicators {
        ratio: format_saving(ratio_htva.as_ref(), "%"),
        difference: format_saving(difference_htva.as_ref(), "€"),
    };

    tracing::debug!(
        energy_type = %energy_type,
        delivery_point = %mask_identifier(energy.delivery_point()),
        rates = rates.len(),
        "comparatif normalized"
    );

    Ok(CanonicalComparatif {
        id: json_text(raw.get("id")),
        title: options.title.clone(),
        created_on,
        energy_type,
        energy,
        current_supplier,
        contract_start: optional_date(raw.get("contractStart"), options.zone),
        contract_expiry: optional_date(raw.get("contractExpiry"), options.zone),
        ratio_htva,
        difference_htva,
        savings,
        comparatif_rate: rates,
    })
}

/// Presence rule for the per-energy field sets: blank, or a numeric zero.
fn is_unset(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        other => is_blank(other),
    }
}

fn text(raw: &RawComparatifInput, field: &str) -> String {
    json_text(raw.get(field)).unwrap_or_default()
}

fn epoch_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.round() as i64))
        }
        _ => None,
    }
}

fn parse_created_on(value: Option<&Value>, zone: DateZone) -> Result<String, ApiError> {
    let value = match value {
        Some(v) if !is_blank(Some(v)) => v,
        _ => return Err(ApiError::validation("createdOn", "missing required field")),
    };

    let millis = epoch_millis(value)
        .ok_or_else(|| ApiError::validation("createdOn", format!("invalid value {}", value)))?;
    if millis == 0 {
        return Err(ApiError::validation("createdOn", "missing required field"));
    }

    format_epoch_millis(millis, zone)
        .ok_or_else(|| ApiError::validation("createdOn", format!("timestamp out of range: {}", millis)))
}

fn parse_energy_type(value: Option<&Value>) -> Result<EnergyType, ApiError> {
    let reason = "invalid or missing energyType, must be 'GAS' or 'ELECTRICITY'";
    value
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<EnergyType>().ok())
        .ok_or_else(|| ApiError::validation("energyType", reason))
}

/// Optional contract dates: absent renders as a dash, garbage is logged and
/// rendered the same way.
fn optional_date(value: Option<&Value>, zone: DateZone) -> String {
    if is_blank(value) {
        return MISSING_DATE.to_string();
    }
    match value.and_then(epoch_millis).and_then(|ms| format_epoch_millis(ms, zone)) {
        Some(date) => date,
        None => {
            tracing::warn!("⚠️ Ignoring unparseable contract date: {:?}", value);
            MISSING_DATE.to_string()
        }
    }
}

/// Savings indicators are only shown for an actual saving or break-even.
pub fn format_saving(value: Option<&Value>, suffix: &str) -> Option<String> {
    let value = value?;
    let amount = json_decimal(value)?;
    if amount > Decimal::ZERO {
        return None;
    }
    let shown = match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    Some(format!("{}{}", shown, suffix))
}

fn parse_rates(
    value: Option<&Value>,
    energy_type: EnergyType,
    columns: Option<&ColumnSchema>,
) -> Result<Vec<ProviderRateRecord>, ApiError> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ApiError::validation("comparatifRate", "must be a list")),
    };

    let component_fields: Vec<&'static str> = columns
        .map(|schema| schema.components.iter().map(|c| c.code()).collect())
        .unwrap_or_default();

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| -> Result<ProviderRateRecord, ApiError> {
            let position = idx + 1;
            let attributes: &Map<String, Value> = item.as_object().ok_or_else(|| {
                ApiError::validation(
                    format!("comparatifRate[{}]", position),
                    "rate item must be an object",
                )
            })?;

            let record = ProviderRateRecord::from_attributes(attributes.clone());

            let energy_fields: &[&str] = match energy_type {
                EnergyType::Gas => GAS_RATE_FIELDS,
                EnergyType::Electricity => &component_fields,
            };

            for field in COMMON_RATE_FIELDS.iter().chain(energy_fields) {
                let present = if energy_type == EnergyType::Electricity && energy_fields.contains(field) {
                    record.field_ignore_case(field)
                } else {
                    record.field(field)
                };
                if is_blank(present) {
                    return Err(ApiError::validation(
                        format!("comparatifRate[{}].{}", position, field),
                        format!("missing or empty field '{}' in comparatifRate item {}", field, position),
                    ));
                }
            }

            Ok(record)
        })
        .collect()
}
