//! Builds the render tree the HTML template consumes: client identity, the
//! canonical comparatif, chart images, paginated tariff rows and the static
//! French copy (every text can be overridden from the request payload).

use crate::comparatif::paginator::paginate;
use crate::comparatif::{CanonicalComparatif, EnergyDetails, EnergyType, ProviderRateRecord, RawComparatifInput};
use crate::utils::json_text;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_TITLE: &str = "VOLT CONSULTING - Energy Services Presentation";
pub const EMPTY_CELL: &str = "-";

const SUPPLIER_HEADER: &str = "Fournisseur";

const GAS_COLUMNS: &[&str] = &[
    SUPPLIER_HEADER,
    "Molécule €/MWh",
    "Abonnement €/mois",
    "CEE €/MWh",
    "CTA €/an",
    "TICGN €/MWh",
    "TOTAL €/an",
];
const GAS_CELL_FIELDS: &[&str] = &["rate2", "abonnement", "partCee", "cta", "ticgn", "coutHTVA"];

const ELECTRICITY_TRAILING_COLUMNS: &[&str] = &["Abonnement €/mois", "CEE €/MWh", "CTA €/an", "TOTAL €/an"];
const ELECTRICITY_TRAILING_FIELDS: &[&str] = &["abonnement", "partCee", "cta", "coutHTVA"];

const COMPARISON_LABELS: &[&str] = &[
    "Budget Énergétique <br>en €/an",
    "Distribution <br>en €/an",
    "Taxes <br>en €/an",
    "Abonnement <br>en €/an",
    "CEE <br>en €/an",
    "CTA <br>en €/an",
    "Budget HTVA <br>en €/an",
];
const COMPARISON_FIELDS: &[&str] = &["rate3", "rate4", "rate5", "rate6", "rate7", "cta", "coutHTVA"];

/// (image key, request override key, static path)
const DEFAULT_IMAGES: &[(&str, Option<&str>, &str)] = &[
    ("left", None, "image/side2-removebg-preview.png"),
    ("right", None, "image/side-removebg-preview.png"),
    ("logo", None, "image/volt1-removebg-preview.png"),
    ("side333", Some("side3"), "image/side333-removebg-preview.png"),
    ("volt_image1", None, "image/volt_image1.png"),
    ("icon", Some("icon"), "image/buld-removebg-preview.png"),
    ("Screenshot1", Some("Screenshot1"), "image/Screenshot_2025-08-18_135847-removebg-preview.png"),
    ("Screenshot2", Some("Screenshot2"), "image/Screenshot_2025-08-18_131641-removebg-preview.png"),
    ("black", Some("black"), "image/black-removebg-preview.png"),
    ("zero", Some("zero"), "image/zero-removebg-preview.png"),
    ("icon1", Some("icon1"), "image/icon-removebg-preview.png"),
    ("whitee", Some("whitee"), "image/whiteee.png"),
    ("con", Some("con"), "image/Screenshot_2025-08-18_164713-removebg-preview.png"),
    ("con5", Some("con5"), "image/Screenshot_2025-08-18_164344-removebg-preview.png"),
    ("Hmm", Some("Hmm"), "image/Hmm-removebg-preview.png"),
    ("last", Some("last"), "image/circle-black-removebg-preview.png"),
    ("double", Some("double"), "image/double-removebg-preview.png"),
];

/// Where static assets are served from, as seen by the browser printing the page.
#[derive(Debug, Clone)]
pub struct AssetContext {
    pub base_url: String,
    pub static_url: String,
}

impl AssetContext {
    pub fn new(scheme: &str, host: &str, static_url: &str) -> Self {
        Self {
            base_url: format!("{}://{}", scheme, host),
            static_url: static_url.to_string(),
        }
    }

    pub fn static_asset(&self, path: &str) -> String {
        let prefix = self.static_url.trim_matches('/');
        let path = path.trim_start_matches('/');
        if prefix.is_empty() {
            format!("{}/{}", self.base_url, path)
        } else {
            format!("{}/{}/{}", self.base_url, prefix, path)
        }
    }
}

/// Chart images as data URIs.
#[derive(Debug, Clone, Default)]
pub struct ChartImages {
    pub price: Option<String>,
    pub consumption: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientIdentity {
    pub client_society: String,
    pub client_siret: String,
    pub client_first_name: String,
    pub client_last_name: String,
    pub client_email: String,
    pub client_phone_number: String,
}

impl ClientIdentity {
    pub fn from_payload(data: &RawComparatifInput) -> Self {
        let field = |key: &str| json_text(data.get(key)).unwrap_or_default();
        Self {
            client_society: field("clientSociety"),
            client_siret: field("clientSiret"),
            client_first_name: field("clientFirstName"),
            client_last_name: field("clientLastName"),
            client_email: field("clientEmail"),
            client_phone_number: field("clientPhoneNumber"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RateRow {
    /// Position in the canonical rate list.
    #[serde(skip)]
    pub index: usize,
    pub supplier: String,
    pub partner_photo: Option<String>,
    pub is_current: bool,
    pub is_best_offer: bool,
    /// The "offres consultées" labels row goes right above this row.
    pub labels_before: bool,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatePage {
    pub show_header: bool,
    pub show_labels: bool,
    /// Labels row closes the table (the page has no alternative supplier).
    pub trailing_labels: bool,
    pub rows: Vec<RateRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyPresentation {
    pub title: String,
    pub description: String,
    pub quote: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetSection {
    pub title: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TenderResults {
    pub title: String,
    pub introduction: String,
    pub pricing_policy: String,
    pub pricing_explanation: String,
    pub stability_benefits: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonTable {
    pub section_title: String,
    pub last_text: String,
    pub labels: Vec<String>,
    pub rows: Vec<RateRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TenderTable {
    pub title: String,
    pub tarif_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeSection {
    pub title: String,
    pub text: String,
    pub quote: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactInfo {
    pub company_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Presentation<'a> {
    pub title: String,
    pub document_type: EnergyType,
    pub client: ClientIdentity,
    pub images: BTreeMap<String, String>,
    pub chart: Option<String>,
    pub consumption_chart: Option<String>,
    pub comparatif: &'a CanonicalComparatif,
    pub columns: Vec<String>,
    pub rate_pages: Vec<RatePage>,
    pub company_presentation: CompanyPresentation,
    pub budget_global: BudgetSection,
    pub tender_results: TenderResults,
    pub comparison_table: ComparisonTable,
    pub tender_table: TenderTable,
    pub change_section: ChangeSection,
    pub contact_info: ContactInfo,
}

fn text_or(data: &RawComparatifInput, key: &str, default: &str) -> String {
    json_text(data.get(key))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// A list override is only taken when it has the expected length; anything
/// else would misalign headers and cells.
fn list_or(data: &RawComparatifInput, key: &str, default: Vec<String>) -> Vec<String> {
    let Some(items) = data.get(key).and_then(Value::as_array) else {
        return default;
    };
    let items: Vec<String> = items.iter().map(|v| json_text(Some(v)).unwrap_or_default()).collect();
    if items.len() == default.len() {
        items
    } else {
        tracing::warn!(
            "Ignoring '{}' override: {} entries, expected {}",
            key,
            items.len(),
            default.len()
        );
        default
    }
}

fn cell(value: Option<&Value>) -> String {
    json_text(value)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| EMPTY_CELL.to_string())
}

fn build_images(data: &RawComparatifInput, assets: &AssetContext) -> BTreeMap<String, String> {
    let mut images: BTreeMap<String, String> = DEFAULT_IMAGES
        .iter()
        .map(|(key, override_key, path)| {
            let url = override_key
                .and_then(|k| json_text(data.get(k)))
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| assets.static_asset(path));
            (key.to_string(), url)
        })
        .collect();

    if let Some(overrides) = data.get("images").and_then(Value::as_object) {
        for (key, value) in overrides {
            if let Some(url) = json_text(Some(value)).filter(|s| !s.is_empty()) {
                images.insert(key.clone(), url);
            }
        }
    }
    images
}

/// Header row of the tariff table and the per-record cell extractor that
/// matches it.
fn tariff_columns(data: &RawComparatifInput, energy: &EnergyDetails) -> (Vec<String>, Vec<String>) {
    let (headers, fields): (Vec<String>, Vec<String>) = match energy {
        EnergyDetails::Gas(_) => (
            GAS_COLUMNS.iter().map(|s| s.to_string()).collect(),
            GAS_CELL_FIELDS.iter().map(|s| s.to_string()).collect(),
        ),
        EnergyDetails::Electricity(elec) => {
            let mut headers = vec![SUPPLIER_HEADER.to_string()];
            headers.extend(elec.columns.labels.iter().cloned());
            headers.extend(ELECTRICITY_TRAILING_COLUMNS.iter().map(|s| s.to_string()));

            let mut fields: Vec<String> = elec.columns.components.iter().map(|c| c.code().to_string()).collect();
            fields.extend(ELECTRICITY_TRAILING_FIELDS.iter().map(|s| s.to_string()));
            (headers, fields)
        }
    };
    (list_or(data, "columns", headers), fields)
}

fn rate_row(index: usize, record: &ProviderRateRecord, fields: &[String], is_best_offer: bool) -> RateRow {
    RateRow {
        index,
        supplier: record.supplier(),
        partner_photo: json_text(record.field("partnerPhoto")).filter(|s| !s.is_empty()),
        is_current: record.is_current,
        is_best_offer,
        labels_before: false,
        cells: fields
            .iter()
            .map(|f| cell(record.field_ignore_case(f)))
            .collect(),
    }
}

fn build_rate_pages(comparatif: &CanonicalComparatif, fields: &[String]) -> Vec<RatePage> {
    let rates = &comparatif.comparatif_rate;
    paginate(rates)
        .into_iter()
        .map(|page| {
            let mut rows: Vec<RateRow> = page
                .rows
                .iter()
                .map(|placed| rate_row(placed.index, &rates[placed.index], fields, placed.is_best_offer))
                .collect();
            let mut trailing_labels = false;
            if page.show_labels {
                match rows.iter_mut().find(|row| !row.is_current) {
                    Some(first_regular) => first_regular.labels_before = true,
                    None => trailing_labels = true,
                }
            }
            RatePage {
                show_header: page.show_header,
                show_labels: page.show_labels,
                trailing_labels,
                rows,
            }
        })
        .collect()
}

/// Current offers followed by the renewal offer (the best offer, or the
/// cheapest alternative when none beats the current contract).
fn comparison_rows(rate_pages: &[RatePage], comparatif: &CanonicalComparatif) -> Vec<RateRow> {
    let fields: Vec<String> = COMPARISON_FIELDS.iter().map(|s| s.to_string()).collect();
    let rates = &comparatif.comparatif_rate;

    let mut rows: Vec<RateRow> = rates
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_current)
        .map(|(index, r)| rate_row(index, r, &fields, false))
        .collect();

    let renewal = rates.iter().position(|r| r.is_best_offer).or_else(|| {
        rate_pages
            .iter()
            .flat_map(|p| p.rows.iter())
            .find(|row| !row.is_current)
            .map(|row| row.index)
    });
    if let Some((index, record)) = renewal.and_then(|index| rates.get(index).map(|r| (index, r))) {
        rows.push(rate_row(index, record, &fields, record.is_best_offer));
    }
    rows
}

pub fn build_presentation<'a>(
    data: &RawComparatifInput,
    comparatif: &'a CanonicalComparatif,
    charts: ChartImages,
    assets: &AssetContext,
) -> Presentation<'a> {
    let (columns, fields) = tariff_columns(data, &comparatif.energy);
    let rate_pages = build_rate_pages(comparatif, &fields);
    let comparison = comparison_rows(&rate_pages, comparatif);

    let tarif_type = match &comparatif.energy {
        EnergyDetails::Electricity(elec) => elec.columns.tarif_type.clone(),
        EnergyDetails::Gas(_) => None,
    };

    Presentation {
        title: text_or(data, "title", DEFAULT_TITLE),
        document_type: comparatif.energy_type,
        client: ClientIdentity::from_payload(data),
        images: build_images(data, assets),
        chart: charts.price,
        consumption_chart: charts.consumption,
        comparatif,
        columns,
        rate_pages,
        company_presentation: CompanyPresentation {
            title: text_or(data, "company_title", "L'ÉNERGIE DE VOTRE<br> ENTREPRISE, NOTRE EXPERTISE"),
            description: text_or(
                data,
                "description",
                "<b>Volt Consulting</b> est votre partenaire de confiance dans la <b>gestion énergétique B2B</b>. \
                 Notre proximité et notre engagement nous permettent de comprendre vos besoins <b>spécifiques</b>. \
                 Nous vous accompagnons dans le choix du fournisseur d'énergie optimal, tout en maximisant l'efficacité énergétique. \
                 Nos réussites parlent d'elles-mêmes, avec des <b>économies mesurables</b> pour nos clients.",
            ),
            quote: text_or(data, "quote", "Faites équipe avec nous pour un avenir énergétique plus efficace."),
        },
        budget_global: BudgetSection {
            title: text_or(data, "budget_title", "BUDGET GLOBAL"),
            subtitle: text_or(data, "budget_subtitle", "La synthèse"),
        },
        tender_results: TenderResults {
            title: text_or(data, "tender_title", "RÉSULTAT DE L'APPEL D'OFFRE"),
            introduction: text_or(
                data,
                "introduction",
                "Lors de notre processus d'appel d'offres, <b>nous avons sollicité la participation de<br> plusieurs fournisseurs d'énergie</b>, \
                 cherchant à identifier le partenaire idéal pour<br> vous. Pour ce faire, nous avons établi des critères stricts, \
                 en mettant l'accent sur<br> <b>la qualité du service clientèle et en privilégiant les fournisseurs basés en<br> France.</b> \
                 Nous avons fait ce choix en nous plaçant du côté du consommateur.",
            ),
            pricing_policy: text_or(data, "pricing_policy", "Nous privilégions les prix fixes."),
            pricing_explanation: text_or(
                data,
                "pricing_explanation",
                "En cas d'augmentation du marché du gaz et d'électricité, c'est le fournisseur qui<br> subira l'impact des variations de prix, et non l'inverse.",
            ),
            stability_benefits: text_or(
                data,
                "stability_benefits",
                "Cela nous permet d'offrir à nos clients la stabilité budgétaire et la capacité d'anticiper les coûts<br>\
                 sur les prochaines années. Dans le contexte actuel, marqué par la volatilité des prix et<br> \
                 l'incertitude liée aux conflits mondiaux, il est essentiel de sécuriser les prix sur une période à long<br> terme.",
            ),
        },
        comparison_table: ComparisonTable {
            section_title: text_or(data, "section_title", "Offre Actuelle / de renouvellement"),
            last_text: text_or(
                data,
                "comparison_note",
                "Ce comparatif tient compte de votre consommation au cours des douze derniers mois. \
                 Les prix mentionnés sont variables au jour de la consultation, étant donné qu'ils sont sujets à la fluctuation des prix sur le marché de l'énergie. \
                 Ils sont non contractuels. Il est important de noter que ce comparatif se base uniquement sur votre historique de consommation et ne prend pas en considération vos besoins énergétiques futurs.",
            ),
            labels: list_or(data, "labels", COMPARISON_LABELS.iter().map(|s| s.to_string()).collect()),
            rows: comparison,
        },
        tender_table: TenderTable {
            title: text_or(data, "tender_table_title", "RÉSULTAT DE L’APPEL D’OFFRE"),
            tarif_type,
        },
        change_section: ChangeSection {
            title: text_or(data, "change_title", "LE CHANGEMENT SANS CONTRAINTE"),
            text: text_or(
                data,
                "change_text",
                "Contrairement à la téléphonie, rien ne change sur<br> \
                 l'installation. Vous conservez le même compteur, le<br> \
                 même numéro de dépannage en cas de problème. \
                 C'est <br> toujours GRDF & ENEDIS qui s'occupe de la relève du<br> compteur. \
                 Changer de fournisseur, c'est gratuit!",
            ),
            quote: text_or(
                data,
                "change_quote",
                "Les équipes de VOLT CONSULTING <br> peuvent vous accompagner sur toute<br> cette partie administrative",
            ),
        },
        contact_info: ContactInfo {
            company_name: text_or(data, "company_name", "VOLT CONSULTING"),
            phone: text_or(data, "phone", "01 87 66 70 43"),
            email: text_or(data, "email", "contact@volt-consulting.fr"),
            address: text_or(data, "address", "8 Place Hoche - 78000 Versailles"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparatif::{normalize, NormalizeOptions};
    use serde_json::json;

    fn assets() -> AssetContext {
        AssetContext::new("https", "crm.volt-consulting.com", "/static/")
    }

    fn object(value: Value) -> RawComparatifInput {
        match value {
            Value::Object(map) => map,
            _ => panic!("object expected"),
        }
    }

    fn rate(supplier: &str, kind: &str, cost: Value) -> Value {
        json!({
            "fournisseur": supplier,
            "typeFournisseur": kind,
            "coutHTVA": cost,
            "partnerPhoto": format!("https://cdn.example.com/{}.png", supplier),
            "abonnement": 12, "partCee": 4.1, "cta": 80, "ticgn": 16.37, "rate2": 41.5,
            "rate3": 9000, "rate4": 2100, "rate5": 1500, "rate6": 144, "rate7": 310,
            "HPH": 120, "HCH": 90, "HPE": 80, "HCE": 60, "POINTE": 150,
        })
    }

    fn gas_comparatif() -> CanonicalComparatif {
        let raw = object(json!({
            "createdOn": 1700000000000i64,
            "energyType": "GAS",
            "pce": "GI123456",
            "gasProfile": "P011",
            "routingRate": "T2",
            "comparatifRate": [
                rate("EDF", "CURRENT", json!(12000)),
                rate("Engie", "ALTERNATIVE", json!(11000)),
                rate("Ekwateur", "ALTERNATIVE", json!(11500)),
            ],
        }));
        normalize(&raw, &NormalizeOptions::default()).unwrap()
    }

    #[test]
    fn test_static_asset_urls() {
        assert_eq!(
            assets().static_asset("image/volt_image1.png"),
            "https://crm.volt-consulting.com/static/image/volt_image1.png"
        );
        let bare = AssetContext::new("http", "localhost:8000", "/");
        assert_eq!(bare.static_asset("/a.png"), "http://localhost:8000/a.png");
    }

    #[test]
    fn test_gas_table_and_defaults() {
        let comparatif = gas_comparatif();
        let data = object(json!({"clientSociety": "ACME"}));
        let tree = build_presentation(&data, &comparatif, ChartImages::default(), &assets());

        assert_eq!(tree.title, DEFAULT_TITLE);
        assert_eq!(tree.client.client_society, "ACME");
        assert_eq!(tree.columns.len(), GAS_COLUMNS.len());
        assert_eq!(tree.rate_pages.len(), 1);

        let rows = &tree.rate_pages[0].rows;
        assert_eq!(rows[0].supplier, "EDF");
        assert_eq!(rows[1].supplier, "Engie");
        assert!(rows[1].is_best_offer);
        assert_eq!(rows[1].cells.len(), tree.columns.len() - 1);
        assert_eq!(rows[1].cells[0], "41.5");
        assert_eq!(rows[1].cells.last().unwrap(), "11000");

        assert_eq!(tree.contact_info.phone, "01 87 66 70 43");
        assert_eq!(tree.comparison_table.labels.len(), 7);
        let suppliers: Vec<&str> = tree.comparison_table.rows.iter().map(|r| r.supplier.as_str()).collect();
        assert_eq!(suppliers, vec!["EDF", "Engie"]);
    }

    #[test]
    fn test_electricity_columns_follow_schema() {
        let raw = object(json!({
            "createdOn": 1700000000000i64,
            "energyType": "ELECTRICITY",
            "pdl": "14512345678901",
            "segmentation": "C4",
            "comparatifRate": [rate("EDF", "CURRENT", json!(5000))],
        }));
        let comparatif = normalize(&raw, &NormalizeOptions::default()).unwrap();
        let tree = build_presentation(&RawComparatifInput::new(), &comparatif, ChartImages::default(), &assets());

        assert_eq!(tree.columns[1], "HPH €/MWh");
        assert_eq!(tree.columns.len(), 1 + 4 + ELECTRICITY_TRAILING_COLUMNS.len());
        let row = &tree.rate_pages[0].rows[0];
        assert_eq!(row.cells.len(), tree.columns.len() - 1);
        assert_eq!(&row.cells[..4], &["120", "90", "80", "60"]);
    }

    #[test]
    fn test_overrides() {
        let comparatif = gas_comparatif();
        let data = object(json!({
            "title": "Offre ACME",
            "phone": "06 00 00 00 00",
            "side3": "https://cdn.example.com/side.png",
            "images": {"logo": "https://cdn.example.com/logo.png"},
            "labels": ["too", "short"],
        }));
        let charts = ChartImages {
            price: Some("data:image/svg+xml;base64,AAA".to_string()),
            consumption: None,
        };
        let tree = build_presentation(&data, &comparatif, charts, &assets());

        assert_eq!(tree.title, "Offre ACME");
        assert_eq!(tree.contact_info.phone, "06 00 00 00 00");
        assert_eq!(tree.images["side333"], "https://cdn.example.com/side.png");
        assert_eq!(tree.images["logo"], "https://cdn.example.com/logo.png");
        assert_eq!(
            tree.images["left"],
            "https://crm.volt-consulting.com/static/image/side2-removebg-preview.png"
        );
        assert_eq!(tree.comparison_table.labels.len(), COMPARISON_LABELS.len());
        assert!(tree.chart.is_some());
        assert!(tree.consumption_chart.is_none());
    }

    #[test]
    fn test_labels_row_precedes_alternatives() {
        let comparatif = gas_comparatif();
        let tree = build_presentation(&RawComparatifInput::new(), &comparatif, ChartImages::default(), &assets());
        let page = &tree.rate_pages[0];

        let flags: Vec<bool> = page.rows.iter().map(|r| r.labels_before).collect();
        assert_eq!(flags, vec![false, true, false]);
        assert!(!page.trailing_labels);
    }

    #[test]
    fn test_current_only_table_ends_with_labels() {
        let raw = object(json!({
            "createdOn": 1700000000000i64,
            "energyType": "GAS",
            "pce": "GI123456",
            "gasProfile": "P011",
            "routingRate": "T2",
            "comparatifRate": [rate("EDF", "CURRENT", json!(12000))],
        }));
        let comparatif = normalize(&raw, &NormalizeOptions::default()).unwrap();
        let tree = build_presentation(&RawComparatifInput::new(), &comparatif, ChartImages::default(), &assets());

        assert!(tree.rate_pages[0].trailing_labels);
        assert!(!tree.rate_pages[0].rows[0].labels_before);
    }

    #[test]
    fn test_renewal_row_is_the_placed_record() {
        let mut dearer = rate("Engie", "ALTERNATIVE", json!(12500));
        dearer["rate3"] = json!(9900);
        let mut cheaper = rate("Engie", "ALTERNATIVE", json!(11000));
        cheaper["rate3"] = json!(8800);
        let raw = object(json!({
            "createdOn": 1700000000000i64,
            "energyType": "GAS",
            "pce": "GI123456",
            "gasProfile": "P011",
            "routingRate": "T2",
            "comparatifRate": [rate("EDF", "CURRENT", json!(10000)), dearer, cheaper],
        }));
        let comparatif = normalize(&raw, &NormalizeOptions::default()).unwrap();
        assert!(comparatif.comparatif_rate.iter().all(|r| !r.is_best_offer));

        let tree = build_presentation(&RawComparatifInput::new(), &comparatif, ChartImages::default(), &assets());
        let renewal = &tree.comparison_table.rows[1];
        assert_eq!(renewal.index, 2);
        assert_eq!(renewal.cells[0], "8800");
        assert_eq!(renewal.cells.last().unwrap(), "11000");
    }

    #[test]
    fn test_tree_serializes_for_template() {
        let comparatif = gas_comparatif();
        let tree = build_presentation(&RawComparatifInput::new(), &comparatif, ChartImages::default(), &assets());
        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(value["document_type"], "GAS");
        assert_eq!(value["comparatif"]["createdOn"], "14/11/2023");
        assert_eq!(value["rate_pages"][0]["show_header"], true);
        assert_eq!(value["client"]["clientSociety"], "");
    }
}
