use crate::http::ApiError;
use handlebars::Handlebars;
use serde::Serialize;

pub const COMPARATIF_TEMPLATE: &str = "comparatif";

const COMPARATIF_SOURCE: &str = include_str!("../../templates/comparatif.hbs");

/// Named HTML templates rendered through handlebars.
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self, ApiError> {
        let mut renderer = Self {
            registry: Handlebars::new(),
        };
        // Missing optional sections render as empty.
        renderer.registry.set_strict_mode(false);
        renderer.register(COMPARATIF_TEMPLATE, COMPARATIF_SOURCE)?;
        Ok(renderer)
    }

    pub fn register(&mut self, name: &str, source: &str) -> Result<(), ApiError> {
        self.registry
            .register_template_string(name, source)
            .map_err(|e| ApiError::Internal(format!("Invalid template '{}': {}", name, e)))
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, ApiError> {
        if !self.registry.has_template(name) {
            return Err(ApiError::Render(format!("Unknown template '{}'", name)));
        }
        Ok(self.registry.render(name, data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bundled_template_compiles() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer
            .render(
                COMPARATIF_TEMPLATE,
                &json!({
                    "title": "Comparatif",
                    "columns": ["Fournisseur", "TOTAL €/an"],
                    "rate_pages": [{
                        "show_header": true,
                        "show_labels": true,
                        "rows": [{"supplier": "EDF", "is_current": true, "is_best_offer": false, "cells": ["12000"]}],
                    }],
                    "tender_table": {"title": "RÉSULTAT"},
                }),
            )
            .unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<th>TOTAL €/an</th>"));
        assert!(html.contains("<td>12000</td>"));
        assert!(html.contains("<h1>RÉSULTAT</h1>"));
    }

    #[test]
    fn test_labels_row_sits_between_current_and_alternatives() {
        use crate::comparatif::{normalize, NormalizeOptions, RawComparatifInput};
        use crate::services::presentation::{build_presentation, AssetContext, ChartImages};

        let rate = |supplier: &str, kind: &str, cost: i64| {
            json!({
                "fournisseur": supplier, "typeFournisseur": kind, "coutHTVA": cost,
                "partnerPhoto": "https://cdn.example.com/p.png", "abonnement": 10, "partCee": 4, "cta": 80, "ticgn": 16,
                "rate2": 40, "rate3": 1, "rate4": 1, "rate5": 1, "rate6": 1, "rate7": 1,
            })
        };
        let raw = json!({
            "createdOn": 1700000000000i64,
            "energyType": "GAS",
            "pce": "GI123456",
            "gasProfile": "P011",
            "routingRate": "T2",
            "comparatifRate": [rate("CURRENTCO", "CURRENT", 100), rate("REGULARCO", "ALTERNATIVE", 90)],
        });
        let raw = raw.as_object().cloned().unwrap();
        let comparatif = normalize(&raw, &NormalizeOptions::default()).unwrap();
        let assets = AssetContext::new("http", "localhost", "/static/");
        let tree = build_presentation(&RawComparatifInput::new(), &comparatif, ChartImages::default(), &assets);

        let html = TemplateRenderer::new().unwrap().render(COMPARATIF_TEMPLATE, &tree).unwrap();
        let current = html.find("CURRENTCO").unwrap();
        let labels = html.find("Offres des fournisseurs consultés").unwrap();
        let regular = html.find("REGULARCO").unwrap();
        assert!(current < labels && labels < regular, "{} {} {}", current, labels, regular);
    }

    #[test]
    fn test_escaping_and_raw_sections() {
        let mut renderer = TemplateRenderer::new().unwrap();
        renderer.register("snippet", "{{name}}|{{{html}}}").unwrap();
        let out = renderer
            .render("snippet", &json!({"name": "<b>A&B</b>", "html": "<br>"}))
            .unwrap();
        assert_eq!(out, "&lt;b&gt;A&amp;B&lt;/b&gt;|<br>");
    }

    #[test]
    fn test_unknown_template() {
        let renderer = TemplateRenderer::new().unwrap();
        let err = renderer.render("missing", &json!({})).unwrap_err();
        assert!(matches!(err, ApiError::Render(_)));
    }

    #[test]
    fn test_invalid_template_rejected() {
        let mut renderer = TemplateRenderer::new().unwrap();
        assert!(renderer.register("broken", "{{#each rows}}").is_err());
    }
}
