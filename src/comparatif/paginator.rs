//! Splits provider rates into fixed-capacity table pages and picks the
//! single "best offer" row.
//!
//! Current-supplier rows always come first in their original order; the other
//! suppliers follow sorted by cost (missing costs last, stable among ties).

use crate::comparatif::models::{ProviderRateRecord, SupplierKind};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;

pub const PAGE_CAPACITY: usize = 4;

/// What the paginator needs to know about a rate row.
pub trait RateEntry {
    fn is_current(&self) -> bool;
    fn cost(&self) -> Option<Decimal>;
}

impl RateEntry for ProviderRateRecord {
    fn is_current(&self) -> bool {
        self.kind == SupplierKind::Current
    }

    fn cost(&self) -> Option<Decimal> {
        self.cost
    }
}

/// A row placed on a page; `index` points into the paginated slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedRow {
    pub index: usize,
    pub is_current: bool,
    pub is_best_offer: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPage {
    pub rows: Vec<PlacedRow>,
    pub show_header: bool,
    pub show_labels: bool,
}

fn cmp_cost(a: Option<Decimal>, b: Option<Decimal>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn paginate<R: RateEntry>(rates: &[R]) -> Vec<DisplayPage> {
    paginate_with_capacity(rates, PAGE_CAPACITY)
}

pub fn paginate_with_capacity<R: RateEntry>(rates: &[R], capacity: usize) -> Vec<DisplayPage> {
    let capacity = capacity.max(1);

    let current: Vec<usize> = (0..rates.len()).filter(|&i| rates[i].is_current()).collect();
    let mut regular: Vec<usize> = (0..rates.len()).filter(|&i| !rates[i].is_current()).collect();
    // sort_by is stable
    regular.sort_by(|&a, &b| cmp_cost(rates[a].cost(), rates[b].cost()));

    let current_cost = current.first().and_then(|&i| rates[i].cost());
    let min_regular_cost = regular.first().and_then(|&i| rates[i].cost());
    let best_offer_wins = matches!(
        (min_regular_cost, current_cost),
        (Some(min), Some(cur)) if min <= cur
    );

    if current.is_empty() && regular.is_empty() {
        return vec![DisplayPage {
            rows: Vec::new(),
            show_header: true,
            show_labels: true,
        }];
    }

    let mut pages = Vec::new();
    let mut current_iter = current.into_iter().peekable();
    let mut regular_iter = regular.into_iter().peekable();
    let mut labels_shown = false;
    let mut best_offer_checked = false;

    while current_iter.peek().is_some() || regular_iter.peek().is_some() {
        let mut page = DisplayPage {
            rows: Vec::with_capacity(capacity),
            show_header: pages.is_empty(),
            show_labels: false,
        };

        while page.rows.len() < capacity {
            match current_iter.next() {
                Some(index) => page.rows.push(PlacedRow {
                    index,
                    is_current: true,
                    is_best_offer: false,
                }),
                None => break,
            }
        }

        // Labels go on the page where regular rows start; a page filled
        // entirely by current rows defers them to the next one.
        let current_done = current_iter.peek().is_none();
        let has_room = page.rows.len() < capacity;
        if current_done && !labels_shown && (has_room || regular_iter.peek().is_none()) {
            page.show_labels = true;
            labels_shown = true;
        }

        if current_done {
            while page.rows.len() < capacity {
                let Some(index) = regular_iter.next() else { break };
                let mut row = PlacedRow {
                    index,
                    is_current: false,
                    is_best_offer: false,
                };
                if page.show_labels && !best_offer_checked {
                    best_offer_checked = true;
                    row.is_best_offer = best_offer_wins;
                }
                page.rows.push(row);
            }
        }

        pages.push(page);
    }

    pages
}

/// Index of the best-offer row in `rates`, if any.
pub fn best_offer_index<R: RateEntry>(rates: &[R]) -> Option<usize> {
    paginate(rates)
        .iter()
        .flat_map(|page| page.rows.iter())
        .find(|row| row.is_best_offer)
        .map(|row| row.index)
}
