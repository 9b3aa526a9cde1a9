//! List-page query construction: raw URL parameters in, validated
//! per-entity list specs and display rows out.
//!
//! Malformed input never raises; every value degrades to its
//! documented default so a hand-edited URL still renders a page.

use std::str::FromStr;

use db::models::order::{Order, OrderListSpec, OrderSort};
use db::models::product::{ProductListSpec, ProductSort};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utils::format;
use uuid::Uuid;

/// Raw order-list parameters exactly as they arrive from the URL.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrderListParams {
    pub user_id: Option<String>,
    pub sort: Option<String>,
    pub is_paid: Option<String>,
    pub category: Option<String>,
    pub page: Option<String>,
    pub min_payable: Option<String>,
    pub max_payable: Option<String>,
}

/// Raw product-list parameters exactly as they arrive from the URL.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProductListParams {
    pub sort: Option<String>,
    pub is_available: Option<String>,
    pub is_featured: Option<String>,
    pub category: Option<String>,
    pub category_id: Option<String>,
    pub page: Option<String>,
}

/// Display row for the admin order table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct OrderRow {
    pub id: Uuid,
    pub number: String,
    pub date: String,
    pub payable: String,
    pub is_paid: bool,
}

pub fn order_list_spec(raw: &RawOrderListParams) -> OrderListSpec {
    OrderListSpec {
        user_id: non_empty(&raw.user_id).and_then(|v| Uuid::parse_str(v).ok()),
        is_paid: tri_state(&raw.is_paid),
        category: non_empty(&raw.category).map(str::to_string),
        min_payable: amount(&raw.min_payable),
        max_payable: amount(&raw.max_payable),
        sort: sort_key::<OrderSort>(&raw.sort),
        page: parse_page(raw.page.as_deref()),
    }
}

pub fn product_list_spec(raw: &RawProductListParams) -> ProductListSpec {
    ProductListSpec {
        // The storefront toggle only ever narrows to available
        // products; any other value leaves the predicate off.
        is_available: match non_empty(&raw.is_available) {
            Some("true") => Some(true),
            _ => None,
        },
        is_featured: tri_state(&raw.is_featured),
        category: non_empty(&raw.category).map(str::to_string),
        category_id: non_empty(&raw.category_id).and_then(|v| Uuid::parse_str(v).ok()),
        sort: sort_key::<ProductSort>(&raw.sort),
        page: parse_page(raw.page.as_deref()),
    }
}

pub fn order_row(order: &Order) -> OrderRow {
    OrderRow {
        id: order.id,
        number: format!("Order #{}", order.number),
        date: format::long_date(order.created_at),
        payable: format::currency(order.payable),
        is_paid: order.is_paid,
    }
}

/// Positive page number; anything unparsable or below 1 becomes 1.
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

fn non_empty(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Unset / true / false. Only the literal string "true" is true.
fn tri_state(raw: &Option<String>) -> Option<bool> {
    non_empty(raw).map(|v| v == "true")
}

fn amount(raw: &Option<String>) -> Option<f64> {
    non_empty(raw).and_then(|v| v.parse::<f64>().ok())
}

fn sort_key<S: FromStr + Default>(raw: &Option<String>) -> S {
    non_empty(raw)
        .and_then(|v| S::from_str(v).ok())
        .unwrap_or_default()
}
