//! Keyword query responder over stored bills.
//!
//! Understands two phrases, "due this month" and "summary". Anything else
//! gets an apology. Responses carry chart data for an external renderer.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::bill::BillRecord;

/// Chart style for a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// Data for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub kind: ChartKind,
    pub title: String,
    pub points: Vec<ChartPoint>,
}

/// Answer to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartData>,
}

pub const NOT_UNDERSTOOD: &str = "Sorry, I couldn't understand the query.";

/// Answer `query` over `records`, with `today` deciding the current month.
pub fn respond(query: &str, records: &[BillRecord], today: NaiveDate) -> QueryResponse {
    let query = query.to_lowercase();

    if query.contains("due this month") {
        due_this_month(records, today)
    } else if query.contains("summary") {
        summary(records)
    } else {
        debug!("Unrecognized query: {:?}", query);
        QueryResponse {
            text: NOT_UNDERSTOOD.to_string(),
            chart: None,
        }
    }
}

fn due_this_month(records: &[BillRecord], today: NaiveDate) -> QueryResponse {
    let due: Vec<&BillRecord> = records
        .iter()
        .filter(|r| {
            r.due_date()
                .is_some_and(|d| d.year() == today.year() && d.month() == today.month())
        })
        .collect();

    let total: f64 = due.iter().map(|r| r.amount()).sum();
    let points = due
        .iter()
        .map(|r| ChartPoint {
            label: r.category().to_string(),
            value: r.amount(),
        })
        .collect();

    QueryResponse {
        text: format!(
            "You have {} bills due this month, totaling {:.2}",
            due.len(),
            total
        ),
        chart: Some(ChartData {
            kind: ChartKind::Bar,
            title: "Bills Due This Month".to_string(),
            points,
        }),
    }
}

fn summary(records: &[BillRecord]) -> QueryResponse {
    // One point per category, labels in sorted order.
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.category()).or_default() += record.amount();
    }
    let points = totals
        .into_iter()
        .map(|(label, value)| ChartPoint {
            label: label.to_string(),
            value,
        })
        .collect();

    QueryResponse {
        text: "Here is your monthly bill summary by type.".to_string(),
        chart: Some(ChartData {
            kind: ChartKind::Pie,
            title: "Monthly Bill Summary".to_string(),
            points,
        }),
    }
}
