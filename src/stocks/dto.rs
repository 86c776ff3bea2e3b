use serde::Serialize;
use time::OffsetDateTime;

use crate::db::{PricePoint, Quote};

/// Latest sample of one symbol.
#[derive(Debug, Serialize)]
pub struct QuoteView {
    pub symbol: String,
    #[serde(with = "time::serde::rfc3339")]
    pub ts: OffsetDateTime,
    pub close: Option<f64>,
    pub volume: Option<i64>,
}

/// One history sample; absent values serialize as `null`.
#[derive(Debug, Serialize)]
pub struct PricePointView {
    #[serde(with = "time::serde::rfc3339")]
    pub ts: OffsetDateTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
}

impl From<Quote> for QuoteView {
    fn from(q: Quote) -> Self {
        Self {
            symbol: q.symbol,
            ts: q.ts,
            close: q.close,
            volume: q.volume,
        }
    }
}

impl From<PricePoint> for PricePointView {
    fn from(p: PricePoint) -> Self {
        Self {
            ts: p.ts,
            open: p.open,
            high: p.high,
            low: p.low,
            close: p.close,
            volume: p.volume,
        }
    }
}
