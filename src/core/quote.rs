//! Quote and price-history types

use crate::core::instrument::Instrument;
use crate::core::metrics::percent_change;
use chrono::NaiveDate;

/// Current level of an instrument with its change against the previous period.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub instrument: &'static Instrument,
    pub last: Option<f64>,
    pub previous: Option<f64>,
    pub change_pct: Option<f64>,
}

impl Quote {
    pub fn new(instrument: &'static Instrument, last: Option<f64>, previous: Option<f64>) -> Self {
        Self {
            instrument,
            last,
            previous,
            change_pct: percent_change(last, previous),
        }
    }

    pub fn unavailable(instrument: &'static Instrument) -> Self {
        Self::new(instrument, None, None)
    }
}

/// Latest tracker price as reported by the market data provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerQuote {
    pub last: Option<f64>,
    pub previous_close: Option<f64>,
    pub change_pct: Option<f64>,
}

impl TrackerQuote {
    pub fn new(last: Option<f64>, previous_close: Option<f64>) -> Self {
        Self {
            last,
            previous_close,
            change_pct: percent_change(last, previous_close),
        }
    }
}

/// A dated value of a rate series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Daily bars in ascending date order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySeries {
    bars: Vec<Bar>,
}

impl HistorySeries {
    pub fn from_bars(mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.date);
        Self { bars }
    }

    /// Builds bars for a series that only publishes one level per day.
    ///
    /// Each open is the previous close (the first bar opens at its own close),
    /// high and low are the max and min of open and close.
    pub fn synthesize(closes: &[(NaiveDate, f64)]) -> Self {
        let mut bars = Vec::with_capacity(closes.len());
        let mut prev_close = None;
        for &(date, close) in closes {
            let open = prev_close.unwrap_or(close);
            bars.push(Bar {
                date,
                open,
                high: open.max(close),
                low: open.min(close),
                close,
            });
            prev_close = Some(close);
        }
        Self::from_bars(bars)
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Lowest low and highest high over the whole series.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.bars.iter().fold(None, |acc, bar| match acc {
            None => Some((bar.low, bar.high)),
            Some((lo, hi)) => Some((lo.min(bar.low), hi.max(bar.high))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instrument::Registry;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_synthetic_bars() {
        let series = HistorySeries::synthesize(&[(day(2), 100.0), (day(3), 102.0), (day(4), 101.0)]);
        let ohlc: Vec<_> = series
            .bars()
            .iter()
            .map(|b| (b.open, b.high, b.low, b.close))
            .collect();
        assert_eq!(
            ohlc,
            vec![
                (100.0, 100.0, 100.0, 100.0),
                (100.0, 102.0, 100.0, 102.0),
                (102.0, 102.0, 101.0, 101.0),
            ]
        );
        assert_eq!(series.range(), Some((100.0, 102.0)));
    }

    #[test]
    fn test_bars_sorted_by_date() {
        let bar = |date, close| Bar {
            date,
            open: close,
            high: close,
            low: close,
            close,
        };
        let series = HistorySeries::from_bars(vec![bar(day(5), 3.0), bar(day(1), 1.0), bar(day(3), 2.0)]);
        let dates: Vec<_> = series.bars().iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![day(1), day(3), day(5)]);
        assert_eq!(series.last().map(|b| b.close), Some(3.0));
    }

    #[test]
    fn test_empty_series() {
        let series = HistorySeries::synthesize(&[]);
        assert!(series.is_empty());
        assert_eq!(series.range(), None);
    }

    #[test]
    fn test_quote_change() {
        let registry = Registry::default();
        let shy = registry.resolve("1-3Y Treasury").unwrap();

        let quote = Quote::new(shy, Some(82.5), Some(82.0));
        assert!((quote.change_pct.unwrap() - 0.6097560975609756).abs() < 1e-9);

        let quote = Quote::new(shy, Some(82.5), None);
        assert_eq!(quote.change_pct, None);
        assert_eq!(Quote::unavailable(shy).last, None);
    }
}
