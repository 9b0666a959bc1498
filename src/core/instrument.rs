//! Instrument definitions and the registry they are looked up in.

use std::collections::HashSet;
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Interest-rate series published by the macro data provider.
    Rate,
    /// Exchange-traded fund quoted by the market data provider.
    Tracker,
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Category::Rate => "rate",
                Category::Tracker => "tracker",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instrument {
    pub name: &'static str,
    pub symbol: &'static str,
    pub category: Category,
}

impl Instrument {
    pub const fn rate(name: &'static str, symbol: &'static str) -> Self {
        Self {
            name,
            symbol,
            category: Category::Rate,
        }
    }

    pub const fn tracker(name: &'static str, symbol: &'static str) -> Self {
        Self {
            name,
            symbol,
            category: Category::Tracker,
        }
    }

    pub fn is_rate(&self) -> bool {
        self.category == Category::Rate
    }
}

/// Treasury series first, bond ETFs second. The tile grid follows this order.
pub static BOND_MARKET: &[Instrument] = &[
    Instrument::rate("US 1M", "DGS1MO"),
    Instrument::rate("US 3M", "DTB3"),
    Instrument::rate("US 6M", "DTB6"),
    Instrument::rate("US 1Y", "DGS1"),
    Instrument::rate("US 2Y", "DGS2"),
    Instrument::rate("US 5Y", "DGS5"),
    Instrument::rate("US 10Y", "DGS10"),
    Instrument::rate("US 30Y", "DGS30"),
    Instrument::tracker("1-3Y Treasury", "SHY"),
    Instrument::tracker("7-10Y Treasury", "IEF"),
    Instrument::tracker("20Y+ Treasury", "TLT"),
    Instrument::tracker("Investment Grade Credit", "LQD"),
    Instrument::tracker("High Yield Credit", "HYG"),
    Instrument::tracker("High Yield", "JNK"),
    Instrument::tracker("Emerging Markets Debt", "EMB"),
    Instrument::tracker("Short-Term Corporate", "VCSH"),
    Instrument::tracker("Inflation-Protected", "TIP"),
    Instrument::tracker("Global Sovereigns", "BWX"),
    Instrument::tracker("Convertible Bonds", "CWB"),
    Instrument::tracker("Mortgage-Backed", "MBB"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown instrument: {0}")]
    NotFound(String),
    #[error("Instrument registry is empty")]
    Empty,
    #[error("Duplicate instrument name: {0}")]
    DuplicateName(String),
}

/// Fixed, ordered set of instruments. Cheap to copy.
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    instruments: &'static [Instrument],
}

impl Registry {
    pub fn new(instruments: &'static [Instrument]) -> Result<Self, RegistryError> {
        if instruments.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut seen = HashSet::new();
        for instrument in instruments {
            if !seen.insert(instrument.name) {
                return Err(RegistryError::DuplicateName(instrument.name.to_string()));
            }
        }
        Ok(Self { instruments })
    }

    pub fn resolve(&self, name: &str) -> Result<&'static Instrument, RegistryError> {
        self.instruments
            .iter()
            .find(|i| i.name == name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.instruments.iter().position(|i| i.name == name)
    }

    pub fn get(&self, index: usize) -> Option<&'static Instrument> {
        self.instruments.get(index)
    }

    /// All instruments in registration order.
    pub fn all(&self) -> &'static [Instrument] {
        self.instruments
    }

    pub fn first(&self) -> &'static Instrument {
        // Non-empty by construction.
        &self.instruments[0]
    }

    pub fn rates(&self) -> impl Iterator<Item = &'static Instrument> + use<> {
        let instruments = self.instruments;
        instruments.iter().filter(|i| i.category == Category::Rate)
    }

    pub fn trackers(&self) -> impl Iterator<Item = &'static Instrument> + use<> {
        let instruments = self.instruments;
        instruments
            .iter()
            .filter(|i| i.category == Category::Tracker)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            instruments: BOND_MARKET,
        }
    }
}
