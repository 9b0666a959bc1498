use crate::core::instrument::{Instrument, Registry, RegistryError};
use tracing::debug;

/// The instrument currently shown in the detail view of one session.
///
/// Always points at a registered instrument; starts at the first one.
#[derive(Debug, Clone)]
pub struct Selection {
    registry: Registry,
    current: &'static Instrument,
}

impl Selection {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            current: registry.first(),
        }
    }

    pub fn current(&self) -> &'static Instrument {
        self.current
    }

    pub fn is_selected(&self, instrument: &Instrument) -> bool {
        self.current.name == instrument.name
    }

    /// Replaces the selection. An unknown name leaves it unchanged.
    pub fn select(&mut self, name: &str) -> Result<&'static Instrument, RegistryError> {
        let instrument = self.registry.resolve(name)?;
        debug!(from = self.current.name, to = instrument.name, "Selection changed");
        self.current = instrument;
        Ok(instrument)
    }
}
