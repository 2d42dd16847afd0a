//! Which SGS series publish daily and which publish monthly.

use std::collections::BTreeSet;

use super::WindowError;
use crate::domain::{Cadence, SeriesId};

/// Two disjoint sets of series ids, one per cadence.
///
/// The catalog is an explicit value handed to the validator, so tests and
/// callers can swap in their own classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesCatalog {
    daily: BTreeSet<SeriesId>,
    monthly: BTreeSet<SeriesId>,
}

impl SeriesCatalog {
    pub fn new<D, M>(daily: D, monthly: M) -> Result<Self, WindowError>
    where
        D: IntoIterator<Item = SeriesId>,
        M: IntoIterator<Item = SeriesId>,
    {
        let daily: BTreeSet<SeriesId> = daily.into_iter().collect();
        let monthly: BTreeSet<SeriesId> = monthly.into_iter().collect();
        if let Some(id) = daily.intersection(&monthly).next() {
            return Err(WindowError::OverlappingSeries(*id));
        }
        Ok(Self { daily, monthly })
    }

    /// Banco Central series used by the construction-cost dashboards.
    pub fn bcb() -> Self {
        Self {
            daily: DAILY_SGS.iter().copied().map(SeriesId).collect(),
            monthly: MONTHLY_SGS.iter().copied().map(SeriesId).collect(),
        }
    }

    pub fn classify(&self, id: SeriesId) -> Result<Cadence, WindowError> {
        if self.daily.contains(&id) {
            Ok(Cadence::Daily)
        } else if self.monthly.contains(&id) {
            Ok(Cadence::Monthly)
        } else {
            Err(WindowError::UnknownSeries(id))
        }
    }

    /// Every known id with its cadence, daily first.
    pub fn iter(&self) -> impl Iterator<Item = (SeriesId, Cadence)> + '_ {
        self.daily
            .iter()
            .map(|id| (*id, Cadence::Daily))
            .chain(self.monthly.iter().map(|id| (*id, Cadence::Monthly)))
    }
}

// D+1 publication.
const DAILY_SGS: [u32; 4] = [
    1,     // USD/BRL
    11,    // USD/BRL Ptax venda
    10813, // EUR/BRL
    10814, // GBP/BRL
];

// Published after the reference month closes.
const MONTHLY_SGS: [u32; 10] = [
    189,   // IGP-M
    226,   // TR
    432,   // Selic
    433,   // IPCA
    4189,  // INPC
    4390,  // Credito PF
    7478,  // Poupanca
    21864, // PAIC construcao civil
    24364, // Estoque credito habitacional
    28561, // Credito construcao civil
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_is_total_over_known_ids() {
        let catalog = SeriesCatalog::bcb();
        for id in DAILY_SGS {
            assert_eq!(catalog.classify(SeriesId(id)).unwrap(), Cadence::Daily);
        }
        for id in MONTHLY_SGS {
            assert_eq!(catalog.classify(SeriesId(id)).unwrap(), Cadence::Monthly);
        }
        assert_eq!(catalog.iter().count(), DAILY_SGS.len() + MONTHLY_SGS.len());
    }

    #[test]
    fn unknown_ids_fail_instead_of_defaulting() {
        let err = SeriesCatalog::bcb().classify(SeriesId(1207)).unwrap_err();
        assert_eq!(err, WindowError::UnknownSeries(SeriesId(1207)));
    }

    #[test]
    fn overlapping_sets_are_rejected() {
        let err = SeriesCatalog::new([SeriesId(1), SeriesId(2)], [SeriesId(2)]).unwrap_err();
        assert_eq!(err, WindowError::OverlappingSeries(SeriesId(2)));
    }

    #[test]
    fn custom_catalog_replaces_defaults() {
        let catalog = SeriesCatalog::new([SeriesId(433)], Vec::new()).unwrap();
        assert_eq!(catalog.classify(SeriesId(433)).unwrap(), Cadence::Daily);
        assert!(catalog.classify(SeriesId(1)).is_err());
    }
}
