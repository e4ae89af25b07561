use std::fmt;

/// Tag of one additive term of an energy model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnergyContribution {
    Zeeman,
    Anisotropy,
    Exchange,
    Dmi,
    Ddi,
    /// The `n`-th term of a gaussian landscape.
    Gaussian(usize),
}

impl fmt::Display for EnergyContribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zeeman => write!(f, "Zeeman"),
            Self::Anisotropy => write!(f, "Anisotropy"),
            Self::Exchange => write!(f, "Exchange"),
            Self::Dmi => write!(f, "DMI"),
            Self::Ddi => write!(f, "DDI"),
            Self::Gaussian(n) => write!(f, "Gaussian {}", n),
        }
    }
}

/// Energy of a configuration split into its active contributions, in model order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnergyBreakdown {
    entries: Vec<(EnergyContribution, f64)>,
}

impl EnergyBreakdown {
    #[inline]
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, e)| e).sum()
    }

    /// The energies alone, one per active contribution.
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|&(_, e)| e).collect()
    }

    pub fn get(&self, contribution: EnergyContribution) -> Option<f64> {
        self.entries
            .iter()
            .find(|(c, _)| *c == contribution)
            .map(|&(_, e)| e)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(EnergyContribution, f64)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(EnergyContribution, f64)> for EnergyBreakdown {
    fn from_iter<I: IntoIterator<Item = (EnergyContribution, f64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_returns_sum_of_all_entries() {
        let breakdown: EnergyBreakdown = [
            (EnergyContribution::Zeeman, 1.5),
            (EnergyContribution::Exchange, -2.0),
            (EnergyContribution::Dmi, 0.5),
        ]
        .into_iter()
        .collect();
        assert_eq!(breakdown.total(), 0.0);
    }

    #[test]
    fn values_preserve_insertion_order() {
        let breakdown: EnergyBreakdown = [
            (EnergyContribution::Anisotropy, 3.0),
            (EnergyContribution::Zeeman, 1.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(breakdown.values(), vec![3.0, 1.0]);
    }

    #[test]
    fn get_finds_energy_by_contribution() {
        let breakdown: EnergyBreakdown =
            std::iter::once((EnergyContribution::Gaussian(1), 4.0)).collect();
        assert_eq!(breakdown.get(EnergyContribution::Gaussian(1)), Some(4.0));
        assert_eq!(breakdown.get(EnergyContribution::Gaussian(0)), None);
    }

    #[test]
    fn default_breakdown_is_empty_with_zero_total() {
        let breakdown = EnergyBreakdown::default();
        assert!(breakdown.is_empty());
        assert_eq!(breakdown.total(), 0.0);
    }

    #[test]
    fn display_names_match_contribution_labels() {
        assert_eq!(EnergyContribution::Dmi.to_string(), "DMI");
        assert_eq!(EnergyContribution::Gaussian(2).to_string(), "Gaussian 2");
    }
}
