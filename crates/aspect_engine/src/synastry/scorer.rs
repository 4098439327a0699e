use log::debug;
use serde::{Deserialize, Serialize};

use crate::aspects::{AspectCatalog, InstantAspect, InstantAspectFinder};
use crate::ephemeris::ChartPoint;
use crate::error::ConfigError;
use crate::synastry::categories::{base_score, Category};
use crate::zodiac::{ChartTraits, ElementBalance};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    /// 0 to 10
    pub score: f64,
    pub weight: f64,
    /// Matched aspects that fed the score
    pub matches: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynastryScores {
    pub categories: Vec<CategoryScore>,
    /// Weighted sum of every category, 0 to 10
    pub total: f64,
}

impl SynastryScores {
    pub fn get(&self, category: Category) -> Option<&CategoryScore> {
        self.categories.iter().find(|c| c.category == category)
    }
}

/// Full cross-chart comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynastryReport {
    pub aspects: Vec<InstantAspect>,
    pub first_traits: ChartTraits,
    pub second_traits: ChartTraits,
    pub scores: SynastryScores,
}

/// Weighted category scoring over a snapshot of cross-chart aspects.
///
/// Pure aggregation: no positions are looked up and no time is involved.
#[derive(Debug, Clone)]
pub struct SynastryScorer {
    finder: InstantAspectFinder,
}

impl Default for SynastryScorer {
    fn default() -> Self {
        Self::new(AspectCatalog::natal())
    }
}

impl SynastryScorer {
    pub fn new(catalog: AspectCatalog) -> Self {
        Self {
            finder: InstantAspectFinder::new(catalog),
        }
    }

    /// Find the cross aspects between two charts, derive both charts'
    /// traits and score the pair.
    pub fn compare(
        &self,
        first: &[ChartPoint],
        second: &[ChartPoint],
    ) -> Result<SynastryReport, ConfigError> {
        let aspects = self.finder.synastry(first, second)?;
        let first_traits = ChartTraits::from_points(first);
        let second_traits = ChartTraits::from_points(second);
        let scores = self.score(
            &aspects,
            &first_traits.element_balance,
            &second_traits.element_balance,
        );
        Ok(SynastryReport {
            aspects,
            first_traits,
            second_traits,
            scores,
        })
    }

    /// Score a set of already-matched aspects.
    ///
    /// An aspect category averages `base_score × strength` over the matches
    /// on its watched pairs, and is 0 when none matched. The total is the
    /// weighted sum over every category, missing ones included.
    pub fn score(
        &self,
        aspects: &[InstantAspect],
        first: &ElementBalance,
        second: &ElementBalance,
    ) -> SynastryScores {
        let categories: Vec<CategoryScore> = Category::ALL
            .iter()
            .map(|&category| {
                let (score, matches) = match category {
                    Category::ElementalBalance => (elemental_score(first, second), 0),
                    _ => aspect_score(aspects, category),
                };
                CategoryScore {
                    category,
                    score,
                    weight: category.weight(),
                    matches,
                }
            })
            .collect();

        let total: f64 = categories.iter().map(|c| c.weight * c.score).sum();
        debug!("Synastry total {:.2} from {} aspects", total, aspects.len());
        SynastryScores { categories, total }
    }
}

fn aspect_score(aspects: &[InstantAspect], category: Category) -> (f64, usize) {
    let watched: Vec<&InstantAspect> = aspects
        .iter()
        .filter(|a| category.pairs().iter().any(|&(x, y)| a.joins(x, y)))
        .collect();
    if watched.is_empty() {
        return (0.0, 0);
    }
    let sum: f64 = watched
        .iter()
        .map(|a| base_score(a.aspect.aspect) * a.aspect.strength)
        .sum();
    ((sum / watched.len() as f64).clamp(0.0, 10.0), watched.len())
}

/// Similarity of element distributions: 10 when identical, 0 when disjoint.
fn elemental_score(first: &ElementBalance, second: &ElementBalance) -> f64 {
    if first.is_empty() || second.is_empty() {
        return 0.0;
    }
    (10.0 * (1.0 - first.distance(second) / 2.0)).clamp(0.0, 10.0)
}
