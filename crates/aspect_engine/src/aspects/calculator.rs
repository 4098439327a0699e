use std::cmp::Ordering;

use crate::angle;
use crate::aspects::catalog::AspectCatalog;
use crate::aspects::types::InstantAspect;
use crate::ephemeris::ChartPoint;
use crate::error::ConfigError;

/// Single-instant aspect detection.
///
/// Natal (one chart) and synastry (two charts) differ only in how pairs
/// are formed; both go through [`find_instant_aspects`].
#[derive(Debug, Clone, Default)]
pub struct InstantAspectFinder {
    catalog: AspectCatalog,
}

impl InstantAspectFinder {
    pub fn new(catalog: AspectCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &AspectCatalog {
        &self.catalog
    }

    /// Aspects within one chart, over every unordered pair of bodies.
    pub fn natal(&self, points: &[ChartPoint]) -> Result<Vec<InstantAspect>, ConfigError> {
        for (i, p) in points.iter().enumerate() {
            if points[..i].iter().any(|q| q.body == p.body) {
                return Err(ConfigError::DuplicateBody { body: p.body });
            }
        }

        let mut pairs = Vec::with_capacity(points.len() * points.len().saturating_sub(1) / 2);
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                let (a, b) = (points[i], points[j]);
                // orient by body order so input order can't change the output
                if a.body <= b.body {
                    pairs.push((a, b));
                } else {
                    pairs.push((b, a));
                }
            }
        }
        find_instant_aspects(&self.catalog, pairs)
    }

    /// Cross-chart aspects: every body of `first` against every body of
    /// `second`, including same-body pairs such as Moon to Moon.
    pub fn synastry(
        &self,
        first: &[ChartPoint],
        second: &[ChartPoint],
    ) -> Result<Vec<InstantAspect>, ConfigError> {
        let pairs = first
            .iter()
            .flat_map(|a| second.iter().map(move |b| (*a, *b)));
        find_instant_aspects(&self.catalog, pairs)
    }
}

/// Match every pair and return the hits in a deterministic order:
/// strength descending, then first body, second body, aspect.
pub fn find_instant_aspects<I>(
    catalog: &AspectCatalog,
    pairs: I,
) -> Result<Vec<InstantAspect>, ConfigError>
where
    I: IntoIterator<Item = (ChartPoint, ChartPoint)>,
{
    let mut hits = Vec::new();
    for (a, b) in pairs {
        check_finite(&a)?;
        check_finite(&b)?;

        if let Some(aspect) = catalog.match_longitudes(a.longitude, b.longitude) {
            let target = catalog
                .get(aspect.aspect)
                .map_or(aspect.aspect.angle(), |d| d.target_angle);
            let is_applying = match (a.speed, b.speed) {
                (Some(s1), Some(s2)) => is_aspect_applying(
                    a.longitude,
                    b.longitude,
                    s1,
                    s2,
                    aspect.separation,
                    aspect.deviation,
                    target,
                ),
                _ => None,
            };
            hits.push(InstantAspect {
                first: a.body,
                second: b.body,
                first_longitude: a.longitude,
                second_longitude: b.longitude,
                aspect,
                is_applying,
            });
        }
    }
    hits.sort_by(compare_instant);
    Ok(hits)
}

fn compare_instant(x: &InstantAspect, y: &InstantAspect) -> Ordering {
    y.aspect
        .strength
        .total_cmp(&x.aspect.strength)
        .then_with(|| x.first.cmp(&y.first))
        .then_with(|| x.second.cmp(&y.second))
        .then_with(|| x.aspect.aspect.cmp(&y.aspect.aspect))
}

fn check_finite(p: &ChartPoint) -> Result<(), ConfigError> {
    if p.longitude.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFiniteLongitude {
            body: p.body,
            value: p.longitude,
        })
    }
}

/// Determine if an aspect is applying (approaching exact) or separating.
///
/// Uses the rate of change of the separation implied by the two speeds.
/// Returns `None` when the relative motion is too small to tell.
fn is_aspect_applying(
    lon1: f64,
    lon2: f64,
    speed1: f64,
    speed2: f64,
    separation: f64,
    deviation: f64,
    aspect_angle: f64,
) -> Option<bool> {
    let relative_speed = speed1 - speed2;
    if relative_speed.abs() < 1e-6 {
        return None;
    }
    if deviation == 0.0 {
        return Some(false);
    }

    // separation = |signed|, so it grows when signed and relative speed agree
    let signed = angle::signed_delta(lon1 - lon2);
    let separation_rate = if signed == 0.0 {
        relative_speed.abs()
    } else if signed >= 180.0 {
        // at the fold the separation can only shrink
        -relative_speed.abs()
    } else if signed > 0.0 {
        relative_speed
    } else {
        -relative_speed
    };

    let deviation_rate = if separation >= aspect_angle {
        separation_rate
    } else {
        -separation_rate
    };
    Some(deviation_rate < 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspects::AspectKind;
    use crate::ephemeris::Body;

    #[test]
    fn applying_when_faster_body_closes_in() {
        // Moon 5 degrees behind the Sun, moving faster: applying conjunction
        let sun = ChartPoint::with_speed(Body::Sun, 100.0, 1.0);
        let moon = ChartPoint::with_speed(Body::Moon, 95.0, 13.0);
        let hits = InstantAspectFinder::default().natal(&[sun, moon]).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].aspect.aspect, AspectKind::Conjunction);
        assert_eq!(hits[0].is_applying, Some(true));

        // Moon 5 degrees past the Sun: separating
        let moon = ChartPoint::with_speed(Body::Moon, 105.0, 13.0);
        let hits = InstantAspectFinder::default().natal(&[sun, moon]).unwrap();
        assert_eq!(hits[0].is_applying, Some(false));
    }

    #[test]
    fn applying_across_zero_aries() {
        // Sun at 358, Moon at 2 moving away from it
        let sun = ChartPoint::with_speed(Body::Sun, 358.0, 1.0);
        let moon = ChartPoint::with_speed(Body::Moon, 2.0, 13.0);
        let hits = InstantAspectFinder::default().natal(&[sun, moon]).unwrap();
        assert_eq!(hits[0].is_applying, Some(false));
    }

    #[test]
    fn unknown_speed_means_unknown_direction() {
        let hits = InstantAspectFinder::default()
            .natal(&[
                ChartPoint::new(Body::Sun, 10.0),
                ChartPoint::new(Body::Mars, 100.0),
            ])
            .unwrap();
        assert_eq!(hits[0].aspect.aspect, AspectKind::Square);
        assert_eq!(hits[0].is_applying, None);
    }

    #[test]
    fn natal_orients_pairs_by_body_order() {
        let hits = InstantAspectFinder::default()
            .natal(&[
                ChartPoint::new(Body::Mars, 100.0),
                ChartPoint::new(Body::Sun, 10.0),
            ])
            .unwrap();
        assert_eq!((hits[0].first, hits[0].second), (Body::Sun, Body::Mars));
    }

    #[test]
    fn natal_rejects_duplicate_bodies() {
        let err = InstantAspectFinder::default()
            .natal(&[
                ChartPoint::new(Body::Sun, 10.0),
                ChartPoint::new(Body::Sun, 12.0),
            ])
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateBody { body: Body::Sun });
    }

    #[test]
    fn rejects_nan_longitude() {
        let err = InstantAspectFinder::default()
            .synastry(
                &[ChartPoint::new(Body::Sun, f64::NAN)],
                &[ChartPoint::new(Body::Moon, 1.0)],
            )
            .unwrap_err();
        assert!(matches!(err, ConfigError::NonFiniteLongitude { .. }));
    }
}
