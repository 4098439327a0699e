use aspect_engine::aspects::{AspectCatalog, AspectNature, InstantAspect, InstantAspectFinder};
use aspect_engine::ephemeris::{ChartPoint, FrameConfig};
use aspect_engine::transit::{AspectPeriod, ScanRequest};
use aspect_engine::zodiac::{ChartTraits, Sign};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Placement {
    #[serde(flatten)]
    pub point: ChartPoint,
    pub sign: Sign,
    /// Degrees into the sign
    pub degree: f64,
}

#[derive(Debug, Serialize)]
pub struct NatalReport {
    pub instant: DateTime<Utc>,
    pub frame: FrameConfig,
    pub placements: Vec<Placement>,
    pub aspects: Vec<InstantAspect>,
    pub traits: ChartTraits,
}

pub fn natal(
    instant: DateTime<Utc>,
    frame: FrameConfig,
    points: Vec<ChartPoint>,
    catalog: &AspectCatalog,
) -> anyhow::Result<NatalReport> {
    let aspects = InstantAspectFinder::new(catalog.clone()).natal(&points)?;
    let traits = ChartTraits::from_points(&points);
    let placements = points
        .into_iter()
        .map(|point| Placement {
            sign: Sign::from_longitude(point.longitude),
            degree: point.longitude.rem_euclid(30.0),
            point,
        })
        .collect();
    Ok(NatalReport {
        instant,
        frame,
        placements,
        aspects,
        traits,
    })
}

#[derive(Debug, Serialize)]
pub struct TimelineEntry {
    /// e.g. "Jup-Tri-natal Sun"
    pub key: String,
    pub nature: AspectNature,
    #[serde(flatten)]
    pub period: AspectPeriod,
}

#[derive(Debug, Serialize)]
pub struct Timeline {
    pub natal: DateTime<Utc>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub step_minutes: i64,
    pub frame: FrameConfig,
    pub periods: Vec<TimelineEntry>,
}

pub fn timeline(natal: DateTime<Utc>, request: &ScanRequest, periods: Vec<AspectPeriod>) -> Timeline {
    Timeline {
        natal,
        start: request.start,
        end: request.end,
        step_minutes: request.step.num_minutes(),
        frame: request.frame,
        periods: periods
            .into_iter()
            .map(|period| TimelineEntry {
                key: period.key(),
                nature: period.aspect.nature(),
                period,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspect_engine::ephemeris::Body;
    use chrono::TimeZone;

    #[test]
    fn placements_carry_sign_and_degree() {
        let at = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let points = vec![
            ChartPoint::new(Body::Sun, 280.5),
            ChartPoint::new(Body::Moon, 100.5),
        ];
        let report = natal(at, FrameConfig::Tropical, points, &AspectCatalog::natal()).unwrap();
        assert_eq!(report.placements[0].sign, Sign::Capricorn);
        assert!((report.placements[0].degree - 10.5).abs() < 1e-9);
        assert_eq!(report.aspects.len(), 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["placements"][1]["body"], "moon");
        assert_eq!(json["placements"][1]["sign"], "cancer");
    }
}
