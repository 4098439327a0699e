use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use std::sync::Arc;

use crate::angle;
use crate::aspects::{strength, AspectCatalog, AspectDefinition};
use crate::ephemeris::{Body, PositionCache, PositionProvider};
use crate::error::{AspectError, ConfigError, ProviderError, Result};
use crate::transit::period::{compare_periods, AspectPeriod, PeriodTarget, Reference, ScanRequest};
use crate::transit::refine::golden_section_min;

/// Upper bound on samples per transiting body.
pub const MAX_SAMPLES: u64 = 5_000_000;

/// Find every contiguous in-orb window over the request's time range.
///
/// Each (transiting body, reference) pair is sampled at `start + k * step`
/// and at `end`. A window for an aspect is open while the matcher picks
/// that aspect; if it flips to a neighbouring aspect the first window
/// closes and the other opens. A body that leaves orb and comes back, as
/// in a retrograde loop, yields a separate period for each pass.
///
/// Provider failures abort the whole call; no partial result is returned.
pub fn find_aspect_periods<P>(provider: &P, request: &ScanRequest) -> Result<Vec<AspectPeriod>>
where
    P: PositionProvider + ?Sized,
{
    let plan = ScanPlan::new(request)?;
    let mut cache = PositionCache::new(provider, request.frame);
    let mut periods = Vec::new();

    for &(body, target) in &plan.pairs {
        let found = scan_pair(&mut cache, request, &plan.instants, body, &request.targets[target])?;
        periods.extend(found);
    }

    periods.sort_by(compare_periods);
    info!(
        "Found {} aspect periods over {} samples ({} provider calls, {} cache hits)",
        periods.len(),
        plan.instants.len(),
        cache.misses(),
        cache.hits()
    );
    Ok(periods)
}

/// [`find_aspect_periods`] with one blocking task per (body, reference)
/// pair. Each task keeps its own position cache; the merged output is
/// sorted exactly as the sequential version sorts it.
pub async fn find_aspect_periods_concurrent<P>(
    provider: Arc<P>,
    request: &ScanRequest,
) -> Result<Vec<AspectPeriod>>
where
    P: PositionProvider + Send + Sync + 'static,
{
    let plan = ScanPlan::new(request)?;
    let request = Arc::new(request.clone());
    let instants = Arc::new(plan.instants);

    let handles: Vec<_> = plan
        .pairs
        .into_iter()
        .map(|(body, target)| {
            let provider = Arc::clone(&provider);
            let request = Arc::clone(&request);
            let instants = Arc::clone(&instants);
            tokio::task::spawn_blocking(move || {
                let mut cache = PositionCache::new(provider.as_ref(), request.frame);
                scan_pair(&mut cache, &request, &instants, body, &request.targets[target])
            })
        })
        .collect();

    debug!("Spawned {} scan tasks", handles.len());

    let mut periods = Vec::new();
    for handle in handles {
        let found = handle.await.map_err(|e| AspectError::Task {
            message: e.to_string(),
        })??;
        periods.extend(found);
    }

    periods.sort_by(compare_periods);
    info!("Found {} aspect periods concurrently", periods.len());
    Ok(periods)
}

/// Validated request broken into sample instants and work items.
struct ScanPlan {
    instants: Vec<DateTime<Utc>>,
    /// (transiting body, index into `request.targets`)
    pairs: Vec<(Body, usize)>,
}

impl ScanPlan {
    fn new(request: &ScanRequest) -> std::result::Result<Self, ConfigError> {
        request.validate()?;
        let instants = sample_instants(request.start, request.end, request.step)?;

        let mut bodies: Vec<Body> = Vec::with_capacity(request.bodies.len());
        for &body in &request.bodies {
            if !bodies.contains(&body) && !request.exclude.contains(&body) {
                bodies.push(body);
            }
        }
        for body in &request.exclude {
            if !request.bodies.contains(body) {
                warn!("Excluded body {} is not in the transiting list", body);
            }
        }
        if bodies.is_empty() {
            warn!("Every transiting body is excluded; nothing to scan");
        }

        let mut pairs = Vec::new();
        for &body in &bodies {
            for (i, target) in request.targets.iter().enumerate() {
                if target.reference == Reference::moving(body) {
                    debug!("Skipping {} against itself", body);
                    continue;
                }
                pairs.push((body, i));
            }
        }

        Ok(Self { instants, pairs })
    }
}

/// `start + k * step` for every k that stays within the range, plus `end`
/// itself when the last step falls short of it.
pub(crate) fn sample_instants(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
) -> std::result::Result<Vec<DateTime<Utc>>, ConfigError> {
    let span = (end - start).to_std().map_or(0.0, |d| d.as_secs_f64());
    let step_secs = step.to_std().map_or(0.0, |d| d.as_secs_f64());
    let estimate = if step_secs > 0.0 { span / step_secs } else { f64::INFINITY };
    if estimate + 2.0 > MAX_SAMPLES as f64 {
        return Err(ConfigError::TooManySamples {
            count: (estimate.min(u64::MAX as f64) as u64).saturating_add(2),
            limit: MAX_SAMPLES,
        });
    }

    let mut instants = Vec::with_capacity(estimate as usize + 2);
    let mut t = start;
    loop {
        instants.push(t);
        match t.checked_add_signed(step) {
            Some(next) if next <= end => t = next,
            _ => break,
        }
    }
    if t < end {
        instants.push(end);
    }
    Ok(instants)
}

#[derive(Debug, Default)]
enum WindowState {
    #[default]
    Searching,
    Open(OpenWindow),
}

/// Sample indices of a window that is still in orb.
#[derive(Debug, Clone, Copy)]
struct OpenWindow {
    first: usize,
    last: usize,
    best: usize,
    best_deviation: f64,
}

impl OpenWindow {
    fn new(index: usize, deviation: f64) -> Self {
        Self {
            first: index,
            last: index,
            best: index,
            best_deviation: deviation,
        }
    }

    fn extend(&mut self, index: usize, deviation: f64) {
        self.last = index;
        // strict: the earliest of equal minima is kept
        if deviation < self.best_deviation {
            self.best = index;
            self.best_deviation = deviation;
        }
    }
}

fn scan_pair<P>(
    cache: &mut PositionCache<'_, P>,
    request: &ScanRequest,
    instants: &[DateTime<Utc>],
    body: Body,
    target: &PeriodTarget,
) -> Result<Vec<AspectPeriod>>
where
    P: PositionProvider + ?Sized,
{
    let catalog: AspectCatalog = match request.body_orbs.get(&body) {
        Some(&floor) => target.catalog.widened(floor),
        None => target.catalog.clone(),
    };
    let scan = PairScan {
        request,
        instants,
        body,
        reference: &target.reference,
        label: target.reference.label(),
    };

    let mut states: Vec<WindowState> = std::iter::repeat_with(WindowState::default)
        .take(catalog.len())
        .collect();
    let mut periods = Vec::new();

    for (i, &instant) in instants.iter().enumerate() {
        let separation = scan.separation_at(cache, instant)?;
        let hit = catalog.match_separation(separation);

        for (k, def) in catalog.iter().enumerate() {
            let matched = hit.filter(|m| m.aspect == def.kind);
            states[k] = match (std::mem::take(&mut states[k]), matched) {
                (WindowState::Searching, Some(m)) => {
                    WindowState::Open(OpenWindow::new(i, m.deviation))
                }
                (WindowState::Open(mut w), Some(m)) => {
                    w.extend(i, m.deviation);
                    WindowState::Open(w)
                }
                (WindowState::Open(w), None) => {
                    periods.push(scan.close(cache, def, w)?);
                    WindowState::Searching
                }
                (WindowState::Searching, None) => WindowState::Searching,
            };
        }
    }

    // windows still in orb at the end of the range
    for (def, state) in catalog.iter().zip(states) {
        if let WindowState::Open(w) = state {
            periods.push(scan.close(cache, def, w)?);
        }
    }

    debug!(
        "{} vs {}: {} periods over {} samples",
        body,
        scan.label,
        periods.len(),
        instants.len()
    );
    Ok(periods)
}

/// Provider longitude, with NaN or infinity reported as a failed calculation.
fn finite_longitude<P>(
    cache: &mut PositionCache<'_, P>,
    body: Body,
    instant: DateTime<Utc>,
) -> std::result::Result<f64, ProviderError>
where
    P: PositionProvider + ?Sized,
{
    let longitude = cache.position(body, instant)?.longitude;
    if longitude.is_finite() {
        Ok(longitude)
    } else {
        Err(ProviderError::CalculationFailed {
            body,
            instant,
            message: format!("non-finite longitude {longitude}"),
        })
    }
}

/// Fixed context for one (transiting body, reference) scan.
struct PairScan<'r> {
    request: &'r ScanRequest,
    instants: &'r [DateTime<Utc>],
    body: Body,
    reference: &'r Reference,
    label: String,
}

impl PairScan<'_> {
    fn separation_at<P>(
        &self,
        cache: &mut PositionCache<'_, P>,
        instant: DateTime<Utc>,
    ) -> std::result::Result<f64, ProviderError>
    where
        P: PositionProvider + ?Sized,
    {
        let lon = finite_longitude(cache, self.body, instant)?;
        let reference = match self.reference {
            Reference::Fixed { longitude, .. } => *longitude,
            Reference::Moving { body } => finite_longitude(cache, *body, instant)?,
        };
        Ok(angle::separation(lon, reference))
    }

    fn deviation_at<P>(
        &self,
        cache: &mut PositionCache<'_, P>,
        instant: DateTime<Utc>,
        target_angle: f64,
    ) -> std::result::Result<f64, ProviderError>
    where
        P: PositionProvider + ?Sized,
    {
        Ok(angle::deviation(self.separation_at(cache, instant)?, target_angle))
    }

    /// Turn a finished window into a period, refining its exact instant
    /// between the samples either side of the best one. The search never
    /// leaves the window's own samples.
    fn close<P>(
        &self,
        cache: &mut PositionCache<'_, P>,
        def: &AspectDefinition,
        window: OpenWindow,
    ) -> std::result::Result<AspectPeriod, ProviderError>
    where
        P: PositionProvider + ?Sized,
    {
        let lo = window.best.saturating_sub(1).max(window.first);
        let hi = (window.best + 1).min(window.last);
        let mut exact = self.instants[window.best];
        let mut deviation = window.best_deviation;

        if hi > lo {
            let origin = self.instants[lo];
            let width = (self.instants[hi] - origin).num_nanoseconds();
            let tolerance = self
                .request
                .refinement
                .tolerance
                .num_nanoseconds()
                .unwrap_or(i64::MAX) as f64;
            if let Some(width) = width {
                let at = |x: f64| origin + Duration::nanoseconds(x.round().clamp(0.0, width as f64) as i64);
                let (x, refined) = golden_section_min(
                    0.0,
                    width as f64,
                    tolerance,
                    self.request.refinement.max_iterations,
                    |x| self.deviation_at(cache, at(x), def.target_angle),
                )?;
                if refined < deviation {
                    exact = at(x);
                    deviation = refined;
                }
            }
        }

        Ok(AspectPeriod {
            transiting_body: self.body,
            aspect: def.kind,
            reference: self.label.clone(),
            window_start: self.instants[window.first],
            exact_instant: exact,
            window_end: self.instants[window.last],
            peak_strength: strength(deviation, def.max_orb),
            min_deviation: deviation,
            max_orb: def.max_orb,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn samples_include_end_when_step_falls_short() {
        let s = sample_instants(t0(), t0() + Duration::hours(10), Duration::hours(4)).unwrap();
        let hours: Vec<i64> = s.iter().map(|t| (*t - t0()).num_hours()).collect();
        assert_eq!(hours, vec![0, 4, 8, 10]);
    }

    #[test]
    fn samples_land_on_end_without_duplicating_it() {
        let s = sample_instants(t0(), t0() + Duration::hours(8), Duration::hours(4)).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s[2], t0() + Duration::hours(8));
    }

    #[test]
    fn zero_length_range_is_one_sample() {
        let s = sample_instants(t0(), t0(), Duration::hours(1)).unwrap();
        assert_eq!(s, vec![t0()]);
    }

    #[test]
    fn absurd_sample_counts_are_rejected() {
        let err = sample_instants(t0(), t0() + Duration::days(3650), Duration::seconds(1))
            .unwrap_err();
        assert!(matches!(err, ConfigError::TooManySamples { .. }));
    }
}
