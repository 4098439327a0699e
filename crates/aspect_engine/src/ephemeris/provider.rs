use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use crate::ephemeris::types::{Body, BodyPosition, ChartPoint, FrameConfig};
use crate::error::ProviderError;

/// Source of ecliptic positions.
///
/// Implementations must fail explicitly for bodies or instants they
/// cannot resolve; never return a sentinel longitude.
pub trait PositionProvider {
    fn position(
        &self,
        body: Body,
        instant: DateTime<Utc>,
        frame: &FrameConfig,
    ) -> Result<BodyPosition, ProviderError>;
}

impl<P: PositionProvider + ?Sized> PositionProvider for &P {
    fn position(
        &self,
        body: Body,
        instant: DateTime<Utc>,
        frame: &FrameConfig,
    ) -> Result<BodyPosition, ProviderError> {
        (**self).position(body, instant, frame)
    }
}

impl<P: PositionProvider + ?Sized> PositionProvider for Arc<P> {
    fn position(
        &self,
        body: Body,
        instant: DateTime<Utc>,
        frame: &FrameConfig,
    ) -> Result<BodyPosition, ProviderError> {
        (**self).position(body, instant, frame)
    }
}

/// Provider backed by a closure. The closure sees the frame too, so it
/// can apply or ignore it.
pub struct FnProvider<F>(pub F);

impl<F> PositionProvider for FnProvider<F>
where
    F: Fn(Body, DateTime<Utc>, &FrameConfig) -> Result<BodyPosition, ProviderError>,
{
    fn position(
        &self,
        body: Body,
        instant: DateTime<Utc>,
        frame: &FrameConfig,
    ) -> Result<BodyPosition, ProviderError> {
        (self.0)(body, instant, frame)
    }
}

/// Request-scoped memo of provider lookups.
///
/// The frame is fixed at construction, so cached entries can never leak
/// across frame configurations. Drop it at the end of the request.
pub struct PositionCache<'a, P: PositionProvider + ?Sized> {
    provider: &'a P,
    frame: FrameConfig,
    entries: HashMap<(Body, i64, u32), BodyPosition>,
    hits: usize,
}

impl<'a, P: PositionProvider + ?Sized> PositionCache<'a, P> {
    pub fn new(provider: &'a P, frame: FrameConfig) -> Self {
        Self {
            provider,
            frame,
            entries: HashMap::new(),
            hits: 0,
        }
    }

    pub fn frame(&self) -> &FrameConfig {
        &self.frame
    }

    pub fn position(
        &mut self,
        body: Body,
        instant: DateTime<Utc>,
    ) -> Result<BodyPosition, ProviderError> {
        let key = (body, instant.timestamp(), instant.timestamp_subsec_nanos());
        if let Some(pos) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(*pos);
        }
        let pos = self.provider.position(body, instant, &self.frame)?;
        self.entries.insert(key, pos);
        Ok(pos)
    }

    /// Number of distinct lookups that reached the provider.
    pub fn misses(&self) -> usize {
        self.entries.len()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }
}

/// Snapshot of several bodies at one instant.
pub fn chart_positions<P: PositionProvider + ?Sized>(
    provider: &P,
    bodies: &[Body],
    instant: DateTime<Utc>,
    frame: &FrameConfig,
) -> Result<Vec<ChartPoint>, ProviderError> {
    bodies
        .iter()
        .map(|&body| {
            provider
                .position(body, instant, frame)
                .map(|pos| ChartPoint::from_position(body, pos))
        })
        .collect()
}
