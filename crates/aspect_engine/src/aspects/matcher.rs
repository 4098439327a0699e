use crate::angle;
use crate::aspects::catalog::AspectCatalog;
use crate::aspects::types::{strength, AspectMatch};

impl AspectCatalog {
    /// Best aspect for a separation, or `None` when nothing is in orb.
    ///
    /// The aspect with the smallest deviation wins; an exact tie goes to
    /// the earlier catalog entry. Separations outside [0, 180] are folded
    /// back onto the circle first. A non-finite separation never matches.
    pub fn match_separation(&self, separation: f64) -> Option<AspectMatch> {
        if !separation.is_finite() {
            return None;
        }
        let sep = angle::separation(separation, 0.0);
        let mut best: Option<AspectMatch> = None;
        for def in self.iter() {
            let deviation = angle::deviation(sep, def.target_angle);
            if deviation > def.max_orb {
                continue;
            }
            // strict comparison keeps the lower index on ties
            if best.map_or(true, |b| deviation < b.deviation) {
                best = Some(AspectMatch {
                    aspect: def.kind,
                    separation: sep,
                    deviation,
                    max_orb: def.max_orb,
                    strength: strength(deviation, def.max_orb),
                });
            }
        }
        best
    }

    /// Match the separation between two longitudes.
    pub fn match_longitudes(&self, a: f64, b: f64) -> Option<AspectMatch> {
        self.match_separation(angle::separation(a, b))
    }
}
