use anyhow::Context;
use aspect_engine::aspects::{AspectCatalog, AspectKind};
use aspect_engine::ephemeris::{Ayanamsha, Body, FrameConfig};
use aspect_engine::transit::{Horizon, PeriodTarget, Refinement, ScanRequest};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Resolved engine settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AspectSettings {
    pub frame: FrameConfig,
    /// Orbs for transit windows
    pub transit_catalog: AspectCatalog,
    /// Orbs for natal and synastry snapshots
    pub natal_catalog: AspectCatalog,
    /// Orb floor per transiting body
    pub body_orbs: BTreeMap<Body, f64>,
    /// Step used when no horizon is given
    pub default_step: Duration,
    pub refinement: Refinement,
    pub horizons: HashMap<Horizon, HorizonSettings>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HorizonSettings {
    pub step: Duration,
    pub exclude: Vec<Body>,
}

impl HorizonSettings {
    fn preset(horizon: Horizon) -> Self {
        Self {
            step: horizon.step(),
            exclude: horizon.exclusions().to_vec(),
        }
    }
}

impl Default for AspectSettings {
    fn default() -> Self {
        Self {
            frame: FrameConfig::Tropical,
            transit_catalog: AspectCatalog::transit(),
            natal_catalog: AspectCatalog::natal(),
            body_orbs: BTreeMap::new(),
            default_step: Duration::hours(default_step_hours() as i64),
            refinement: Refinement::default(),
            horizons: HashMap::new(),
        }
    }
}

impl AspectSettings {
    /// Step and exclusions for a horizon: the configured override, or the
    /// horizon's own preset.
    pub fn horizon(&self, horizon: Horizon) -> HorizonSettings {
        self.horizons
            .get(&horizon)
            .cloned()
            .unwrap_or_else(|| HorizonSettings::preset(horizon))
    }

    /// Build a transit request with these settings applied.
    ///
    /// With a horizon, `end` defaults to the horizon's span and the
    /// horizon's step and exclusions are used. Without one, `end` is
    /// required and the default step applies.
    pub fn scan_request(
        &self,
        bodies: Vec<Body>,
        targets: Vec<PeriodTarget>,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        horizon: Option<Horizon>,
    ) -> anyhow::Result<ScanRequest> {
        let (end, step, exclude) = match horizon {
            Some(h) => {
                let hs = self.horizon(h);
                (end.unwrap_or(start + h.span()), hs.step, hs.exclude)
            }
            None => {
                let end = end.ok_or_else(|| anyhow::anyhow!("An end instant or a horizon is required"))?;
                (end, self.default_step, Vec::new())
            }
        };

        let mut request = ScanRequest::new(bodies, targets, start, end, step)
            .excluding(&exclude)
            .with_frame(self.frame)
            .with_refinement(self.refinement);
        request.body_orbs = self.body_orbs.clone();
        Ok(request)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RootConfigToml {
    #[serde(default)]
    frame: FrameToml,
    #[serde(default)]
    orbs: OrbsToml,
    #[serde(default)]
    scan: ScanToml,
    #[serde(default)]
    horizons: BTreeMap<String, HorizonToml>,
}

#[derive(Debug, Clone, Deserialize)]
struct FrameToml {
    #[serde(default = "default_zodiac")]
    zodiac: String,
    #[serde(default)]
    ayanamsha: Option<String>,
    #[serde(default)]
    custom_offset: Option<f64>,
}

impl Default for FrameToml {
    fn default() -> Self {
        Self {
            zodiac: default_zodiac(),
            ayanamsha: None,
            custom_offset: None,
        }
    }
}

fn default_zodiac() -> String {
    "tropical".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OrbsToml {
    #[serde(default)]
    transit: BTreeMap<String, f64>,
    #[serde(default)]
    natal: BTreeMap<String, f64>,
    #[serde(default)]
    transit_body: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct ScanToml {
    #[serde(default = "default_step_hours")]
    step_hours: f64,
    #[serde(default = "default_refine_tolerance_minutes")]
    refine_tolerance_minutes: f64,
    #[serde(default = "default_refine_iterations")]
    max_refine_iterations: u32,
}

impl Default for ScanToml {
    fn default() -> Self {
        Self {
            step_hours: default_step_hours(),
            refine_tolerance_minutes: default_refine_tolerance_minutes(),
            max_refine_iterations: default_refine_iterations(),
        }
    }
}

fn default_step_hours() -> f64 {
    6.0
}

fn default_refine_tolerance_minutes() -> f64 {
    1.0
}

fn default_refine_iterations() -> u32 {
    60
}

#[derive(Debug, Clone, Deserialize)]
struct HorizonToml {
    #[serde(default)]
    step_hours: Option<f64>,
    #[serde(default)]
    exclude: Option<Vec<String>>,
}

/// Try common relative paths for `configs/aspects.toml`.
pub fn read_aspects_toml_text() -> anyhow::Result<String> {
    let paths = ["configs/aspects.toml", "../../configs/aspects.toml"];
    for p in &paths {
        if let Ok(c) = fs::read_to_string(p) {
            log::debug!("Loaded aspect settings from {}", p);
            return Ok(c);
        }
    }
    anyhow::bail!("Could not load aspects.toml from {:?}", paths);
}

/// Load settings from an explicit path, or from the default locations.
/// A missing default file is not an error; built-in defaults are used.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<AspectSettings> {
    match path {
        Some(p) => {
            let text = fs::read_to_string(p)
                .with_context(|| format!("Failed to read config file {}", p.display()))?;
            parse_settings(&text).with_context(|| format!("Invalid config file {}", p.display()))
        }
        None => match read_aspects_toml_text() {
            Ok(text) => parse_settings(&text),
            Err(e) => {
                log::info!("{e}; using built-in aspect settings");
                Ok(AspectSettings::default())
            }
        },
    }
}

pub fn parse_settings(text: &str) -> anyhow::Result<AspectSettings> {
    let root: RootConfigToml = toml::from_str(text)
        .map_err(|e| anyhow::anyhow!("Failed to parse aspects.toml: {e}"))?;

    let frame = parse_frame(&root.frame)?;
    let transit_catalog = apply_orbs(AspectCatalog::transit(), &root.orbs.transit)
        .context("Invalid [orbs.transit]")?;
    let natal_catalog =
        apply_orbs(AspectCatalog::natal(), &root.orbs.natal).context("Invalid [orbs.natal]")?;

    let mut body_orbs = BTreeMap::new();
    for (name, &orb) in &root.orbs.transit_body {
        let body = name.parse::<Body>().context("Invalid [orbs.transit_body]")?;
        if !(orb.is_finite() && orb > 0.0) {
            anyhow::bail!("orbs.transit_body.{name} must be positive, got {orb}");
        }
        body_orbs.insert(body, orb);
    }

    let default_step = hours(root.scan.step_hours).context("Invalid scan.step_hours")?;
    let tolerance = minutes(root.scan.refine_tolerance_minutes)
        .context("Invalid scan.refine_tolerance_minutes")?;
    let refinement = Refinement {
        tolerance,
        max_iterations: root.scan.max_refine_iterations,
    };

    let mut horizons = HashMap::new();
    for (name, h) in &root.horizons {
        let horizon: Horizon = name.parse()?;
        let mut settings = HorizonSettings::preset(horizon);
        if let Some(step) = h.step_hours {
            settings.step =
                hours(step).with_context(|| format!("Invalid horizons.{name}.step_hours"))?;
        }
        if let Some(exclude) = &h.exclude {
            settings.exclude = exclude
                .iter()
                .map(|b| b.parse::<Body>())
                .collect::<Result<Vec<Body>, _>>()
                .with_context(|| format!("Invalid horizons.{name}.exclude"))?;
        }
        horizons.insert(horizon, settings);
    }

    Ok(AspectSettings {
        frame,
        transit_catalog,
        natal_catalog,
        body_orbs,
        default_step,
        refinement,
        horizons,
    })
}

fn parse_frame(frame: &FrameToml) -> anyhow::Result<FrameConfig> {
    match frame.zodiac.to_lowercase().as_str() {
        "tropical" => Ok(FrameConfig::Tropical),
        "sidereal" => {
            let ayanamsha = match (&frame.ayanamsha, frame.custom_offset) {
                (_, Some(offset_deg)) => Ayanamsha::Custom { offset_deg },
                (Some(name), None) => name.parse()?,
                (None, None) => Ayanamsha::Lahiri,
            };
            Ok(FrameConfig::sidereal(ayanamsha))
        }
        other => anyhow::bail!("frame.zodiac must be \"tropical\" or \"sidereal\", got {other:?}"),
    }
}

fn apply_orbs(
    mut catalog: AspectCatalog,
    orbs: &BTreeMap<String, f64>,
) -> anyhow::Result<AspectCatalog> {
    for (name, &orb) in orbs {
        let kind: AspectKind = name.parse()?;
        catalog = catalog.with_orb(kind, orb)?;
    }
    Ok(catalog)
}

/// Positive, finite hours as a duration. Values too large for a
/// `Duration` are rejected rather than saturated.
pub fn hours(value: f64) -> anyhow::Result<Duration> {
    if !(value.is_finite() && value > 0.0) {
        anyhow::bail!("must be a positive number of hours, got {value}");
    }
    let seconds = (value * 3600.0).round();
    if seconds >= i64::MAX as f64 {
        anyhow::bail!("{value} hours is out of range");
    }
    Duration::try_seconds(seconds as i64)
        .ok_or_else(|| anyhow::anyhow!("{value} hours is out of range"))
}

/// Positive, finite minutes as a duration.
pub fn minutes(value: f64) -> anyhow::Result<Duration> {
    if !(value.is_finite() && value > 0.0) {
        anyhow::bail!("must be a positive number of minutes, got {value}");
    }
    let millis = (value * 60_000.0).round();
    if millis >= i64::MAX as f64 {
        anyhow::bail!("{value} minutes is out of range");
    }
    Duration::try_milliseconds(millis as i64)
        .ok_or_else(|| anyhow::anyhow!("{value} minutes is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = parse_settings("").unwrap();
        assert_eq!(settings, AspectSettings::default());
        assert_eq!(settings.horizon(Horizon::Month).step, Duration::hours(3));
    }

    #[test]
    fn parses_full_file() {
        let text = r#"
            [frame]
            zodiac = "sidereal"
            ayanamsha = "fagan_bradley"

            [orbs.transit]
            conjunction = 5.0
            sxt = 2.5

            [orbs.natal]
            trine = 12

            [orbs.transit_body]
            moon = 6.0

            [scan]
            step_hours = 2
            refine_tolerance_minutes = 0.5

            [horizons.year]
            step_hours = 12
            exclude = ["moon", "mercury"]
        "#;
        let s = parse_settings(text).unwrap();
        assert_eq!(s.frame, FrameConfig::sidereal(Ayanamsha::FaganBradley));
        assert_eq!(s.transit_catalog.get(AspectKind::Conjunction).unwrap().max_orb, 5.0);
        assert_eq!(s.transit_catalog.get(AspectKind::Sextile).unwrap().max_orb, 2.5);
        assert_eq!(s.natal_catalog.get(AspectKind::Trine).unwrap().max_orb, 12.0);
        assert_eq!(s.body_orbs.get(&Body::Moon), Some(&6.0));
        assert_eq!(s.default_step, Duration::hours(2));
        assert_eq!(s.refinement.tolerance, Duration::seconds(30));

        let year = s.horizon(Horizon::Year);
        assert_eq!(year.step, Duration::hours(12));
        assert_eq!(year.exclude, vec![Body::Moon, Body::Mercury]);
        // untouched horizons keep their presets
        assert_eq!(s.horizon(Horizon::HalfYear).exclude.len(), 4);
    }

    #[test]
    fn rejects_unknown_names_and_bad_values() {
        assert!(parse_settings("[orbs.transit]\nquincunx = 2.0").is_err());
        assert!(parse_settings("[orbs.transit]\ntrine = -1.0").is_err());
        assert!(parse_settings("[orbs.transit_body]\nvulcan = 2.0").is_err());
        assert!(parse_settings("[frame]\nzodiac = \"draconic\"").is_err());
        assert!(parse_settings("[scan]\nstep_hours = 0").is_err());
        assert!(parse_settings("[horizons.decade]\nstep_hours = 1").is_err());
    }

    #[test]
    fn huge_durations_are_errors_not_panics() {
        assert!(parse_settings("[scan]\nstep_hours = 1e18").is_err());
        assert!(parse_settings("[scan]\nrefine_tolerance_minutes = 1e300").is_err());
        assert!(parse_settings("[horizons.month]\nstep_hours = 1e15").is_err());
        assert!(hours(f64::MAX).is_err());
        assert_eq!(hours(1.5).unwrap(), Duration::minutes(90));
        assert_eq!(minutes(0.5).unwrap(), Duration::seconds(30));
    }

    #[test]
    fn scan_request_applies_settings() {
        let s = parse_settings("[orbs.transit_body]\nsun = 5.0").unwrap();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let req = s
            .scan_request(vec![Body::Sun], vec![], start, None, Some(Horizon::Year))
            .unwrap();
        assert_eq!(req.end - req.start, Duration::days(365));
        assert!(req.exclude.contains(&Body::Sun));
        assert_eq!(req.body_orbs.get(&Body::Sun), Some(&5.0));

        assert!(s.scan_request(vec![Body::Sun], vec![], start, None, None).is_err());
    }

    #[test]
    fn loads_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[frame]\nzodiac = \"sidereal\"\ncustom_offset = 20.0").unwrap();
        let s = load_settings(Some(file.path())).unwrap();
        assert_eq!(
            s.frame,
            FrameConfig::sidereal(Ayanamsha::Custom { offset_deg: 20.0 })
        );

        let missing = file.path().with_extension("missing");
        assert!(load_settings(Some(missing.as_path())).is_err());
    }
}
