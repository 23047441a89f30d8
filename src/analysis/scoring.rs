use crate::analysis::round2;
use crate::error::AppError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Stat categories that contribute to fantasy points, paired with the league
/// scoring key that prices them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatCategory {
    PassYards,
    PassTd,
    PassInt,
    RushYards,
    RushTd,
    Reception,
    RecYards,
    RecTd,
    FumbleLost,
    PassTwoPoint,
    RushTwoPoint,
    RecTwoPoint,
}

impl StatCategory {
    pub const ALL: [StatCategory; 12] = [
        StatCategory::PassYards,
        StatCategory::PassTd,
        StatCategory::PassInt,
        StatCategory::RushYards,
        StatCategory::RushTd,
        StatCategory::Reception,
        StatCategory::RecYards,
        StatCategory::RecTd,
        StatCategory::FumbleLost,
        StatCategory::PassTwoPoint,
        StatCategory::RushTwoPoint,
        StatCategory::RecTwoPoint,
    ];

    pub fn stat_key(&self) -> &'static str {
        match self {
            StatCategory::PassYards => "pass_yd",
            StatCategory::PassTd => "pass_td",
            StatCategory::PassInt => "pass_int",
            StatCategory::RushYards => "rush_yd",
            StatCategory::RushTd => "rush_td",
            StatCategory::Reception => "rec",
            StatCategory::RecYards => "rec_yd",
            StatCategory::RecTd => "rec_td",
            StatCategory::FumbleLost => "fum_lost",
            StatCategory::PassTwoPoint => "pass_2pt",
            StatCategory::RushTwoPoint => "rush_2pt",
            StatCategory::RecTwoPoint => "rec_2pt",
        }
    }

    pub fn scoring_key(&self) -> &'static str {
        match self {
            StatCategory::PassYards => "pts_pass_yd",
            StatCategory::PassTd => "pts_pass_td",
            StatCategory::PassInt => "pts_pass_int",
            StatCategory::RushYards => "pts_rush_yd",
            StatCategory::RushTd => "pts_rush_td",
            StatCategory::Reception => "pts_rec",
            StatCategory::RecYards => "pts_rec_yd",
            StatCategory::RecTd => "pts_rec_td",
            StatCategory::FumbleLost => "pts_fum_lost",
            StatCategory::PassTwoPoint => "pts_pass_2pt",
            StatCategory::RushTwoPoint => "pts_rush_2pt",
            StatCategory::RecTwoPoint => "pts_rec_2pt",
        }
    }
}

/// Sleeper payloads mix numbers, nulls and the odd string; only numbers count.
fn numeric_entries<'de, D, M>(deserializer: D) -> Result<M, D::Error>
where
    D: Deserializer<'de>,
    M: FromIterator<(String, f64)>,
{
    let raw = HashMap::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| value.as_f64().map(|v| (key, v)))
        .collect())
}

/// One player's stat line for one week. Missing keys count as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatRecord {
    #[serde(deserialize_with = "numeric_entries")]
    values: HashMap<String, f64>,
}

impl StatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, f64)> for StatRecord {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        StatRecord {
            values: iter.into_iter().collect(),
        }
    }
}

/// Player id -> stat line, as returned for a single week.
pub type StatSnapshot = HashMap<String, StatRecord>;

/// Points awarded per unit of each scoring key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringTable {
    #[serde(deserialize_with = "numeric_entries")]
    coefficients: BTreeMap<String, f64>,
}

impl ScoringTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, points: f64) -> Self {
        self.coefficients.insert(key.to_string(), points);
        self
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.coefficients.get(key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn points_per_reception(&self) -> f64 {
        self.get(StatCategory::Reception.scoring_key()).unwrap_or(0.0)
    }

    /// Unrounded point total for a stat line.
    pub fn raw_points(&self, stats: &StatRecord) -> f64 {
        StatCategory::ALL
            .iter()
            .filter_map(|cat| {
                let value = stats.get(cat.stat_key())?;
                let points_per = self.get(cat.scoring_key())?;
                Some(value * points_per)
            })
            .sum()
    }

    pub fn fantasy_points(&self, stats: &StatRecord) -> f64 {
        round2(self.raw_points(stats))
    }
}

impl FromIterator<(String, f64)> for ScoringTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        ScoringTable {
            coefficients: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub settings: ScoringTable,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    presets: BTreeMap<String, Preset>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringComparison {
    pub first: (String, f64),
    pub second: (String, f64),
    pub difference: f64,
}

/// Named scoring presets, keyed by short id ("standard", "ppr", ...).
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    presets: BTreeMap<String, Preset>,
}

impl PresetCatalog {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                warn!("Scoring config not found at {:?}, using built-in presets", path);
                return Ok(Self::builtin());
            }
        };

        let file: CatalogFile = serde_json::from_str(&content).map_err(|e| {
            AppError::JsonError(format!("Failed to parse scoring presets {:?}: {}", path, e))
        })?;
        debug!("Loaded {} scoring presets from {:?}", file.presets.len(), path);

        Ok(PresetCatalog {
            presets: file.presets,
        })
    }

    pub fn builtin() -> Self {
        let base = |rec: f64| {
            ScoringTable::new()
                .with("pts_pass_yd", 0.04)
                .with("pts_pass_td", 4.0)
                .with("pts_pass_int", -2.0)
                .with("pts_rush_yd", 0.1)
                .with("pts_rush_td", 6.0)
                .with("pts_rec", rec)
                .with("pts_rec_yd", 0.1)
                .with("pts_rec_td", 6.0)
                .with("pts_fum_lost", -2.0)
                .with("pts_pass_2pt", 2.0)
                .with("pts_rush_2pt", 2.0)
                .with("pts_rec_2pt", 2.0)
        };

        let mut presets = BTreeMap::new();
        presets.insert(
            "standard".to_string(),
            Preset {
                name: "Standard Scoring".to_string(),
                description: "Traditional fantasy football scoring without PPR".to_string(),
                settings: base(0.0),
            },
        );
        presets.insert(
            "ppr".to_string(),
            Preset {
                name: "PPR (Point Per Reception)".to_string(),
                description: "Full point per reception scoring".to_string(),
                settings: base(1.0),
            },
        );
        presets.insert(
            "half_ppr".to_string(),
            Preset {
                name: "Half PPR".to_string(),
                description: "Half point per reception scoring".to_string(),
                settings: base(0.5),
            },
        );

        PresetCatalog { presets }
    }

    pub fn list_presets(&self) -> Vec<(String, String)> {
        self.presets
            .iter()
            .map(|(id, preset)| (id.clone(), preset.description.clone()))
            .collect()
    }

    pub fn preset(&self, id: &str) -> Option<&Preset> {
        self.presets.get(id)
    }

    pub fn settings(&self, id: &str) -> Option<&ScoringTable> {
        self.presets.get(id).map(|p| &p.settings)
    }

    fn require(&self, id: &str) -> Result<&ScoringTable, AppError> {
        self.settings(id).ok_or_else(|| AppError::UnknownPreset {
            name: id.to_string(),
            available: self.presets.keys().cloned().collect::<Vec<_>>().join(", "),
        })
    }

    /// Score the same stat line under two presets.
    pub fn compare_scoring(
        &self,
        stats: &StatRecord,
        first: &str,
        second: &str,
    ) -> Result<ScoringComparison, AppError> {
        let first_points = self.require(first)?.raw_points(stats);
        let second_points = self.require(second)?.raw_points(stats);

        Ok(ScoringComparison {
            first: (first.to_string(), round2(first_points)),
            second: (second.to_string(), round2(second_points)),
            difference: round2(second_points - first_points),
        })
    }
}

/// File-backed custom scoring that takes precedence over everything else.
pub struct OverrideStore {
    path: PathBuf,
}

impl OverrideStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        OverrideStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<ScoringTable>, AppError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            AppError::ConfigError(format!("Failed to read scoring override {:?}: {}", self.path, e))
        })?;
        let table = serde_json::from_str(&content).map_err(|e| {
            AppError::JsonError(format!("Failed to parse scoring override {:?}: {}", self.path, e))
        })?;

        Ok(Some(table))
    }

    pub fn save(&self, table: &ScoringTable) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(table).map_err(|e| {
            AppError::JsonError(format!("Failed to serialize scoring override: {}", e))
        })?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, json)
            .and_then(|_| fs::rename(&temp_path, &self.path))
            .map_err(|e| {
                AppError::ConfigError(format!("Failed to write scoring override {:?}: {}", self.path, e))
            })?;

        info!("Custom scoring settings saved to {:?}", self.path);
        Ok(())
    }

    pub fn clear(&self) -> Result<(), AppError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                AppError::ConfigError(format!("Failed to remove scoring override {:?}: {}", self.path, e))
            })?;
        }
        Ok(())
    }
}

/// Where a resolved scoring table came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringSource {
    Override,
    Preset(String),
    DetectedFromLeague(String),
    League,
    Default,
}

impl ScoringSource {
    pub fn describe(&self) -> String {
        match self {
            ScoringSource::Override => "custom override".to_string(),
            ScoringSource::Preset(id) => format!("preset '{}'", id),
            ScoringSource::DetectedFromLeague(id) => format!("preset '{}' (detected from league)", id),
            ScoringSource::League => "league settings".to_string(),
            ScoringSource::Default => "preset 'standard' (default)".to_string(),
        }
    }
}

/// Resolves the scoring table for a run. The override is read once by the
/// caller and handed in, so resolution itself never touches the filesystem.
pub struct ScoringResolver {
    catalog: PresetCatalog,
    override_table: Option<ScoringTable>,
}

impl ScoringResolver {
    pub fn new(catalog: PresetCatalog, override_table: Option<ScoringTable>) -> Self {
        ScoringResolver {
            catalog,
            override_table,
        }
    }

    pub fn catalog(&self) -> &PresetCatalog {
        &self.catalog
    }

    pub fn resolve(
        &self,
        explicit_preset: Option<&str>,
        league_defaults: &ScoringTable,
        prefer_league: bool,
    ) -> Result<ScoringTable, AppError> {
        self.resolve_with_source(explicit_preset, league_defaults, prefer_league)
            .map(|(table, _)| table)
    }

    pub fn resolve_with_source(
        &self,
        explicit_preset: Option<&str>,
        league_defaults: &ScoringTable,
        prefer_league: bool,
    ) -> Result<(ScoringTable, ScoringSource), AppError> {
        let preset = match explicit_preset {
            Some(id) => Some((id, self.catalog.require(id)?)),
            None => None,
        };

        if let Some(table) = &self.override_table {
            return Ok((table.clone(), ScoringSource::Override));
        }

        if let Some((id, table)) = preset {
            return Ok((table.clone(), ScoringSource::Preset(id.to_string())));
        }

        if prefer_league && !league_defaults.is_empty() {
            let pts_rec = league_defaults.points_per_reception();
            let detected = if pts_rec == 1.0 {
                Some("ppr")
            } else if pts_rec == 0.5 {
                Some("half_ppr")
            } else {
                None
            };

            return Ok(match detected.and_then(|id| self.catalog.settings(id).map(|t| (id, t))) {
                Some((id, table)) => {
                    info!("Detected {} scoring from league settings", id);
                    (table.clone(), ScoringSource::DetectedFromLeague(id.to_string()))
                }
                None => (league_defaults.clone(), ScoringSource::League),
            });
        }

        let table = self.catalog.settings("standard").cloned().unwrap_or_default();
        Ok((table, ScoringSource::Default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn wr_line() -> StatRecord {
        StatRecord::new()
            .with("rec", 5.0)
            .with("rec_yd", 75.0)
            .with("rec_td", 1.0)
            .with("rush_yd", 0.0)
            .with("rush_td", 0.0)
    }

    #[test]
    fn test_ppr_and_standard_points() {
        let catalog = PresetCatalog::builtin();
        let ppr = catalog.settings("ppr").unwrap();
        let standard = catalog.settings("standard").unwrap();

        assert_eq!(ppr.fantasy_points(&wr_line()), 18.5);
        assert_eq!(standard.fantasy_points(&wr_line()), 13.5);
    }

    #[test]
    fn test_compare_scoring() {
        let catalog = PresetCatalog::builtin();
        let cmp = catalog.compare_scoring(&wr_line(), "standard", "ppr").unwrap();

        assert_eq!(cmp.first, ("standard".to_string(), 13.5));
        assert_eq!(cmp.second, ("ppr".to_string(), 18.5));
        assert_eq!(cmp.difference, 5.0);
    }

    #[test]
    fn test_points_ignore_unpriced_and_unknown_stats() {
        let table = ScoringTable::new().with("pts_rush_yd", 0.1);
        let stats = StatRecord::new()
            .with("rush_yd", 100.0)
            .with("rush_td", 2.0)
            .with("gp", 1.0);

        assert_eq!(table.fantasy_points(&stats), 10.0);
    }

    #[test]
    fn test_points_round_to_two_decimals() {
        let table = ScoringTable::new().with("pts_pass_yd", 0.04);
        let stats = StatRecord::new().with("pass_yd", 263.0);
        assert_eq!(table.fantasy_points(&stats), 10.52);

        let stats = StatRecord::new().with("pass_yd", 1.0 / 3.0);
        assert_eq!(table.fantasy_points(&stats), 0.01);
    }

    #[test]
    fn test_stat_record_skips_non_numeric_values() {
        let record: StatRecord =
            serde_json::from_str(r#"{"rec": 4, "rec_yd": null, "note": "x", "rec_td": 1.0}"#).unwrap();

        assert_eq!(record.get("rec"), Some(4.0));
        assert_eq!(record.get("rec_td"), Some(1.0));
        assert_eq!(record.get("rec_yd"), None);
        assert_eq!(record.get("note"), None);
    }

    fn league_with_rec(rec: f64) -> ScoringTable {
        ScoringTable::new()
            .with("pts_rec", rec)
            .with("pts_pass_td", 6.0)
    }

    #[test]
    fn test_resolve_override_wins() {
        let custom = ScoringTable::new().with("pts_rec", 2.0);
        let resolver = ScoringResolver::new(PresetCatalog::builtin(), Some(custom.clone()));

        let (table, source) = resolver
            .resolve_with_source(Some("ppr"), &league_with_rec(1.0), true)
            .unwrap();
        assert_eq!(table, custom);
        assert_eq!(source, ScoringSource::Override);
    }

    #[test]
    fn test_resolve_explicit_preset_beats_league() {
        let resolver = ScoringResolver::new(PresetCatalog::builtin(), None);
        let table = resolver
            .resolve(Some("standard"), &league_with_rec(1.0), true)
            .unwrap();
        assert_eq!(table.points_per_reception(), 0.0);
    }

    #[test]
    fn test_resolve_unknown_preset_is_error_even_with_override() {
        let resolver = ScoringResolver::new(
            PresetCatalog::builtin(),
            Some(ScoringTable::new().with("pts_rec", 2.0)),
        );
        let err = resolver
            .resolve(Some("tiered"), &ScoringTable::new(), true)
            .unwrap_err();

        match err {
            AppError::UnknownPreset { name, available } => {
                assert_eq!(name, "tiered");
                assert!(available.contains("ppr"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_detects_league_format() {
        let catalog = PresetCatalog::builtin();
        let resolver = ScoringResolver::new(catalog.clone(), None);

        let (table, source) = resolver
            .resolve_with_source(None, &league_with_rec(1.0), true)
            .unwrap();
        assert_eq!(&table, catalog.settings("ppr").unwrap());
        assert_eq!(source, ScoringSource::DetectedFromLeague("ppr".to_string()));

        let (table, _) = resolver
            .resolve_with_source(None, &league_with_rec(0.5), true)
            .unwrap();
        assert_eq!(&table, catalog.settings("half_ppr").unwrap());
    }

    #[test]
    fn test_resolve_passes_unusual_league_table_through() {
        let resolver = ScoringResolver::new(PresetCatalog::builtin(), None);
        let league = league_with_rec(0.25);

        let (table, source) = resolver.resolve_with_source(None, &league, true).unwrap();
        assert_eq!(table, league);
        assert_eq!(source, ScoringSource::League);
    }

    #[test]
    fn test_resolve_passes_league_through_when_detected_preset_missing() {
        let mut catalog = PresetCatalog::builtin();
        catalog.presets.remove("half_ppr");
        let resolver = ScoringResolver::new(catalog, None);
        let league = league_with_rec(0.5);

        assert_eq!(resolver.resolve(None, &league, true).unwrap(), league);
    }

    #[test]
    fn test_resolve_falls_back_to_standard() {
        let catalog = PresetCatalog::builtin();
        let resolver = ScoringResolver::new(catalog.clone(), None);

        let (table, source) = resolver
            .resolve_with_source(None, &league_with_rec(1.0), false)
            .unwrap();
        assert_eq!(&table, catalog.settings("standard").unwrap());
        assert_eq!(source, ScoringSource::Default);

        let (_, source) = resolver
            .resolve_with_source(None, &ScoringTable::new(), true)
            .unwrap();
        assert_eq!(source, ScoringSource::Default);
    }

    #[test]
    fn test_catalog_load_from_file_and_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scoring_settings.json");
        fs::write(
            &path,
            r#"{"presets": {"superflex": {"name": "Superflex", "description": "6pt pass TD",
                "settings": {"pts_pass_td": 6, "pts_rec": 1}}}}"#,
        )
        .unwrap();

        let catalog = PresetCatalog::load(&path).unwrap();
        assert_eq!(catalog.list_presets().len(), 1);
        assert_eq!(catalog.settings("superflex").unwrap().get("pts_pass_td"), Some(6.0));
        assert_eq!(catalog.preset("superflex").unwrap().name, "Superflex");

        let fallback = PresetCatalog::load(&dir.path().join("missing.json")).unwrap();
        assert!(fallback.settings("standard").is_some());
        assert!(fallback.settings("half_ppr").is_some());
    }

    #[test]
    fn test_catalog_load_rejects_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scoring_settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(PresetCatalog::load(&path), Err(AppError::JsonError(_))));
    }

    #[test]
    fn test_override_store_save_load_clear() {
        let dir = TempDir::new().unwrap();
        let store = OverrideStore::new(dir.path().join(".env.scoring.json"));
        assert!(store.load().unwrap().is_none());

        let table = ScoringTable::new().with("pts_rec", 0.75).with("pts_rec_td", 6.0);
        store.save(&table).unwrap();
        assert_eq!(store.load().unwrap(), Some(table));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(!store.path().exists());
    }

    proptest! {
        #[test]
        fn prop_points_are_linear_in_each_stat(
            rec in 0u32..20,
            rec_yd in 0u32..250,
            rush_td in 0u32..5,
            k in 0u32..6,
        ) {
            let table = PresetCatalog::builtin().settings("ppr").unwrap().clone();
            let base = StatRecord::new()
                .with("rec", rec as f64)
                .with("rec_yd", rec_yd as f64)
                .with("rush_td", rush_td as f64);
            let scaled = base.clone().with("rec_yd", (rec_yd * k) as f64);

            let contribution = table.raw_points(&base)
                - table.raw_points(&base.clone().with("rec_yd", 0.0));
            let scaled_contribution = table.raw_points(&scaled)
                - table.raw_points(&base.clone().with("rec_yd", 0.0));

            prop_assert!((scaled_contribution - contribution * k as f64).abs() < 1e-9);
        }
    }
}
