//! Benchmark-results model for the JMH visualizer.
//!
//! Parses the JSON array JMH writes with `-rf json`, groups records by
//! benchmark class, sorts them for charting, and resolves per-chart display
//! settings between the global controls and each chart's own controls.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum JmhError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid results JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// RECORDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryMetric {
    #[serde(default, deserialize_with = "number_or_nan")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "number_or_nan")]
    pub score_error: Option<f64>,
    #[serde(default)]
    pub score_unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkRecord {
    pub benchmark: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub threads: u32,
    #[serde(default)]
    pub forks: u32,
    #[serde(default)]
    pub jmh_version: Option<String>,
    #[serde(default)]
    pub jvm: Option<String>,
    #[serde(default)]
    pub jvm_args: Vec<String>,
    #[serde(default)]
    pub jdk_version: Option<String>,
    #[serde(default)]
    pub vm_name: Option<String>,
    #[serde(default)]
    pub vm_version: Option<String>,
    #[serde(default)]
    pub warmup_iterations: Option<u32>,
    #[serde(default)]
    pub warmup_time: Option<String>,
    #[serde(default)]
    pub warmup_batch_size: Option<u32>,
    #[serde(default)]
    pub measurement_iterations: Option<u32>,
    #[serde(default)]
    pub measurement_time: Option<String>,
    #[serde(default)]
    pub measurement_batch_size: Option<u32>,
    pub primary_metric: PrimaryMetric,
    /// JMH writes params in declaration order; a BTreeMap keeps output
    /// stable regardless.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// JMH writes `"NaN"` as a string for missing errors (and sometimes scores).
fn number_or_nan<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

impl BenchmarkRecord {
    /// Second-to-last dotted segment of the qualified name.
    pub fn simple_class_name(&self) -> &str {
        simple_class_name(&self.benchmark)
    }

    pub fn method_name(&self) -> &str {
        method_name(&self.benchmark)
    }

    /// `key=value, key=value`, empty when there are no params.
    pub fn params_display(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn params_values(&self) -> String {
        self.params.values().cloned().collect::<Vec<_>>().join(", ")
    }

    /// Chart axis label: method name plus parameter values in parentheses.
    pub fn label(&self) -> String {
        let values = self.params_values();
        if values.is_empty() {
            self.method_name().to_string()
        } else {
            format!("{} ({})", self.method_name(), values)
        }
    }

    pub fn score(&self) -> f64 {
        self.primary_metric.score.unwrap_or(0.0)
    }
}

pub fn simple_class_name(qualified: &str) -> &str {
    let mut parts = qualified.rsplit('.');
    let last = parts.next().unwrap_or(qualified);
    parts.next().unwrap_or(last)
}

pub fn method_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

pub fn parse_results(json: &str) -> Result<Vec<BenchmarkRecord>, JmhError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_results(path: &Path) -> Result<Vec<BenchmarkRecord>, JmhError> {
    let text = std::fs::read_to_string(path)?;
    let records = parse_results(&text)?;
    log::info!("loaded {} benchmark records from {}", records.len(), path.display());
    Ok(records)
}

// ============================================================================
// GROUPS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentInfo {
    pub jmh_version: Option<String>,
    pub benchmark: String,
    pub mode: String,
    pub threads: u32,
    pub forks: u32,
    pub jvm: Option<String>,
    pub jvm_args: String,
    pub jdk_version: Option<String>,
    pub vm_name: Option<String>,
    pub vm_version: Option<String>,
    pub warmup_iterations: Option<u32>,
    pub warmup_time: Option<String>,
    pub measurement_iterations: Option<u32>,
    pub measurement_time: Option<String>,
}

impl EnvironmentInfo {
    pub fn from_record(r: &BenchmarkRecord) -> Self {
        Self {
            jmh_version: r.jmh_version.clone(),
            benchmark: r.benchmark.clone(),
            mode: r.mode.clone(),
            threads: r.threads,
            forks: r.forks,
            jvm: r.jvm.clone(),
            jvm_args: r.jvm_args.join(" "),
            jdk_version: r.jdk_version.clone(),
            vm_name: r.vm_name.clone(),
            vm_version: r.vm_version.clone(),
            warmup_iterations: r.warmup_iterations,
            warmup_time: r.warmup_time.clone(),
            measurement_iterations: r.measurement_iterations,
            measurement_time: r.measurement_time.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkGroup {
    pub class_name: String,
    pub benchmarks: Vec<BenchmarkRecord>,
    pub environment: EnvironmentInfo,
}

/// Group records by simple class name, in first-seen order.
pub fn group_by_class(records: &[BenchmarkRecord]) -> Vec<BenchmarkGroup> {
    let mut groups: Vec<BenchmarkGroup> = Vec::new();
    for record in records {
        let class_name = record.simple_class_name();
        match groups.iter_mut().find(|g| g.class_name == class_name) {
            Some(group) => group.benchmarks.push(record.clone()),
            None => groups.push(BenchmarkGroup {
                class_name: class_name.to_string(),
                benchmarks: vec![record.clone()],
                environment: EnvironmentInfo::from_record(record),
            }),
        }
    }
    groups
}

// ============================================================================
// CHART SETTINGS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ChartType {
    #[default]
    HorizontalBar,
    Bar,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Renderer {
    #[default]
    Canvas,
    Svg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortMetric {
    #[default]
    Score,
    /// Only `thrpt` records contribute; others sort as 0.
    Throughput,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Original,
    Asc,
    Desc,
}

/// One chart's effective display settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChartSettings {
    pub chart_type: ChartType,
    pub renderer: Renderer,
    pub sort_metric: SortMetric,
    pub sort_order: SortOrder,
    pub show_errors: bool,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            chart_type: ChartType::HorizontalBar,
            renderer: Renderer::Canvas,
            sort_metric: SortMetric::Score,
            sort_order: SortOrder::Original,
            show_errors: true,
        }
    }
}

/// A single control value, tagged with the setting it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingValue {
    ChartType(ChartType),
    Renderer(Renderer),
    SortMetric(SortMetric),
    SortOrder(SortOrder),
    ShowErrors(bool),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettingKind {
    ChartType,
    Renderer,
    SortMetric,
    SortOrder,
    ShowErrors,
}

impl SettingValue {
    pub fn kind(&self) -> SettingKind {
        match self {
            SettingValue::ChartType(_) => SettingKind::ChartType,
            SettingValue::Renderer(_) => SettingKind::Renderer,
            SettingValue::SortMetric(_) => SettingKind::SortMetric,
            SettingValue::SortOrder(_) => SettingKind::SortOrder,
            SettingValue::ShowErrors(_) => SettingKind::ShowErrors,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingSource {
    Global,
    Local,
}

/// Partially-set controls: a kind missing from the map has no value yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct ControlValues {
    values: HashMap<SettingKind, SettingValue>,
}

impl ControlValues {
    fn set(&mut self, value: SettingValue) {
        self.values.insert(value.kind(), value);
    }

    fn get(&self, kind: SettingKind) -> Option<SettingValue> {
        self.values.get(&kind).copied()
    }
}

#[derive(Clone, Debug, Default)]
struct ChartEntry {
    local: ControlValues,
    last_source: HashMap<SettingKind, SettingSource>,
}

/// Last-write-wins resolution between the global controls and each chart's
/// local controls, tracked independently per setting.
#[derive(Clone, Debug, Default)]
pub struct SettingResolver {
    global: ControlValues,
    charts: HashMap<String, ChartEntry>,
}

impl SettingResolver {
    pub fn register_chart(&mut self, chart_id: &str) {
        self.charts.entry(chart_id.to_string()).or_default();
    }

    pub fn chart_ids(&self) -> impl Iterator<Item = &str> {
        self.charts.keys().map(String::as_str)
    }

    /// A global control changed: it becomes the latest source for that
    /// setting on every registered chart.
    pub fn set_global(&mut self, value: SettingValue) {
        self.global.set(value);
        for entry in self.charts.values_mut() {
            entry.last_source.insert(value.kind(), SettingSource::Global);
        }
        log::debug!("global {:?} -> {:?}", value.kind(), value);
    }

    pub fn set_local(&mut self, chart_id: &str, value: SettingValue) {
        let entry = self.charts.entry(chart_id.to_string()).or_default();
        entry.local.set(value);
        entry.last_source.insert(value.kind(), SettingSource::Local);
        log::debug!("chart {} local {:?} -> {:?}", chart_id, value.kind(), value);
    }

    fn resolve_one(&self, chart_id: &str, kind: SettingKind) -> Option<SettingValue> {
        let global = self.global.get(kind);
        let entry = self.charts.get(chart_id);
        let local = entry.and_then(|e| e.local.get(kind));
        match entry.and_then(|e| e.last_source.get(&kind)) {
            Some(SettingSource::Global) if global.is_some() => global,
            Some(SettingSource::Local) if local.is_some() => local,
            _ => local.or(global),
        }
    }

    /// Effective settings for `chart_id`; anything unset takes its default.
    pub fn resolve(&self, chart_id: &str) -> ChartSettings {
        let mut s = ChartSettings::default();
        for kind in [
            SettingKind::ChartType,
            SettingKind::Renderer,
            SettingKind::SortMetric,
            SettingKind::SortOrder,
            SettingKind::ShowErrors,
        ] {
            match self.resolve_one(chart_id, kind) {
                Some(SettingValue::ChartType(v)) => s.chart_type = v,
                Some(SettingValue::Renderer(v)) => s.renderer = v,
                Some(SettingValue::SortMetric(v)) => s.sort_metric = v,
                Some(SettingValue::SortOrder(v)) => s.sort_order = v,
                Some(SettingValue::ShowErrors(v)) => s.show_errors = v,
                None => {}
            }
        }
        s
    }
}

// ============================================================================
// SORTING / COLORS
// ============================================================================

pub fn sort_benchmarks(
    records: &[BenchmarkRecord],
    metric: SortMetric,
    order: SortOrder,
) -> Vec<BenchmarkRecord> {
    let mut sorted = records.to_vec();
    if order == SortOrder::Original {
        return sorted;
    }
    let key = |r: &BenchmarkRecord| match metric {
        SortMetric::Score => r.score(),
        SortMetric::Throughput if r.mode == "thrpt" => r.score(),
        SortMetric::Throughput => 0.0,
    };
    sorted.sort_by(|a, b| key(a).total_cmp(&key(b)));
    if order == SortOrder::Desc {
        sorted.reverse();
    }
    sorted
}

/// Green for the lowest score through red for the highest.
pub fn color_for_score(score: f64, min: f64, max: f64) -> String {
    if max == min {
        return "#3498db".to_string();
    }
    let ratio = ((score - min) / (max - min)).clamp(0.0, 1.0);
    let hue = 120.0 - ratio * 120.0;
    format!("hsl({}, 70%, 50%)", hue.round())
}

/// `(min, max)` of the scores, or `None` for an empty slice.
pub fn score_range(records: &[BenchmarkRecord]) -> Option<(f64, f64)> {
    let mut it = records.iter().map(BenchmarkRecord::score);
    let first = it.next()?;
    Some(it.fold((first, first), |(lo, hi), s| (lo.min(s), hi.max(s))))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
      {
        "jmhVersion": "1.37",
        "benchmark": "com.example.bench.StringBench.concat",
        "mode": "thrpt",
        "threads": 1,
        "forks": 2,
        "jvm": "/usr/bin/java",
        "jvmArgs": ["-Xmx2g", "-XX:+UseG1GC"],
        "jdkVersion": "21.0.2",
        "primaryMetric": { "score": 1500.5, "scoreError": 12.25, "scoreUnit": "ops/ms" },
        "params": { "length": "10" }
      },
      {
        "benchmark": "com.example.bench.StringBench.builder",
        "mode": "avgt",
        "threads": 4,
        "forks": 1,
        "primaryMetric": { "score": 900.0, "scoreError": "NaN", "scoreUnit": "ns/op" }
      },
      {
        "benchmark": "com.example.bench.MapBench.get",
        "mode": "thrpt",
        "threads": 1,
        "forks": 1,
        "primaryMetric": { "score": 3000.0, "scoreError": 1.0, "scoreUnit": "ops/ms" }
      }
    ]"#;

    #[test]
    fn parses_records_and_nan_errors() {
        let records = parse_results(SAMPLE).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].primary_metric.score_error, Some(12.25));
        assert_eq!(records[1].primary_metric.score_error, None);
        assert_eq!(records[0].jvm_args, vec!["-Xmx2g", "-XX:+UseG1GC"]);
        assert!(records[1].params.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(parse_results("{oops"), Err(JmhError::Json(_))));
        assert!(parse_results(r#"{"benchmark": "x"}"#).is_err());
    }

    #[test]
    fn name_helpers() {
        assert_eq!(simple_class_name("a.b.Cls.method"), "Cls");
        assert_eq!(method_name("a.b.Cls.method"), "method");
        assert_eq!(simple_class_name("method"), "method");
        let records = parse_results(SAMPLE).unwrap();
        assert_eq!(records[0].params_display(), "length=10");
        assert_eq!(records[0].label(), "concat (10)");
        assert_eq!(records[1].label(), "builder");
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let records = parse_results(SAMPLE).unwrap();
        let groups = group_by_class(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].class_name, "StringBench");
        assert_eq!(groups[0].benchmarks.len(), 2);
        assert_eq!(groups[0].environment.jvm_args, "-Xmx2g -XX:+UseG1GC");
        assert_eq!(groups[1].class_name, "MapBench");
    }

    #[test]
    fn sorting_by_score_and_throughput() {
        let records = parse_results(SAMPLE).unwrap();
        let original = sort_benchmarks(&records, SortMetric::Score, SortOrder::Original);
        assert_eq!(original, records);

        let asc = sort_benchmarks(&records, SortMetric::Score, SortOrder::Asc);
        let names: Vec<_> = asc.iter().map(|r| r.method_name()).collect();
        assert_eq!(names, ["builder", "concat", "get"]);

        // avgt record counts as 0 under throughput, so it sorts last in desc
        let desc = sort_benchmarks(&records, SortMetric::Throughput, SortOrder::Desc);
        let names: Vec<_> = desc.iter().map(|r| r.method_name()).collect();
        assert_eq!(names, ["get", "concat", "builder"]);
    }

    #[test]
    fn score_colors() {
        assert_eq!(color_for_score(5.0, 5.0, 5.0), "#3498db");
        assert_eq!(color_for_score(0.0, 0.0, 10.0), "hsl(120, 70%, 50%)");
        assert_eq!(color_for_score(10.0, 0.0, 10.0), "hsl(0, 70%, 50%)");
        let records = parse_results(SAMPLE).unwrap();
        assert_eq!(score_range(&records), Some((900.0, 3000.0)));
        assert_eq!(score_range(&[]), None);
    }

    #[test]
    fn defaults_when_nothing_set() {
        let mut resolver = SettingResolver::default();
        resolver.register_chart("c1");
        assert_eq!(resolver.resolve("c1"), ChartSettings::default());
        assert_eq!(resolver.resolve("unknown"), ChartSettings::default());
    }

    #[test]
    fn most_recent_source_wins_per_setting() {
        let mut resolver = SettingResolver::default();
        resolver.register_chart("c1");
        resolver.register_chart("c2");

        resolver.set_local("c1", SettingValue::SortOrder(SortOrder::Asc));
        assert_eq!(resolver.resolve("c1").sort_order, SortOrder::Asc);

        resolver.set_global(SettingValue::SortOrder(SortOrder::Desc));
        assert_eq!(resolver.resolve("c1").sort_order, SortOrder::Desc);
        assert_eq!(resolver.resolve("c2").sort_order, SortOrder::Desc);

        resolver.set_local("c1", SettingValue::SortOrder(SortOrder::Original));
        assert_eq!(resolver.resolve("c1").sort_order, SortOrder::Original);
        assert_eq!(resolver.resolve("c2").sort_order, SortOrder::Desc);
    }

    #[test]
    fn settings_are_tracked_independently() {
        let mut resolver = SettingResolver::default();
        resolver.register_chart("c1");
        resolver.set_local("c1", SettingValue::Renderer(Renderer::Svg));
        resolver.set_global(SettingValue::ShowErrors(false));

        let s = resolver.resolve("c1");
        assert_eq!(s.renderer, Renderer::Svg);
        assert!(!s.show_errors);
        assert_eq!(s.chart_type, ChartType::HorizontalBar);
    }

    #[test]
    fn late_chart_follows_global_until_set_locally() {
        let mut resolver = SettingResolver::default();
        resolver.set_global(SettingValue::SortMetric(SortMetric::Throughput));
        // chart registered after the global change has no recorded source
        resolver.register_chart("late");
        assert_eq!(resolver.resolve("late").sort_metric, SortMetric::Throughput);

        resolver.set_local("late", SettingValue::SortMetric(SortMetric::Score));
        assert_eq!(resolver.resolve("late").sort_metric, SortMetric::Score);
    }
}
