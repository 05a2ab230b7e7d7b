// Aggregation pipeline - groupings over filtered records
use crate::domain::geometry::zone_radius_m;
use crate::domain::measurement::JoinedRecord;
use crate::domain::severity::SeverityTier;
use crate::domain::summary::{
    MapStats, OverviewStats, PivotMatrix, PollutantMean, PollutantTrend, RankingEntry,
    RecentMeasurement, SampleInfo, StationPollutantSummary, StationSummary, TimeSeriesPoint,
    YearlySummary,
};
use chrono::NaiveDate;
use ordered_float::OrderedFloat;
use std::collections::{BTreeMap, BTreeSet};

const TOP_POLLUTANT_COUNT: usize = 3;

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: f64,
    max: f64,
    count: u64,
    exceeded: u64,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            sum: 0.0,
            max: f64::NEG_INFINITY,
            count: 0,
            exceeded: 0,
        }
    }
}

impl Accumulator {
    fn push(&mut self, record: &JoinedRecord) {
        self.sum += record.concentration;
        self.max = self.max.max(record.concentration);
        self.count += 1;
        if record.is_exceeded {
            self.exceeded += 1;
        }
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

fn group_by<K, F>(records: &[JoinedRecord], mut key: F) -> BTreeMap<K, Accumulator>
where
    K: Ord,
    F: FnMut(&JoinedRecord) -> Option<K>,
{
    let mut groups: BTreeMap<K, Accumulator> = BTreeMap::new();
    for record in records {
        if let Some(k) = key(record) {
            groups.entry(k).or_default().push(record);
        }
    }
    groups
}

fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Per-station mean concentration and exceedance count, one entry per
/// `(station, latitude, longitude)` in ascending order. Records without
/// usable coordinates are left out.
pub fn station_summaries(records: &[JoinedRecord]) -> Vec<StationSummary> {
    let groups = group_by(records, |r| {
        r.coordinates()
            .map(|(lat, lon)| (r.station_name.clone(), OrderedFloat(lat), OrderedFloat(lon)))
    });

    groups
        .into_iter()
        .enumerate()
        .map(|(idx, ((station_name, lat, lon), acc))| {
            let mean_concentration = acc.mean();
            StationSummary {
                number: idx + 1,
                station_name,
                latitude: lat.into_inner(),
                longitude: lon.into_inner(),
                mean_concentration,
                exceedance_count: acc.exceeded,
                tier: SeverityTier::classify(mean_concentration),
                zone_radius_m: zone_radius_m(mean_concentration),
            }
        })
        .collect()
}

/// Mean, max and count per `(year, pollutant)`, ordered by year ascending
/// then mean concentration descending.
pub fn yearly_summaries(records: &[JoinedRecord]) -> Vec<YearlySummary> {
    let groups = group_by(records, |r| Some((r.year, r.pollutant_name.clone())));

    let mut rows: Vec<YearlySummary> = groups
        .into_iter()
        .map(|((year, pollutant_name), acc)| YearlySummary {
            year,
            pollutant_name,
            mean_concentration: acc.mean(),
            max_concentration: acc.max,
            measurement_count: acc.count,
        })
        .collect();

    rows.sort_by(|a, b| {
        a.year
            .cmp(&b.year)
            .then(b.mean_concentration.total_cmp(&a.mean_concentration))
    });
    rows
}

pub fn station_pollutant_summaries(records: &[JoinedRecord]) -> Vec<StationPollutantSummary> {
    group_by(records, |r| Some((r.station_name.clone(), r.pollutant_name.clone())))
        .into_iter()
        .map(|((station_name, pollutant_name), acc)| StationPollutantSummary {
            station_name,
            pollutant_name,
            mean_concentration: acc.mean(),
            max_concentration: acc.max,
            measurement_count: acc.count,
            exceedance_count: acc.exceeded,
        })
        .collect()
}

/// Station x pollutant matrix of means over the full cross-product of the
/// stations and pollutants present; absent pairs are `0.0`.
pub fn pivot_means(summaries: &[StationPollutantSummary]) -> PivotMatrix {
    let stations: Vec<String> = summaries
        .iter()
        .map(|s| s.station_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let pollutants: Vec<String> = summaries
        .iter()
        .map(|s| s.pollutant_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut values = vec![vec![0.0; pollutants.len()]; stations.len()];
    let mut measured = vec![vec![false; pollutants.len()]; stations.len()];

    for summary in summaries {
        let row = stations.iter().position(|s| *s == summary.station_name);
        let col = pollutants.iter().position(|p| *p == summary.pollutant_name);
        if let (Some(row), Some(col)) = (row, col) {
            values[row][col] = summary.mean_concentration;
            measured[row][col] = true;
        }
    }

    PivotMatrix {
        stations,
        pollutants,
        values,
        measured,
    }
}

/// Stations by mean concentration, highest first, ranked from 1
pub fn station_ranking(records: &[JoinedRecord]) -> Vec<RankingEntry> {
    let mut means: Vec<(String, f64)> = group_by(records, |r| Some(r.station_name.clone()))
        .into_iter()
        .map(|(name, acc)| (name, acc.mean()))
        .collect();
    means.sort_by(|a, b| b.1.total_cmp(&a.1));

    means
        .into_iter()
        .enumerate()
        .map(|(idx, (station_name, mean_concentration))| RankingEntry {
            rank: idx + 1,
            station_name,
            mean_concentration,
            tier: SeverityTier::classify(mean_concentration),
        })
        .collect()
}

/// Percent of records flagged as exceeding the PDK; `None` for no records
pub fn exceedance_rate(records: &[JoinedRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let exceeded = records.iter().filter(|r| r.is_exceeded).count();
    Some(exceeded as f64 / records.len() as f64 * 100.0)
}

/// Daily per-station means for one pollutant; `None` if it has no records
pub fn pollutant_trend(records: &[JoinedRecord], pollutant: &str) -> Option<PollutantTrend> {
    let pollutant_records: Vec<JoinedRecord> = records
        .iter()
        .filter(|r| r.pollutant_name == pollutant)
        .cloned()
        .collect();

    let exceedance_rate = exceedance_rate(&pollutant_records)?;
    let pdk_max = pollutant_records.first().and_then(|r| r.pdk_max);

    let points: Vec<TimeSeriesPoint> =
        group_by(&pollutant_records, |r| Some((r.date, r.station_name.clone())))
            .into_iter()
            .map(|((date, station_name), acc)| TimeSeriesPoint {
                date,
                station_name,
                concentration: acc.mean(),
            })
            .collect();

    let mean_concentration = mean(points.iter().map(|p| p.concentration))?;
    let max_concentration = points
        .iter()
        .map(|p| p.concentration)
        .fold(f64::NEG_INFINITY, f64::max);

    Some(PollutantTrend {
        pollutant_name: pollutant.to_string(),
        points,
        pdk_max,
        mean_concentration,
        max_concentration,
        exceedance_rate,
    })
}

pub fn overview(records: &[JoinedRecord]) -> OverviewStats {
    let stations: BTreeSet<&str> = records.iter().map(|r| r.station_name.as_str()).collect();
    let pollutants: BTreeSet<&str> = records.iter().map(|r| r.pollutant_name.as_str()).collect();

    OverviewStats {
        measurement_count: records.len(),
        station_count: stations.len(),
        pollutant_count: pollutants.len(),
        exceedance_count: records.iter().filter(|r| r.is_exceeded).count() as u64,
    }
}

pub fn map_stats(summaries: &[StationSummary]) -> Option<MapStats> {
    let center_lat = mean(summaries.iter().map(|s| s.latitude))?;
    let center_lon = mean(summaries.iter().map(|s| s.longitude))?;
    let mean_concentration = mean(summaries.iter().map(|s| s.mean_concentration))?;

    let concentrations = summaries.iter().map(|s| s.mean_concentration);
    let min_concentration = concentrations.clone().fold(f64::INFINITY, f64::min);
    let max_concentration = concentrations.fold(f64::NEG_INFINITY, f64::max);

    Some(MapStats {
        center_lat,
        center_lon,
        min_concentration,
        max_concentration,
        mean_zone_radius_m: zone_radius_m(mean_concentration),
        max_zone_radius_m: zone_radius_m(max_concentration),
        high_station_count: summaries
            .iter()
            .filter(|s| s.tier == SeverityTier::High)
            .count(),
        exceedance_count: summaries.iter().map(|s| s.exceedance_count).sum(),
    })
}

/// Record count, covered period and the three pollutants with the highest
/// mean concentration
pub fn sample_info(records: &[JoinedRecord]) -> Option<SampleInfo> {
    let first_date: NaiveDate = records.iter().map(|r| r.date).min()?;
    let last_date: NaiveDate = records.iter().map(|r| r.date).max()?;

    let mut means: Vec<PollutantMean> = group_by(records, |r| Some(r.pollutant_name.clone()))
        .into_iter()
        .map(|(name, acc)| PollutantMean {
            pollutant_name: short_pollutant_name(&name),
            mean_concentration: acc.mean(),
        })
        .collect();
    means.sort_by(|a, b| b.mean_concentration.total_cmp(&a.mean_concentration));
    means.truncate(TOP_POLLUTANT_COUNT);

    Some(SampleInfo {
        record_count: records.len(),
        first_date,
        last_date,
        top_pollutants: means,
    })
}

/// "Nitrogen dioxide (NO2)" -> "Nitrogen dioxide"
fn short_pollutant_name(name: &str) -> String {
    name.split('(').next().unwrap_or(name).trim_end().to_string()
}

/// Newest `limit` records, latest first
pub fn recent_measurements(records: &[JoinedRecord], limit: usize) -> Vec<RecentMeasurement> {
    let mut sorted: Vec<&JoinedRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    sorted
        .into_iter()
        .take(limit)
        .map(|r| RecentMeasurement {
            timestamp: r.timestamp,
            station_name: r.station_name.clone(),
            pollutant_name: r.pollutant_name.clone(),
            concentration: r.concentration,
            unit: r.unit.clone(),
            is_exceeded: r.is_exceeded,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    const EPS: f64 = 1e-12;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn rec(
        id: i64,
        at: NaiveDateTime,
        station: &str,
        pollutant: &str,
        concentration: f64,
        exceeded: bool,
    ) -> JoinedRecord {
        JoinedRecord::new(id, at, concentration, exceeded, station.into(), pollutant.into())
            .with_station(Some(58.2), Some(92.5), None)
    }

    #[test]
    fn test_station_mean_and_exceedances() {
        let records = vec![
            rec(1, ts(2023, 1, 1, 0), "Post 1", "NO2", 0.02, false),
            rec(2, ts(2023, 1, 2, 0), "Post 1", "NO2", 0.04, true),
        ];
        let summaries = station_summaries(&records);
        assert_eq!(summaries.len(), 1);
        assert!((summaries[0].mean_concentration - 0.03).abs() < EPS);
        assert_eq!(summaries[0].exceedance_count, 1);
        assert_eq!(summaries[0].number, 1);
        assert_eq!(summaries[0].tier, SeverityTier::Low);
    }

    #[test]
    fn test_station_summaries_drop_missing_coordinates() {
        let records = vec![
            rec(1, ts(2023, 1, 1, 0), "B", "NO2", 0.07, false),
            rec(2, ts(2023, 1, 1, 0), "A", "NO2", 0.01, false),
            JoinedRecord::new(3, ts(2023, 1, 1, 0), 0.5, true, "C".into(), "NO2".into()),
        ];
        let summaries = station_summaries(&records);
        let names: Vec<&str> = summaries.iter().map(|s| s.station_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(summaries[1].number, 2);
        assert_eq!(summaries[1].tier, SeverityTier::High);
        assert!((summaries[1].zone_radius_m - 1000.0).abs() < 1e-9);

        // the coordinate-less station still counts elsewhere
        assert_eq!(station_ranking(&records)[0].station_name, "C");
    }

    #[test]
    fn test_yearly_order() {
        let records = vec![
            rec(1, ts(2024, 1, 1, 0), "A", "NO2", 0.01, false),
            rec(2, ts(2023, 1, 1, 0), "A", "SO2", 0.01, false),
            rec(3, ts(2023, 1, 1, 0), "A", "NO2", 0.05, false),
            rec(4, ts(2023, 2, 1, 0), "A", "NO2", 0.03, false),
        ];
        let rows = yearly_summaries(&records);
        let keys: Vec<(i32, &str)> = rows.iter().map(|r| (r.year, r.pollutant_name.as_str())).collect();
        assert_eq!(keys, vec![(2023, "NO2"), (2023, "SO2"), (2024, "NO2")]);
        assert!((rows[0].mean_concentration - 0.04).abs() < EPS);
        assert_eq!(rows[0].max_concentration, 0.05);
        assert_eq!(rows[0].measurement_count, 2);
    }

    fn cell(matrix: &PivotMatrix, station: &str, pollutant: &str) -> Option<f64> {
        let row = matrix.stations.iter().position(|s| s == station)?;
        let col = matrix.pollutants.iter().position(|p| p == pollutant)?;
        Some(matrix.values[row][col])
    }

    #[test]
    fn test_pivot_fills_missing_pairs_with_zero() {
        let records = vec![
            rec(1, ts(2023, 1, 1, 0), "A", "NO2", 0.02, false),
            rec(2, ts(2023, 1, 1, 0), "B", "SO2", 0.04, true),
            rec(3, ts(2023, 1, 1, 0), "C", "NO2", 0.06, false),
        ];
        let summaries = station_pollutant_summaries(&records);
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[1].exceedance_count, 1);

        let matrix = pivot_means(&summaries);
        assert_eq!(matrix.stations, vec!["A", "B", "C"]);
        assert_eq!(matrix.pollutants, vec!["NO2", "SO2"]);
        assert_eq!(matrix.values.len(), 3);
        assert!(matrix.values.iter().all(|row| row.len() == 2));

        assert_eq!(cell(&matrix, "A", "SO2"), Some(0.0));
        assert!(!matrix.measured[0][1]);
        assert_eq!(cell(&matrix, "B", "SO2"), Some(0.04));
        assert!(matrix.measured[1][1]);
        assert_eq!(cell(&matrix, "Z", "NO2"), None);
    }

    #[test]
    fn test_ranking() {
        let records = vec![
            rec(1, ts(2023, 1, 1, 0), "A", "NO2", 0.01, false),
            rec(2, ts(2023, 1, 1, 0), "B", "NO2", 0.08, false),
            rec(3, ts(2023, 1, 1, 0), "C", "NO2", 0.04, false),
        ];
        let ranking = station_ranking(&records);
        let order: Vec<(usize, &str, SeverityTier)> = ranking
            .iter()
            .map(|r| (r.rank, r.station_name.as_str(), r.tier))
            .collect();
        assert_eq!(
            order,
            vec![
                (1, "B", SeverityTier::High),
                (2, "C", SeverityTier::Medium),
                (3, "A", SeverityTier::Low),
            ]
        );
    }

    #[test]
    fn test_exceedance_rate() {
        assert_eq!(exceedance_rate(&[]), None);
        let records = vec![
            rec(1, ts(2023, 1, 1, 0), "A", "NO2", 0.01, true),
            rec(2, ts(2023, 1, 1, 0), "A", "NO2", 0.01, false),
            rec(3, ts(2023, 1, 1, 0), "A", "NO2", 0.01, false),
            rec(4, ts(2023, 1, 1, 0), "A", "NO2", 0.01, false),
        ];
        assert_eq!(exceedance_rate(&records), Some(25.0));
    }

    #[test]
    fn test_pollutant_trend() {
        let records = vec![
            rec(1, ts(2023, 1, 2, 12), "A", "NO2", 0.05, true).with_pollutant(None, Some(0.04), None),
            rec(2, ts(2023, 1, 2, 6), "A", "NO2", 0.03, false).with_pollutant(None, Some(0.04), None),
            rec(3, ts(2023, 1, 1, 6), "A", "NO2", 0.01, false).with_pollutant(None, Some(0.04), None),
            rec(4, ts(2023, 1, 1, 6), "A", "SO2", 0.9, true),
        ];
        let trend = pollutant_trend(&records, "NO2").unwrap();
        assert_eq!(trend.points.len(), 2);
        assert_eq!(trend.points[0].date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert!((trend.points[1].concentration - 0.04).abs() < EPS);
        assert!((trend.mean_concentration - 0.025).abs() < EPS);
        assert!((trend.max_concentration - 0.04).abs() < EPS);
        assert_eq!(trend.pdk_max, Some(0.04));
        assert!((trend.exceedance_rate - 100.0 / 3.0).abs() < 1e-9);

        assert!(pollutant_trend(&records, "CO").is_none());
    }

    #[test]
    fn test_overview_and_sample() {
        let records = vec![
            rec(1, ts(2023, 3, 1, 0), "A", "Nitrogen dioxide (NO2)", 0.02, true),
            rec(2, ts(2023, 1, 1, 0), "B", "Sulfur dioxide (SO2)", 0.05, false),
            rec(3, ts(2024, 1, 1, 0), "B", "Benzopyrene", 0.01, true),
            rec(4, ts(2024, 2, 1, 0), "B", "Formaldehyde", 0.03, false),
        ];
        let stats = overview(&records);
        assert_eq!(stats.measurement_count, 4);
        assert_eq!(stats.station_count, 2);
        assert_eq!(stats.pollutant_count, 4);
        assert_eq!(stats.exceedance_count, 2);

        let sample = sample_info(&records).unwrap();
        assert_eq!(sample.first_date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(sample.last_date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        let top: Vec<&str> = sample
            .top_pollutants
            .iter()
            .map(|p| p.pollutant_name.as_str())
            .collect();
        assert_eq!(top, vec!["Sulfur dioxide", "Formaldehyde", "Nitrogen dioxide"]);

        assert!(sample_info(&[]).is_none());
        assert_eq!(overview(&[]), OverviewStats::default());
    }

    #[test]
    fn test_map_stats() {
        let records = vec![
            rec(1, ts(2023, 1, 1, 0), "A", "NO2", 0.01, true),
            JoinedRecord::new(2, ts(2023, 1, 1, 0), 0.09, true, "B".into(), "NO2".into())
                .with_station(Some(58.4), Some(92.7), None),
        ];
        let summaries = station_summaries(&records);
        let stats = map_stats(&summaries).unwrap();
        assert!((stats.center_lat - 58.3).abs() < 1e-9);
        assert!((stats.center_lon - 92.6).abs() < 1e-9);
        assert_eq!(stats.min_concentration, 0.01);
        assert_eq!(stats.max_concentration, 0.09);
        assert!((stats.mean_zone_radius_m - 800.0).abs() < 1e-9);
        assert!((stats.max_zone_radius_m - 1200.0).abs() < 1e-9);
        assert_eq!(stats.high_station_count, 1);
        assert_eq!(stats.exceedance_count, 2);

        assert!(map_stats(&[]).is_none());
    }

    #[test]
    fn test_recent_measurements() {
        let records: Vec<JoinedRecord> = (0..20)
            .map(|i| rec(i, ts(2023, 1, 1, 0) + chrono::Duration::hours(i), "A", "NO2", 0.01, false))
            .collect();
        let recent = recent_measurements(&records, 15);
        assert_eq!(recent.len(), 15);
        assert_eq!(recent[0].timestamp, ts(2023, 1, 1, 19));
        assert!(recent.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }
}
