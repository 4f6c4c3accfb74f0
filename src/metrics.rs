//! Derived metrics over a filtered view: counts, sums, means, Pearson
//! correlation with significance, percentile buckets, top-N, and grouped
//! totals.  Every metric is a pure function of the view; nothing is cached.

use std::collections::BTreeMap;

use crate::data::filter::FilteredView;
use crate::data::model::NumericField;
use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Metric – tagged request, MetricValue – tagged result
// ---------------------------------------------------------------------------

/// Which grouping column a grouped metric aggregates over.
///
/// Temporal keys derive their group label from the event date (`"2025"`,
/// `"2025-03"`, `"2025-Q1"`); their results are ordered chronologically,
/// while categorical keys are ordered descending by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    DisasterType,
    Location,
    AidProvided,
    Year,
    Month,
    Quarter,
}

impl GroupKey {
    fn is_temporal(&self) -> bool {
        matches!(self, GroupKey::Year | GroupKey::Month | GroupKey::Quarter)
    }
}

/// A metric request.  Parameters are part of the variant, so an invalid
/// combination (e.g. a correlation without two fields) cannot be expressed.
#[derive(Debug, Clone, PartialEq)]
pub enum Metric {
    /// Number of rows in the view.
    Count,
    /// Number of rows with the major-disaster flag set.
    CountMajor,
    /// Sum of a numeric field (0.0 on an empty view).
    Sum(NumericField),
    /// Arithmetic mean of a numeric field.
    Mean(NumericField),
    /// Median of a numeric field.
    Median(NumericField),
    /// Pearson correlation between two numeric fields, with a two-sided
    /// p-value from the t distribution on n-2 degrees of freedom.
    Correlation { x: NumericField, y: NumericField },
    /// Per-bucket counts of a field over half-open buckets `[lo, hi)`; the
    /// final bucket also includes its upper edge.
    BucketCounts {
        field: NumericField,
        edges: Vec<f64>,
    },
    /// The `n` events with the largest field value, descending, ties broken
    /// by input order.
    TopN { field: NumericField, n: usize },
    /// Row counts per group, descending.
    GroupedCount(GroupKey),
    /// Field totals per group, descending.
    GroupedSum { key: GroupKey, field: NumericField },
}

/// Pearson correlation result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    /// Correlation coefficient in [-1, 1].
    pub r: f64,
    /// Two-sided significance of r under the Pearson correlation test.
    pub p_value: f64,
    /// Number of paired observations.
    pub n: usize,
}

/// One half-open bucket `[lower, upper)` and its row count.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// One entry of a top-N ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEvent {
    pub event_id: String,
    pub value: f64,
}

/// The result of a metric computation.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Count(usize),
    Scalar(f64),
    Correlation(Correlation),
    Buckets(Vec<Bucket>),
    Ranked(Vec<RankedEvent>),
    /// `(group label, value)` pairs sorted descending by value.
    Grouped(Vec<(String, f64)>),
}

// ---------------------------------------------------------------------------
// compute – dispatch
// ---------------------------------------------------------------------------

/// Compute a metric over the view.
///
/// Empty-view policy: count-like metrics (`Count`, `CountMajor`, `Sum`,
/// `BucketCounts`, `TopN`, grouped metrics) return their natural zero/empty
/// result; `Mean`, `Median`, and `Correlation` fail with
/// [`EngineError::InsufficientData`] instead of producing a misleading value.
pub fn compute(view: &FilteredView<'_>, metric: &Metric) -> Result<MetricValue, EngineError> {
    match metric {
        Metric::Count => Ok(MetricValue::Count(view.len())),
        Metric::CountMajor => Ok(MetricValue::Count(
            view.events().filter(|e| e.is_major_disaster).count(),
        )),
        Metric::Sum(field) => Ok(MetricValue::Scalar(
            view.events().map(|e| field.value(e)).sum(),
        )),
        Metric::Mean(field) => {
            let values = collect(view, *field);
            Ok(MetricValue::Scalar(mean(&values, "mean")?))
        }
        Metric::Median(field) => {
            let values = collect(view, *field);
            Ok(MetricValue::Scalar(median(&values, "median")?))
        }
        Metric::Correlation { x, y } => {
            let xs = collect(view, *x);
            let ys = collect(view, *y);
            Ok(MetricValue::Correlation(pearson(&xs, &ys)?))
        }
        Metric::BucketCounts { field, edges } => {
            let values = collect(view, *field);
            Ok(MetricValue::Buckets(bucket_counts(&values, edges)?))
        }
        Metric::TopN { field, n } => Ok(MetricValue::Ranked(top_n(view, *field, *n))),
        Metric::GroupedCount(key) => Ok(MetricValue::Grouped(grouped(view, *key, |_| 1.0))),
        Metric::GroupedSum { key, field } => {
            let field = *field;
            Ok(MetricValue::Grouped(grouped(view, *key, move |e| {
                field.value(e)
            })))
        }
    }
}

fn collect(view: &FilteredView<'_>, field: NumericField) -> Vec<f64> {
    view.events().map(|e| field.value(e)).collect()
}

// ---------------------------------------------------------------------------
// Scalar statistics
// ---------------------------------------------------------------------------

fn mean(values: &[f64], metric: &'static str) -> Result<f64, EngineError> {
    if values.is_empty() {
        return Err(EngineError::InsufficientData {
            metric,
            needed: 1,
            got: 0,
        });
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

fn median(values: &[f64], metric: &'static str) -> Result<f64, EngineError> {
    if values.is_empty() {
        return Err(EngineError::InsufficientData {
            metric,
            needed: 1,
            got: 0,
        });
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Ok(sorted[mid])
    } else {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Pearson correlation with two-sided significance.  Needs at least three
/// paired observations for the test to have a degree of freedom, and both
/// series must vary.  The series must have equal length: unpaired
/// observations have no place in the statistic, so a mismatch is an error,
/// not a silent truncation.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Result<Correlation, EngineError> {
    if xs.len() != ys.len() {
        return Err(EngineError::InsufficientData {
            metric: "correlation",
            needed: xs.len().max(ys.len()),
            got: xs.len().min(ys.len()),
        });
    }
    let n = xs.len();
    if n < 3 {
        return Err(EngineError::InsufficientData {
            metric: "correlation",
            needed: 3,
            got: n,
        });
    }

    let nf = n as f64;
    let mean_x = xs.iter().sum::<f64>() / nf;
    let mean_y = ys.iter().sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        // A constant series has no defined correlation.
        return Err(EngineError::InsufficientData {
            metric: "correlation",
            needed: 3,
            got: n,
        });
    }

    let r = (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0);
    let df = nf - 2.0;
    let p_value = if (1.0 - r * r) < f64::EPSILON {
        0.0
    } else {
        let t2 = r * r * df / (1.0 - r * r);
        incomplete_beta(df / 2.0, 0.5, df / (df + t2))
    };

    Ok(Correlation { r, p_value, n })
}

/// Least-squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub n: usize,
}

/// Ordinary least-squares line through the paired series.  As with
/// [`pearson`], mismatched series lengths are an error.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Result<LinearFit, EngineError> {
    if xs.len() != ys.len() {
        return Err(EngineError::InsufficientData {
            metric: "linear_fit",
            needed: xs.len().max(ys.len()),
            got: xs.len().min(ys.len()),
        });
    }
    let n = xs.len();
    if n < 2 {
        return Err(EngineError::InsufficientData {
            metric: "linear_fit",
            needed: 2,
            got: n,
        });
    }

    let nf = n as f64;
    let mean_x = xs.iter().sum::<f64>() / nf;
    let mean_y = ys.iter().sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x) * (x - mean_x);
    }
    if var_x == 0.0 {
        return Err(EngineError::InsufficientData {
            metric: "linear_fit",
            needed: 2,
            got: n,
        });
    }

    let slope = cov / var_x;
    Ok(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
        n,
    })
}

// ---------------------------------------------------------------------------
// Buckets, rankings, groupings
// ---------------------------------------------------------------------------

/// Count values into half-open buckets defined by strictly ascending edges.
/// `edges = [0, 10, 20]` gives buckets `[0, 10)` and `[10, 20]`: the final
/// bucket includes its upper edge so the overall maximum is not dropped.
fn bucket_counts(values: &[f64], edges: &[f64]) -> Result<Vec<Bucket>, EngineError> {
    if edges.len() < 2 {
        return Err(EngineError::bad_range(
            "bucket edges",
            edges.first().copied().unwrap_or(f64::NAN),
            "(fewer than two edges)",
        ));
    }
    for pair in edges.windows(2) {
        if pair[0] >= pair[1] {
            return Err(EngineError::bad_range("bucket edges", pair[0], pair[1]));
        }
    }

    let mut buckets: Vec<Bucket> = edges
        .windows(2)
        .map(|pair| Bucket {
            lower: pair[0],
            upper: pair[1],
            count: 0,
        })
        .collect();

    let last = buckets.len() - 1;
    for &v in values {
        for (i, bucket) in buckets.iter_mut().enumerate() {
            let in_bucket = if i == last {
                v >= bucket.lower && v <= bucket.upper
            } else {
                v >= bucket.lower && v < bucket.upper
            };
            if in_bucket {
                bucket.count += 1;
                break;
            }
        }
    }
    Ok(buckets)
}

fn top_n(view: &FilteredView<'_>, field: NumericField, n: usize) -> Vec<RankedEvent> {
    let mut ranked: Vec<RankedEvent> = view
        .events()
        .map(|e| RankedEvent {
            event_id: e.event_id.clone(),
            value: field.value(e),
        })
        .collect();
    // Stable sort keeps input order among ties.
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    ranked.truncate(n);
    ranked
}

fn grouped<F>(view: &FilteredView<'_>, key: GroupKey, weight: F) -> Vec<(String, f64)>
where
    F: Fn(&crate::data::model::DisasterEvent) -> f64,
{
    use chrono::Datelike;

    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for ev in view.events() {
        let label = match key {
            GroupKey::DisasterType => ev.disaster_type.clone(),
            GroupKey::Location => ev.location.clone(),
            GroupKey::AidProvided => ev.aid_provided.clone(),
            GroupKey::Year => format!("{}", ev.date.year()),
            GroupKey::Month => format!("{}-{:02}", ev.date.year(), ev.date.month()),
            GroupKey::Quarter => {
                format!("{}-Q{}", ev.date.year(), (ev.date.month() - 1) / 3 + 1)
            }
        };
        *totals.entry(label).or_insert(0.0) += weight(ev);
    }
    let mut out: Vec<(String, f64)> = totals.into_iter().collect();
    if !key.is_temporal() {
        // BTreeMap iteration is alphabetical, so ties stay alphabetical here.
        out.sort_by(|a, b| b.1.total_cmp(&a.1));
    }
    // Temporal labels are zero-padded, so BTreeMap order is chronological.
    out
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// The dashboard-level summary block computed over one view.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub total_events: usize,
    pub major_disasters: usize,
    pub total_affected: u64,
    pub avg_affected: f64,
    pub total_economic_loss: f64,
    pub avg_economic_loss: f64,
    pub total_aid_amount: f64,
    pub avg_response_time: f64,
    pub median_response_time: f64,
    pub avg_severity: f64,
    pub avg_infrastructure_damage: f64,
    pub unique_locations: usize,
    pub unique_disaster_types: usize,
    pub date_range_days: i64,
}

/// Compute the summary block; fails with `InsufficientData` on an empty view
/// since most of its entries are means.
pub fn summary(view: &FilteredView<'_>) -> Result<SummaryStats, EngineError> {
    if view.is_empty() {
        return Err(EngineError::InsufficientData {
            metric: "summary",
            needed: 1,
            got: 0,
        });
    }

    let response_times = collect(view, NumericField::ResponseTimeHours);
    let mut min_date = None;
    let mut max_date = None;
    let mut locations = std::collections::BTreeSet::new();
    let mut types = std::collections::BTreeSet::new();
    for ev in view.events() {
        min_date = Some(min_date.map_or(ev.date, |d: chrono::NaiveDate| d.min(ev.date)));
        max_date = Some(max_date.map_or(ev.date, |d: chrono::NaiveDate| d.max(ev.date)));
        locations.insert(&ev.location);
        types.insert(&ev.disaster_type);
    }

    Ok(SummaryStats {
        total_events: view.len(),
        major_disasters: view.events().filter(|e| e.is_major_disaster).count(),
        total_affected: view.events().map(|e| e.affected_population).sum(),
        avg_affected: mean(&collect(view, NumericField::AffectedPopulation), "summary")?,
        total_economic_loss: view
            .events()
            .map(|e| e.estimated_economic_loss_usd)
            .sum(),
        avg_economic_loss: mean(&collect(view, NumericField::EconomicLossUsd), "summary")?,
        total_aid_amount: view.events().map(|e| e.aid_amount_usd).sum(),
        avg_response_time: mean(&response_times, "summary")?,
        median_response_time: median(&response_times, "summary")?,
        avg_severity: mean(&collect(view, NumericField::SeverityLevel), "summary")?,
        avg_infrastructure_damage: mean(
            &collect(view, NumericField::InfrastructureDamageIndex),
            "summary",
        )?,
        unique_locations: locations.len(),
        unique_disaster_types: types.len(),
        date_range_days: match (min_date, max_date) {
            (Some(lo), Some(hi)) => (hi - lo).num_days(),
            _ => 0,
        },
    })
}

// ---------------------------------------------------------------------------
// Regularized incomplete beta – p-value backbone
// ---------------------------------------------------------------------------

/// Lanczos approximation of ln Γ(x).
fn ln_gamma(x: f64) -> f64 {
    const COEF: [f64; 6] = [
        76.180_091_729_471_46,
        -86.505_320_329_416_77,
        24.014_098_240_830_91,
        -1.231_739_572_450_155,
        0.120_865_097_386_617_9e-2,
        -0.539_523_938_495_3e-5,
    ];
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut y = x;
    let mut ser = 1.000_000_000_190_015;
    for c in COEF {
        y += 1.0;
        ser += c / y;
    }
    -tmp + (2.506_628_274_631_000_5 * ser / x).ln()
}

/// Continued-fraction evaluation for the incomplete beta (Lentz's method).
fn betacf(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 200;
    const EPS: f64 = 3.0e-14;
    const FPMIN: f64 = 1.0e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < FPMIN {
        d = FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;

        if (del - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

/// Regularized incomplete beta function I_x(a, b).
fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front =
        ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * betacf(a, b, x) / a
    } else {
        1.0 - front * betacf(b, a, 1.0 - x) / b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::EventTable;
    use crate::data::testutil::sample_event;

    fn table_with_losses(losses: &[f64]) -> EventTable {
        let events = losses
            .iter()
            .enumerate()
            .map(|(i, &loss)| {
                let mut ev = sample_event(&format!("EV-{i}"), 5);
                ev.estimated_economic_loss_usd = loss;
                ev
            })
            .collect();
        EventTable::from_events(events)
    }

    fn empty_view(table: &EventTable) -> FilteredView<'_> {
        FilteredView::new(table, Vec::new())
    }

    #[test]
    fn count_and_sum_are_zero_on_an_empty_view() {
        let table = table_with_losses(&[1.0, 2.0]);
        let view = empty_view(&table);

        assert_eq!(
            compute(&view, &Metric::Count).unwrap(),
            MetricValue::Count(0)
        );
        assert_eq!(
            compute(&view, &Metric::Sum(NumericField::EconomicLossUsd)).unwrap(),
            MetricValue::Scalar(0.0)
        );
    }

    #[test]
    fn mean_on_an_empty_view_is_insufficient_data() {
        let table = table_with_losses(&[1.0]);
        let view = empty_view(&table);
        let err = compute(&view, &Metric::Mean(NumericField::EconomicLossUsd)).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientData { .. }));
    }

    #[test]
    fn mean_and_median_of_known_values() {
        let table = table_with_losses(&[10.0, 20.0, 60.0]);
        let view = FilteredView::all(&table);

        let mean = compute(&view, &Metric::Mean(NumericField::EconomicLossUsd)).unwrap();
        assert_eq!(mean, MetricValue::Scalar(30.0));

        let median = compute(&view, &Metric::Median(NumericField::EconomicLossUsd)).unwrap();
        assert_eq!(median, MetricValue::Scalar(20.0));
    }

    #[test]
    fn median_of_even_count_averages_the_middle_pair() {
        let table = table_with_losses(&[40.0, 10.0, 20.0, 30.0]);
        let view = FilteredView::all(&table);
        let median = compute(&view, &Metric::Median(NumericField::EconomicLossUsd)).unwrap();
        assert_eq!(median, MetricValue::Scalar(25.0));
    }

    #[test]
    fn perfectly_linear_series_has_r_one_and_p_zero() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 4.0, 6.0, 8.0, 10.0];
        let corr = pearson(&xs, &ys).unwrap();
        assert!((corr.r - 1.0).abs() < 1e-12);
        assert!(corr.p_value < 1e-10);
        assert_eq!(corr.n, 5);
    }

    #[test]
    fn anticorrelated_series_has_negative_r() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [8.0, 6.0, 4.0, 2.0];
        let corr = pearson(&xs, &ys).unwrap();
        assert!((corr.r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn correlation_p_value_matches_reference() {
        // Reference: pearsonr([1..6], [2,1,4,3,7,5]) = (0.79179, 0.06050)
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let ys = [2.0, 1.0, 4.0, 3.0, 7.0, 5.0];
        let corr = pearson(&xs, &ys).unwrap();
        assert!((corr.r - 0.79179).abs() < 1e-4, "r = {}", corr.r);
        assert!((corr.p_value - 0.06050).abs() < 1e-4, "p = {}", corr.p_value);
    }

    #[test]
    fn correlation_needs_at_least_three_points() {
        let err = pearson(&[1.0, 2.0], &[3.0, 4.0]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientData { metric: "correlation", needed: 3, got: 2 }
        ));
    }

    #[test]
    fn constant_series_has_no_correlation() {
        let err = pearson(&[1.0, 1.0, 1.0], &[2.0, 5.0, 9.0]).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientData { .. }));
    }

    #[test]
    fn linear_fit_recovers_slope_and_intercept() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 5.0, 7.0];
        let fit = linear_fit(&xs, &ys).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
    }

    #[test]
    fn bucket_counts_are_half_open_with_a_closed_final_bucket() {
        let values = [0.0, 5.0, 10.0, 15.0, 20.0];
        let buckets = bucket_counts(&values, &[0.0, 10.0, 20.0]).unwrap();
        assert_eq!(buckets.len(), 2);
        // 0 and 5 in [0, 10); 10, 15, and 20 in [10, 20].
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[1].count, 3);
    }

    #[test]
    fn descending_bucket_edges_are_rejected() {
        let err = bucket_counts(&[1.0], &[10.0, 0.0]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidFilterRange { .. }));
    }

    #[test]
    fn bucket_counts_on_an_empty_view_are_all_zero() {
        let table = table_with_losses(&[5.0]);
        let view = empty_view(&table);
        let result = compute(
            &view,
            &Metric::BucketCounts {
                field: NumericField::EconomicLossUsd,
                edges: vec![0.0, 10.0, 20.0],
            },
        )
        .unwrap();
        let MetricValue::Buckets(buckets) = result else {
            panic!("expected buckets");
        };
        assert!(buckets.iter().all(|b| b.count == 0));
    }

    #[test]
    fn top_n_is_descending_with_input_order_ties() {
        let table = table_with_losses(&[50.0, 90.0, 50.0, 70.0]);
        let view = FilteredView::all(&table);
        let result = compute(
            &view,
            &Metric::TopN {
                field: NumericField::EconomicLossUsd,
                n: 3,
            },
        )
        .unwrap();
        let MetricValue::Ranked(ranked) = result else {
            panic!("expected ranking");
        };
        let ids: Vec<&str> = ranked.iter().map(|r| r.event_id.as_str()).collect();
        assert_eq!(ids, vec!["EV-1", "EV-3", "EV-0"]);
    }

    #[test]
    fn top_n_may_return_fewer_than_n() {
        let table = table_with_losses(&[50.0]);
        let view = FilteredView::all(&table);
        let result = compute(
            &view,
            &Metric::TopN {
                field: NumericField::EconomicLossUsd,
                n: 10,
            },
        )
        .unwrap();
        let MetricValue::Ranked(ranked) = result else {
            panic!("expected ranking");
        };
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn grouped_sum_is_descending_and_covers_all_keys() {
        let mut events: Vec<_> = (0..4)
            .map(|i| sample_event(&format!("EV-{i}"), 5))
            .collect();
        events[0].location = "A".to_string();
        events[0].affected_population = 100;
        events[1].location = "B".to_string();
        events[1].affected_population = 500;
        events[2].location = "A".to_string();
        events[2].affected_population = 150;
        events[3].location = "C".to_string();
        events[3].affected_population = 50;
        let table = EventTable::from_events(events);
        let view = FilteredView::all(&table);

        let result = compute(
            &view,
            &Metric::GroupedSum {
                key: GroupKey::Location,
                field: NumericField::AffectedPopulation,
            },
        )
        .unwrap();
        let MetricValue::Grouped(groups) = result else {
            panic!("expected grouped totals");
        };
        assert_eq!(
            groups,
            vec![
                ("B".to_string(), 500.0),
                ("A".to_string(), 250.0),
                ("C".to_string(), 50.0),
            ]
        );
    }

    #[test]
    fn monthly_counts_are_chronological() {
        use chrono::NaiveDate;

        let mut events: Vec<_> = (0..4)
            .map(|i| sample_event(&format!("EV-{i}"), 5))
            .collect();
        events[0].date = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
        events[1].date = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap();
        events[2].date = NaiveDate::from_ymd_opt(2025, 11, 20).unwrap();
        events[3].date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let table = EventTable::from_events(events);
        let view = FilteredView::all(&table);

        let result = compute(&view, &Metric::GroupedCount(GroupKey::Month)).unwrap();
        let MetricValue::Grouped(groups) = result else {
            panic!("expected grouped totals");
        };
        assert_eq!(
            groups,
            vec![("2025-02".to_string(), 2.0), ("2025-11".to_string(), 2.0)]
        );
    }

    #[test]
    fn quarterly_sums_label_and_order_by_quarter() {
        use chrono::NaiveDate;

        let mut events: Vec<_> = (0..3)
            .map(|i| sample_event(&format!("EV-{i}"), 5))
            .collect();
        events[0].date = NaiveDate::from_ymd_opt(2025, 8, 10).unwrap();
        events[0].affected_population = 300;
        events[1].date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        events[1].affected_population = 100;
        events[2].date = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        events[2].affected_population = 50;
        let table = EventTable::from_events(events);
        let view = FilteredView::all(&table);

        let result = compute(
            &view,
            &Metric::GroupedSum {
                key: GroupKey::Quarter,
                field: NumericField::AffectedPopulation,
            },
        )
        .unwrap();
        let MetricValue::Grouped(groups) = result else {
            panic!("expected grouped totals");
        };
        // January and March are both Q1; chronological, not value-sorted.
        assert_eq!(
            groups,
            vec![("2025-Q1".to_string(), 150.0), ("2025-Q3".to_string(), 300.0)]
        );
    }

    #[test]
    fn yearly_counts_span_year_boundaries() {
        use chrono::NaiveDate;

        let mut events: Vec<_> = (0..3)
            .map(|i| sample_event(&format!("EV-{i}"), 5))
            .collect();
        events[0].date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        events[1].date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        events[2].date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let table = EventTable::from_events(events);
        let view = FilteredView::all(&table);

        let result = compute(&view, &Metric::GroupedCount(GroupKey::Year)).unwrap();
        let MetricValue::Grouped(groups) = result else {
            panic!("expected grouped totals");
        };
        assert_eq!(
            groups,
            vec![("2024".to_string(), 1.0), ("2025".to_string(), 2.0)]
        );
    }

    #[test]
    fn mismatched_series_lengths_are_an_error() {
        let err = pearson(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientData { metric: "correlation", needed: 4, got: 3 }
        ));

        let err = linear_fit(&[1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientData { metric: "linear_fit", needed: 3, got: 2 }
        ));
    }

    #[test]
    fn summary_on_an_empty_view_is_insufficient_data() {
        let table = table_with_losses(&[1.0]);
        let err = summary(&empty_view(&table)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientData { metric: "summary", .. }
        ));
    }

    #[test]
    fn summary_aggregates_match_hand_computation() {
        let mut events: Vec<_> = (0..3)
            .map(|i| sample_event(&format!("EV-{i}"), 4 + i as u8 * 2))
            .collect();
        events[0].affected_population = 100;
        events[1].affected_population = 200;
        events[2].affected_population = 600;
        events[0].response_time_hours = 10.0;
        events[1].response_time_hours = 20.0;
        events[2].response_time_hours = 90.0;
        let table = EventTable::from_events(events);
        let view = FilteredView::all(&table);

        let stats = summary(&view).unwrap();
        assert_eq!(stats.total_events, 3);
        // severities 4, 6, 8 → one major (>= 7 per the fixture)
        assert_eq!(stats.major_disasters, 1);
        assert_eq!(stats.total_affected, 900);
        assert!((stats.avg_affected - 300.0).abs() < 1e-12);
        assert!((stats.avg_response_time - 40.0).abs() < 1e-12);
        assert!((stats.median_response_time - 20.0).abs() < 1e-12);
        assert!((stats.avg_severity - 6.0).abs() < 1e-12);
        assert_eq!(stats.unique_locations, 1);
        assert_eq!(stats.unique_disaster_types, 1);
        assert_eq!(stats.date_range_days, 0);
    }

    #[test]
    fn incomplete_beta_boundary_values() {
        assert_eq!(incomplete_beta(2.0, 3.0, 0.0), 0.0);
        assert_eq!(incomplete_beta(2.0, 3.0, 1.0), 1.0);
        // I_x(1, 1) is the identity.
        assert!((incomplete_beta(1.0, 1.0, 0.42) - 0.42).abs() < 1e-12);
    }
}
