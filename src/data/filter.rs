use chrono::Datelike;

use super::model::ObservationRow;

// ---------------------------------------------------------------------------
// Year filter: rows → chart-ready points for one calendar year
// ---------------------------------------------------------------------------

/// Project the rows whose timestamp falls in `year` to plot points,
/// preserving file order. x is the unix timestamp in seconds, y the
/// temperature in °C.
///
/// Pure: the input is never mutated and repeated calls with the same
/// arguments yield the same output. A year with no rows yields an empty
/// vector (the chart renders blank, which is not an error).
pub fn year_points(rows: &[ObservationRow], year: i32) -> Vec<[f64; 2]> {
    rows.iter()
        .filter(|row| row.timestamp.year() == year)
        .map(|row| [row.timestamp.and_utc().timestamp() as f64, row.temperature_c])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(y: i32, m: u32, d: u32, temp: f64) -> ObservationRow {
        ObservationRow {
            timestamp: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(6, 0, 0)
                .unwrap(),
            temperature_c: temp,
        }
    }

    #[test]
    fn keeps_only_the_requested_year_in_order() {
        let rows = vec![
            row(2021, 3, 1, 8.0),
            row(2020, 6, 1, 15.0),
            row(2021, 1, 2, 2.5),
        ];
        let points = year_points(&rows, 2021);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0][1], 8.0);
        assert_eq!(points[1][1], 2.5);
        // File order is preserved, not timestamp order.
        assert!(points[0][0] > points[1][0]);
    }

    #[test]
    fn year_without_rows_yields_empty() {
        let rows = vec![row(2020, 6, 1, 15.0)];
        assert!(year_points(&rows, 1999).is_empty());
    }

    #[test]
    fn repeated_calls_are_identical() {
        let rows = vec![row(2021, 3, 1, 8.0), row(2021, 4, 1, 11.0)];
        let first = year_points(&rows, 2021);
        let second = year_points(&rows, 2021);
        assert_eq!(first, second);
    }
}
