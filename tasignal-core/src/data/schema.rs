//! Bar schema for polars frames.
//!
//! Incoming frames need `Date, Open, High, Low, Close, Volume` columns.
//! Names match case-insensitively, so both vendor-style `Close` and
//! lowercase `close` are accepted. Numeric columns of any width are cast to
//! f64; nulls become NaN. Dates may be a `Date`/`Datetime` column or
//! strings starting with `YYYY-MM-DD`.

use chrono::NaiveDate;
use polars::prelude::*;

use crate::domain::Bar;
use crate::frame::FrameError;

/// Required bar columns in canonical order.
pub const BAR_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Expected schema for bar data
pub struct BarSchema;

impl BarSchema {
    /// Canonical schema written by [`bars_to_dataframe`].
    pub fn schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("date".into(), DataType::Date),
            Field::new("open".into(), DataType::Float64),
            Field::new("high".into(), DataType::Float64),
            Field::new("low".into(), DataType::Float64),
            Field::new("close".into(), DataType::Float64),
            Field::new("volume".into(), DataType::Float64),
        ])
    }

    /// Check that every required column exists (case-insensitive).
    pub fn validate(df: &DataFrame) -> Result<(), FrameError> {
        for wanted in BAR_COLUMNS {
            find_column(df, wanted)?;
        }
        Ok(())
    }
}

fn find_column<'a>(df: &'a DataFrame, wanted: &str) -> Result<&'a Column, FrameError> {
    let actual = df
        .get_column_names()
        .into_iter()
        .find(|name| name.as_str().eq_ignore_ascii_case(wanted))
        .ok_or_else(|| FrameError::MissingColumn(wanted.to_string()))?;
    df.column(actual.as_str())
        .map_err(|e| FrameError::InvalidColumn {
            column: wanted.to_string(),
            reason: e.to_string(),
        })
}

fn invalid(column: &str) -> impl Fn(PolarsError) -> FrameError + '_ {
    move |e| FrameError::InvalidColumn {
        column: column.to_string(),
        reason: e.to_string(),
    }
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

fn read_dates(col: &Column) -> Result<Vec<NaiveDate>, FrameError> {
    if col.dtype() == &DataType::String {
        let ca = col.str().map_err(invalid("date"))?;
        return ca
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let raw = v.ok_or_else(|| FrameError::InvalidColumn {
                    column: "date".into(),
                    reason: format!("null date at row {i}"),
                })?;
                // Vendor exports may append a time and offset to the date.
                let day = raw.trim().get(..10).unwrap_or(raw);
                NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
                    FrameError::InvalidColumn {
                        column: "date".into(),
                        reason: format!("row {i}: '{raw}': {e}"),
                    }
                })
            })
            .collect();
    }

    let days = col
        .cast(&DataType::Date)
        .and_then(|c| c.cast(&DataType::Int32))
        .map_err(invalid("date"))?;
    let ca = days.i32().map_err(invalid("date"))?;
    let epoch = epoch();
    ca.into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.map(|d| epoch + chrono::Duration::days(d as i64))
                .ok_or_else(|| FrameError::InvalidColumn {
                    column: "date".into(),
                    reason: format!("null date at row {i}"),
                })
        })
        .collect()
}

fn read_f64(col: &Column, name: &str) -> Result<Vec<f64>, FrameError> {
    let cast = col.cast(&DataType::Float64).map_err(invalid(name))?;
    let ca = cast.f64().map_err(invalid(name))?;
    Ok(ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// Convert a polars frame into bars. Row order is preserved; ordering is
/// checked later by the pipeline.
pub fn bars_from_dataframe(df: &DataFrame) -> Result<Vec<Bar>, FrameError> {
    BarSchema::validate(df)?;

    let dates = read_dates(find_column(df, "date")?)?;
    let opens = read_f64(find_column(df, "open")?, "open")?;
    let highs = read_f64(find_column(df, "high")?, "high")?;
    let lows = read_f64(find_column(df, "low")?, "low")?;
    let closes = read_f64(find_column(df, "close")?, "close")?;
    let volumes = read_f64(find_column(df, "volume")?, "volume")?;

    Ok((0..df.height())
        .map(|i| Bar::new(dates[i], opens[i], highs[i], lows[i], closes[i], volumes[i]))
        .collect())
}

/// Date column as days since the Unix epoch, cast to polars `Date`.
pub(crate) fn date_column(name: &str, dates: impl Iterator<Item = NaiveDate>) -> PolarsResult<Column> {
    let epoch = epoch();
    let days: Vec<i32> = dates.map(|d| (d - epoch).num_days() as i32).collect();
    Column::new(name.into(), days).cast(&DataType::Date)
}

/// Convert bars to a polars frame with the canonical schema.
pub fn bars_to_dataframe(bars: &[Bar]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        date_column("date", bars.iter().map(|b| b.date))?,
        Column::new("open".into(), bars.iter().map(|b| b.open).collect::<Vec<f64>>()),
        Column::new("high".into(), bars.iter().map(|b| b.high).collect::<Vec<f64>>()),
        Column::new("low".into(), bars.iter().map(|b| b.low).collect::<Vec<f64>>()),
        Column::new("close".into(), bars.iter().map(|b| b.close).collect::<Vec<f64>>()),
        Column::new("volume".into(), bars.iter().map(|b| b.volume).collect::<Vec<f64>>()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vendor_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("Date".into(), &["2024-01-02", "2024-01-03"]),
            Column::new("Open".into(), &[100.0, 101.0]),
            Column::new("High".into(), &[102.0, 103.0]),
            Column::new("Low".into(), &[99.0, 100.5]),
            Column::new("Close".into(), &[101.0, 102.5]),
            Column::new("Volume".into(), &[1_000_i64, 2_000]),
        ])
        .unwrap()
    }

    #[test]
    fn test_schema_has_all_required_columns() {
        let schema = BarSchema::schema();
        for col in BAR_COLUMNS {
            assert!(schema.contains(col));
        }
    }

    #[test]
    fn reads_vendor_style_columns() {
        let bars = bars_from_dataframe(&vendor_frame()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[1].close, 102.5);
        assert_eq!(bars[1].volume, 2_000.0);
    }

    #[test]
    fn rejects_missing_column() {
        let df = vendor_frame().drop("Volume").unwrap();
        let err = bars_from_dataframe(&df).unwrap_err();
        assert!(matches!(err, FrameError::MissingColumn(ref c) if c == "volume"));
    }

    #[test]
    fn rejects_unparseable_date() {
        let mut df = vendor_frame();
        df.with_column(Column::new("Date".into(), &["2024-01-02", "yesterday"]))
            .unwrap();
        let err = bars_from_dataframe(&df).unwrap_err();
        assert!(matches!(err, FrameError::InvalidColumn { ref column, .. } if column == "date"));
    }

    #[test]
    fn canonical_frame_roundtrip() {
        let bars = bars_from_dataframe(&vendor_frame()).unwrap();
        let df = bars_to_dataframe(&bars).unwrap();
        assert_eq!(df.schema().get("date"), Some(&DataType::Date));
        assert_eq!(bars_from_dataframe(&df).unwrap(), bars);
    }

    #[test]
    fn timestamp_strings_keep_the_day() {
        let mut df = vendor_frame();
        df.with_column(Column::new(
            "Date".into(),
            &["2024-01-02 00:00:00-05:00", "2024-01-03 00:00:00-05:00"],
        ))
        .unwrap();
        let bars = bars_from_dataframe(&df).unwrap();
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn null_prices_become_nan() {
        let df = DataFrame::new(vec![
            Column::new("date".into(), &["2024-01-02"]),
            Column::new("open".into(), &[Some(1.0)]),
            Column::new("high".into(), &[None::<f64>]),
            Column::new("low".into(), &[Some(1.0)]),
            Column::new("close".into(), &[Some(1.0)]),
            Column::new("volume".into(), &[Some(1.0)]),
        ])
        .unwrap();
        let bars = bars_from_dataframe(&df).unwrap();
        assert!(bars[0].high.is_nan());
    }
}
