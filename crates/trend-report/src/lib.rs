//! Rendering of the enriched result table: fixed-width text or CSV, to a
//! file or stdout. Row order is whatever the ranking produced; nothing here
//! reorders.

use std::path::Path;
use trend_core::{EnrichedRow, TrendError};

fn fmt_opt_f64(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "-".to_string(),
    }
}

fn fmt_opt_i64(value: Option<i64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

fn fmt_opt_str(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn header(advanced: bool) -> Vec<&'static str> {
    let mut cols = vec![
        "Ticker", "Total", "Recent", "Prev", "Change", "Rockets", "Price", "Change%", "Volume",
        "3mAvgVol", "Name",
    ];
    if advanced {
        cols.extend(["MktCap", "Float", "ShortFloat%", "Industry"]);
    }
    cols
}

fn record(row: &EnrichedRow, advanced: bool) -> Vec<String> {
    let meta = row.meta.as_ref();
    let mut fields = vec![
        row.row.ticker.clone(),
        row.row.total().to_string(),
        row.row.recent.to_string(),
        row.row.prev.to_string(),
        row.row.change.to_string(),
        row.row.rockets.to_string(),
        fmt_opt_f64(meta.and_then(|m| m.price), 2),
        fmt_opt_f64(meta.and_then(|m| m.change_pct), 2),
        fmt_opt_i64(meta.and_then(|m| m.volume)),
        fmt_opt_i64(meta.and_then(|m| m.avg_volume_3m)),
        fmt_opt_str(meta.and_then(|m| m.name.as_deref())),
    ];
    if advanced {
        fields.push(fmt_opt_f64(meta.and_then(|m| m.market_cap), 0));
        fields.push(fmt_opt_i64(meta.and_then(|m| m.float_shares)));
        fields.push(fmt_opt_f64(
            meta.and_then(|m| m.short_percent_float.map(|f| f * 100.0)),
            2,
        ));
        fields.push(fmt_opt_str(meta.and_then(|m| m.industry.as_deref())));
    }
    fields
}

/// Render the table as fixed-width text, one header line plus one line per
/// row.
pub fn render_text(rows: &[EnrichedRow], advanced: bool) -> String {
    let header = header(advanced);
    let records: Vec<Vec<String>> = rows.iter().map(|r| record(r, advanced)).collect();

    // Column widths sized to content
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for rec in &records {
        for (i, field) in rec.iter().enumerate() {
            widths[i] = widths[i].max(field.len());
        }
    }

    let mut out = String::new();
    let format_line = |fields: &[String]| -> String {
        fields
            .iter()
            .enumerate()
            .map(|(i, f)| format!("{:<width$}", f, width = widths[i] + 2))
            .collect::<String>()
            .trim_end()
            .to_string()
    };

    let header_fields: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    out.push_str(&format_line(&header_fields));
    out.push('\n');
    for rec in &records {
        out.push_str(&format_line(rec));
        out.push('\n');
    }
    out
}

/// Write the text table to `<filename>.txt`.
pub fn write_text_file(
    rows: &[EnrichedRow],
    advanced: bool,
    filename: &str,
) -> Result<(), TrendError> {
    let path = format!("{}.txt", filename);
    std::fs::write(Path::new(&path), render_text(rows, advanced))?;
    tracing::info!("Wrote {} rows to {}", rows.len(), path);
    Ok(())
}

/// Write the table as CSV to any writer.
pub fn write_csv<W: std::io::Write>(
    rows: &[EnrichedRow],
    advanced: bool,
    writer: W,
) -> Result<(), TrendError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(header(advanced))
        .map_err(|e| TrendError::InvalidData(format!("csv write: {}", e)))?;
    for row in rows {
        csv_writer
            .write_record(record(row, advanced))
            .map_err(|e| TrendError::InvalidData(format!("csv write: {}", e)))?;
    }
    csv_writer
        .flush()
        .map_err(TrendError::Io)?;
    Ok(())
}

/// Write the table as CSV to `<filename>.csv`.
pub fn write_csv_file(
    rows: &[EnrichedRow],
    advanced: bool,
    filename: &str,
) -> Result<(), TrendError> {
    let path = format!("{}.csv", filename);
    let file = std::fs::File::create(Path::new(&path))?;
    write_csv(rows, advanced, file)?;
    tracing::info!("Wrote {} rows to {}", rows.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trend_core::{TickerMetadata, TickerRow};

    fn sample() -> Vec<EnrichedRow> {
        vec![
            EnrichedRow {
                row: TickerRow {
                    ticker: "GME".to_string(),
                    recent: 100,
                    prev: 40,
                    change: 60,
                    rockets: 6,
                },
                meta: Some(TickerMetadata {
                    symbol: "GME".to_string(),
                    name: Some("GameStop Corp.".to_string()),
                    price: Some(23.5),
                    change_pct: Some(-1.25),
                    volume: Some(1_000_000),
                    avg_volume_3m: Some(2_000_000),
                    ..Default::default()
                }),
            },
            EnrichedRow {
                row: TickerRow {
                    ticker: "AMC".to_string(),
                    recent: 20,
                    prev: 0,
                    change: 20,
                    rockets: 1,
                },
                meta: None,
            },
        ]
    }

    #[test]
    fn test_render_text_has_header_and_rows() {
        let text = render_text(&sample(), false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Ticker"));
        assert!(lines[1].starts_with("GME"));
        assert!(lines[1].contains("140")); // total = recent + prev
        assert!(lines[2].starts_with("AMC"));
        assert!(lines[2].contains('-')); // missing metadata placeholder
    }

    #[test]
    fn test_advanced_mode_adds_columns() {
        let basic = render_text(&sample(), false);
        let advanced = render_text(&sample(), true);
        assert!(!basic.contains("Industry"));
        assert!(advanced.contains("Industry"));
        assert!(advanced.contains("ShortFloat%"));
    }

    #[test]
    fn test_csv_output_parses_back() {
        let mut buf = Vec::new();
        write_csv(&sample(), false, &mut buf).unwrap();

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][0], "GME");
        assert_eq!(&records[0][1], "140");
        assert_eq!(&records[1][0], "AMC");
        assert_eq!(&records[1][6], "-");
    }
}
