// src/report/render.rs

use std::fmt::Write;

use super::{compare::Pivot, metrics::KeyMetrics, Trend};
use crate::{store::Table, types::IndicatorRecord};

fn pct(v: Option<f64>) -> String {
    v.map(|v| format!("{:.2}%", v)).unwrap_or_else(|| "-".into())
}

/// Lay out `header` + `rows` as left-aligned columns separated by two spaces.
fn grid(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{:<w$}", c, w = w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", line(header));
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    let _ = writeln!(out, "{}", line(&rule));
    for row in rows {
        let _ = writeln!(out, "{}", line(row));
    }
    out
}

pub fn render_table(table: &Table) -> String {
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|r| r.iter().map(ToString::to_string).collect())
        .collect();
    format!("{} ({} rows)\n{}", table.name, table.len(), grid(&table.columns, &rows))
}

pub fn render_metrics(title: &str, m: &KeyMetrics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);
    match m.latest {
        Some(r) => {
            let _ = writeln!(
                out,
                "  latest ({}):        {}  (change {})",
                r.year,
                pct(Some(r.value)),
                pct(m.change)
            );
        }
        None => {
            let _ = writeln!(out, "  no observations");
            return out;
        }
    }
    let _ = writeln!(
        out,
        "  mean last {} years:  {}",
        m.recent_window,
        pct(m.recent_mean)
    );
    let _ = writeln!(out, "  mean overall:        {}", pct(m.overall_mean));
    if let Some(p) = m.peak {
        let _ = writeln!(out, "  peak:                {} in {}", pct(Some(p.value)), p.year);
    }
    if let Some(t) = m.trend {
        let word = match t {
            Trend::Rising => "rising",
            Trend::Falling => "falling",
        };
        let _ = writeln!(out, "  recent trend:        {}", word);
    }
    out
}

pub fn render_pivot(p: &Pivot) -> String {
    let mut header = vec!["year".to_string()];
    header.extend(p.countries.iter().cloned());
    let rows: Vec<Vec<String>> = p
        .rows
        .iter()
        .map(|(year, cells)| {
            let mut row = vec![year.to_string()];
            row.extend(cells.iter().map(|c| pct(*c)));
            row
        })
        .collect();
    grid(&header, &rows)
}

pub fn render_ranking(ranked: &[(String, IndicatorRecord)]) -> String {
    let header = ["#", "country", "year", "value"].map(String::from).to_vec();
    let rows: Vec<Vec<String>> = ranked
        .iter()
        .enumerate()
        .map(|(i, (name, r))| {
            vec![
                (i + 1).to_string(),
                name.clone(),
                r.year.to_string(),
                pct(Some(r.value)),
            ]
        })
        .collect();
    grid(&header, &rows)
}

/// Two series side by side on their shared years.
pub fn render_joined(labels: (&str, &str), joined: &[(i32, f64, f64)]) -> String {
    let header = vec!["year".to_string(), labels.0.to_string(), labels.1.to_string()];
    let rows: Vec<Vec<String>> = joined
        .iter()
        .map(|&(y, a, b)| vec![y.to_string(), pct(Some(a)), pct(Some(b))])
        .collect();
    grid(&header, &rows)
}
