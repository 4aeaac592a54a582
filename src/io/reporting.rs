// src/io/reporting.rs

use crate::analysis::metrics::{chart_series, ChartPoint, ReportMetrics};
use crate::error::GameError;
use crate::model::state::CycleSnapshot;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// One CSV row: a single tier in a single cycle.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRecord {
    pub cycle: u32,
    pub role: String,
    pub inventory: u32,
    pub backlog: u32,
    pub incoming_order: u32,
    pub outgoing_order: u32,
    pub incoming_shipment: u32,
    pub outgoing_shipment: u32,
    pub cost: f64,
}

/// Flattens snapshots into rows, upstream tier first within each cycle.
pub fn history_records(
    history: &[CycleSnapshot],
    holding_cost: f64,
    backlog_cost: f64,
) -> Vec<HistoryRecord> {
    history
        .iter()
        .flat_map(|snapshot| {
            snapshot.nodes.iter().map(move |node| HistoryRecord {
                cycle: snapshot.cycle,
                role: node.role.to_string(),
                inventory: node.inventory,
                backlog: node.backlog,
                incoming_order: node.incoming_order,
                outgoing_order: node.outgoing_order,
                incoming_shipment: node.incoming_shipment,
                outgoing_shipment: node.outgoing_shipment,
                cost: node.cycle_cost(holding_cost, backlog_cost),
            })
        })
        .collect()
}

/// Serializes every row to `writer` as CSV with a header line.
fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), GameError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// The history log as CSV text.
pub fn history_to_csv(
    history: &[CycleSnapshot],
    holding_cost: f64,
    backlog_cost: f64,
) -> Result<Vec<u8>, GameError> {
    let mut buf = Vec::new();
    write_rows(&mut buf, &history_records(history, holding_cost, backlog_cost))?;
    Ok(buf)
}

/// Writes the history log to a CSV file.
///
/// # Arguments
/// * `path` - Where to save the file (e.g., "results/run_1.csv").
/// * `history` - The snapshots collected by the game.
pub fn write_history_csv(
    path: impl AsRef<Path>,
    history: &[CycleSnapshot],
    holding_cost: f64,
    backlog_cost: f64,
) -> Result<(), GameError> {
    let path = path.as_ref();
    let records = history_records(history, holding_cost, backlog_cost);
    write_rows(File::create(path)?, &records)?;
    info!(rows = records.len(), path = %path.display(), "exported history");
    Ok(())
}

/// Writes the demand/order series behind the bullwhip chart.
pub fn write_chart_series_csv(
    path: impl AsRef<Path>,
    history: &[CycleSnapshot],
) -> Result<(), GameError> {
    let path = path.as_ref();
    let series = chart_series(history);
    write_rows(File::create(path)?, &series)?;
    info!(rows = series.len(), path = %path.display(), "exported chart series");
    Ok(())
}

/// Everything the end-of-game screen shows.
#[derive(Debug, Clone, Serialize)]
pub struct FinalReport {
    pub metrics: ReportMetrics,
    pub chart: Vec<ChartPoint>,
    /// Markdown, either from the advisor or the fallback text.
    pub narrative: String,
}

impl FinalReport {
    pub fn new(history: &[CycleSnapshot], metrics: ReportMetrics, narrative: String) -> Self {
        Self {
            metrics,
            chart: chart_series(history),
            narrative,
        }
    }

    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), GameError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), "exported final report");
        Ok(())
    }
}
