use super::{RunReport, Summary};
use crate::simulation::SimulationResults;
use anyhow::Result;
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes one CSV row per run of a sweep. Header comes from `RunReport`'s field names.
pub struct ReportLogger<W: Write> {
    writer: Writer<W>,
    rows: usize,
}

impl ReportLogger<File> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_writer(File::create(path)?))
    }
}

impl<W: Write> ReportLogger<W> {
    pub fn from_writer(inner: W) -> Self {
        Self {
            writer: Writer::from_writer(inner),
            rows: 0,
        }
    }

    /// Summarized run straight from the runner; the row is built here.
    pub fn record(
        &mut self,
        results: &SimulationResults,
        seed: u64,
        summary: Summary,
    ) -> Result<()> {
        self.write_row(&RunReport::new(results, seed, summary))
    }

    pub fn write_all(&mut self, reports: &[RunReport]) -> Result<()> {
        reports.iter().try_for_each(|report| self.write_row(report))
    }

    fn write_row(&mut self, report: &RunReport) -> Result<()> {
        self.writer.serialize(report)?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flushes and hands back the underlying writer.
    pub fn finish(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("CSV flush failed: {}", e.error()))
    }
}
