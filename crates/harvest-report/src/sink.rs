//! Report sinks.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use harvest_core::Problem;
use serde::Serialize;
use serde_jsonlines::JsonLinesWriter;

use crate::error::ReportError;
use crate::report::{ItemReport, ReportHeader, ReportSummary};

const TITLE: &str = "Archive Harvest Report";

/// Destination for report output.
pub trait ReportSink {
    /// # Errors
    /// Returns [`ReportError::Io`] when the output cannot be written.
    fn header(&mut self, header: &ReportHeader) -> Result<(), ReportError>;

    /// # Errors
    /// Returns [`ReportError::Io`] when the output cannot be written.
    fn item(&mut self, item: &ItemReport<'_>) -> Result<(), ReportError>;

    /// Write the summary and flush.
    ///
    /// # Errors
    /// Returns [`ReportError::Io`] when the output cannot be written.
    fn summary(&mut self, summary: &ReportSummary) -> Result<(), ReportError>;
}

impl<T: ReportSink + ?Sized> ReportSink for Box<T> {
    fn header(&mut self, header: &ReportHeader) -> Result<(), ReportError> {
        (**self).header(header)
    }

    fn item(&mut self, item: &ItemReport<'_>) -> Result<(), ReportError> {
        (**self).item(item)
    }

    fn summary(&mut self, summary: &ReportSummary) -> Result<(), ReportError> {
        (**self).summary(summary)
    }
}

/// Open `path` for writing, or stdout when `path` is `None`.
///
/// # Errors
/// Returns [`ReportError::Open`] when the file or its directory cannot be created.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write + Send>, ReportError> {
    let Some(path) = path else {
        return Ok(Box::new(io::stdout()));
    };
    let open = |source| ReportError::Open {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(open)?;
    }
    let file = File::create(path).map_err(open)?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Human-readable report.
#[derive(Debug)]
pub struct TextSink<W> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    fn problem(&mut self, problem: &Problem) -> io::Result<()> {
        writeln!(self.out, "      {problem}")
    }
}

impl<W: Write> ReportSink for TextSink<W> {
    fn header(&mut self, header: &ReportHeader) -> Result<(), ReportError> {
        writeln!(self.out, "{TITLE}")?;
        writeln!(self.out)?;
        writeln!(self.out, "Configuration:")?;
        for (name, value) in &header.configuration {
            writeln!(self.out, "   {name:<24}{value}")?;
        }
        writeln!(self.out)?;
        writeln!(self.out, "Parameters:")?;
        for (name, value) in &header.parameters {
            writeln!(self.out, "   {name:<24}{value}")?;
        }
        writeln!(self.out)?;
        writeln!(self.out, "Validation Details:")?;
        Ok(())
    }

    fn item(&mut self, item: &ItemReport<'_>) -> Result<(), ReportError> {
        writeln!(self.out)?;
        writeln!(self.out, "  {}: {}", item.status, item.source)?;

        for &problem in &item.problems {
            self.problem(problem)?;
        }
        Ok(())
    }

    fn summary(&mut self, summary: &ReportSummary) -> Result<(), ReportError> {
        let totals = &summary.totals;
        let crawl = &summary.crawl;
        writeln!(self.out)?;
        writeln!(self.out, "Summary:")?;
        writeln!(self.out)?;
        writeln!(
            self.out,
            "  {} of {} validated, {} skipped",
            totals.validated(),
            totals.total(),
            totals.skipped
        )?;
        writeln!(self.out, "  {} of {} passed", totals.passed, totals.validated())?;
        writeln!(self.out)?;
        writeln!(
            self.out,
            "  Files crawled: {} good, {} bad, {} skipped",
            crawl.good, crawl.bad, crawl.skipped
        )?;
        writeln!(
            self.out,
            "  Problems: {} errors, {} warnings, {} infos",
            totals.errors, totals.warnings, totals.infos
        )?;
        writeln!(self.out)?;
        writeln!(self.out, "End of Report")?;
        self.out.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum JsonLine<'r, 'a> {
    Header(&'r ReportHeader),
    Item(&'r ItemReport<'a>),
    Summary(&'r ReportSummary),
}

/// One JSON object per line: a header, each item, then the summary.
pub struct JsonSink<W> {
    out: JsonLinesWriter<W>,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: JsonLinesWriter::new(out),
        }
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn header(&mut self, header: &ReportHeader) -> Result<(), ReportError> {
        self.out.write(&JsonLine::Header(header))?;
        Ok(())
    }

    fn item(&mut self, item: &ItemReport<'_>) -> Result<(), ReportError> {
        self.out.write(&JsonLine::Item(item))?;
        Ok(())
    }

    fn summary(&mut self, summary: &ReportSummary) -> Result<(), ReportError> {
        self.out.write(&JsonLine::Summary(summary))?;
        self.out.flush()?;
        Ok(())
    }
}
