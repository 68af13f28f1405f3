//! HTML export.
//!
//! The page is a Tera template filled from the serialized [`Report`]; every
//! value is HTML-escaped on the way in.

use std::path::{Path, PathBuf};

use tera::{Context, Tera};

use crate::session::{LEGEND_HEADING, TOTALS_HEADING, TOTALS_SUBHEADING};

use super::{write_replacing, ExportResult, Report, ReportSink, NOTES_HEADING};

const TEMPLATE_NAME: &str = "report.html";

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{ title }}</title>
<style>
  body { font-family: Helvetica, Arial, sans-serif; margin: 2em; }
  table.form td { padding: 2px 12px 2px 0; }
  .lungs { display: flex; gap: 2em; margin: 1.5em 0; }
  .lung { display: grid; grid-template-columns: 12em; gap: 4px; }
  .region { border: 1px solid #9B9B9B; padding: 6px; }
  .swatch { display: inline-block; width: 2em; height: 1em; border: 1px solid #9B9B9B; vertical-align: middle; margin-right: 0.5em; }
  .notes { white-space: pre-wrap; }
  footer { font-size: 0.7em; color: #7D7C7C; margin-top: 2em; }
</style>
</head>
<body>
<h1>{{ title }}</h1>
<table class="form">
  <tr><td><b>Name:</b></td><td>{{ patient.name }}</td></tr>
  <tr><td><b>Last Name:</b></td><td>{{ patient.last_name }}</td></tr>
  <tr><td><b>Date of Birth:</b></td><td>{{ patient.date_of_birth }}</td></tr>
  <tr><td><b>Date of acquisition:</b></td><td>{{ patient.date_of_acquisition }}</td></tr>
</table>
<div class="lungs">
  <div class="lung">
  {%- for region in regions %}
    {%- if loop.index0 == per_lung %}
  </div>
  <div class="lung">
    {%- endif %}
    <div class="region" id="{{ region.region }}" style="background-color: {{ region.color }}">{{ region.region }} ({{ region.level }})</div>
  {%- endfor %}
  </div>
</div>
<h2>{{ legend_heading }}</h2>
<ul>
{%- for row in legend.rows %}
  <li><span class="swatch" style="background-color: {{ row.color }}"></span>{{ row.label }}</li>
{%- endfor %}
</ul>
<h2>{{ totals_heading }}</h2>
<p>{{ totals_subheading }} {{ totals.pathological }}</p>
<ul>
{%- for row in totals.rows %}
  <li><span class="swatch" style="background-color: {{ row.color }}"></span><b>{{ row.count }}</b></li>
{%- endfor %}
</ul>
<h2>{{ notes_heading }}</h2>
<p class="notes">{{ patient.notes }}</p>
<footer>Report {{ id }} | SHA-256 {{ digest }}</footer>
</body>
</html>
"#;

/// Writes `<stem>.html` into a directory.
#[derive(Debug, Clone)]
pub struct HtmlExporter {
    output_dir: PathBuf,
}

impl HtmlExporter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }
}

impl ReportSink for HtmlExporter {
    fn export(&self, report: &Report) -> ExportResult<PathBuf> {
        let html = render_html(report)?;
        let file_name = format!("{}.html", report.file_stem());
        let path = write_replacing(&self.output_dir, &file_name, html.as_bytes())?;

        tracing::info!(path = %path.display(), bytes = html.len(), "exported HTML report");
        Ok(path)
    }
}

/// Render the report as a standalone HTML page.
pub fn render_html(report: &Report) -> ExportResult<String> {
    let mut tera = Tera::default();
    tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)?;

    let mut context = Context::from_serialize(report)?;
    context.insert("digest", &report.digest()?);
    context.insert("per_lung", &report.regions.len().div_ceil(2));
    context.insert("legend_heading", LEGEND_HEADING);
    context.insert("totals_heading", TOTALS_HEADING);
    context.insert("totals_subheading", TOTALS_SUBHEADING);
    context.insert("notes_heading", NOTES_HEADING);

    Ok(tera.render(TEMPLATE_NAME, &context)?)
}
