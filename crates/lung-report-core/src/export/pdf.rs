//! PDF rendering.
//!
//! Layout, top to bottom: title, patient form, two-lung diagram, legend,
//! totals, clinician notes. Each page ends with the digest footer.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Rect,
};

use crate::models::Rgb;
use crate::session::{LEGEND_HEADING, TOTALS_HEADING, TOTALS_SUBHEADING};

use super::{write_replacing, ExportError, ExportResult, Report, ReportSink};

pub const NOTES_HEADING: &str = "Notes of the clinician";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
/// Lowest baseline for body text; the footer sits below it.
const CONTENT_BOTTOM: f32 = MARGIN + 5.0;
const LINE_HEIGHT: f32 = 7.0;
const NOTE_LINE_HEIGHT: f32 = 5.0;
const NOTE_LINE_CHARS: usize = 90;

const CELL_WIDTH: f32 = 38.0;
const CELL_HEIGHT: f32 = 12.0;
const LUNG_GAP: f32 = 8.0;
const SWATCH_WIDTH: f32 = 10.0;
const SWATCH_HEIGHT: f32 = 5.0;

const BLACK: Rgb = Rgb::new(0, 0, 0);
const BORDER_GRAY: Rgb = Rgb::new(155, 155, 155);

/// Writes `<stem>.pdf` into a directory.
#[derive(Debug, Clone)]
pub struct PdfExporter {
    output_dir: PathBuf,
}

impl PdfExporter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }
}

impl ReportSink for PdfExporter {
    fn export(&self, report: &Report) -> ExportResult<PathBuf> {
        let bytes = render_pdf(report)?;
        let file_name = format!("{}.pdf", report.file_stem());
        let path = write_replacing(&self.output_dir, &file_name, &bytes)?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "exported PDF report");
        Ok(path)
    }
}

/// Render the report as PDF bytes.
///
/// Content flows onto as many pages as it needs; every page carries the
/// digest footer.
pub fn render_pdf(report: &Report) -> ExportResult<Vec<u8>> {
    let digest = report.digest()?;
    let mut page = PageWriter::new(
        &report.title,
        format!("Report {} | SHA-256 {}", report.id, digest),
    )?;

    // Title
    page.text(&report.title, 20.0, MARGIN, page.y, true);
    page.y -= 14.0;

    // Patient form
    let patient = &report.patient;
    for (label, value) in [
        ("Name:", patient.name.as_str()),
        ("Last Name:", patient.last_name.as_str()),
        ("Date of Birth:", patient.date_of_birth.as_str()),
        ("Date of acquisition:", patient.date_of_acquisition.as_str()),
    ] {
        page.text(label, 11.0, MARGIN, page.y, true);
        page.text(value, 11.0, MARGIN + 42.0, page.y, false);
        page.y -= 6.0;
    }
    page.y -= 8.0;

    // Diagram: first half of the regions on the left lung, the rest on the right
    let per_lung = report.regions.len().div_ceil(2);
    for row in 0..per_lung {
        page.ensure_room(CELL_HEIGHT);
        let top = page.y;
        for (column, position) in [(0, row), (1, row + per_lung)] {
            let Some(region) = report.regions.get(position) else {
                continue;
            };
            let x = MARGIN + column as f32 * (CELL_WIDTH + LUNG_GAP);
            page.cell(x, top - CELL_HEIGHT, CELL_WIDTH, CELL_HEIGHT, region.color);
            page.text(
                &format!("{} ({})", short_region_name(region.region.as_str()), region.level),
                8.0,
                x + 2.0,
                top - CELL_HEIGHT / 2.0 - 1.0,
                false,
            );
        }
        page.y -= CELL_HEIGHT;
    }
    page.y -= 10.0;

    // Legend
    page.ensure_room(LINE_HEIGHT * 2.0);
    page.text(LEGEND_HEADING, 12.0, MARGIN, page.y, true);
    page.y -= LINE_HEIGHT;
    for row in &report.legend.rows {
        page.ensure_room(LINE_HEIGHT);
        page.swatch(MARGIN, page.y, row.color);
        page.text(&row.label, 10.0, MARGIN + SWATCH_WIDTH + 3.0, page.y, false);
        page.y -= LINE_HEIGHT;
    }
    page.y -= 5.0;

    // Totals
    page.ensure_room(LINE_HEIGHT * 3.0);
    page.text(TOTALS_HEADING, 12.0, MARGIN, page.y, true);
    page.y -= LINE_HEIGHT;
    page.text(
        &format!("{} {}", TOTALS_SUBHEADING, report.totals.pathological),
        10.0,
        MARGIN,
        page.y,
        false,
    );
    page.y -= LINE_HEIGHT;
    for row in &report.totals.rows {
        page.ensure_room(LINE_HEIGHT);
        page.swatch(MARGIN, page.y, row.color);
        page.text(
            &row.count.to_string(),
            10.0,
            MARGIN + SWATCH_WIDTH + 3.0,
            page.y,
            true,
        );
        page.y -= LINE_HEIGHT;
    }
    page.y -= 5.0;

    // Notes
    page.ensure_room(LINE_HEIGHT * 2.0);
    page.text(NOTES_HEADING, 12.0, MARGIN, page.y, true);
    page.y -= LINE_HEIGHT;
    for line in wrap_text(&patient.notes, NOTE_LINE_CHARS) {
        page.ensure_room(NOTE_LINE_HEIGHT);
        page.text(&line, 10.0, MARGIN, page.y, false);
        page.y -= NOTE_LINE_HEIGHT;
    }

    page.finish()
}

/// Flowing writer over a growing list of A4 pages.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    footer: String,
    pages: usize,
    /// Baseline of the next line on the current page
    y: f32,
}

impl PageWriter {
    fn new(title: &str, footer: String) -> ExportResult<Self> {
        let (doc, page1, layer1) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page 1");
        let layer = doc.get_page(page1).get_layer(layer1);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?;

        let writer = Self {
            doc,
            layer,
            font,
            bold,
            footer,
            pages: 1,
            y: PAGE_HEIGHT - MARGIN,
        };
        writer.draw_footer();
        Ok(writer)
    }

    /// Start a new page unless `height` still fits above the footer.
    fn ensure_room(&mut self, height: f32) {
        if self.y - height < CONTENT_BOTTOM {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Page {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
        self.draw_footer();
    }

    fn draw_footer(&self) {
        self.text(
            &format!("{} | Page {}", self.footer, self.pages),
            6.0,
            MARGIN,
            MARGIN / 2.0,
            false,
        );
    }

    fn text(&self, text: &str, size: f32, x: f32, y: f32, bold: bool) {
        if text.is_empty() {
            return;
        }
        self.layer.set_fill_color(to_pdf_color(BLACK));
        let font = if bold { &self.bold } else { &self.font };
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    fn cell(&self, x: f32, y: f32, width: f32, height: f32, fill: Rgb) {
        self.layer.set_fill_color(to_pdf_color(fill));
        self.layer.set_outline_color(to_pdf_color(BORDER_GRAY));
        self.layer.set_outline_thickness(0.5);
        self.layer.add_rect(
            Rect::new(Mm(x), Mm(y), Mm(x + width), Mm(y + height)).with_mode(PaintMode::FillStroke),
        );
    }

    /// Swatch vertically centered on a text baseline.
    fn swatch(&self, x: f32, baseline: f32, fill: Rgb) {
        self.cell(x, baseline - 1.0, SWATCH_WIDTH, SWATCH_HEIGHT, fill);
    }

    fn finish(self) -> ExportResult<Vec<u8>> {
        tracing::debug!(pages = self.pages, "rendered PDF");
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| ExportError::Pdf(format!("save error: {e}")))?;
        buf.into_inner()
            .map_err(|e| ExportError::Pdf(format!("buffer error: {e}")))
    }
}

fn to_pdf_color(color: Rgb) -> Color {
    let (r, g, b) = color.to_unit();
    Color::Rgb(printpdf::Rgb::new(r, g, b, None))
}

/// `lung_area_7` → `Area 7`; other identifiers are printed as is.
fn short_region_name(id: &str) -> String {
    match id.strip_prefix("lung_area_") {
        Some(number) => format!("Area {}", number),
        None => id.to_string(),
    }
}

/// Greedy word wrap counted in characters; explicit line breaks are kept and
/// words longer than a line are split.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut width = 0;
        for word in paragraph.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                if width > 0 && width + 1 + piece.len() > max_chars {
                    lines.push(std::mem::take(&mut current));
                    width = 0;
                }
                if width > 0 {
                    current.push(' ');
                    width += 1;
                }
                current.extend(piece);
                width += piece.len();
            }
        }
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::{make_report, pdf_text};
    use crate::generator::{ReportGenerator, ScriptedSource};
    use crate::models::{Palette, PatientRecord, RegionCatalog};

    #[test]
    fn test_render_pdf() {
        let bytes = render_pdf(&make_report()).unwrap();
        assert!(!bytes.is_empty());
        // PDF magic bytes: %PDF
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn test_render_pdf_content() {
        let report = make_report();
        let (pages, text) = pdf_text(&render_pdf(&report).unwrap());

        assert_eq!(pages, 1);
        for expected in [
            "COVID-19 Diagnosis Support",
            "Mario",
            "Rossi",
            "21 Oct 1962",
            "04 Apr 2020",
            LEGEND_HEADING,
            "Score 0",
            "Score 3",
            "Not measured",
            TOTALS_HEADING,
            "Pathological areas: 9",
            NOTES_HEADING,
            "Bilateral B-lines, worse at the bases.",
            "Area 14",
        ] {
            assert!(text.contains(expected), "missing {expected:?}");
        }
        assert!(text.contains(&report.digest().unwrap()));
    }

    #[test]
    fn test_long_notes_continue_on_next_page() {
        let mut report = make_report();
        report.patient.notes = (0..600)
            .map(|n| format!("n{n:03}"))
            .collect::<Vec<_>>()
            .join(" ");

        let (pages, text) = pdf_text(&render_pdf(&report).unwrap());

        assert!(pages >= 2);
        for word in ["n000", "n300", "n599"] {
            assert!(text.contains(word), "missing {word}");
        }
        assert!(text.contains("Page 2"));
    }

    #[test]
    fn test_large_catalog_flows_across_pages() {
        let palette = Palette::default();
        let ids: Vec<String> = (0..80).map(|n| format!("zone_{n:02}")).collect();
        let catalog = RegionCatalog::new(ids).unwrap();
        let mut generator = ReportGenerator::new(ScriptedSource::constant(1));
        let (assignment, tally) = generator.generate(catalog.regions(), &palette);
        let mut patient = PatientRecord::new("Anna", "Bianchi");
        patient.notes = "Closing remark.".into();
        let report = Report::compose("Ward", patient, &assignment, &tally, &palette);

        let (pages, text) = pdf_text(&render_pdf(&report).unwrap());

        assert!(pages >= 2);
        assert!(text.contains("zone_00"));
        assert!(text.contains("zone_79"));
        assert!(text.contains("Pathological areas: 80"));
        assert!(text.contains("Closing remark."));
    }

    #[test]
    fn test_render_pdf_without_regions_or_notes() {
        let mut report = make_report();
        report.regions.clear();
        report.patient.notes.clear();

        let bytes = render_pdf(&report).unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn test_pdf_exporter_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let report = make_report();

        let path = PdfExporter::new(dir.path()).export(&report).unwrap();

        assert!(path.exists());
        assert!(path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("Report Rossi Mario"));
        assert_eq!(&std::fs::read(&path).unwrap()[0..4], b"%PDF");
    }

    #[test]
    fn test_short_region_name() {
        assert_eq!(short_region_name("lung_area_12"), "Area 12");
        assert_eq!(short_region_name("apex"), "apex");
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("one two three four", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);

        let lines = wrap_text("first\nsecond line", 80);
        assert_eq!(lines, vec!["first", "second line"]);

        assert!(wrap_text("", 80).is_empty());
    }

    #[test]
    fn test_wrap_text_counts_characters() {
        // 9 characters, 12 bytes
        let lines = wrap_text("più città", 9);
        assert_eq!(lines, vec!["più città"]);
    }

    #[test]
    fn test_wrap_text_splits_long_words() {
        let lines = wrap_text("ab abcdefghij", 4);
        assert_eq!(lines, vec!["ab", "abcd", "efgh", "ij"]);
    }
}
