//! Screen session state.
//!
//! A [`ReportSession`] holds everything the scoring screen shows: the latest
//! assignment and tally, the patient form contents and the configuration
//! they were produced with. Collaborators are handed in per call rather than
//! stored, so all wiring stays visible at the call site.

mod views;

pub use views::*;

use std::path::PathBuf;

use crate::config::{ConfigResult, ReportConfig};
use crate::export::{ExportError, ExportResult, Report, ReportSink};
use crate::generator::{self, RandomSource, ReportGenerator};
use crate::models::{
    Assignment, Palette, PatientForm, PatientRecord, Region, RegionCatalog, SeverityLevel, Tally,
};

/// Display side of a generation.
pub trait RegionRenderer {
    /// Called once per region, in catalog order.
    fn render_region(&mut self, region: &Region, level: &SeverityLevel);

    /// Called after every region has been rendered.
    fn render_totals(&mut self, _tally: &Tally) {}
}

/// Renderer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl RegionRenderer for NullRenderer {
    fn render_region(&mut self, _region: &Region, _level: &SeverityLevel) {}
}

/// State of one scoring screen.
pub struct ReportSession<S> {
    title: String,
    catalog: RegionCatalog,
    palette: Palette,
    generator: ReportGenerator<S>,
    date_format: String,
    assignment: Option<Assignment>,
    tally: Tally,
    patient: PatientRecord,
    generations: u32,
}

impl<S: RandomSource> ReportSession<S> {
    /// Create a session from a configuration and a random source.
    pub fn new(config: &ReportConfig, source: S) -> ConfigResult<Self> {
        config.validate()?;
        let catalog = config.catalog()?;
        let palette = config.palette()?;
        let generator = ReportGenerator::new(source).with_policy(config.draw_policy);
        let tally = Tally::zeroed(palette.scored_len());

        Ok(Self {
            title: config.title.clone(),
            catalog,
            palette,
            generator,
            date_format: config.date_format.clone(),
            assignment: None,
            tally,
            patient: PatientRecord::default(),
            generations: 0,
        })
    }

    /// Replace the current assignment with a fresh one.
    pub fn generate(&mut self) -> &Assignment {
        self.generate_with(&mut NullRenderer)
    }

    /// Replace the current assignment and push every region and the totals to
    /// `renderer`.
    pub fn generate_with<R: RegionRenderer + ?Sized>(&mut self, renderer: &mut R) -> &Assignment {
        let (assignment, tally) = self
            .generator
            .generate(self.catalog.regions(), &self.palette);

        for score in assignment.iter() {
            renderer.render_region(&score.region, &score.level);
        }
        renderer.render_totals(&tally);

        self.generations += 1;
        tracing::debug!(
            generation = self.generations,
            tally = ?tally.counts(),
            pathological = tally.pathological(),
            "generated region scores"
        );

        self.tally = tally;
        self.assignment.insert(assignment)
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }

    /// Latest tally; all zeros before the first generation.
    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    /// Count the current assignment again without drawing.
    pub fn recount(&self) -> Tally {
        match &self.assignment {
            Some(assignment) => generator::tally(assignment, &self.palette),
            None => Tally::zeroed(self.palette.scored_len()),
        }
    }

    pub fn legend(&self) -> Legend {
        Legend::from_palette(&self.palette)
    }

    /// Totals display for the latest tally.
    pub fn totals(&self) -> TotalsView {
        let mut totals = TotalsView::from_palette(&self.palette);
        totals.set_counts(&self.tally);
        totals
    }

    /// Whether there is anything to export yet.
    pub fn can_export(&self) -> bool {
        self.assignment.is_some()
    }

    pub fn generations(&self) -> u32 {
        self.generations
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_patient(&mut self, patient: PatientRecord) {
        self.patient = patient;
    }

    pub fn patient(&self) -> &PatientRecord {
        &self.patient
    }

    /// Compose the report from the latest generation and the form contents.
    pub fn compose_report<F: PatientForm + ?Sized>(&self, form: &F) -> ExportResult<Report> {
        let assignment = self.assignment.as_ref().ok_or_else(|| {
            tracing::warn!("report requested before any generation");
            ExportError::NothingGenerated
        })?;

        let patient = form
            .patient_record()
            .with_today_acquisition(&self.date_format)?;
        Ok(Report::compose(
            &self.title,
            patient,
            assignment,
            &self.tally,
            &self.palette,
        ))
    }

    /// Compose the report from the session's own patient record.
    pub fn report(&self) -> ExportResult<Report> {
        self.compose_report(&self.patient)
    }

    /// Compose the report and hand it to `sink`.
    pub fn export_with<F, K>(&self, form: &F, sink: &K) -> ExportResult<PathBuf>
    where
        F: PatientForm + ?Sized,
        K: ReportSink + ?Sized,
    {
        let report = self.compose_report(form)?;
        sink.export(&report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::ScriptedSource;

    #[derive(Default)]
    struct RecordingRenderer {
        regions: Vec<(String, usize)>,
        totals: Vec<Vec<u32>>,
    }

    impl RegionRenderer for RecordingRenderer {
        fn render_region(&mut self, region: &Region, level: &SeverityLevel) {
            self.regions.push((region.to_string(), level.index));
        }

        fn render_totals(&mut self, tally: &Tally) {
            self.totals.push(tally.counts().to_vec());
        }
    }

    fn session(source: ScriptedSource) -> ReportSession<ScriptedSource> {
        ReportSession::new(&ReportConfig::default(), source).unwrap()
    }

    #[test]
    fn test_fresh_session() {
        let session = session(ScriptedSource::constant(0));
        assert!(!session.can_export());
        assert!(session.assignment().is_none());
        assert_eq!(session.tally().counts(), &[0, 0, 0, 0]);
        assert_eq!(session.generations(), 0);
        assert_eq!(session.title(), "COVID-19 Diagnosis Support");
    }

    #[test]
    fn test_generate_renders_every_region_then_totals() {
        let mut session = session(ScriptedSource::constant(3));
        let mut renderer = RecordingRenderer::default();

        session.generate_with(&mut renderer);

        assert_eq!(renderer.regions.len(), 14);
        assert_eq!(renderer.regions[0], ("lung_area_1".to_string(), 3));
        assert_eq!(renderer.totals, vec![vec![0, 0, 0, 14]]);
        assert!(session.can_export());
    }

    #[test]
    fn test_generation_replaces_previous_state() {
        let mut session = session(ScriptedSource::new(vec![
            1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4,
        ]));

        session.generate();
        assert_eq!(session.tally().counts(), &[0, 14, 0, 0]);

        session.generate();
        assert_eq!(session.tally().counts(), &[0, 0, 0, 0]);
        assert_eq!(session.assignment().unwrap().len(), 14);
        assert_eq!(session.generations(), 2);
    }

    #[test]
    fn test_recount_matches_tally() {
        let mut session = session(ScriptedSource::new(vec![0, 2, 4, 3]));
        session.generate();
        assert_eq!(&session.recount(), session.tally());
    }

    #[test]
    fn test_totals_follow_latest_tally() {
        let mut session = session(ScriptedSource::constant(2));
        session.generate();
        let totals = session.totals();
        assert_eq!(totals.counts(), vec![0, 0, 14, 0]);
        assert_eq!(totals.pathological, 14);
    }

    #[test]
    fn test_totals_view_as_renderer() {
        let mut session = session(ScriptedSource::constant(1));
        let mut totals = session.totals();
        session.generate_with(&mut totals);
        assert_eq!(totals.counts(), vec![0, 14, 0, 0]);
    }

    #[test]
    fn test_report_requires_generation() {
        let session = session(ScriptedSource::constant(0));
        assert!(matches!(session.report(), Err(ExportError::NothingGenerated)));
    }

    #[test]
    fn test_report_uses_form_contents() {
        let mut session = session(ScriptedSource::constant(0));
        session.generate();

        let mut form = PatientRecord::new("Mario", "Rossi");
        form.date_of_acquisition = "04 Apr 2020".into();
        let report = session.compose_report(&form).unwrap();

        assert_eq!(report.patient.full_name(), "Mario Rossi");
        assert_eq!(report.patient.date_of_acquisition, "04 Apr 2020");
        assert_eq!(report.regions.len(), 14);
    }

    #[test]
    fn test_report_fills_acquisition_date() {
        let mut session = session(ScriptedSource::constant(0));
        session.set_patient(PatientRecord::new("Mario", "Rossi"));
        session.generate();

        let report = session.report().unwrap();
        assert!(!report.patient.date_of_acquisition.is_empty());
    }
}
