//! The single mutable aggregate behind all four views.
//!
//! Fields are private; every change goes through a named operation so the
//! cross-view invariants hold after each call:
//! - `current_scan` is the scan closest to the displayed MS1 spectrum.
//! - A new MS1 spectrum drops the MS2 spectrum and its zoom window.
//! - An integration result only lives while integration mode is on and the
//!   active chromatogram is unchanged.
//! - Responses are applied only when their [`Ticket`] is still current.

use serde::Serialize;
use tracing::{
    debug,
    error,
    info,
    warn,
};

use crate::closest_scan::closest_scan_index;
use crate::errors::GatewayError;
use crate::gateway::Ticket;
use crate::integration::{
    IntegrationResult,
    IntegrationSelection,
    integrate,
};
use crate::models::{
    Chromatogram,
    FragmentSpectrum,
    ScanSummary,
    Spectrum,
};
use crate::stick_spectrum::{
    StickSeries,
    build_stick_series,
};
use crate::tolerance::{
    MzWindow,
    XicInput,
};
use crate::zoom::{
    AxisEvent,
    Pane,
    ZoomWindows,
    y_axis_upper_bound,
};

/// Progress of the selected-retention-time path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SelectionPhase {
    #[default]
    Idle,
    Resolving,
    Displayed,
}

/// Which fetches are in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadingFlags {
    pub source: bool,
    pub chromatogram: bool,
    pub scans: bool,
    pub extraction: bool,
    pub spectrum: bool,
    pub fragment: bool,
}

impl LoadingFlags {
    pub fn any(&self) -> bool {
        self.source
            || self.chromatogram
            || self.scans
            || self.extraction
            || self.spectrum
            || self.fragment
    }
}

/// Independent request streams; each keeps its own generation counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Channel {
    Source,
    File,
    Extraction,
    Spectrum,
    Fragment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
struct Generations {
    source: u64,
    file: u64,
    extraction: u64,
    spectrum: u64,
    fragment: u64,
}

impl Generations {
    fn slot_mut(&mut self, channel: Channel) -> &mut u64 {
        match channel {
            Channel::Source => &mut self.source,
            Channel::File => &mut self.file,
            Channel::Extraction => &mut self.extraction,
            Channel::Spectrum => &mut self.spectrum,
            Channel::Fragment => &mut self.fragment,
        }
    }

    fn get(&self, channel: Channel) -> u64 {
        match channel {
            Channel::Source => self.source,
            Channel::File => self.file,
            Channel::Extraction => self.extraction,
            Channel::Spectrum => self.spectrum,
            Channel::Fragment => self.fragment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplorationState {
    file: Option<String>,
    total_chromatogram: Option<Chromatogram>,
    extracted_chromatogram: Option<Chromatogram>,
    scans: Vec<ScanSummary>,
    current_scan: Option<usize>,
    spectrum: Option<Spectrum>,
    fragment: Option<FragmentSpectrum>,
    integration_mode: bool,
    integration: Option<IntegrationResult>,
    zoom: ZoomWindows,
    /// Bumped whenever the plotted dataset (not just the view) changes.
    revision: u64,
    xic_input: XicInput,
    normalize_ms1: bool,
    loading: LoadingFlags,
    error_banner: Option<String>,
    selection: SelectionPhase,
    #[serde(skip)]
    scroll_to_row: Option<usize>,
    #[serde(skip)]
    generations: Generations,
}

impl Default for ExplorationState {
    fn default() -> Self {
        Self::new(
            XicInput {
                target_mz: 0.0,
                ppm: 10.0,
            },
            false,
        )
    }
}

impl ExplorationState {
    pub fn new(xic_input: XicInput, normalize_ms1: bool) -> Self {
        Self {
            file: None,
            total_chromatogram: None,
            extracted_chromatogram: None,
            scans: Vec::new(),
            current_scan: None,
            spectrum: None,
            fragment: None,
            integration_mode: false,
            integration: None,
            zoom: ZoomWindows::default(),
            revision: 0,
            xic_input,
            normalize_ms1,
            loading: LoadingFlags::default(),
            error_banner: None,
            selection: SelectionPhase::Idle,
            scroll_to_row: None,
            generations: Generations::default(),
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn total_chromatogram(&self) -> Option<&Chromatogram> {
        self.total_chromatogram.as_ref()
    }

    pub fn extracted_chromatogram(&self) -> Option<&Chromatogram> {
        self.extracted_chromatogram.as_ref()
    }

    /// The extracted chromatogram when there is one, otherwise the total.
    pub fn active_chromatogram(&self) -> Option<&Chromatogram> {
        self.extracted_chromatogram
            .as_ref()
            .or(self.total_chromatogram.as_ref())
    }

    pub fn scans(&self) -> &[ScanSummary] {
        &self.scans
    }

    pub fn current_scan_index(&self) -> Option<usize> {
        self.current_scan
    }

    pub fn current_scan(&self) -> Option<&ScanSummary> {
        self.current_scan.and_then(|idx| self.scans.get(idx))
    }

    pub fn spectrum(&self) -> Option<&Spectrum> {
        self.spectrum.as_ref()
    }

    pub fn fragment_spectrum(&self) -> Option<&FragmentSpectrum> {
        self.fragment.as_ref()
    }

    pub fn integration_mode(&self) -> bool {
        self.integration_mode
    }

    pub fn integration(&self) -> Option<&IntegrationResult> {
        self.integration.as_ref()
    }

    pub fn zoom(&self) -> &ZoomWindows {
        &self.zoom
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn xic_input(&self) -> XicInput {
        self.xic_input
    }

    /// Window for the current XIC input, recomputed on every call.
    pub fn mass_window(&self) -> Option<MzWindow> {
        self.xic_input.window()
    }

    pub fn normalize_ms1(&self) -> bool {
        self.normalize_ms1
    }

    pub fn loading(&self) -> &LoadingFlags {
        &self.loading
    }

    pub fn error_banner(&self) -> Option<&str> {
        self.error_banner.as_deref()
    }

    pub fn selection(&self) -> SelectionPhase {
        self.selection
    }

    /// One-shot request for the table to bring a row into view.
    pub fn take_scroll_request(&mut self) -> Option<usize> {
        self.scroll_to_row.take()
    }

    pub fn ms1_sticks(&self) -> Option<StickSeries> {
        let spec = self.spectrum.as_ref()?;
        let intensities = if self.normalize_ms1 {
            spec.normalized_intensities()
        } else {
            spec.intensities().to_vec()
        };
        Some(build_stick_series(
            spec.mzs(),
            &intensities,
            spec.precursor_mzs_with_fragments(),
        ))
    }

    pub fn ms2_sticks(&self) -> Option<StickSeries> {
        let frag = self.fragment.as_ref()?;
        Some(build_stick_series(frag.mzs(), frag.intensities(), &[]))
    }

    /// Derived y-axis upper bound for `pane` under its current zoom window.
    pub fn y_axis_upper_bound(&self, pane: Pane) -> f64 {
        let window = self.zoom.get(pane);
        match pane {
            Pane::Chromatogram => match self.active_chromatogram() {
                Some(chrom) => {
                    let (xs, ys): (Vec<f64>, Vec<f64>) = chrom.points_minutes().unzip();
                    y_axis_upper_bound(&xs, &ys, window, None)
                }
                None => 1.0,
            },
            Pane::Ms1 => match &self.spectrum {
                Some(spec) => {
                    let normalize_to = self.normalize_ms1.then(|| spec.max_intensity());
                    y_axis_upper_bound(spec.mzs(), spec.intensities(), window, normalize_to)
                }
                None => 1.0,
            },
            Pane::Ms2 => match &self.fragment {
                Some(frag) => y_axis_upper_bound(frag.mzs(), frag.intensities(), window, None),
                None => 1.0,
            },
        }
    }

    // ------------------------------------------------------------------
    // Tickets
    // ------------------------------------------------------------------

    pub(crate) fn issue_ticket(&mut self, channel: Channel) -> Ticket {
        let slot = self.generations.slot_mut(channel);
        *slot += 1;
        let generation = *slot;
        Ticket {
            file_generation: self.generations.file,
            generation,
        }
    }

    pub(crate) fn is_current(&self, channel: Channel, ticket: Ticket) -> bool {
        ticket.file_generation == self.generations.file
            && ticket.generation == self.generations.get(channel)
    }

    fn drop_if_stale(&self, channel: Channel, ticket: Ticket) -> bool {
        let stale = !self.is_current(channel, ticket);
        if stale {
            debug!("Dropping stale {:?} response {:?}", channel, ticket);
        }
        stale
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub(crate) fn report_error(&mut self, message: String) {
        error!("{}", message);
        self.error_banner = Some(message);
    }

    pub(crate) fn dismiss_error(&mut self) {
        self.error_banner = None;
    }

    pub(crate) fn begin_source(&mut self) -> Ticket {
        self.loading.source = true;
        self.issue_ticket(Channel::Source)
    }

    /// Apply a resolved demo/upload path. Returns the path to open when the
    /// response is still current.
    pub(crate) fn finish_source(
        &mut self,
        ticket: Ticket,
        operation: &str,
        result: Result<String, GatewayError>,
    ) -> Option<String> {
        if self.drop_if_stale(Channel::Source, ticket) {
            return None;
        }
        self.loading.source = false;
        match result {
            Ok(path) => Some(path),
            Err(e) => {
                self.report_error(e.user_message(operation));
                None
            }
        }
    }

    /// Switch to a new file. Everything derived from the previous file is
    /// dropped before any fetch for the new one is issued.
    pub(crate) fn begin_file(&mut self, filepath: String) -> Ticket {
        info!("Opening file {}", filepath);
        self.file = Some(filepath);
        self.total_chromatogram = None;
        self.extracted_chromatogram = None;
        self.scans.clear();
        self.current_scan = None;
        self.spectrum = None;
        self.fragment = None;
        self.integration = None;
        self.zoom.reset_all();
        self.revision += 1;
        self.selection = SelectionPhase::Idle;
        self.scroll_to_row = None;
        self.error_banner = None;
        self.loading = LoadingFlags {
            chromatogram: true,
            ..LoadingFlags::default()
        };

        self.generations.file += 1;
        Ticket {
            file_generation: self.generations.file,
            generation: self.generations.file,
        }
    }

    /// Returns `true` when the response was current, in which case the scan
    /// list may be requested next.
    pub(crate) fn finish_total_chromatogram(
        &mut self,
        ticket: Ticket,
        result: Result<Chromatogram, GatewayError>,
    ) -> bool {
        if self.drop_if_stale(Channel::File, ticket) {
            return false;
        }
        self.loading.chromatogram = false;
        match result {
            Ok(chrom) => {
                info!("Loaded total chromatogram with {} points", chrom.len());
                self.total_chromatogram = Some(chrom);
                if self.extracted_chromatogram.is_none() {
                    self.active_chromatogram_changed();
                }
            }
            Err(e) => self.report_error(e.user_message("load chromatogram")),
        }
        true
    }

    pub(crate) fn begin_scan_list(&mut self) {
        self.loading.scans = true;
    }

    pub(crate) fn finish_scan_list(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<ScanSummary>, GatewayError>,
    ) {
        if self.drop_if_stale(Channel::File, ticket) {
            return;
        }
        self.loading.scans = false;
        match result {
            Ok(scans) => {
                info!("Loaded scan list with {} scans", scans.len());
                self.scans = scans;
                self.resolve_current_scan();
            }
            Err(e) => self.report_error(e.user_message("load scan list")),
        }
    }

    pub(crate) fn set_xic_input(&mut self, input: XicInput) {
        self.xic_input = input;
    }

    pub(crate) fn begin_extraction(&mut self) -> Ticket {
        self.loading.extraction = true;
        self.issue_ticket(Channel::Extraction)
    }

    pub(crate) fn finish_extraction(
        &mut self,
        ticket: Ticket,
        result: Result<Chromatogram, GatewayError>,
    ) {
        if self.drop_if_stale(Channel::Extraction, ticket) {
            return;
        }
        self.loading.extraction = false;
        match result {
            Ok(chrom) => {
                info!("Extracted chromatogram with {} points", chrom.len());
                self.extracted_chromatogram = Some(chrom);
                self.active_chromatogram_changed();
            }
            Err(e) => self.report_error(e.user_message("extract chromatogram")),
        }
    }

    pub(crate) fn clear_extraction(&mut self) {
        // Invalidate anything still in flight for the old window.
        self.issue_ticket(Channel::Extraction);
        self.loading.extraction = false;
        if self.extracted_chromatogram.take().is_some() {
            self.active_chromatogram_changed();
        }
    }

    fn active_chromatogram_changed(&mut self) {
        self.revision += 1;
        self.zoom.reset(Pane::Chromatogram);
        self.integration = None;
    }

    pub(crate) fn set_integration_mode(&mut self, enabled: bool) {
        self.integration_mode = enabled;
        if !enabled {
            self.integration = None;
        }
    }

    /// Integrate the active chromatogram over `selection`.
    ///
    /// Leaves the previous result untouched when integration mode is off,
    /// no chromatogram is loaded, or fewer than two samples qualify.
    pub(crate) fn apply_integration(&mut self, selection: &IntegrationSelection) {
        if !self.integration_mode {
            debug!("Ignoring selection outside integration mode");
            return;
        }
        let Some(chrom) = self.active_chromatogram() else {
            return;
        };
        match integrate(selection, chrom) {
            Some(result) => {
                info!(
                    "Integrated {} samples, area {:.3}",
                    result.sample_times_minutes.len(),
                    result.area
                );
                self.integration = Some(result);
            }
            None => debug!("Selection {:?} covers fewer than 2 samples", selection.bounds()),
        }
    }

    pub(crate) fn apply_axis_event(&mut self, pane: Pane, event: AxisEvent) {
        self.zoom.apply(pane, event);
    }

    pub(crate) fn set_normalize_ms1(&mut self, normalize: bool) {
        self.normalize_ms1 = normalize;
    }

    pub(crate) fn begin_spectrum(&mut self) -> Ticket {
        self.selection = SelectionPhase::Resolving;
        self.loading.spectrum = true;
        self.issue_ticket(Channel::Spectrum)
    }

    pub(crate) fn finish_spectrum(&mut self, ticket: Ticket, result: Result<Spectrum, GatewayError>) {
        if self.drop_if_stale(Channel::Spectrum, ticket) {
            return;
        }
        self.loading.spectrum = false;
        match result {
            Ok(spec) => {
                info!(
                    "Displaying spectrum at RT {:.2}s with {} peaks",
                    spec.retention_time_seconds(),
                    spec.mzs().len()
                );
                self.spectrum = Some(spec);
                // A new MS1 context invalidates the fragment view and anything in flight for it.
                self.fragment = None;
                self.zoom.reset(Pane::Ms2);
                self.issue_ticket(Channel::Fragment);
                self.loading.fragment = false;
                self.selection = SelectionPhase::Displayed;
                self.resolve_current_scan();
            }
            Err(e) => {
                self.selection = SelectionPhase::Idle;
                self.report_error(e.user_message("load spectrum"));
            }
        }
    }

    pub(crate) fn begin_fragment(&mut self) -> Ticket {
        self.loading.fragment = true;
        self.issue_ticket(Channel::Fragment)
    }

    /// Failures only log; the MS1 view stays as it is.
    pub(crate) fn finish_fragment(
        &mut self,
        ticket: Ticket,
        precursor_mz: f64,
        result: Result<FragmentSpectrum, GatewayError>,
    ) {
        if self.drop_if_stale(Channel::Fragment, ticket) {
            return;
        }
        self.loading.fragment = false;
        match result {
            Ok(frag) => {
                info!(
                    "Displaying MS2 spectrum for precursor {:.4} with {} peaks",
                    frag.precursor_mz(),
                    frag.mzs().len()
                );
                self.fragment = Some(frag);
                self.zoom.reset(Pane::Ms2);
            }
            Err(e) => warn!("MS2 spectrum for precursor {:.4} unavailable: {}", precursor_mz, e),
        }
    }

    fn resolve_current_scan(&mut self) {
        let Some(spec) = &self.spectrum else {
            return;
        };
        self.current_scan = closest_scan_index(&self.scans, spec.retention_time_seconds());
        self.scroll_to_row = self.current_scan;
    }
}
