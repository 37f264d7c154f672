use serde::{
    Deserialize,
    Serialize,
};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::mpsc::Receiver;
use tracing::{
    debug,
    info,
    instrument,
    warn,
};

use crate::config::ExplorerConfig;
use crate::events::{
    ChartEvent,
    KeyboardHub,
    PixelToData,
    ScanStep,
};
use crate::gateway::{
    self,
    DataGateway,
    FetchOutcome,
    FetchRequest,
};
use crate::integration::IntegrationSelection;
use crate::selection::{
    self,
    SpectrumTrigger,
};
use crate::state::ExplorationState;
use crate::tolerance::XicInput;
use crate::zoom::{
    AxisEvent,
    Pane,
};

/// User intents that change the exploration state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExplorerCommand {
    /// Open a file already known to the data service.
    OpenFile(String),
    /// Resolve the bundled demo dataset and open it.
    OpenDemoDataset,
    /// Upload a local file and open it.
    UploadFile {
        file_name: String,
        #[serde(skip)]
        payload: Vec<u8>,
    },
    /// Pointer interaction on the chromatogram.
    Chart(ChartEvent),
    /// Keyboard step through the scan table.
    StepScan(ScanStep),
    /// Click on a scan table row.
    SelectScanRow(usize),
    /// Show the spectrum nearest to a retention time given in minutes.
    SelectRetentionTime { minutes: f64 },
    /// Click in the MS1 pane at `mz`.
    ClickMs1Peak { mz: f64 },
    SetXicInput(XicInput),
    ExtractChromatogram,
    ClearExtractedChromatogram,
    SetIntegrationMode(bool),
    /// Axis notification from one of the panes.
    Axis { pane: Pane, event: AxisEvent },
    SetNormalizeMs1(bool),
    DismissError,
}

/// Owns the exploration state and is the only writer to it.
///
/// Commands are queued with [`Explorer::submit`] and drained by
/// [`Explorer::handle_commands`]. Hosts that run fetches concurrently can use
/// [`Explorer::begin`] and [`Explorer::complete`] directly; responses that
/// arrive after a newer request of the same kind are discarded.
pub struct Explorer<G> {
    gateway: G,
    state: ExplorationState,
    pending_commands: Vec<ExplorerCommand>,
    keyboard: Option<Receiver<ScanStep>>,
    chromatogram_axis: Option<Box<dyn PixelToData>>,
    session_log: Option<Box<dyn Write + Send + Sync>>,
}

impl<G: DataGateway> Explorer<G> {
    pub fn new(gateway: G, config: &ExplorerConfig) -> Self {
        let xic_input = XicInput {
            target_mz: 0.0,
            ppm: config.ppm_tolerance,
        };
        Self {
            gateway,
            state: ExplorationState::new(xic_input, config.normalize_ms1),
            pending_commands: Vec::new(),
            keyboard: None,
            chromatogram_axis: None,
            session_log: None,
        }
    }

    pub fn with_session_log(mut self, log: Box<dyn Write + Send + Sync>) -> Self {
        self.session_log = Some(log);
        self
    }

    /// Receive keyboard steps from `hub` for as long as this explorer lives.
    pub fn subscribe_keyboard(&mut self, hub: &KeyboardHub) {
        self.keyboard = Some(hub.subscribe());
    }

    /// Register the chromatogram pane's pixel-to-data transform.
    pub fn set_chromatogram_axis(&mut self, axis: Box<dyn PixelToData>) {
        self.chromatogram_axis = Some(axis);
    }

    pub fn state(&self) -> &ExplorationState {
        &self.state
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn take_scroll_request(&mut self) -> Option<usize> {
        self.state.take_scroll_request()
    }

    pub fn submit(&mut self, command: ExplorerCommand) {
        self.pending_commands.push(command);
    }

    pub fn pending_commands(&self) -> &[ExplorerCommand] {
        &self.pending_commands
    }

    fn poll_keyboard(&mut self) {
        let Some(rx) = &self.keyboard else {
            return;
        };
        while let Ok(step) = rx.try_recv() {
            self.pending_commands.push(ExplorerCommand::StepScan(step));
        }
    }

    /// Drain queued commands (keyboard first), running each to completion.
    pub async fn handle_commands(&mut self) {
        self.poll_keyboard();
        let commands = std::mem::take(&mut self.pending_commands);

        for cmd in commands {
            debug!("Handling command: {:?}", cmd);
            self.log_command(&cmd);
            let requests = self.begin(cmd);
            self.run(requests).await;
        }
    }

    /// Convenience for a single command.
    pub async fn dispatch(&mut self, command: ExplorerCommand) {
        self.submit(command);
        self.handle_commands().await;
    }

    fn log_command(&mut self, cmd: &ExplorerCommand) {
        let Some(logger) = &mut self.session_log else {
            return;
        };
        match serde_json::to_string(cmd) {
            Ok(json) => {
                if let Err(e) = writeln!(logger, "{}", json) {
                    warn!("Failed to write session log: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize command for session log: {}", e),
        }
    }

    /// Execute `requests` and any follow-ups they produce, in order.
    #[instrument(skip_all, fields(n = requests.len()))]
    pub async fn run(&mut self, requests: Vec<FetchRequest>) {
        let mut queue: VecDeque<FetchRequest> = requests.into();
        while let Some(request) = queue.pop_front() {
            let outcome = gateway::execute(&self.gateway, request).await;
            queue.extend(self.complete(outcome));
        }
    }

    /// Apply the synchronous part of `cmd` and return the fetches it needs.
    pub fn begin(&mut self, cmd: ExplorerCommand) -> Vec<FetchRequest> {
        match cmd {
            ExplorerCommand::OpenFile(path) => self.open_file(path).into_iter().collect(),
            ExplorerCommand::OpenDemoDataset => {
                let ticket = self.state.begin_source();
                vec![FetchRequest::DemoDataset { ticket }]
            }
            ExplorerCommand::UploadFile { file_name, payload } => {
                let ticket = self.state.begin_source();
                vec![FetchRequest::Upload {
                    ticket,
                    file_name,
                    payload,
                }]
            }
            ExplorerCommand::Chart(event) => self.handle_chart_event(event).into_iter().collect(),
            ExplorerCommand::StepScan(step) => {
                let target =
                    selection::step_target(self.state.scans(), self.state.current_scan_index(), step);
                match target.and_then(|idx| selection::row_retention_time(self.state.scans(), idx)) {
                    Some(rt) => self
                        .request_spectrum(rt, SpectrumTrigger::KeyboardStep)
                        .into_iter()
                        .collect(),
                    None => {
                        debug!("Scan step {:?} has no target", step);
                        Vec::new()
                    }
                }
            }
            ExplorerCommand::SelectScanRow(idx) => {
                match selection::row_retention_time(self.state.scans(), idx) {
                    Some(rt) => self
                        .request_spectrum(rt, SpectrumTrigger::TableRow)
                        .into_iter()
                        .collect(),
                    None => {
                        warn!("Scan row {} out of range", idx);
                        Vec::new()
                    }
                }
            }
            ExplorerCommand::SelectRetentionTime { minutes } => {
                if !minutes.is_finite() {
                    warn!("Ignoring non-finite retention time {}", minutes);
                    return Vec::new();
                }
                self.request_spectrum(minutes * 60.0, SpectrumTrigger::Direct)
                    .into_iter()
                    .collect()
            }
            ExplorerCommand::ClickMs1Peak { mz } => self.request_fragment(mz).into_iter().collect(),
            ExplorerCommand::SetXicInput(input) => {
                self.state.set_xic_input(input);
                Vec::new()
            }
            ExplorerCommand::ExtractChromatogram => self.request_extraction().into_iter().collect(),
            ExplorerCommand::ClearExtractedChromatogram => {
                self.state.clear_extraction();
                Vec::new()
            }
            ExplorerCommand::SetIntegrationMode(enabled) => {
                self.state.set_integration_mode(enabled);
                Vec::new()
            }
            ExplorerCommand::Axis { pane, event } => {
                self.state.apply_axis_event(pane, event);
                Vec::new()
            }
            ExplorerCommand::SetNormalizeMs1(normalize) => {
                self.state.set_normalize_ms1(normalize);
                Vec::new()
            }
            ExplorerCommand::DismissError => {
                self.state.dismiss_error();
                Vec::new()
            }
        }
    }

    /// Apply a finished fetch. Returns follow-up requests, such as the scan
    /// list once the total chromatogram has settled.
    pub fn complete(&mut self, outcome: FetchOutcome) -> Vec<FetchRequest> {
        match outcome {
            FetchOutcome::DemoDataset { ticket, result } => self
                .state
                .finish_source(ticket, "resolve demo dataset", result)
                .and_then(|path| self.open_file(path))
                .into_iter()
                .collect(),
            FetchOutcome::Upload { ticket, result } => self
                .state
                .finish_source(ticket, "upload file", result)
                .and_then(|path| self.open_file(path))
                .into_iter()
                .collect(),
            FetchOutcome::TotalChromatogram { ticket, result } => {
                // The scan list is requested only once the chromatogram has settled.
                if !self.state.finish_total_chromatogram(ticket, result) {
                    return Vec::new();
                }
                let Some(filepath) = self.state.file().map(str::to_string) else {
                    return Vec::new();
                };
                self.state.begin_scan_list();
                vec![FetchRequest::ScanList { ticket, filepath }]
            }
            FetchOutcome::ScanList { ticket, result } => {
                self.state.finish_scan_list(ticket, result);
                Vec::new()
            }
            FetchOutcome::ExtractedChromatogram {
                ticket,
                window,
                result,
            } => {
                debug!("Extraction for {:?} finished", window);
                self.state.finish_extraction(ticket, result);
                Vec::new()
            }
            FetchOutcome::Spectrum {
                ticket,
                rt_seconds,
                result,
            } => {
                debug!("Spectrum request at {:.2}s finished", rt_seconds);
                self.state.finish_spectrum(ticket, result);
                Vec::new()
            }
            FetchOutcome::FragmentSpectrum {
                ticket,
                precursor_mz,
                result,
            } => {
                self.state.finish_fragment(ticket, precursor_mz, result);
                Vec::new()
            }
        }
    }

    fn open_file(&mut self, path: String) -> Option<FetchRequest> {
        if path.trim().is_empty() {
            warn!("Ignoring empty file identifier");
            return None;
        }
        let ticket = self.state.begin_file(path.clone());
        Some(FetchRequest::TotalChromatogram {
            ticket,
            filepath: path,
        })
    }

    fn handle_chart_event(&mut self, event: ChartEvent) -> Option<FetchRequest> {
        match event {
            ChartEvent::PointClick { x, pixel_x } => {
                let minutes =
                    selection::resolve_click_minutes(x, pixel_x, self.chromatogram_axis.as_deref());
                match minutes {
                    Some(minutes) => self.request_spectrum(minutes * 60.0, SpectrumTrigger::ChartClick),
                    None => {
                        debug!("Chromatogram click could not be resolved to a time");
                        None
                    }
                }
            }
            ChartEvent::RangeSelect { min_x, max_x } => {
                self.state
                    .apply_integration(&IntegrationSelection::from_range(min_x, max_x));
                None
            }
            ChartEvent::PointsSelect { xs } => {
                self.state
                    .apply_integration(&IntegrationSelection::from_points(xs));
                None
            }
        }
    }

    fn request_spectrum(&mut self, rt_seconds: f64, trigger: SpectrumTrigger) -> Option<FetchRequest> {
        let Some(filepath) = self.state.file().map(str::to_string) else {
            warn!("No file open, ignoring spectrum request");
            return None;
        };
        info!("Requesting spectrum at {:.2}s ({:?})", rt_seconds, trigger);
        let ticket = self.state.begin_spectrum();
        Some(FetchRequest::Spectrum {
            ticket,
            filepath,
            rt_seconds,
        })
    }

    fn request_fragment(&mut self, clicked_mz: f64) -> Option<FetchRequest> {
        let filepath = self.state.file().map(str::to_string)?;
        let Some((precursor_mz, rt_seconds)) =
            selection::fragment_target(self.state.spectrum(), clicked_mz)
        else {
            debug!("No precursor with fragment data near m/z {:.4}", clicked_mz);
            return None;
        };
        let ticket = self.state.begin_fragment();
        Some(FetchRequest::FragmentSpectrum {
            ticket,
            filepath,
            precursor_mz,
            rt_seconds,
        })
    }

    fn request_extraction(&mut self) -> Option<FetchRequest> {
        let Some(filepath) = self.state.file().map(str::to_string) else {
            warn!("No file open, ignoring extraction request");
            return None;
        };
        let Some(window) = self.state.mass_window() else {
            let input = self.state.xic_input();
            self.state.report_error(format!(
                "Invalid m/z {} or tolerance {} ppm",
                input.target_mz, input.ppm
            ));
            return None;
        };
        let ticket = self.state.begin_extraction();
        Some(FetchRequest::ExtractedChromatogram {
            ticket,
            filepath,
            window,
        })
    }
}
