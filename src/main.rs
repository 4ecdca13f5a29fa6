use iced::widget::image::Handle;
use iced::widget::{column, container, scrollable, text, Column};
use iced::{event, window, Alignment, Element, Event, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;

mod config;
mod detect;
mod error;
mod state;
mod ui;

use config::Config;
use detect::{resolve_url, AnalysisClient};
use error::AnalysisError;
use state::{AnalysisResult, Completion, LoadedFile, Session, Ticket};
use ui::HeatmapImage;

/// Main application state
struct DeepfakeScanner {
    config: Config,
    client: AnalysisClient,
    /// Selection, verdict slot and request generation
    session: Session,
    /// Heatmap download for the visible verdict
    heatmap: HeatmapImage,
    /// Backend health line shown at the bottom
    backend: String,
    /// One-line notice for refused actions and unreadable files
    notice: Option<String>,
    /// Bumped for every pick or drop; only the latest read is applied
    load_seq: u64,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked "Choose Image"
    PickFile,
    /// A file was dropped on the window
    FileDropped(PathBuf),
    /// Background file read finished (tagged with its load sequence)
    FileLoaded(u64, Result<LoadedFile, String>),
    /// User clicked "Upload Now"
    Submit,
    /// The detection request settled
    AnalysisComplete(Ticket, Result<AnalysisResult, AnalysisError>),
    /// Heatmap download for the given generation settled
    HeatmapLoaded(u64, Result<Vec<u8>, AnalysisError>),
    /// Startup health probe settled
    BackendChecked(Result<String, AnalysisError>),
}

impl DeepfakeScanner {
    fn new(config: Config, client: AnalysisClient) -> (Self, Task<Message>) {
        log::info!("🔍 Deepfake Scanner using {}", config.detect_url());

        let probe = client.clone();
        let app = DeepfakeScanner {
            config,
            client,
            session: Session::new(),
            heatmap: HeatmapImage::None,
            backend: "Checking backend...".to_string(),
            notice: None,
            load_seq: 0,
        };

        (
            app,
            Task::perform(
                async move { probe.health().await },
                Message::BackendChecked,
            ),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickFile => {
                // Show the native file picker dialog
                let file = FileDialog::new()
                    .set_title("Select an image to analyze")
                    .add_filter("Images", self.config.image_extensions.as_slice())
                    .pick_file();

                match file {
                    Some(path) => self.load_file(path),
                    None => Task::none(),
                }
            }
            Message::FileDropped(path) => {
                // Same extension filter as the picker
                if !self.config.accepts(&path) {
                    log::warn!("⚠️  Ignoring dropped file {}", path.display());
                    self.notice = Some(format!(
                        "Unsupported file type: {} (expected {})",
                        path.display(),
                        self.config.image_extensions.join(", ")
                    ));
                    return Task::none();
                }
                self.load_file(path)
            }
            Message::FileLoaded(seq, result) => {
                // A newer pick or drop owns the selection now
                if seq != self.load_seq {
                    log::debug!("Discarding stale file read {} (latest {})", seq, self.load_seq);
                    return Task::none();
                }

                match result {
                    Ok(file) => {
                        self.session.select_file(file);
                        self.heatmap = HeatmapImage::None;
                        self.notice = None;
                    }
                    Err(reason) => {
                        log::warn!("⚠️  {}", reason);
                        self.notice = Some(reason);
                    }
                }
                Task::none()
            }
            Message::Submit => match self.session.begin_submit() {
                Ok(request) => {
                    self.notice = None;
                    self.heatmap = HeatmapImage::None;

                    // Send the upload in the background
                    let ticket = request.ticket.clone();
                    let client = self.client.clone();
                    Task::perform(
                        async move { client.submit(request).await },
                        move |result| Message::AnalysisComplete(ticket.clone(), result),
                    )
                }
                Err(err) => {
                    log::warn!("⚠️  Submit refused: {}", err);
                    self.notice = Some(err.to_string());
                    Task::none()
                }
            },
            Message::AnalysisComplete(ticket, result) => {
                if self.session.complete(&ticket, result) == Completion::Discarded {
                    return Task::none();
                }

                // Fetch the heatmap, tagged with this verdict's generation
                let heatmap_path = self
                    .session
                    .results()
                    .result()
                    .and_then(|result| result.heatmap_path.clone());
                let Some(path) = heatmap_path else {
                    return Task::none();
                };

                self.heatmap = HeatmapImage::Loading;
                let url = resolve_url(self.client.base_url(), &path);
                let generation = ticket.generation();
                let client = self.client.clone();
                Task::perform(
                    async move { client.fetch_heatmap(url).await },
                    move |bytes| Message::HeatmapLoaded(generation, bytes),
                )
            }
            Message::HeatmapLoaded(generation, bytes) => {
                // Stale heatmap from a superseded verdict
                if !self.session.is_current(generation) {
                    log::debug!("Discarding heatmap for generation {}", generation);
                    return Task::none();
                }
                self.heatmap = match bytes {
                    Ok(bytes) => HeatmapImage::Loaded(Handle::from_bytes(bytes)),
                    Err(err) => {
                        log::warn!("⚠️  Heatmap download failed: {}", err);
                        HeatmapImage::Failed(err.to_string())
                    }
                };
                Task::none()
            }
            Message::BackendChecked(result) => {
                self.backend = match result {
                    Ok(message) => {
                        log::info!("✅ Backend online: {}", message);
                        format!("🟢 Backend online: {}", message)
                    }
                    Err(err) => {
                        log::warn!("⚠️  Backend unreachable: {}", err);
                        format!("🔴 Backend unreachable at {}", self.config.base_url)
                    }
                };
                Task::none()
            }
        }
    }

    /// Start reading `path` and tag the read so older ones are dropped
    fn load_file(&mut self, path: PathBuf) -> Task<Message> {
        self.load_seq += 1;
        let seq = self.load_seq;
        Task::perform(read_image_file(path), move |result| {
            Message::FileLoaded(seq, result)
        })
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let panel = ui::verdict::render(&self.session, self.client.base_url());

        let mut content: Column<Message> = column![
            text("Deepfake Scanner").size(48),
            text("Upload an image to check whether it was generated or manipulated.").size(16),
            ui::panel::upload_section(panel, &self.heatmap),
        ]
        .spacing(20)
        .padding(40)
        .align_x(Alignment::Center);

        if let Some(notice) = &self.notice {
            content = content.push(text(notice).size(14));
        }
        content = content.push(text(&self.backend).size(12));

        container(scrollable(content))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Files dropped onto the window go through the same path as the picker
    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, _status, _window| match event {
            Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,deepfake_scanner=info"),
    )
    .init();

    let config = Config::load().unwrap_or_else(|err| {
        log::warn!("⚠️  {}; using default settings", err);
        Config::default()
    });
    let client = AnalysisClient::new(&config)?;

    iced::application(
        "Deepfake Scanner",
        DeepfakeScanner::update,
        DeepfakeScanner::view,
    )
    .theme(DeepfakeScanner::theme)
    .subscription(DeepfakeScanner::subscription)
    .centered()
    .run_with(move || DeepfakeScanner::new(config, client))?;

    Ok(())
}

/// Read an image file off the UI thread
async fn read_image_file(path: PathBuf) -> Result<LoadedFile, String> {
    let content = tokio::fs::read(&path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());

    Ok(LoadedFile {
        name,
        path: Some(path),
        content,
    })
}
