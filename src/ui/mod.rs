/// User interface module
///
/// - `verdict.rs` projects the session into plain display data
/// - `panel.rs` builds iced widgets from that data
/// - `confidence_bar.rs` draws the verdict bar on a canvas

pub mod confidence_bar;
pub mod panel;
pub mod verdict;

use iced::widget::image::Handle;

/// Heatmap image download state for the visible verdict
#[derive(Debug, Clone, Default)]
pub enum HeatmapImage {
    #[default]
    None,
    Loading,
    Loaded(Handle),
    Failed(String),
}
