/// Upload panel widgets
/// Turns a `PanelView` into iced widgets
use iced::widget::{button, canvas, column, container, image, row, text, Column};
use iced::{Alignment, Color, Element, Length};

use super::confidence_bar::{bar_color, ConfidenceBar};
use super::verdict::{PanelView, ResultPanel, VerdictView};
use super::HeatmapImage;
use crate::Message;

const PREVIEW_WIDTH: f32 = 300.0;
const ERROR_RED: Color = Color { r: 0.95, g: 0.35, b: 0.35, a: 1.0 };

/// Build the upload section
pub fn upload_section<'a>(panel: PanelView<'a>, heatmap: &'a HeatmapImage) -> Element<'a, Message> {
    let mut content: Column<Message> = column![
        text("Upload Image").size(32),
        button("Choose Image")
            .on_press(Message::PickFile)
            .padding(10),
    ]
    .spacing(16)
    .align_x(Alignment::Center);

    if let Some(preview) = panel.preview {
        content = content.push(
            column![
                text("Preview:").size(18),
                image(preview.handle.clone()).width(Length::Fixed(PREVIEW_WIDTH)),
                text(preview.caption).size(14),
            ]
            .spacing(8)
            .align_x(Alignment::Center),
        );
    } else {
        content = content.push(text("Drop an image here or choose one").size(14));
    }

    content = content.push(
        button(panel.submit_label)
            .on_press_maybe(panel.submit_enabled.then_some(Message::Submit))
            .padding(10),
    );

    content = match panel.result {
        ResultPanel::Empty => content,
        ResultPanel::Busy => content.push(text("Analyzing image...").size(16)),
        ResultPanel::Error(reason) => content.push(
            column![
                text("Something went wrong. Please try again.")
                    .size(16)
                    .color(ERROR_RED),
                text(reason).size(14),
            ]
            .spacing(4)
            .align_x(Alignment::Center),
        ),
        ResultPanel::Verdict(verdict) => content.push(verdict_block(verdict, heatmap)),
    };

    container(content)
        .width(Length::Fill)
        .center_x(Length::Fill)
        .padding(20)
        .into()
}

fn verdict_block<'a>(verdict: VerdictView, heatmap: &'a HeatmapImage) -> Element<'a, Message> {
    let bar = ConfidenceBar {
        fill: verdict.fill,
        color: verdict.color,
    };

    let mut block: Column<Message> = column![
        text("Result:").size(24),
        row![
            text("Prediction:").size(16),
            text(verdict.label).size(16).color(bar_color(verdict.color)),
        ]
        .spacing(8),
        row![text("Confidence:").size(16), text(verdict.percent).size(16)].spacing(8),
        canvas(bar).width(Length::Fixed(PREVIEW_WIDTH)).height(Length::Fixed(20.0)),
        text(format!("analyzed at {}", verdict.analyzed_at)).size(12),
    ]
    .spacing(8)
    .align_x(Alignment::Center);

    if let Some(url) = verdict.heatmap_url {
        let body: Element<'a, Message> = match heatmap {
            HeatmapImage::Loaded(handle) => image(handle.clone())
                .width(Length::Fixed(PREVIEW_WIDTH))
                .into(),
            HeatmapImage::Loading => text("Loading heatmap...").size(14).into(),
            HeatmapImage::Failed(reason) => text(format!("Heatmap unavailable: {}", reason))
                .size(14)
                .into(),
            HeatmapImage::None => text("").into(),
        };
        block = block.push(
            column![text("Heatmap:").size(18), body, text(url).size(12)]
                .spacing(6)
                .align_x(Alignment::Center),
        );
    }

    block.into()
}
