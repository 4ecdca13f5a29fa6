/// Confidence bar
/// Horizontal bar whose filled width is the verdict confidence
use iced::widget::canvas::{self, Path};
use iced::{Color, Point, Rectangle, Size};

use super::verdict::BarColor;
use crate::Message;

const TRACK: Color = Color { r: 0.87, g: 0.87, b: 0.87, a: 1.0 };
const RED: Color = Color { r: 0.85, g: 0.15, b: 0.15, a: 1.0 };
const GREEN: Color = Color { r: 0.15, g: 0.65, b: 0.25, a: 1.0 };

#[derive(Debug, Clone)]
pub struct ConfidenceBar {
    /// Fill fraction in [0, 1]
    pub fill: f64,
    pub color: BarColor,
}

impl ConfidenceBar {
    /// Width of the filled part for a bar `width` pixels wide
    pub fn fill_width(&self, width: f32) -> f32 {
        width * self.fill as f32
    }
}

pub fn bar_color(color: BarColor) -> Color {
    match color {
        BarColor::Red => RED,
        BarColor::Green => GREEN,
    }
}

impl canvas::Program<Message> for ConfidenceBar {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let radius = (bounds.height / 2.0).min(8.0);

        let track = Path::rounded_rectangle(Point::ORIGIN, bounds.size(), radius.into());
        frame.fill(&track, TRACK);

        let width = self.fill_width(bounds.width);
        if width > 0.0 {
            let bar = Path::rounded_rectangle(
                Point::ORIGIN,
                Size::new(width, bounds.height),
                radius.into(),
            );
            frame.fill(&bar, bar_color(self.color));
        }

        vec![frame.into_geometry()]
    }
}
