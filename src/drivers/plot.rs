use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;

use crate::drivers::error::DecodeError;
use crate::drivers::framer::{DecodedBit, DecodedByte};
use crate::drivers::Sample;

#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub wire_a: RGBColor,
    pub wire_b: RGBColor,
    pub byte_label: RGBColor,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 640 * 16,
            height: 640,
            // snow
            background: RGBColor(255, 250, 250),
            // dark magenta / dark cyan
            wire_a: RGBColor(139, 0, 139),
            wire_b: RGBColor(0, 139, 139),
            // dark green
            byte_label: RGBColor(0, 100, 0),
        }
    }
}

impl PlotStyle {
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

/// Titles and optional decode annotations for one chart.
#[derive(Clone, Debug, Default)]
pub struct ChartOptions {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bits: Vec<DecodedBit>,
    pub bytes: Vec<DecodedByte>,
}

impl ChartOptions {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            ..Self::default()
        }
    }

    pub fn with_trace(mut self, bits: &[DecodedBit], bytes: &[DecodedByte]) -> Self {
        self.bits = bits.to_vec();
        self.bytes = bytes.to_vec();
        self
    }
}

/// Renders both line voltages against time, with bit labels along y = 0 and
/// byte labels along y = -1.
pub fn render_series_png(
    samples: &[Sample],
    options: &ChartOptions,
    style: &PlotStyle,
) -> Result<Vec<u8>, DecodeError> {
    if samples.is_empty() {
        return Err(DecodeError::Plot("series has no samples".into()));
    }
    let mut buffer = vec![0u8; rgb_buffer_len(style.width, style.height)?];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;

        let (x_range, y_range) = axis_ranges(samples);
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(&options.title, ("sans-serif", 20).into_font().color(&BLACK))
            .set_label_area_size(LabelAreaPosition::Left, 50)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(x_range, y_range)?;
        chart
            .configure_mesh()
            .x_desc(options.x_label.as_str())
            .y_desc(options.y_label.as_str())
            .light_line_style(&BLACK.mix(0.05))
            .draw()?;

        for (label, color, pick) in [
            ("A line", style.wire_a, (|s: &Sample| s.voltage_a) as fn(&Sample) -> f64),
            ("B line", style.wire_b, |s: &Sample| s.voltage_b),
        ] {
            chart
                .draw_series(LineSeries::new(
                    samples.iter().map(|s| (s.time, pick(s))),
                    &color,
                ))?
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
            chart.draw_series(
                samples
                    .iter()
                    .map(|s| Cross::new((s.time, pick(s)), 3, color.stroke_width(1))),
            )?;
        }

        if !options.bits.is_empty() {
            let bit_style = ("sans-serif", 12)
                .into_font()
                .transform(FontTransform::Rotate90)
                .color(&BLACK);
            chart.draw_series(
                options
                    .bits
                    .iter()
                    .map(|b| Text::new(b.to_string(), (b.start_time, 0.0), bit_style.clone())),
            )?;
        }
        if !options.bytes.is_empty() {
            let byte_style = ("sans-serif", 22)
                .into_font()
                .color(&style.byte_label)
                .pos(Pos::new(HPos::Left, VPos::Top));
            chart.draw_series(
                options
                    .bytes
                    .iter()
                    .map(|b| Text::new(b.to_string(), (b.start_time, -1.0), byte_style.clone())),
            )?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .border_style(&BLACK.mix(0.3))
            .background_style(&style.background.mix(0.8))
            .draw()?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}

fn axis_ranges(samples: &[Sample]) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    // keep the label rows at 0 and -1 in view
    let (mut y_min, mut y_max) = (-1.5f64, 0.5f64);
    for s in samples {
        x_min = x_min.min(s.time);
        x_max = x_max.max(s.time);
        y_min = y_min.min(s.voltage_a).min(s.voltage_b);
        y_max = y_max.max(s.voltage_a).max(s.voltage_b);
    }
    if (x_max - x_min).abs() < f64::EPSILON {
        x_min -= 1e-6;
        x_max += 1e-6;
    }
    let pad = (y_max - y_min) * 0.05;
    (x_min..x_max, (y_min - pad)..(y_max + pad))
}

/// Bytes needed for an RGB bitmap, computed in `usize` so large charts fail cleanly.
fn rgb_buffer_len(width: u32, height: u32) -> Result<usize, DecodeError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(3))
        .ok_or_else(|| DecodeError::Plot(format!("chart size {width}x{height} is too large")))
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, DecodeError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| DecodeError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
