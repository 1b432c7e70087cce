//! Presentation export.
//!
//! Walks a deck and lays it out for [`pptx_writer`]: document coordinates on the
//! 960x540 editor canvas are scaled to EMU on a 16:9 slide, each slide gets a title
//! box and a body box, then its elements in `zIndex` order.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use crate::services::pptx_writer::{self, Frame, ShapeSpec, SlideSpec, TextBody};
use crate::types::deck::{normalize_color, BorderStyle, Element, ElementKind, ShapeKind, Slide, TextAlign};
use crate::types::errors::ExportError;

pub const CANVAS_WIDTH: f64 = 960.0;
pub const CANVAS_HEIGHT: f64 = 540.0;
/// EMU per canvas unit; 960 units span the 12,192,000 EMU slide width.
pub const EMU_PER_UNIT: f64 = 12_700.0;

const DEFAULT_SHAPE_COLOR: &str = "3498DB";
const TITLE_SIZE: u32 = 3200;
const BODY_SIZE: u32 = 1800;

pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pptx,
    /// Recognised, not implemented.
    Pdf,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Pptx => "pptx",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pptx" => Ok(ExportFormat::Pptx),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// A rendered file ready to download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: String,
}

pub trait ExporterTrait {
    fn export(&self, title: &str, slides: &[Slide], format: ExportFormat) -> Result<ExportedFile, ExportError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Exporter;

impl Exporter {
    pub fn new() -> Self {
        Self
    }
}

impl ExporterTrait for Exporter {
    fn export(&self, title: &str, slides: &[Slide], format: ExportFormat) -> Result<ExportedFile, ExportError> {
        match format {
            ExportFormat::Pdf => Err(ExportError::NotImplemented(format.to_string())),
            ExportFormat::Pptx => {
                let specs = slides
                    .iter()
                    .enumerate()
                    .map(|(index, slide)| layout_slide(index, slide))
                    .collect::<Result<Vec<_>, _>>()?;
                let bytes = pptx_writer::write_package(title, &specs)?;
                info!(slides = slides.len(), bytes = bytes.len(), "Exported presentation");
                Ok(ExportedFile {
                    bytes,
                    content_type: PPTX_CONTENT_TYPE,
                    file_name: format!("{}.{}", file_stem(title), format),
                })
            }
        }
    }
}

/// Safe download name: ASCII alphanumerics, `-` and `_`; spaces become `_`.
/// Falls back to `presentation` when nothing alphanumeric survives.
pub fn file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => Some(c),
            _ => None,
        })
        .collect();
    if !stem.chars().any(|c| c.is_ascii_alphanumeric()) {
        "presentation".to_string()
    } else {
        stem
    }
}

fn emu(units: f64) -> i64 {
    (units * EMU_PER_UNIT).round() as i64
}

fn hex(color: &str) -> String {
    color.trim_start_matches('#').to_ascii_uppercase()
}

fn layout_slide(index: usize, slide: &Slide) -> Result<SlideSpec, ExportError> {
    let mut shapes = Vec::with_capacity(slide.elements.len() + 2);

    if !slide.title.is_empty() {
        shapes.push(text_box("Title", (40.0, 30.0, 880.0, 70.0), &slide.title, TITLE_SIZE, true));
    }
    if !slide.content.is_empty() {
        shapes.push(text_box("Body", (40.0, 110.0, 880.0, 400.0), &slide.content, BODY_SIZE, false));
    }

    let mut ordered: Vec<&Element> = slide.elements.iter().collect();
    ordered.sort_by_key(|e| e.z_index);
    for element in ordered {
        if let Some(shape) = layout_element(index, element)? {
            shapes.push(shape);
        }
    }

    let background = slide
        .background
        .as_ref()
        .and_then(|bg| bg.color.as_deref())
        .and_then(normalize_color)
        .map(|c| hex(&c));

    Ok(SlideSpec { background, shapes })
}

fn text_box(name: &str, (x, y, w, h): (f64, f64, f64, f64), text: &str, size: u32, bold: bool) -> ShapeSpec {
    ShapeSpec {
        name: name.to_string(),
        frame: Frame { x: emu(x), y: emu(y), cx: emu(w), cy: emu(h), rotation: 0 },
        preset: "rect",
        fill: None,
        outline: None,
        dash: None,
        text: Some(TextBody {
            text: text.to_string(),
            size: Some(size),
            align: None,
            color: None,
            bold,
        }),
        text_box: true,
    }
}

fn preset_for(shape: ShapeKind) -> &'static str {
    match shape {
        ShapeKind::Rectangle | ShapeKind::Square => "rect",
        ShapeKind::Circle | ShapeKind::Oval => "ellipse",
        ShapeKind::Triangle => "triangle",
        ShapeKind::RightTriangle => "rtTriangle",
        ShapeKind::Pentagon => "pentagon",
        ShapeKind::Hexagon => "hexagon",
        ShapeKind::Arrow => "rightArrow",
        ShapeKind::DoubleArrow => "leftRightArrow",
        ShapeKind::Star => "star5",
        ShapeKind::Callout => "wedgeRectCallout",
        ShapeKind::Line => "line",
        ShapeKind::Curve => "arc",
    }
}

fn dash_for(style: Option<BorderStyle>) -> Option<&'static str> {
    match style {
        Some(BorderStyle::Dashed) => Some("dash"),
        Some(BorderStyle::Dotted) => Some("sysDot"),
        Some(BorderStyle::Solid) | None => None,
    }
}

fn align_for(align: Option<TextAlign>) -> Option<&'static str> {
    align.map(|a| match a {
        TextAlign::Left => "l",
        TextAlign::Center => "ctr",
        TextAlign::Right => "r",
    })
}

/// `None` for element kinds this exporter does not draw.
fn layout_element(slide: usize, element: &Element) -> Result<Option<ShapeSpec>, ExportError> {
    let geometry = [element.x, element.y, element.width, element.height, element.rotation];
    if geometry.iter().any(|v| !v.is_finite()) {
        return Err(ExportError::InvalidGeometry { slide, element: element.id.clone() });
    }

    let mut frame = Frame {
        x: emu(element.x),
        y: emu(element.y),
        cx: emu(element.width.max(0.0)),
        cy: emu(element.height.max(0.0)),
        rotation: (element.rotation * 60_000.0).round() as i64,
    };
    let style = &element.style;
    let color = style.color.as_deref().map(hex);

    let spec = match &element.kind {
        ElementKind::Shape(shape) => {
            if matches!(shape, ShapeKind::Square | ShapeKind::Circle) {
                let side = frame.cx.min(frame.cy);
                frame.cx = side;
                frame.cy = side;
            }
            let color = color.unwrap_or_else(|| DEFAULT_SHAPE_COLOR.to_string());
            let stroked = matches!(shape, ShapeKind::Line | ShapeKind::Curve);
            ShapeSpec {
                name: element.id.clone(),
                frame,
                preset: preset_for(*shape),
                fill: (!stroked).then(|| color.clone()),
                outline: (stroked || style.border_style.is_some()).then(|| color.clone()),
                dash: dash_for(style.border_style),
                text: None,
                text_box: false,
            }
        }
        ElementKind::Text(text) => ShapeSpec {
            name: element.id.clone(),
            frame,
            preset: "rect",
            fill: None,
            outline: None,
            dash: None,
            text: Some(TextBody {
                text: text.clone(),
                size: style.font_size.map(|size| (size * 100.0).round() as u32),
                align: align_for(style.text_align),
                color,
                bold: false,
            }),
            text_box: true,
        },
        ElementKind::Image(reference) => ShapeSpec {
            name: element.id.clone(),
            frame,
            preset: "rect",
            fill: Some("ECF0F1".to_string()),
            outline: Some("95A5A6".to_string()),
            dash: Some("dash"),
            text: Some(TextBody {
                text: format!("[image] {}", reference),
                size: Some(1200),
                align: Some("ctr"),
                color: Some("7F8C8D".to_string()),
                bold: false,
            }),
            text_box: false,
        },
        ElementKind::Other { kind, .. } => {
            debug!(slide, element = %element.id, kind = %kind, "Skipping element type without an export mapping");
            return Ok(None);
        }
    };
    Ok(Some(spec))
}
