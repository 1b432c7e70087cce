//! Slide-deck document model: slides, the elements placed on them, and element styles.
//!
//! Deserialization is lenient on purpose-built paths (`from_value`): model output and
//! browser payloads are coerced into the typed shape, malformed fields are dropped or
//! replaced with defaults, and unknown fields are carried through untouched.

use std::collections::HashSet;
use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

pub const DEFAULT_X: f64 = 100.0;
pub const DEFAULT_Y: f64 = 100.0;
pub const DEFAULT_WIDTH: f64 = 200.0;
pub const DEFAULT_HEIGHT: f64 = 100.0;

// ─── Vocabularies ───

/// Shape kinds a `shape` element may draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Rectangle,
    Square,
    Circle,
    Oval,
    Triangle,
    RightTriangle,
    Pentagon,
    Hexagon,
    Arrow,
    DoubleArrow,
    Star,
    Callout,
    Line,
    Curve,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 14] = [
        ShapeKind::Rectangle,
        ShapeKind::Square,
        ShapeKind::Circle,
        ShapeKind::Oval,
        ShapeKind::Triangle,
        ShapeKind::RightTriangle,
        ShapeKind::Pentagon,
        ShapeKind::Hexagon,
        ShapeKind::Arrow,
        ShapeKind::DoubleArrow,
        ShapeKind::Star,
        ShapeKind::Callout,
        ShapeKind::Line,
        ShapeKind::Curve,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Square => "square",
            ShapeKind::Circle => "circle",
            ShapeKind::Oval => "oval",
            ShapeKind::Triangle => "triangle",
            ShapeKind::RightTriangle => "right-triangle",
            ShapeKind::Pentagon => "pentagon",
            ShapeKind::Hexagon => "hexagon",
            ShapeKind::Arrow => "arrow",
            ShapeKind::DoubleArrow => "double-arrow",
            ShapeKind::Star => "star",
            ShapeKind::Callout => "callout",
            ShapeKind::Line => "line",
            ShapeKind::Curve => "curve",
        }
    }

    /// Parses a shape tag. Case, `_`/space separators and a few common aliases are accepted.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let normalized = tag.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        let kind = match normalized.as_str() {
            "rectangle" | "rect" => ShapeKind::Rectangle,
            "square" => ShapeKind::Square,
            "circle" => ShapeKind::Circle,
            "oval" | "ellipse" => ShapeKind::Oval,
            "triangle" => ShapeKind::Triangle,
            "right-triangle" | "righttriangle" => ShapeKind::RightTriangle,
            "pentagon" => ShapeKind::Pentagon,
            "hexagon" => ShapeKind::Hexagon,
            "arrow" | "right-arrow" => ShapeKind::Arrow,
            "double-arrow" | "left-right-arrow" => ShapeKind::DoubleArrow,
            "star" => ShapeKind::Star,
            "callout" => ShapeKind::Callout,
            "line" => ShapeKind::Line,
            "curve" | "arc" => ShapeKind::Curve,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ShapeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ShapeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(ShapeKind::from_tag(&tag).unwrap_or(ShapeKind::Rectangle))
    }
}

/// Outline style of a shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    Solid,
    Dashed,
    Dotted,
}

impl BorderStyle {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "solid" => Some(BorderStyle::Solid),
            "dashed" => Some(BorderStyle::Dashed),
            "dotted" => Some(BorderStyle::Dotted),
            _ => None,
        }
    }
}

/// Horizontal alignment of text inside an element.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "left" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" => Some(TextAlign::Right),
            _ => None,
        }
    }
}

// ─── Coercion helpers ───

/// Reads a number from a JSON number or a numeric string such as `"16px"`.
pub fn lenient_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .trim()
            .trim_end_matches("px")
            .trim_end_matches("pt")
            .trim()
            .parse::<f64>()
            .ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Accepts `#RRGGBB` and `#RGB` (expanded), returning lowercase `#rrggbb`.
pub fn normalize_color(raw: &str) -> Option<String> {
    let hex = raw.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => Some(format!("#{}", hex.to_ascii_lowercase())),
        3 => {
            let expanded: String = hex
                .chars()
                .flat_map(|c| [c, c])
                .collect::<String>()
                .to_ascii_lowercase();
            Some(format!("#{}", expanded))
        }
        _ => None,
    }
}

fn normalize_rotation(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

/// Flattens a loosely typed text field. Arrays of bullets are joined by newlines.
fn text_field(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s,
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

// ─── Element style ───

/// Visual style of an element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementStyle {
    /// `#rrggbb`
    pub color: Option<String>,
    pub border_style: Option<BorderStyle>,
    pub font_size: Option<f64>,
    pub text_align: Option<TextAlign>,
    /// Style keys this backend does not interpret (e.g. `fontFamily`).
    pub extra: Map<String, Value>,
}

impl ElementStyle {
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };
        let mut extra = map.clone();
        let color = extra
            .remove("color")
            .as_ref()
            .and_then(Value::as_str)
            .and_then(normalize_color);
        let border_style = extra
            .remove("borderStyle")
            .as_ref()
            .and_then(Value::as_str)
            .and_then(BorderStyle::from_tag);
        let font_size = extra
            .remove("fontSize")
            .as_ref()
            .and_then(lenient_number)
            .filter(|size| *size > 0.0);
        let text_align = extra
            .remove("textAlign")
            .as_ref()
            .and_then(Value::as_str)
            .and_then(TextAlign::from_tag);

        Self { color, border_style, font_size, text_align, extra }
    }

    pub fn to_value(&self) -> Value {
        let mut map = self.extra.clone();
        if let Some(color) = &self.color {
            map.insert("color".into(), json!(color));
        }
        if let Some(border) = self.border_style {
            map.insert("borderStyle".into(), json!(border));
        }
        if let Some(size) = self.font_size {
            map.insert("fontSize".into(), json!(size));
        }
        if let Some(align) = self.text_align {
            map.insert("textAlign".into(), json!(align));
        }
        Value::Object(map)
    }
}

// ─── Element ───

/// What an element draws.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Shape(ShapeKind),
    Text(String),
    /// Image reference (URL or data URI).
    Image(String),
    /// Element types owned by the browser editor (charts, tables). Kept verbatim.
    Other { kind: String, content: Value },
}

impl ElementKind {
    /// The wire `type` tag.
    pub fn type_tag(&self) -> &str {
        match self {
            ElementKind::Shape(_) => "shape",
            ElementKind::Text(_) => "text",
            ElementKind::Image(_) => "image",
            ElementKind::Other { kind, .. } => kind,
        }
    }

    /// True for the shape/text/image kinds this backend knows how to generate and export.
    pub fn is_renderable(&self) -> bool {
        !matches!(self, ElementKind::Other { .. })
    }

    fn content_value(&self) -> Value {
        match self {
            ElementKind::Shape(shape) => json!(shape.as_str()),
            ElementKind::Text(text) | ElementKind::Image(text) => json!(text),
            ElementKind::Other { content, .. } => content.clone(),
        }
    }

    fn from_parts(tag: &str, content: Option<Value>) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "shape" => ElementKind::Shape(
                content
                    .as_ref()
                    .and_then(Value::as_str)
                    .and_then(ShapeKind::from_tag)
                    .unwrap_or(ShapeKind::Rectangle),
            ),
            "text" => ElementKind::Text(text_field(content)),
            "image" => ElementKind::Image(text_field(content)),
            _ => ElementKind::Other {
                kind: tag.to_string(),
                content: content.unwrap_or(Value::Null),
            },
        }
    }

    /// Kind for an element that arrived without a `type`: a recognised shape tag
    /// makes it a shape, anything else is treated as text.
    fn infer(content: Option<Value>) -> Self {
        let shape = content.as_ref().and_then(Value::as_str).and_then(ShapeKind::from_tag);
        match shape {
            Some(shape) => ElementKind::Shape(shape),
            None => ElementKind::Text(text_field(content)),
        }
    }
}

/// One visual object on a slide.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Unique within its slide. Empty until synthesized.
    pub id: String,
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees in `[0, 360)`.
    pub rotation: f64,
    pub style: ElementStyle,
    pub z_index: i64,
    pub extra: Map<String, Value>,
}

impl Element {
    /// An element with default geometry and style.
    pub fn new(id: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
            x: DEFAULT_X,
            y: DEFAULT_Y,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            rotation: 0.0,
            style: ElementStyle::default(),
            z_index: 0,
            extra: Map::new(),
        }
    }

    /// Builds an element from loosely typed JSON; `None` if the value is not an object.
    ///
    /// `position` is the element's index in its list and becomes the `zIndex`
    /// when none is given.
    pub fn from_value(value: &Value, position: usize) -> Option<Self> {
        let map = value.as_object()?;
        let mut extra = map.clone();

        let id = match extra.remove("id") {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let content = extra.remove("content");
        let kind = match extra.remove("type") {
            Some(Value::String(tag)) => ElementKind::from_parts(&tag, content),
            _ => ElementKind::infer(content),
        };

        let mut number = |key: &str| extra.remove(key).as_ref().and_then(lenient_number);
        let x = number("x").unwrap_or(DEFAULT_X);
        let y = number("y").unwrap_or(DEFAULT_Y);
        let width = number("width").unwrap_or(DEFAULT_WIDTH).max(0.0);
        let height = number("height").unwrap_or(DEFAULT_HEIGHT).max(0.0);
        let rotation = normalize_rotation(number("rotation").unwrap_or(0.0));
        let z_index = number("zIndex").map(|z| z as i64).unwrap_or(position as i64);
        let style = extra
            .remove("style")
            .map(|v| ElementStyle::from_value(&v))
            .unwrap_or_default();

        Some(Self { id, kind, x, y, width, height, rotation, style, z_index, extra })
    }

    pub fn to_value(&self) -> Value {
        let mut map = self.extra.clone();
        map.insert("id".into(), json!(self.id));
        map.insert("type".into(), json!(self.kind.type_tag()));
        map.insert("content".into(), self.kind.content_value());
        map.insert("x".into(), json!(self.x));
        map.insert("y".into(), json!(self.y));
        map.insert("width".into(), json!(self.width));
        map.insert("height".into(), json!(self.height));
        map.insert("rotation".into(), json!(self.rotation));
        map.insert("style".into(), self.style.to_value());
        map.insert("zIndex".into(), json!(self.z_index));
        Value::Object(map)
    }
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Element {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Element::from_value(&value, 0).ok_or_else(|| de::Error::custom("element must be a JSON object"))
    }
}

/// Reads an element list. A single object is wrapped into a one-element list;
/// entries that are not objects are skipped. `base` offsets the default `zIndex`.
pub fn elements_from_value(value: &Value, base: usize) -> Vec<Element> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| Element::from_value(item, base + i))
            .collect(),
        Value::Object(_) => Element::from_value(value, base).into_iter().collect(),
        _ => Vec::new(),
    }
}

/// Gives every element with an empty id one of the form
/// `elem_<slide>_<offset + position>_<stamp>`, suffixing `_<n>` when the candidate is taken
/// by `existing` or by another element in the list.
pub fn assign_missing_ids(
    elements: &mut [Element],
    slide_index: usize,
    offset: usize,
    stamp: i64,
    existing: &[Element],
) {
    let mut taken: HashSet<String> = existing
        .iter()
        .chain(elements.iter())
        .filter(|e| !e.id.is_empty())
        .map(|e| e.id.clone())
        .collect();

    for (i, element) in elements.iter_mut().enumerate() {
        if !element.id.is_empty() {
            continue;
        }
        let base = format!("elem_{}_{}_{}", slide_index, offset + i, stamp);
        let mut candidate = base.clone();
        let mut n = 1;
        while taken.contains(&candidate) {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }
        taken.insert(candidate.clone());
        element.id = candidate;
    }
}

// ─── Slide ───

/// Slide background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    #[serde(rename = "type", default = "default_background_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

fn default_background_kind() -> String {
    "solid".to_string()
}

/// One position in a deck.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slide {
    pub title: String,
    pub content: String,
    pub elements: Vec<Element>,
    pub background: Option<Background>,
    /// Slide keys this backend does not interpret (notes, layout, transitions).
    pub extra: Map<String, Value>,
}

impl Slide {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Builds a slide from loosely typed JSON; `None` if the value is not an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let mut extra = map.clone();
        let title = text_field(extra.remove("title"));
        let content = text_field(extra.remove("content"));
        let elements = extra
            .remove("elements")
            .map(|v| elements_from_value(&v, 0))
            .unwrap_or_default();
        let background = extra
            .remove("background")
            .and_then(|v| serde_json::from_value(v).ok());

        Some(Self { title, content, elements, background, extra })
    }

    pub fn to_value(&self) -> Value {
        let mut map = self.extra.clone();
        map.insert("title".into(), json!(self.title));
        map.insert("content".into(), json!(self.content));
        map.insert(
            "elements".into(),
            Value::Array(self.elements.iter().map(Element::to_value).collect()),
        );
        if let Some(background) = &self.background {
            map.insert("background".into(), json!(background));
        }
        Value::Object(map)
    }

    pub fn has_element(&self, id: &str) -> bool {
        self.elements.iter().any(|e| e.id == id)
    }

    /// Synthesizes ids for elements that have none.
    pub fn assign_missing_ids(&mut self, slide_index: usize, stamp: i64) {
        assign_missing_ids(&mut self.elements, slide_index, 0, stamp, &[]);
    }

    /// Appends elements whose id is not already on the slide. Duplicates are dropped,
    /// never overwritten. Returns how many elements were appended.
    pub fn merge_elements(&mut self, incoming: Vec<Element>) -> usize {
        let mut seen: HashSet<String> = self.elements.iter().map(|e| e.id.clone()).collect();
        let before = self.elements.len();
        for element in incoming {
            if seen.insert(element.id.clone()) {
                self.elements.push(element);
            }
        }
        self.elements.len() - before
    }
}

impl Serialize for Slide {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Slide {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Slide::from_value(&value).ok_or_else(|| de::Error::custom("slide must be a JSON object"))
    }
}

/// Partial slide carried by a suggestion.
///
/// `elements` stays raw JSON until applied, since the default `zIndex` of an
/// appended element depends on how many elements the target slide holds then.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Value>,
}
