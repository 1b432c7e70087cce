//! Minimal PresentationML package writer.
//!
//! Emits the smallest part set PowerPoint and LibreOffice open without repair:
//! one master, one blank layout, one theme, and a slide part per rendered slide.
//! Geometry is already in EMU when it reaches this module.

use std::fmt::Write as _;
use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::types::errors::ExportError;

/// 16:9 slide, 13.333in x 7.5in.
pub const SLIDE_WIDTH_EMU: i64 = 12_192_000;
pub const SLIDE_HEIGHT_EMU: i64 = 6_858_000;

const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Position and size in EMU; rotation in 1/60000 degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
    pub rotation: i64,
}

/// One text run per paragraph; the text is split on newlines.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBody {
    pub text: String,
    /// Hundredths of a point.
    pub size: Option<u32>,
    /// `l`, `ctr` or `r`.
    pub align: Option<&'static str>,
    /// `RRGGBB`
    pub color: Option<String>,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSpec {
    pub name: String,
    pub frame: Frame,
    /// DrawingML preset geometry (`rect`, `ellipse`, ...).
    pub preset: &'static str,
    /// `RRGGBB`; `None` means no fill.
    pub fill: Option<String>,
    /// `RRGGBB`; `None` means no outline.
    pub outline: Option<String>,
    /// DrawingML preset dash (`dash`, `sysDot`); solid when `None`.
    pub dash: Option<&'static str>,
    pub text: Option<TextBody>,
    pub text_box: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlideSpec {
    /// `RRGGBB`
    pub background: Option<String>,
    pub shapes: Vec<ShapeSpec>,
}

/// Writes the package and returns the zip bytes.
pub fn write_package(title: &str, slides: &[SlideSpec]) -> Result<Vec<u8>, ExportError> {
    let mut parts: Vec<(String, String)> = vec![
        ("[Content_Types].xml".to_string(), content_types_xml(slides.len())?),
        ("_rels/.rels".to_string(), root_rels_xml()),
        ("docProps/core.xml".to_string(), core_props_xml(title)),
        ("ppt/presentation.xml".to_string(), presentation_xml(slides.len())?),
        ("ppt/_rels/presentation.xml.rels".to_string(), presentation_rels_xml(slides.len())?),
        ("ppt/slideMasters/slideMaster1.xml".to_string(), slide_master_xml()),
        (
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
            relationships_xml(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                ("rId2", "theme", "../theme/theme1.xml"),
            ]),
        ),
        ("ppt/slideLayouts/slideLayout1.xml".to_string(), slide_layout_xml()),
        (
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels".to_string(),
            relationships_xml(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
        ),
        ("ppt/theme/theme1.xml".to_string(), theme_xml()),
    ];

    for (index, slide) in slides.iter().enumerate() {
        let number = index + 1;
        parts.push((format!("ppt/slides/slide{}.xml", number), slide_xml(slide)?));
        parts.push((
            format!("ppt/slides/_rels/slide{}.xml.rels", number),
            relationships_xml(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")]),
        ));
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (path, content) in &parts {
        writer.start_file(path.as_str(), options)?;
        writer.write_all(content.as_bytes())?;
    }
    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

fn content_types_xml(slide_count: usize) -> Result<String, ExportError> {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#);
    xml.push_str(r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#);
    for number in 1..=slide_count {
        write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            number
        )?;
    }
    xml.push_str("</Types>");
    Ok(xml)
}

fn root_rels_xml() -> String {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    xml.push_str(&format!(
        r#"<Relationship Id="rId1" Type="{}/officeDocument" Target="ppt/presentation.xml"/>"#,
        REL_BASE
    ));
    xml.push_str(r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#);
    xml.push_str("</Relationships>");
    xml
}

fn core_props_xml(title: &str) -> String {
    format!(
        concat!(
            r#"{}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/">"#,
            r#"<dc:title>{}</dc:title><dc:creator>Slidesmith</dc:creator></cp:coreProperties>"#
        ),
        XML_DECL,
        escape(title)
    )
}

/// `(id, type suffix, target)` triples.
fn relationships_xml(rels: &[(&str, &str, &str)]) -> String {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    for (id, kind, target) in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
            id, REL_BASE, kind, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// Relationship ids: `rId1` master, `rId2..` slides, then the theme.
fn presentation_rels_xml(slide_count: usize) -> Result<String, ExportError> {
    let slide_targets: Vec<(String, String)> = (1..=slide_count)
        .map(|n| (format!("rId{}", n + 1), format!("slides/slide{}.xml", n)))
        .collect();
    let theme_id = format!("rId{}", slide_count + 2);

    let mut rels: Vec<(&str, &str, &str)> = vec![("rId1", "slideMaster", "slideMasters/slideMaster1.xml")];
    for (id, target) in &slide_targets {
        rels.push((id.as_str(), "slide", target.as_str()));
    }
    rels.push((theme_id.as_str(), "theme", "theme/theme1.xml"));
    Ok(relationships_xml(&rels))
}

fn presentation_xml(slide_count: usize) -> Result<String, ExportError> {
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECL);
    write!(
        xml,
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
        NS_A, NS_R, NS_P
    )?;
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
    if slide_count > 0 {
        xml.push_str("<p:sldIdLst>");
        for index in 0..slide_count {
            write!(xml, r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + index, index + 2)?;
        }
        xml.push_str("</p:sldIdLst>");
    }
    write!(xml, r#"<p:sldSz cx="{}" cy="{}"/>"#, SLIDE_WIDTH_EMU, SLIDE_HEIGHT_EMU)?;
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str("</p:presentation>");
    Ok(xml)
}

const EMPTY_SP_TREE: &str = concat!(
    "<p:spTree><p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>",
    "<p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/>",
    "<a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr></p:spTree>"
);

fn slide_master_xml() -> String {
    format!(
        concat!(
            "{}<p:sldMaster xmlns:a=\"{}\" xmlns:r=\"{}\" xmlns:p=\"{}\">",
            "<p:cSld><p:bg><p:bgRef idx=\"1001\"><a:schemeClr val=\"bg1\"/></p:bgRef></p:bg>{}</p:cSld>",
            "<p:clrMap bg1=\"lt1\" tx1=\"dk1\" bg2=\"lt2\" tx2=\"dk2\" accent1=\"accent1\" accent2=\"accent2\" ",
            "accent3=\"accent3\" accent4=\"accent4\" accent5=\"accent5\" accent6=\"accent6\" hlink=\"hlink\" folHlink=\"folHlink\"/>",
            "<p:sldLayoutIdLst><p:sldLayoutId id=\"2147483649\" r:id=\"rId1\"/></p:sldLayoutIdLst>",
            "</p:sldMaster>"
        ),
        XML_DECL, NS_A, NS_R, NS_P, EMPTY_SP_TREE
    )
}

fn slide_layout_xml() -> String {
    format!(
        concat!(
            "{}<p:sldLayout xmlns:a=\"{}\" xmlns:r=\"{}\" xmlns:p=\"{}\" type=\"blank\" preserve=\"1\">",
            "<p:cSld name=\"Blank\">{}</p:cSld>",
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"
        ),
        XML_DECL, NS_A, NS_R, NS_P, EMPTY_SP_TREE
    )
}

fn theme_xml() -> String {
    let colors = [
        ("dk1", "000000"),
        ("lt1", "FFFFFF"),
        ("dk2", "44546A"),
        ("lt2", "E7E6E6"),
        ("accent1", "3498DB"),
        ("accent2", "2ECC71"),
        ("accent3", "E74C3C"),
        ("accent4", "F1C40F"),
        ("accent5", "9B59B6"),
        ("accent6", "E67E22"),
        ("hlink", "0563C1"),
        ("folHlink", "954F72"),
    ];
    let mut scheme = String::new();
    for (name, value) in colors {
        scheme.push_str(&format!("<a:{0}><a:srgbClr val=\"{1}\"/></a:{0}>", name, value));
    }
    let fill = "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>";
    let line = "<a:ln w=\"9525\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>";
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";

    format!(
        concat!(
            "{decl}<a:theme xmlns:a=\"{ns}\" name=\"Slidesmith\"><a:themeElements>",
            "<a:clrScheme name=\"Slidesmith\">{scheme}</a:clrScheme>",
            "<a:fontScheme name=\"Slidesmith\">",
            "<a:majorFont><a:latin typeface=\"Calibri\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:majorFont>",
            "<a:minorFont><a:latin typeface=\"Calibri\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:minorFont>",
            "</a:fontScheme>",
            "<a:fmtScheme name=\"Slidesmith\">",
            "<a:fillStyleLst>{fill}{fill}{fill}</a:fillStyleLst>",
            "<a:lnStyleLst>{line}{line}{line}</a:lnStyleLst>",
            "<a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst>",
            "<a:bgFillStyleLst>{fill}{fill}{fill}</a:bgFillStyleLst>",
            "</a:fmtScheme></a:themeElements></a:theme>"
        ),
        decl = XML_DECL,
        ns = NS_A,
        scheme = scheme,
        fill = fill,
        line = line,
        effect = effect
    )
}

fn slide_xml(slide: &SlideSpec) -> Result<String, ExportError> {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECL);
    write!(xml, r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#, NS_A, NS_R, NS_P)?;
    xml.push_str("<p:cSld>");
    if let Some(color) = &slide.background {
        write!(
            xml,
            r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
            color
        )?;
    }
    xml.push_str("<p:spTree>");
    xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
    xml.push_str(r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);
    for (index, shape) in slide.shapes.iter().enumerate() {
        // Shape ids start at 2; 1 is the group.
        shape_xml(&mut xml, index + 2, shape)?;
    }
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");
    Ok(xml)
}

fn shape_xml(xml: &mut String, id: usize, shape: &ShapeSpec) -> Result<(), ExportError> {
    xml.push_str("<p:sp><p:nvSpPr>");
    write!(xml, r#"<p:cNvPr id="{}" name="{}"/>"#, id, escape(shape.name.as_str()))?;
    xml.push_str(if shape.text_box { r#"<p:cNvSpPr txBox="1"/>"# } else { "<p:cNvSpPr/>" });
    xml.push_str("<p:nvPr/></p:nvSpPr>");

    let frame = shape.frame;
    xml.push_str("<p:spPr>");
    if frame.rotation != 0 {
        write!(xml, r#"<a:xfrm rot="{}">"#, frame.rotation)?;
    } else {
        xml.push_str("<a:xfrm>");
    }
    write!(xml, r#"<a:off x="{}" y="{}"/>"#, frame.x, frame.y)?;
    write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, frame.cx, frame.cy)?;
    xml.push_str("</a:xfrm>");
    write!(xml, r#"<a:prstGeom prst="{}"><a:avLst/></a:prstGeom>"#, shape.preset)?;

    match &shape.fill {
        Some(color) => write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color)?,
        None => xml.push_str("<a:noFill/>"),
    }
    match &shape.outline {
        Some(color) => {
            write!(xml, r#"<a:ln w="12700"><a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color)?;
            if let Some(dash) = shape.dash {
                write!(xml, r#"<a:prstDash val="{}"/>"#, dash)?;
            }
            xml.push_str("</a:ln>");
        }
        None => xml.push_str("<a:ln><a:noFill/></a:ln>"),
    }
    xml.push_str("</p:spPr>");

    if let Some(body) = &shape.text {
        text_body_xml(xml, body)?;
    }
    xml.push_str("</p:sp>");
    Ok(())
}

fn text_body_xml(xml: &mut String, body: &TextBody) -> Result<(), ExportError> {
    xml.push_str(r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#);
    let lines: Vec<&str> = body.text.lines().collect();
    if lines.is_empty() {
        xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
    }
    for line in lines {
        xml.push_str("<a:p>");
        if let Some(align) = body.align {
            write!(xml, r#"<a:pPr algn="{}"/>"#, align)?;
        }
        xml.push_str(r#"<a:r><a:rPr lang="en-US" dirty="0""#);
        if let Some(size) = body.size {
            write!(xml, r#" sz="{}""#, size)?;
        }
        if body.bold {
            xml.push_str(r#" b="1""#);
        }
        xml.push('>');
        if let Some(color) = &body.color {
            write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color)?;
        }
        xml.push_str("</a:rPr>");
        write!(xml, "<a:t>{}</a:t>", escape(line))?;
        xml.push_str("</a:r></a:p>");
    }
    xml.push_str("</p:txBody>");
    Ok(())
}
