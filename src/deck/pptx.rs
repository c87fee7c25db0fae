//! Office Open XML (`.pptx`) writer.
//!
//! Emits the smallest package PowerPoint, Keynote and LibreOffice all open:
//! one master, one "Title and Content" layout, a theme, and one slide part
//! per [`Slide`].

use super::{Slide, SlideDeck, DEFAULT_SLIDE_TITLE};
use crate::error::{Result, TubedeckError};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT: &str = "application/vnd.openxmlformats-officedocument";

// 16:9 at 13.333in x 7.5in, in EMU.
const SLIDE_CX: u64 = 12_192_000;
const SLIDE_CY: u64 = 6_858_000;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Write `deck` to `path` as a presentation.
#[instrument(skip(deck), fields(slides = deck.len()))]
pub fn write_pptx(deck: &SlideDeck, path: &Path) -> Result<()> {
    if deck.is_empty() {
        return Err(TubedeckError::Deck("cannot write an empty deck".to_string()));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, content) in package_parts(deck) {
        zip.start_file(name.as_str(), options).map_err(zip_err)?;
        zip.write_all(content.as_bytes())?;
    }
    zip.finish().map_err(zip_err)?;

    debug!("Wrote {} slides to {}", deck.len(), path.display());
    Ok(())
}

fn zip_err(e: zip::result::ZipError) -> TubedeckError {
    TubedeckError::Deck(format!("Failed to write presentation archive: {}", e))
}

/// Every part of the package, content types first.
fn package_parts(deck: &SlideDeck) -> Vec<(String, String)> {
    let n = deck.len();
    let title = deck
        .slides
        .first()
        .map(|s| s.title.as_str())
        .unwrap_or(DEFAULT_SLIDE_TITLE);
    let mut parts = vec![
        ("[Content_Types].xml".to_string(), content_types(n)),
        ("_rels/.rels".to_string(), root_rels()),
        ("docProps/app.xml".to_string(), app_props(n)),
        ("docProps/core.xml".to_string(), core_props(title)),
        ("ppt/presentation.xml".to_string(), presentation(n)),
        ("ppt/_rels/presentation.xml.rels".to_string(), presentation_rels(n)),
        ("ppt/presProps.xml".to_string(), pres_props()),
        ("ppt/viewProps.xml".to_string(), view_props()),
        ("ppt/tableStyles.xml".to_string(), table_styles()),
        ("ppt/theme/theme1.xml".to_string(), theme()),
        ("ppt/slideMasters/slideMaster1.xml".to_string(), slide_master()),
        (
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
            rels(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                ("rId2", "theme", "../theme/theme1.xml"),
            ]),
        ),
        ("ppt/slideLayouts/slideLayout1.xml".to_string(), slide_layout()),
        (
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels".to_string(),
            rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
        ),
    ];

    for (i, slide) in deck.slides.iter().enumerate() {
        let num = i + 1;
        parts.push((format!("ppt/slides/slide{}.xml", num), slide_xml(slide)));
        parts.push((
            format!("ppt/slides/_rels/slide{}.xml.rels", num),
            rels(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")]),
        ));
    }

    parts
}

/// Escape text for use in XML content and attribute values.
pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let body: String = entries
        .iter()
        .map(|(id, kind, target)| {
            format!(
                r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
                id, REL, kind, target
            )
        })
        .collect();

    format!(
        r#"{}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        XML_DECL, body
    )
}

fn content_types(slides: usize) -> String {
    let slide_overrides: String = (1..=slides)
        .map(|n| {
            format!(
                r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="{}.presentationml.slide+xml"/>"#,
                n, CT
            )
        })
        .collect();

    format!(
        concat!(
            "{decl}",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/ppt/presentation.xml" ContentType="{ct}.presentationml.presentation.main+xml"/>"#,
            r#"<Override PartName="/ppt/presProps.xml" ContentType="{ct}.presentationml.presProps+xml"/>"#,
            r#"<Override PartName="/ppt/viewProps.xml" ContentType="{ct}.presentationml.viewProps+xml"/>"#,
            r#"<Override PartName="/ppt/tableStyles.xml" ContentType="{ct}.presentationml.tableStyles+xml"/>"#,
            r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="{ct}.presentationml.slideMaster+xml"/>"#,
            r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="{ct}.presentationml.slideLayout+xml"/>"#,
            r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="{ct}.theme+xml"/>"#,
            r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
            r#"<Override PartName="/docProps/app.xml" ContentType="{ct}.extended-properties+xml"/>"#,
            "{slides}",
            "</Types>"
        ),
        decl = XML_DECL,
        ct = CT,
        slides = slide_overrides
    )
}

fn root_rels() -> String {
    format!(
        concat!(
            "{}",
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="{}/officeDocument" Target="ppt/presentation.xml"/>"#,
            r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
            r#"<Relationship Id="rId3" Type="{}/extended-properties" Target="docProps/app.xml"/>"#,
            "</Relationships>"
        ),
        XML_DECL, REL, REL
    )
}

fn app_props(slides: usize) -> String {
    format!(
        concat!(
            "{}",
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
            "<Application>tubedeck</Application>",
            "<Slides>{}</Slides>",
            "</Properties>"
        ),
        XML_DECL, slides
    )
}

fn core_props(title: &str) -> String {
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        concat!(
            "{decl}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{title}</dc:title>",
            "<dc:creator>tubedeck</dc:creator>",
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{now}</dcterms:created>"#,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{now}</dcterms:modified>"#,
            "</cp:coreProperties>"
        ),
        decl = XML_DECL,
        title = escape_xml(title),
        now = now
    )
}

fn presentation(slides: usize) -> String {
    // rId1 = master, rId2 = theme, rId3.. = slides
    let slide_ids: String = (0..slides)
        .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 3))
        .collect();

    format!(
        concat!(
            "{decl}",
            r#"<p:presentation xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}" saveSubsetFonts="1">"#,
            r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
            "<p:sldIdLst>{ids}</p:sldIdLst>",
            r#"<p:sldSz cx="{cx}" cy="{cy}"/>"#,
            r#"<p:notesSz cx="6858000" cy="9144000"/>"#,
            "</p:presentation>"
        ),
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        ids = slide_ids,
        cx = SLIDE_CX,
        cy = SLIDE_CY
    )
}

fn presentation_rels(slides: usize) -> String {
    let mut entries: Vec<(String, &str, String)> = vec![
        (
            "rId1".to_string(),
            "slideMaster",
            "slideMasters/slideMaster1.xml".to_string(),
        ),
        ("rId2".to_string(), "theme", "theme/theme1.xml".to_string()),
    ];
    for i in 0..slides {
        entries.push((format!("rId{}", i + 3), "slide", format!("slides/slide{}.xml", i + 1)));
    }
    let base = slides + 3;
    entries.push((format!("rId{}", base), "presProps", "presProps.xml".to_string()));
    entries.push((format!("rId{}", base + 1), "viewProps", "viewProps.xml".to_string()));
    entries.push((format!("rId{}", base + 2), "tableStyles", "tableStyles.xml".to_string()));

    let borrowed: Vec<(&str, &str, &str)> = entries
        .iter()
        .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
        .collect();
    rels(&borrowed)
}

fn pres_props() -> String {
    format!(
        r#"{}<p:presentationPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"/>"#,
        XML_DECL, NS_A, NS_R, NS_P
    )
}

fn view_props() -> String {
    format!(
        concat!(
            "{}",
            r#"<p:viewPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
            r#"<p:gridSpacing cx="76200" cy="76200"/>"#,
            "</p:viewPr>"
        ),
        XML_DECL, NS_A, NS_R, NS_P
    )
}

fn table_styles() -> String {
    format!(
        r#"{}<a:tblStyleLst xmlns:a="{}" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#,
        XML_DECL, NS_A
    )
}

/// Placeholder shape with an explicit position.
fn placeholder(id: u32, name: &str, ph: &str, frame: Frame, body: &str) -> String {
    let (x, y, cx, cy) = frame;
    format!(
        concat!(
            "<p:sp>",
            r#"<p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#,
            "<p:nvPr>{ph}</p:nvPr></p:nvSpPr>",
            r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm></p:spPr>"#,
            "{body}",
            "</p:sp>"
        ),
        id = id,
        name = name,
        ph = ph,
        x = x,
        y = y,
        cx = cx,
        cy = cy,
        body = body
    )
}

const EMPTY_TX_BODY: &str = "<p:txBody><a:bodyPr/><a:lstStyle/><a:p/></p:txBody>";

const GROUP_PROPS: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

/// Offset and extent (x, y, cx, cy) in EMU.
type Frame = (u64, u64, u64, u64);

const TITLE_FRAME: Frame = (838_200, 365_125, 10_515_600, 1_325_563);
const BODY_FRAME: Frame = (838_200, 1_825_625, 10_515_600, 4_351_338);

fn slide_master() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<p:sldMaster xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">"#,
            "<p:cSld>",
            r#"<p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
            "<p:spTree>{group}{title}{body}</p:spTree>",
            "</p:cSld>",
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
            "<p:txStyles>",
            r#"<p:titleStyle><a:lvl1pPr algn="l"><a:defRPr sz="4400"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mj-lt"/></a:defRPr></a:lvl1pPr></p:titleStyle>"#,
            r#"<p:bodyStyle><a:lvl1pPr marL="0" indent="0"><a:buNone/><a:defRPr sz="2800"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr></p:bodyStyle>"#,
            r#"<p:otherStyle><a:lvl1pPr><a:defRPr sz="1800"/></a:lvl1pPr></p:otherStyle>"#,
            "</p:txStyles>",
            "</p:sldMaster>"
        ),
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        group = GROUP_PROPS,
        title = placeholder(2, "Title Placeholder 1", r#"<p:ph type="title"/>"#, TITLE_FRAME, EMPTY_TX_BODY),
        body = placeholder(3, "Text Placeholder 2", r#"<p:ph type="body" idx="1"/>"#, BODY_FRAME, EMPTY_TX_BODY),
    )
}

fn slide_layout() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<p:sldLayout xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}" type="obj" preserve="1">"#,
            r#"<p:cSld name="Title and Content">"#,
            "<p:spTree>{group}{title}{body}</p:spTree>",
            "</p:cSld>",
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>",
            "</p:sldLayout>"
        ),
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        group = GROUP_PROPS,
        title = placeholder(2, "Title 1", r#"<p:ph type="title"/>"#, TITLE_FRAME, EMPTY_TX_BODY),
        body = placeholder(3, "Content Placeholder 2", r#"<p:ph idx="1"/>"#, BODY_FRAME, EMPTY_TX_BODY),
    )
}

fn text_body(text: &str) -> String {
    let paragraphs: String = text
        .lines()
        .map(|line| {
            format!(
                r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
                escape_xml(line)
            )
        })
        .collect();

    if paragraphs.is_empty() {
        return EMPTY_TX_BODY.to_string();
    }
    format!("<p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody>", paragraphs)
}

fn slide_xml(slide: &Slide) -> String {
    format!(
        concat!(
            "{decl}",
            r#"<p:sld xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">"#,
            "<p:cSld><p:spTree>{group}{title}{body}</p:spTree></p:cSld>",
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>",
            "</p:sld>"
        ),
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        group = GROUP_PROPS,
        title = placeholder(2, "Title 1", r#"<p:ph type="title"/>"#, TITLE_FRAME, &text_body(&slide.title)),
        body = placeholder(3, "Content Placeholder 2", r#"<p:ph idx="1"/>"#, BODY_FRAME, &text_body(&slide.body)),
    )
}

fn theme() -> String {
    let colors = [
        ("dk1", r#"<a:sysClr val="windowText" lastClr="000000"/>"#),
        ("lt1", r#"<a:sysClr val="window" lastClr="FFFFFF"/>"#),
        ("dk2", r#"<a:srgbClr val="1E1E2E"/>"#),
        ("lt2", r#"<a:srgbClr val="E7E6E6"/>"#),
        ("accent1", r#"<a:srgbClr val="4472C4"/>"#),
        ("accent2", r#"<a:srgbClr val="ED7D31"/>"#),
        ("accent3", r#"<a:srgbClr val="A5A5A5"/>"#),
        ("accent4", r#"<a:srgbClr val="FFC000"/>"#),
        ("accent5", r#"<a:srgbClr val="5B9BD5"/>"#),
        ("accent6", r#"<a:srgbClr val="70AD47"/>"#),
        ("hlink", r#"<a:srgbClr val="0563C1"/>"#),
        ("folHlink", r#"<a:srgbClr val="954F72"/>"#),
    ];
    let color_scheme: String = colors
        .iter()
        .map(|(name, value)| format!("<a:{name}>{value}</a:{name}>", name = name, value = value))
        .collect();

    let solid = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let line = r#"<a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#;

    format!(
        concat!(
            "{decl}",
            r#"<a:theme xmlns:a="{a}" name="tubedeck">"#,
            "<a:themeElements>",
            r#"<a:clrScheme name="tubedeck">{colors}</a:clrScheme>"#,
            r#"<a:fontScheme name="tubedeck">"#,
            r#"<a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
            r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
            "</a:fontScheme>",
            r#"<a:fmtScheme name="tubedeck">"#,
            "<a:fillStyleLst>{s}{s}{s}</a:fillStyleLst>",
            "<a:lnStyleLst>{l}{l}{l}</a:lnStyleLst>",
            "<a:effectStyleLst>",
            "<a:effectStyle><a:effectLst/></a:effectStyle>",
            "<a:effectStyle><a:effectLst/></a:effectStyle>",
            "<a:effectStyle><a:effectLst/></a:effectStyle>",
            "</a:effectStyleLst>",
            "<a:bgFillStyleLst>{s}{s}{s}</a:bgFillStyleLst>",
            "</a:fmtScheme>",
            "</a:themeElements>",
            "</a:theme>"
        ),
        decl = XML_DECL,
        a = NS_A,
        colors = color_scheme,
        s = solid,
        l = line
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn deck(bodies: &[&str]) -> SlideDeck {
        SlideDeck {
            slides: bodies
                .iter()
                .map(|b| Slide {
                    title: "Generated Content".to_string(),
                    body: b.to_string(),
                })
                .collect(),
        }
    }

    fn read_part(archive: &mut zip::ZipArchive<File>, name: &str) -> String {
        let mut content = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"a < b & "c" > 'd'"#), "a &lt; b &amp; &quot;c&quot; &gt; &apos;d&apos;");
        assert_eq!(escape_xml("bell\u{7}"), "bell");
    }

    #[test]
    fn test_archive_has_one_part_per_slide() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("presentation.pptx");
        write_pptx(&deck(&["Nodes hold data", "Edges link nodes", "Paths follow edges"]), &path)
            .unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();

        for required in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
        ] {
            assert!(names.iter().any(|n| n == required), "missing {}", required);
        }

        let slides = names
            .iter()
            .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
            .count();
        assert_eq!(slides, 3);

        let types = read_part(&mut archive, "[Content_Types].xml");
        assert!(types.contains("/ppt/slides/slide3.xml"));
        assert!(!types.contains("/ppt/slides/slide4.xml"));

        let presentation = read_part(&mut archive, "ppt/presentation.xml");
        assert_eq!(presentation.matches("<p:sldId ").count(), 3);

        let slide = read_part(&mut archive, "ppt/slides/slide2.xml");
        assert!(slide.contains("<a:t>Generated Content</a:t>"));
        assert!(slide.contains("<a:t>Edges link nodes</a:t>"));
    }

    #[test]
    fn test_slide_text_is_escaped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deck.pptx");
        write_pptx(&deck(&["A < B & C"]), &path).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let slide = read_part(&mut archive, "ppt/slides/slide1.xml");
        assert!(slide.contains("A &lt; B &amp; C"));
    }

    #[test]
    fn test_presentation_rels_target_every_slide() {
        let rels = presentation_rels(2);
        assert!(rels.contains(r#"Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml""#));
        assert!(rels.contains(r#"Target="slides/slide2.xml""#));
        assert!(rels.contains(r#"Id="rId5""#));
    }

    #[test]
    fn test_blank_title_keeps_a_paragraph() {
        assert_eq!(text_body(""), EMPTY_TX_BODY);
        assert_eq!(text_body("One\nTwo").matches("<a:p>").count(), 2);

        let slide = slide_xml(&Slide {
            title: String::new(),
            body: "Body".to_string(),
        });
        let title_start = slide.find("Title 1").unwrap();
        let title_end = slide[title_start..].find("</p:sp>").unwrap() + title_start;
        assert!(slide[title_start..title_end].contains("<a:p/>"));
    }

    #[test]
    fn test_core_props_carry_deck_title() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deck.pptx");
        let mut graphs = deck(&["Nodes hold data"]);
        graphs.slides[0].title = "Graphs & Trees".to_string();
        write_pptx(&graphs, &path).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let core = read_part(&mut archive, "docProps/core.xml");
        assert!(core.contains("<dc:title>Graphs &amp; Trees</dc:title>"));
        assert!(!core.contains("Generated Content"));
    }

    #[test]
    fn test_empty_deck_fails() {
        let dir = TempDir::new().unwrap();
        let err = write_pptx(&SlideDeck::default(), &dir.path().join("x.pptx")).unwrap_err();
        assert!(matches!(err, TubedeckError::Deck(_)));
    }
}
