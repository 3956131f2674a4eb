use image::{DynamicImage, ImageFormat, RgbImage};
use pptx_templater::{
    Error, Event, FillConfig, FillJob, ImageAsset, ImageAssets, KeyOrder, TemplateRequest, Templater, TextTokens,
};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

fn slide_xml(shapes: &str) -> String {
    format!(
        r#"{DECLARATION}<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
    )
}

fn para(runs: &[&str]) -> String {
    let runs: String = runs
        .iter()
        .map(|text| format!(r#"<a:r><a:rPr lang="en-US"/><a:t>{text}</a:t></a:r>"#))
        .collect();
    format!("<a:p>{runs}</a:p>")
}

fn shape(id: u32, (x, y, cx, cy): (i64, i64, i64, i64), paragraphs: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Shape {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#
    )
}

fn table(id: u32, (x, y): (i64, i64), widths: &[i64], row_height: i64, cells: &[&str]) -> String {
    let grid: String = widths.iter().map(|w| format!(r#"<a:gridCol w="{w}"/>"#)).collect();
    let cells: String = cells
        .iter()
        .map(|text| format!(r#"<a:tc><a:txBody><a:bodyPr/><a:lstStyle/>{}</a:txBody><a:tcPr/></a:tc>"#, para(&[text])))
        .collect();
    let cx: i64 = widths.iter().sum();
    format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{id}" name="Table {id}"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{row_height}"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblPr/><a:tblGrid>{grid}</a:tblGrid><a:tr h="{row_height}">{cells}</a:tr></a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#
    )
}

fn package(slides: &[String]) -> Vec<u8> {
    package_with_parts(slides, &[])
}

fn package_with_parts(slides: &[String], parts: &[(&str, String)]) -> Vec<u8> {
    let overrides: String = (1..=slides.len())
        .map(|n| {
            format!(
                r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
            )
        })
        .collect();
    let content_types = format!(
        r#"{DECLARATION}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>{overrides}</Types>"#
    );

    let ids: String = (1..=slides.len())
        .map(|n| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n + 1))
        .collect();
    let presentation = format!(
        r#"{DECLARATION}<p:presentation xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldIdLst>{ids}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#
    );
    let slide_rels: String = (1..=slides.len())
        .map(|n| {
            format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{n}.xml"/>"#,
                n + 1
            )
        })
        .collect();
    let presentation_rels = format!(
        r#"{DECLARATION}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{slide_rels}</Relationships>"#
    );
    let layout_rels = format!(
        r#"{DECLARATION}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/></Relationships>"#
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let mut add = |name: &str, content: &str| {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    };
    add("[Content_Types].xml", &content_types);
    add("ppt/presentation.xml", &presentation);
    add("ppt/_rels/presentation.xml.rels", &presentation_rels);
    for (i, slide) in slides.iter().enumerate() {
        add(&format!("ppt/slides/slide{}.xml", i + 1), slide);
        add(&format!("ppt/slides/_rels/slide{}.xml.rels", i + 1), &layout_rels);
    }
    for (name, content) in parts {
        add(name, content);
    }
    writer.finish().unwrap().into_inner()
}

/// A slide layout (`sldLayout`) or master (`sldMaster`) part holding `shapes`.
fn layout_xml(root: &str, shapes: &str) -> String {
    format!(
        r#"{DECLARATION}<p:{root} xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{shapes}</p:spTree></p:cSld></p:{root}>"#
    )
}

/// A placeholder shape; `geometry` is the content of `<p:spPr>`, empty when inherited.
fn placeholder(id: u32, ph: &str, geometry: &str, paragraphs: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Placeholder {id}"/><p:cNvSpPr/><p:nvPr>{ph}</p:nvPr></p:nvSpPr><p:spPr>{geometry}</p:spPr><p:txBody><a:bodyPr/><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#
    )
}

fn xfrm((x, y, cx, cy): (i64, i64, i64, i64)) -> String {
    format!(r#"<a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#)
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn read_part(package: &[u8], name: &str) -> Option<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(package)).unwrap();
    let mut file = archive.by_name(name).ok()?;
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    Some(content)
}

fn has_part(package: &[u8], name: &str) -> bool {
    let mut archive = zip::ZipArchive::new(Cursor::new(package)).unwrap();
    let found = archive.by_name(name).is_ok();
    found
}

fn tokens(pairs: &[(&str, &str)]) -> TextTokens {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn assets(pairs: &[(&str, &str, Vec<u8>)]) -> ImageAssets {
    pairs
        .iter()
        .map(|(key, filename, data)| (key.to_string(), ImageAsset::new(Some(filename.to_string()), data.clone())))
        .collect()
}

fn templater() -> Templater {
    Templater::new(FillConfig::default())
}

#[test]
fn test_text_token_is_replaced() {
    let template = package(&[slide_xml(&shape(2, (0, 0, 100, 100), &para(&["Hello {name}!"])))]);

    let filled = templater()
        .fill_bytes(&template, &tokens(&[("name", "Ann")]), &ImageAssets::new())
        .unwrap();

    let slide = read_part(&filled.bytes, "ppt/slides/slide1.xml").unwrap();
    assert!(slide.contains("<a:t>Hello Ann!</a:t>"));
    assert!(!slide.contains("{name}"));
    assert_eq!(filled.report.slides, 1);
    assert_eq!(filled.report.paragraphs_rewritten, 1);
}

#[test]
fn test_split_token_keeps_first_run_formatting() {
    let paragraph = r#"<a:p><a:r><a:rPr lang="en-US" b="1"/><a:t>Dear {na</a:t></a:r><a:r><a:rPr lang="en-US" i="1"/><a:t>me},</a:t></a:r></a:p>"#;
    let template = package(&[slide_xml(&shape(2, (0, 0, 100, 100), paragraph))]);

    let filled = templater()
        .fill_bytes(&template, &tokens(&[("name", "Ann")]), &ImageAssets::new())
        .unwrap();

    let slide = read_part(&filled.bytes, "ppt/slides/slide1.xml").unwrap();
    assert!(slide.contains(r#"<a:r><a:rPr lang="en-US" b="1"/><a:t>Dear Ann,</a:t></a:r>"#));
    assert!(slide.contains(r#"<a:r><a:rPr lang="en-US" i="1"/><a:t/></a:r>"#));
}

#[test]
fn test_image_with_exact_fit() {
    let template = package(&[slide_xml(&shape(2, (10, 10, 100, 50), &para(&["{IMAGE:logo}"])))]);

    let filled = templater()
        .fill_bytes(&template, &TextTokens::new(), &assets(&[("logo", "logo.png", png(400, 200))]))
        .unwrap();

    let slide = read_part(&filled.bytes, "ppt/slides/slide1.xml").unwrap();
    assert!(!slide.contains("{IMAGE:logo}"));
    assert!(!slide.contains(r#"name="Shape 2""#));
    assert!(slide.contains(r#"<p:cNvPr id="3" name="Picture 3" descr="logo"/>"#));
    assert!(slide.contains(r#"<a:blip r:embed="rId2"/>"#));
    assert!(slide.contains(r#"<a:off x="10" y="10"/><a:ext cx="100" cy="50"/>"#));

    let rels = read_part(&filled.bytes, "ppt/slides/_rels/slide1.xml.rels").unwrap();
    assert!(rels.contains(r#"Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png""#));
    assert!(rels.contains(r#"Id="rId1""#));

    let types = read_part(&filled.bytes, "[Content_Types].xml").unwrap();
    assert!(types.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));

    let mut archive = zip::ZipArchive::new(Cursor::new(&filled.bytes)).unwrap();
    let mut media = Vec::new();
    archive.by_name("ppt/media/image1.png").unwrap().read_to_end(&mut media).unwrap();
    assert_eq!(media, png(400, 200));

    assert_eq!(filled.report.images_inserted, 1);
    assert_eq!(filled.report.shapes_removed, 1);
}

#[test]
fn test_square_image_is_centered() {
    let template = package(&[slide_xml(&shape(2, (10, 10, 100, 50), &para(&["{IMAGE:logo}"])))]);

    let filled = templater()
        .fill_bytes(&template, &TextTokens::new(), &assets(&[("logo", "logo.png", png(100, 100))]))
        .unwrap();

    let slide = read_part(&filled.bytes, "ppt/slides/slide1.xml").unwrap();
    assert!(slide.contains(r#"<a:off x="35" y="10"/><a:ext cx="50" cy="50"/>"#));
}

#[test]
fn test_out_of_range_mapping_leaves_placeholder() {
    let template = package(&[slide_xml(&shape(2, (10, 10, 100, 50), &para(&["{IMAGE:logo}"])))]);
    let request = TemplateRequest::from_json(r#"{"data": {}, "imageMapping": {"logo": 4}}"#).unwrap();
    let resolved = request
        .resolve(vec![ImageAsset::new(Some("logo.png".into()), png(10, 10))])
        .unwrap();

    let filled = templater().fill_request(&template, &resolved).unwrap();

    let slide = read_part(&filled.bytes, "ppt/slides/slide1.xml").unwrap();
    assert!(slide.contains("<a:t>{IMAGE:logo}</a:t>"));
    assert!(!has_part(&filled.bytes, "ppt/media/image1.png"));
    assert_eq!(filled.report.images_inserted, 0);
    assert!(filled
        .report
        .skipped()
        .any(|d| d.slide.is_none() && matches!(&d.event, Event::UnmatchedIndex { key, index: 4, .. } if key == "logo")));
}

#[test]
fn test_table_cell_placeholder() {
    let frame = table(5, (1000, 2000), &[100, 80], 40, &["Signed", "{IMAGE:sig}"]);
    let template = package(&[slide_xml(&frame)]);

    let filled = templater()
        .fill_bytes(&template, &TextTokens::new(), &assets(&[("sig", "sig.jpg", png(80, 40))]))
        .unwrap();

    let slide = read_part(&filled.bytes, "ppt/slides/slide1.xml").unwrap();
    assert!(!slide.contains("{IMAGE:sig}"));
    assert!(slide.contains("<a:t>Signed</a:t>"));
    assert!(slide.contains(r#"name="Table 5""#));
    assert!(slide.contains(r#"descr="sig""#));
    assert!(slide.contains(r#"<a:off x="1100" y="2000"/><a:ext cx="80" cy="40"/>"#));
    assert_eq!(filled.report.shapes_removed, 0);

    // extension follows the filename, not the bytes
    assert!(has_part(&filled.bytes, "ppt/media/image1.jpeg"));
    let types = read_part(&filled.bytes, "[Content_Types].xml").unwrap();
    assert!(types.contains(r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#));
}

#[test]
fn test_grouped_placeholder_uses_slide_coordinates() {
    let child = shape(3, (10, 10, 40, 20), &para(&["{IMAGE:logo}"]));
    let group = format!(
        r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="2" name="Group 2"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="1000" y="1000"/><a:ext cx="200" cy="200"/><a:chOff x="0" y="0"/><a:chExt cx="100" cy="100"/></a:xfrm></p:grpSpPr>{child}</p:grpSp>"#
    );
    let template = package(&[slide_xml(&group)]);

    let filled = templater()
        .fill_bytes(&template, &TextTokens::new(), &assets(&[("logo", "logo.png", png(200, 100))]))
        .unwrap();

    let slide = read_part(&filled.bytes, "ppt/slides/slide1.xml").unwrap();
    assert!(slide.contains(r#"name="Group 2""#));
    assert!(!slide.contains(r#"name="Shape 3""#));
    assert!(slide.contains(r#"<a:off x="1020" y="1020"/><a:ext cx="80" cy="40"/>"#));
}

#[test]
fn test_second_fill_changes_nothing() {
    let shapes = [
        shape(2, (0, 0, 100, 100), &para(&["Hello {name}!"])),
        shape(3, (10, 10, 100, 50), &para(&["{IMAGE:logo}"])),
    ]
    .concat();
    let template = package(&[slide_xml(&shapes)]);
    let tokens = tokens(&[("name", "Ann")]);
    let assets = assets(&[("logo", "logo.png", png(4, 2))]);

    let first = templater().fill_bytes(&template, &tokens, &assets).unwrap();
    let second = templater().fill_bytes(&first.bytes, &tokens, &assets).unwrap();

    assert_eq!(second.report.paragraphs_rewritten, 0);
    assert_eq!(second.report.images_inserted, 0);
    assert_eq!(
        read_part(&first.bytes, "ppt/slides/slide1.xml"),
        read_part(&second.bytes, "ppt/slides/slide1.xml")
    );
}

#[test]
fn test_slide_without_placeholders_is_unchanged() {
    let plain = slide_xml(&shape(2, (0, 0, 100, 100), &para(&["Nothing to see", " here"])));
    let template = package(&[slide_xml(&shape(2, (0, 0, 100, 100), &para(&["{name}"]))), plain.clone()]);

    let filled = templater()
        .fill_bytes(&template, &tokens(&[("name", "Ann")]), &ImageAssets::new())
        .unwrap();

    assert_eq!(read_part(&filled.bytes, "ppt/slides/slide2.xml").unwrap(), plain);
    assert_eq!(filled.report.slides, 2);
}

#[test]
fn test_same_asset_on_two_slides_is_stored_once() {
    let slide = slide_xml(&shape(2, (0, 0, 100, 100), &para(&["{IMAGE:logo}"])));
    let template = package(&[slide.clone(), slide]);

    let filled = templater()
        .fill_bytes(&template, &TextTokens::new(), &assets(&[("logo", "logo.png", png(1, 1))]))
        .unwrap();

    assert!(has_part(&filled.bytes, "ppt/media/image1.png"));
    assert!(!has_part(&filled.bytes, "ppt/media/image2.png"));
    for n in 1..=2 {
        let rels = read_part(&filled.bytes, &format!("ppt/slides/_rels/slide{n}.xml.rels")).unwrap();
        assert!(rels.contains(r#"Target="../media/image1.png""#));
    }
    assert_eq!(filled.report.images_inserted, 2);
}

#[test]
fn test_undecodable_image_is_skipped() {
    let shapes = [
        shape(2, (0, 0, 100, 100), &para(&["{IMAGE:logo}"])),
        shape(3, (0, 0, 100, 100), &para(&["{IMAGE:seal}"])),
    ]
    .concat();
    let template = package(&[slide_xml(&shapes)]);
    let assets = assets(&[("logo", "logo.png", b"not a png".to_vec()), ("seal", "seal.png", png(2, 2))]);

    let filled = templater().fill_bytes(&template, &TextTokens::new(), &assets).unwrap();

    let slide = read_part(&filled.bytes, "ppt/slides/slide1.xml").unwrap();
    assert!(!slide.contains("{IMAGE:logo}"));
    assert!(!slide.contains("{IMAGE:seal}"));
    assert!(slide.contains(r#"descr="seal""#));
    assert!(!slide.contains(r#"descr="logo""#));
    assert_eq!(filled.report.images_inserted, 1);
    assert_eq!(filled.report.shapes_removed, 2);
    assert!(filled
        .report
        .skipped()
        .any(|d| matches!(&d.event, Event::ImageDecodeFailed { key, .. } if key == "logo")));
}

#[test]
fn test_line_break_stays_between_replaced_lines() {
    let paragraph = r#"<a:p><a:r><a:t>Name: {name}</a:t></a:r><a:br/><a:r><a:t>Title: {title}</a:t></a:r></a:p>"#;
    let template = package(&[slide_xml(&shape(2, (0, 0, 100, 100), paragraph))]);

    let filled = templater()
        .fill_bytes(&template, &tokens(&[("name", "Ann"), ("title", "CEO")]), &ImageAssets::new())
        .unwrap();

    let slide = read_part(&filled.bytes, "ppt/slides/slide1.xml").unwrap();
    assert!(slide.contains("<a:r><a:t>Name: Ann</a:t></a:r><a:br/><a:r><a:t>Title: CEO</a:t></a:r>"));
}

#[test]
fn test_placeholder_takes_position_from_layout() {
    let slide = slide_xml(&placeholder(2, r#"<p:ph idx="1"/>"#, "", &para(&["{IMAGE:logo}"])));
    let layout = layout_xml("sldLayout", &placeholder(2, r#"<p:ph idx="1"/>"#, &xfrm((1000, 2000, 400, 200)), ""));
    let template = package_with_parts(&[slide], &[("ppt/slideLayouts/slideLayout1.xml", layout)]);

    let filled = templater()
        .fill_bytes(&template, &TextTokens::new(), &assets(&[("logo", "logo.png", png(400, 200))]))
        .unwrap();

    let slide = read_part(&filled.bytes, "ppt/slides/slide1.xml").unwrap();
    assert!(!slide.contains("{IMAGE:logo}"));
    assert!(slide.contains(r#"<a:off x="1000" y="2000"/><a:ext cx="400" cy="200"/>"#));
    assert_eq!(filled.report.images_inserted, 1);
    assert_eq!(filled.report.shapes_removed, 1);
    assert!(!filled.report.events().any(|event| matches!(event, Event::MissingAnchor { .. })));
}

#[test]
fn test_placeholder_falls_back_to_master_position() {
    let slide = slide_xml(&placeholder(2, r#"<p:ph idx="1"/>"#, "", &para(&["{IMAGE:logo}"])));
    let layout = layout_xml("sldLayout", &placeholder(2, r#"<p:ph idx="1"/>"#, "", ""));
    let layout_rels = format!(
        r#"{DECLARATION}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#
    );
    let master = layout_xml(
        "sldMaster",
        &[
            placeholder(2, r#"<p:ph type="title"/>"#, &xfrm((0, 0, 900, 100)), ""),
            placeholder(3, r#"<p:ph type="body" idx="1"/>"#, &xfrm((50, 150, 800, 400)), ""),
        ]
        .concat(),
    );
    let template = package_with_parts(
        &[slide],
        &[
            ("ppt/slideLayouts/slideLayout1.xml", layout),
            ("ppt/slideLayouts/_rels/slideLayout1.xml.rels", layout_rels),
            ("ppt/slideMasters/slideMaster1.xml", master),
        ],
    );

    let filled = templater()
        .fill_bytes(&template, &TextTokens::new(), &assets(&[("logo", "logo.png", png(200, 100))]))
        .unwrap();

    let slide = read_part(&filled.bytes, "ppt/slides/slide1.xml").unwrap();
    assert!(slide.contains(r#"<a:off x="50" y="150"/><a:ext cx="800" cy="400"/>"#));
    assert_eq!(filled.report.images_inserted, 1);
}

#[test]
fn test_placeholder_without_layout_is_reported() {
    let slide = slide_xml(&placeholder(2, r#"<p:ph idx="1"/>"#, "", &para(&["{IMAGE:logo}"])));
    let template = package(&[slide]);

    let filled = templater()
        .fill_bytes(&template, &TextTokens::new(), &assets(&[("logo", "logo.png", png(2, 2))]))
        .unwrap();

    let slide = read_part(&filled.bytes, "ppt/slides/slide1.xml").unwrap();
    assert!(slide.contains("{IMAGE:logo}"));
    assert_eq!(filled.report.images_inserted, 0);
    assert!(filled
        .report
        .skipped()
        .any(|d| matches!(&d.event, Event::MissingAnchor { key } if key == "logo")));
}

#[test]
fn test_images_can_be_disabled() {
    let template = package(&[slide_xml(&shape(2, (0, 0, 100, 100), &para(&["{IMAGE:logo}"])))]);
    let templater = Templater::new(FillConfig::builder().replace_images(false).build());

    let filled = templater
        .fill_bytes(&template, &TextTokens::new(), &assets(&[("logo", "logo.png", png(1, 1))]))
        .unwrap();

    assert!(read_part(&filled.bytes, "ppt/slides/slide1.xml").unwrap().contains("{IMAGE:logo}"));
    assert!(!has_part(&filled.bytes, "ppt/media/image1.png"));
}

#[test]
fn test_longest_key_first() {
    let template = package(&[slide_xml(&shape(2, (0, 0, 100, 100), &para(&["{name} / {name_full}"])))]);
    let tokens = tokens(&[("name", "Ann"), ("name_full", "Ann Smith")]);
    let templater = Templater::new(FillConfig::builder().key_order(KeyOrder::LongestFirst).build());

    let filled = templater.fill_bytes(&template, &tokens, &ImageAssets::new()).unwrap();

    let slide = read_part(&filled.bytes, "ppt/slides/slide1.xml").unwrap();
    assert!(slide.contains("<a:t>Ann / Ann Smith</a:t>"));
}

#[test]
fn test_invalid_package_is_fatal() {
    match templater().fill_bytes(b"PK but not really", &TextTokens::new(), &ImageAssets::new()) {
        Ok(_) => panic!("garbage should not be filled"),
        Err(Error::Zip(_)) => {}
        Err(e) => panic!("unexpected error: {e}"),
    }
}

#[test]
fn test_malformed_slide_is_fatal() {
    let template = package(&["<p:sld><unclosed>".to_string()]);
    assert!(matches!(
        templater().fill_bytes(&template, &TextTokens::new(), &ImageAssets::new()),
        Err(Error::Xml(_))
    ));
}

#[test]
fn test_fill_to_temp_file() {
    let template = package(&[slide_xml(&shape(2, (0, 0, 100, 100), &para(&["{name}"])))]);
    let templater = Templater::new(FillConfig::builder().temp_prefix("report-").build());

    let (file, report) = templater
        .fill_to_temp_file(&template, &tokens(&[("name", "Ann")]), &ImageAssets::new())
        .unwrap();

    let name = file.path().file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("report-"));
    assert!(name.ends_with(".pptx"));
    assert_eq!(report.paragraphs_rewritten, 1);

    let written = std::fs::read(file.path()).unwrap();
    assert!(read_part(&written, "ppt/slides/slide1.xml").unwrap().contains("<a:t>Ann</a:t>"));
}

#[test]
fn test_batch_jobs_are_independent() {
    let good = package(&[slide_xml(&shape(2, (0, 0, 100, 100), &para(&["{name}"])))]);
    let jobs = vec![
        FillJob { template: good.clone(), tokens: tokens(&[("name", "Ann")]), assets: ImageAssets::new() },
        FillJob { template: b"broken".to_vec(), tokens: TextTokens::new(), assets: ImageAssets::new() },
        FillJob { template: good, tokens: tokens(&[("name", "Bob")]), assets: ImageAssets::new() },
    ];

    let results = templater().fill_batch(jobs);

    assert_eq!(results.len(), 3);
    let first = results[0].as_ref().unwrap();
    assert!(read_part(&first.bytes, "ppt/slides/slide1.xml").unwrap().contains("<a:t>Ann</a:t>"));
    assert!(results[1].is_err());
    let third = results[2].as_ref().unwrap();
    assert!(read_part(&third.bytes, "ppt/slides/slide1.xml").unwrap().contains("<a:t>Bob</a:t>"));
}
