//! PPTX 解析
//!
//! .pptx 是 ZIP 包内的一组 XML 文档。这里只读取顶层形状：
//! 文本框（段落、片段、字号）、图片（原始字节）以及其他形状的占位

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Read, Seek};
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::{EvalError, Result};
use crate::models::{OtherShape, Paragraph, PictureShape, SlideShape, TextRun, TextShape};

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

/// 按演示顺序解析出的一张幻灯片
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSlide {
    /// 从 1 开始
    pub number: usize,
    pub part_name: String,
    pub shapes: Vec<SlideShape>,
}

/// PPTX 解析器
#[derive(Debug, Default)]
pub struct PptxParser;

impl PptxParser {
    pub fn new() -> Self {
        Self
    }

    /// 解析整个演示文稿
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<Vec<ParsedSlide>> {
        let mut archive = ZipArchive::new(reader)?;
        let slide_parts = self.slide_order(&mut archive)?;
        debug!("演示文稿包含 {} 张幻灯片", slide_parts.len());

        slide_parts
            .iter()
            .enumerate()
            .map(|(idx, part)| self.parse_slide(&mut archive, part, idx + 1))
            .collect()
    }

    /// 幻灯片部件的演示顺序
    ///
    /// 优先使用 presentation.xml 中 `sldIdLst` 的顺序，缺失时按文件名中的编号排序
    fn slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_xml = read_part_string(archive, PRESENTATION_RELS_PART)?;
        let rels = parse_relationships(&rels_xml)?;

        let mut slide_rels: Vec<(&String, &Relationship)> = rels
            .iter()
            .filter(|(_, rel)| rel.is_slide())
            .collect();

        let ordered_ids = match read_part_string(archive, PRESENTATION_PART) {
            Ok(xml) => parse_slide_id_list(&xml)?,
            Err(e) => {
                warn!("无法读取 presentation.xml，按编号排序幻灯片: {}", e);
                Vec::new()
            }
        };

        if !ordered_ids.is_empty() {
            let parts = ordered_ids
                .iter()
                .filter_map(|id| rels.get(id))
                .filter(|rel| rel.is_slide())
                .map(|rel| resolve_target("ppt", &rel.target))
                .collect();
            return Ok(parts);
        }

        slide_rels.sort_by_key(|(_, rel)| trailing_number(&rel.target).unwrap_or(usize::MAX));
        Ok(slide_rels
            .into_iter()
            .map(|(_, rel)| resolve_target("ppt", &rel.target))
            .collect())
    }

    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        part_name: &str,
        number: usize,
    ) -> Result<ParsedSlide> {
        let xml = read_part_string(archive, part_name)?;
        let raw_shapes = parse_slide_shapes(&xml)?;

        let rels = match read_part_string(archive, &rels_part_for(part_name)) {
            Ok(rels_xml) => parse_relationships(&rels_xml)?,
            Err(_) => HashMap::new(),
        };
        let base_dir = part_name.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");

        let mut shapes = Vec::with_capacity(raw_shapes.len());
        for raw in raw_shapes {
            match raw {
                RawShape::Ready(shape) => shapes.push(shape),
                RawShape::Picture { name, embed } => {
                    let Some(rel) = embed.as_ref().and_then(|id| rels.get(id)) else {
                        warn!("幻灯片 {} 的图片 '{}' 没有可解析的引用，已跳过", number, name);
                        continue;
                    };
                    let media_part = resolve_target(base_dir, &rel.target);
                    match read_part_bytes(archive, &media_part) {
                        Ok(bytes) => shapes.push(SlideShape::Picture(PictureShape {
                            name,
                            part_name: media_part,
                            bytes,
                        })),
                        Err(e) => warn!("幻灯片 {} 的图片读取失败，已跳过: {}", number, e),
                    }
                }
            }
        }

        Ok(ParsedSlide {
            number,
            part_name: part_name.to_string(),
            shapes,
        })
    }
}

/// 关系项
#[derive(Debug, Clone)]
struct Relationship {
    rel_type: String,
    target: String,
}

impl Relationship {
    fn is_slide(&self) -> bool {
        self.rel_type.ends_with("/slide")
    }
}

/// 尚未解析图片引用的形状
#[derive(Debug)]
enum RawShape {
    Ready(SlideShape),
    Picture { name: String, embed: Option<String> },
}

/// 正在构建的顶层形状
enum ShapeBuilder {
    Text(TextShape),
    Picture { name: String, embed: Option<String> },
    Other(String),
}

impl ShapeBuilder {
    /// 开始该形状的元素本地名
    fn tag(&self) -> &[u8] {
        match self {
            ShapeBuilder::Text(_) => b"sp",
            ShapeBuilder::Picture { .. } => b"pic",
            ShapeBuilder::Other(kind) => kind.as_bytes(),
        }
    }
}

fn parse_relationships(xml: &str) -> Result<HashMap<String, Relationship>> {
    let mut reader = Reader::from_str(xml);
    let mut rels = HashMap::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) if local_name(e.name().as_ref()) == b"Relationship" => {
                let id = attr_value(e, b"Id");
                let target = attr_value(e, b"Target");
                let rel_type = attr_value(e, b"Type");
                if let (Some(id), Some(target)) = (id, target) {
                    rels.insert(
                        id,
                        Relationship {
                            rel_type: rel_type.unwrap_or_default(),
                            target,
                        },
                    );
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(rels)
}

/// presentation.xml 中 `p:sldId` 的 `r:id` 列表
fn parse_slide_id_list(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut ids = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) if local_name(e.name().as_ref()) == b"sldId" => {
                if let Some(id) = relationship_id(e) {
                    ids.push(id);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(ids)
}

/// 解析幻灯片 XML 的顶层形状
///
/// 分组形状内部不展开，整体记为其他形状；`mc:Fallback` 中的重复内容忽略
fn parse_slide_shapes(xml: &str) -> Result<Vec<RawShape>> {
    let mut reader = Reader::from_str(xml);
    let mut shapes = Vec::new();

    let mut current: Option<ShapeBuilder> = None;
    let mut group_depth = 0usize;
    let mut fallback_depth = 0usize;
    let mut paragraph: Option<Paragraph> = None;
    let mut run: Option<TextRun> = None;
    let mut in_text = false;

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Start(ref e) => {
                let name = e.name();
                let tag = local_name(name.as_ref());

                if tag == b"Fallback" {
                    fallback_depth += 1;
                    continue;
                }
                if fallback_depth > 0 {
                    continue;
                }
                if tag == b"grpSp" {
                    if group_depth == 0 && current.is_none() {
                        current = Some(ShapeBuilder::Other("grpSp".to_string()));
                    }
                    group_depth += 1;
                    continue;
                }
                if group_depth > 0 {
                    continue;
                }

                match tag {
                    b"sp" if current.is_none() => {
                        current = Some(ShapeBuilder::Text(TextShape::default()))
                    }
                    b"pic" if current.is_none() => {
                        current = Some(ShapeBuilder::Picture {
                            name: String::new(),
                            embed: None,
                        })
                    }
                    b"graphicFrame" | b"cxnSp" | b"contentPart" if current.is_none() => {
                        current = Some(ShapeBuilder::Other(
                            String::from_utf8_lossy(tag).to_string(),
                        ))
                    }
                    b"p" if matches!(current, Some(ShapeBuilder::Text(_))) => {
                        paragraph = Some(Paragraph::default());
                    }
                    b"r" | b"fld" if paragraph.is_some() => {
                        run = Some(TextRun::default());
                    }
                    b"rPr" => apply_run_properties(e, run.as_mut()),
                    b"t" if run.is_some() => in_text = true,
                    _ => apply_empty_element(e, tag, &mut current, paragraph.as_mut()),
                }
            }
            Event::Empty(ref e) => {
                if fallback_depth > 0 || group_depth > 0 {
                    continue;
                }
                let name = e.name();
                let tag = local_name(name.as_ref());
                match tag {
                    b"p" => {
                        if let Some(ShapeBuilder::Text(shape)) = current.as_mut() {
                            shape.paragraphs.push(Paragraph::default());
                        }
                    }
                    b"rPr" => apply_run_properties(e, run.as_mut()),
                    _ => apply_empty_element(e, tag, &mut current, paragraph.as_mut()),
                }
            }
            Event::Text(ref e) => {
                if in_text {
                    if let Some(run) = run.as_mut() {
                        let text = e.unescape().map_err(EvalError::from)?;
                        run.text.push_str(&text);
                    }
                }
            }
            Event::End(ref e) => {
                let name = e.name();
                let tag = local_name(name.as_ref());

                if tag == b"Fallback" {
                    fallback_depth = fallback_depth.saturating_sub(1);
                    continue;
                }
                if fallback_depth > 0 {
                    continue;
                }
                if tag == b"grpSp" {
                    group_depth = group_depth.saturating_sub(1);
                    if group_depth == 0 {
                        if let Some(builder) = current.take() {
                            shapes.push(finish_shape(builder));
                        }
                    }
                    continue;
                }
                if group_depth > 0 {
                    continue;
                }

                match tag {
                    b"t" => in_text = false,
                    b"r" | b"fld" => {
                        if let (Some(done), Some(paragraph)) = (run.take(), paragraph.as_mut()) {
                            paragraph.runs.push(done);
                        }
                    }
                    b"p" => {
                        if let (Some(done), Some(ShapeBuilder::Text(shape))) =
                            (paragraph.take(), current.as_mut())
                        {
                            shape.paragraphs.push(done);
                        }
                    }
                    b"sp" | b"pic" | b"graphicFrame" | b"cxnSp" | b"contentPart"
                        if current.as_ref().is_some_and(|b| b.tag() == tag) =>
                    {
                        if let Some(builder) = current.take() {
                            shapes.push(finish_shape(builder));
                        }
                        paragraph = None;
                        run = None;
                        in_text = false;
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}

/// 处理形状名称、图片引用、换行等既可能是空元素也可能是开始标签的元素
fn apply_empty_element(
    e: &BytesStart<'_>,
    tag: &[u8],
    current: &mut Option<ShapeBuilder>,
    paragraph: Option<&mut Paragraph>,
) {
    match (tag, current.as_mut()) {
        (b"cNvPr", Some(ShapeBuilder::Text(shape))) => {
            shape.name = attr_value(e, b"name").unwrap_or_default();
        }
        (b"cNvPr", Some(ShapeBuilder::Picture { name, .. })) => {
            *name = attr_value(e, b"name").unwrap_or_default();
        }
        (b"blip", Some(ShapeBuilder::Picture { embed, .. })) => {
            *embed = attr_value(e, b"embed");
        }
        (b"br", Some(ShapeBuilder::Text(_))) => {
            if let Some(paragraph) = paragraph {
                paragraph.runs.push(TextRun::new("\n", None));
            }
        }
        _ => {}
    }
}

/// `a:rPr sz="2400"` 以百分之一磅为单位
fn apply_run_properties(e: &BytesStart<'_>, run: Option<&mut TextRun>) {
    if let Some(run) = run {
        run.size_pt = attr_value(e, b"sz")
            .and_then(|sz| sz.parse::<f64>().ok())
            .map(|sz| sz / 100.0);
    }
}

fn finish_shape(builder: ShapeBuilder) -> RawShape {
    match builder {
        ShapeBuilder::Text(shape) => RawShape::Ready(SlideShape::Text(shape)),
        ShapeBuilder::Picture { name, embed } => RawShape::Picture { name, embed },
        ShapeBuilder::Other(kind) => RawShape::Ready(SlideShape::Other(OtherShape { kind })),
    }
}

/// 按本地名读取属性值（忽略命名空间前缀）
fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| local_name(attr.key.as_ref()) == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// 带命名空间前缀的 `r:id`（同一元素上还有不带前缀的数字 `id`）
fn relationship_id(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| {
            let key = attr.key.as_ref();
            key.contains(&b':') && local_name(key) == b"id"
        })
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// 去掉命名空间前缀
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// `ppt/slides/slide1.xml` → `ppt/slides/_rels/slide1.xml.rels`
fn rels_part_for(part_name: &str) -> String {
    match part_name.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_name),
    }
}

/// 把关系目标解析为包内绝对路径（处理 `..` 与前导 `/`）
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// `slides/slide12.xml` → 12
fn trailing_number(s: &str) -> Option<usize> {
    let stem = s.trim_end_matches(".xml");
    let digits: String = stem
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().ok()
}

fn read_part_string<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let bytes = read_part_bytes(archive, path)?;
    String::from_utf8(bytes).map_err(|e| EvalError::Document(format!("'{}' 不是 UTF-8: {}", path, e)))
}

fn read_part_bytes<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Vec<u8>> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| EvalError::Document(format!("包内缺少 '{}': {}", path, e)))?;
    // 不按头部声明的大小预分配
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}
