//! SpreadsheetML package writer and read-back.
//!
//! The writer emits the smallest part set common spreadsheet applications
//! accept for one styled worksheet: content types, package and workbook
//! relationships, document properties, workbook, styles, shared strings, the
//! sheet itself, and the sheet's hyperlink relationships.

use crate::error::TableSheetError;
use crate::helpers::xml::escape_text;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellStyle;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::cell::Fill;
use crate::spreadsheet::cell::Font;
use crate::spreadsheet::cell::RenderedCell;
use crate::spreadsheet::format::builtin_number_format_id;
use crate::spreadsheet::format::FIRST_CUSTOM_FORMAT_ID;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::RenderedSheet;
use crate::spreadsheet::SpreadsheetError;
use chrono::SecondsFormat;
use chrono::Utc;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufRead;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipArchive;
use zip::ZipWriter;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PACKAGE_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_HYPERLINK: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// Default font size and face for every font record
const FONT_SIZE: u32 = 11;
const FONT_NAME: &str = "Calibri";

/// Fills 0 and 1 are reserved by the format.
const RESERVED_FILLS: usize = 2;

// XML tag names for read-back
const TAG_RELATIONSHIP: &[u8] = b"Relationship";
const TAG_SHEET: QName = QName(b"sheet");
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");
const TAG_TEXT: QName = QName(b"t");
const TAG_ROW: QName = QName(b"row");
const TAG_CELL: QName = QName(b"c");
const TAG_INLINE_STRING: QName = QName(b"is");
const TAG_VALUE: QName = QName(b"v");

/// Writes `sheet` as a complete package into `writer` and hands the writer back.
pub fn write_package<W: Write + Seek>(sheet: &RenderedSheet, writer: W) -> Result<W, TableSheetError> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let shared_strings = SharedStrings::build(sheet);
    let styles = StyleTable::build(sheet);
    let hyperlinks = sheet
        .cells()
        .filter(|cell| cell.hyperlink.is_some())
        .collect::<Vec<_>>();

    let mut parts = vec![
        ("[Content_Types].xml".to_owned(), content_types_xml(!shared_strings.values.is_empty())),
        ("_rels/.rels".to_owned(), root_rels_xml()),
        ("docProps/app.xml".to_owned(), app_xml()),
        ("docProps/core.xml".to_owned(), core_xml()),
        ("xl/workbook.xml".to_owned(), workbook_xml(&sheet.name)),
        ("xl/_rels/workbook.xml.rels".to_owned(), workbook_rels_xml(!shared_strings.values.is_empty())),
        ("xl/styles.xml".to_owned(), styles.to_xml()),
    ];
    if !shared_strings.values.is_empty() {
        parts.push(("xl/sharedStrings.xml".to_owned(), shared_strings.to_xml()));
    }
    parts.push(("xl/worksheets/sheet1.xml".to_owned(), sheet_xml(sheet, &shared_strings, &styles, &hyperlinks)));
    if !hyperlinks.is_empty() {
        parts.push(("xl/worksheets/_rels/sheet1.xml.rels".to_owned(), sheet_rels_xml(&hyperlinks)));
    }

    for (path, xml) in parts {
        zip.start_file(path, options)?;
        zip.write_all(xml.as_bytes())?;
    }
    Ok(zip.finish()?)
}

fn content_types_xml(has_shared_strings: bool) -> String {
    let shared_strings = if has_shared_strings {
        r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#
    } else {
        ""
    };
    format!(
        r#"{XML_DECLARATION}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>{shared_strings}<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/></Types>"#
    )
}

fn root_rels_xml() -> String {
    format!(
        r#"{XML_DECLARATION}
<Relationships xmlns="{NS_PACKAGE_RELATIONSHIPS}"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#
    )
}

fn app_xml() -> String {
    format!(
        r#"{XML_DECLARATION}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>{}</Application></Properties>"#,
        env!("CARGO_PKG_NAME")
    )
}

fn core_xml() -> String {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    format!(
        r#"{XML_DECLARATION}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:creator>{}</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{now}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{now}</dcterms:modified></cp:coreProperties>"#,
        env!("CARGO_PKG_NAME")
    )
}

fn workbook_xml(sheet_name: &str) -> String {
    format!(
        r#"{XML_DECLARATION}
<workbook xmlns="{NS_MAIN}" xmlns:r="{NS_RELATIONSHIPS}"><bookViews><workbookView/></bookViews><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape_text(&sheet_title(sheet_name))
    )
}

/// Sheet titles are 1..=31 characters without `[]:*?/\`.
fn sheet_title(name: &str) -> String {
    let title = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect::<String>();
    if title.trim().is_empty() {
        "Sheet1".to_owned()
    } else {
        title
    }
}

fn workbook_rels_xml(has_shared_strings: bool) -> String {
    let shared_strings = if has_shared_strings {
        r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#
    } else {
        ""
    };
    format!(
        r#"{XML_DECLARATION}
<Relationships xmlns="{NS_PACKAGE_RELATIONSHIPS}"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>{shared_strings}</Relationships>"#
    )
}

fn sheet_rels_xml(hyperlinks: &[&RenderedCell]) -> String {
    let mut rels = String::new();
    for (index, cell) in hyperlinks.iter().enumerate() {
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{REL_HYPERLINK}" Target="{}" TargetMode="External"/>"#,
            index + 1,
            escape_text(cell.hyperlink.as_deref().unwrap_or_default())
        ));
    }
    format!(
        r#"{XML_DECLARATION}
<Relationships xmlns="{NS_PACKAGE_RELATIONSHIPS}">{rels}</Relationships>"#
    )
}

fn sheet_xml(sheet: &RenderedSheet, shared_strings: &SharedStrings, styles: &StyleTable, hyperlinks: &[&RenderedCell]) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(&format!(r#"<worksheet xmlns="{NS_MAIN}" xmlns:r="{NS_RELATIONSHIPS}">"#));
    let show_grid_lines = if sheet.show_grid_lines { "" } else { r#" showGridLines="0""# };
    xml.push_str(&format!(r#"<sheetViews><sheetView{show_grid_lines} workbookViewId="0"/></sheetViews>"#));
    xml.push_str(r#"<sheetFormatPr defaultRowHeight="15"/>"#);

    if !sheet.column_widths.is_empty() {
        xml.push_str("<cols>");
        for (index, width) in sheet.column_widths.iter().enumerate() {
            xml.push_str(&format!(
                r#"<col min="{0}" max="{0}" width="{1}" customWidth="1"/>"#,
                index + 1,
                width
            ));
        }
        xml.push_str("</cols>");
    }

    xml.push_str("<sheetData>");
    for (row_index, cells) in sheet.rows.iter().enumerate() {
        xml.push_str(&format!(r#"<row r="{}">"#, row_index + 1));
        for cell in cells {
            xml.push_str(&cell_xml(cell, shared_strings, styles));
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData>");

    if !hyperlinks.is_empty() {
        xml.push_str("<hyperlinks>");
        for (index, cell) in hyperlinks.iter().enumerate() {
            xml.push_str(&format!(r#"<hyperlink ref="{}" r:id="rId{}"/>"#, cell.reference(), index + 1));
        }
        xml.push_str("</hyperlinks>");
    }
    xml.push_str("</worksheet>");
    xml
}

fn cell_xml(cell: &RenderedCell, shared_strings: &SharedStrings, styles: &StyleTable) -> String {
    let style = styles.xf_index(&cell.style);
    if cell.value == CellValue::Empty && style == 0 {
        return String::new();
    }
    let mut attrs = format!(r#" r="{}""#, cell.reference());
    if style != 0 {
        attrs.push_str(&format!(r#" s="{}""#, style));
    }
    let value = match &cell.value {
        CellValue::Empty => String::new(),
        CellValue::Number(number) if number.is_finite() => format!("<v>{}</v>", number),
        value => {
            attrs.push_str(r#" t="s""#);
            let text = value.to_string();
            format!("<v>{}</v>", shared_strings.index.get(&text).copied().unwrap_or_default())
        }
    };
    format!("<c{}>{}</c>", attrs, value)
}

/// Strings stored once per package and referenced by index.
struct SharedStrings {
    values: Vec<String>,
    index: HashMap<String, usize>,
}

impl SharedStrings {
    fn build(sheet: &RenderedSheet) -> Self {
        let mut values = Vec::<String>::new();
        let mut index = HashMap::<String, usize>::new();
        for cell in sheet.cells() {
            let text = match &cell.value {
                CellValue::Empty => continue,
                CellValue::Number(number) if number.is_finite() => continue,
                value => value.to_string(),
            };
            if !index.contains_key(&text) {
                index.insert(text.clone(), values.len());
                values.push(text);
            }
        }
        Self { values, index }
    }

    fn to_xml(&self) -> String {
        let mut items = String::new();
        for value in &self.values {
            let space = if value.trim() != value { r#" xml:space="preserve""# } else { "" };
            items.push_str(&format!("<si><t{}>{}</t></si>", space, escape_text(value)));
        }
        format!(
            r#"{XML_DECLARATION}
<sst xmlns="{NS_MAIN}" count="{0}" uniqueCount="{0}">{items}</sst>"#,
            self.values.len()
        )
    }
}

/// Deduplicated fonts, fills, number formats and cell formats (`xf`).
struct StyleTable {
    fonts: Vec<Font>,
    fills: Vec<Fill>,
    number_formats: Vec<(u32, String)>,
    xfs: Vec<Xf>,
    index: HashMap<CellStyle, usize>,
}

/// One `cellXfs` record, already resolved to table ids.
struct Xf {
    number_format_id: u32,
    font_id: usize,
    fill_id: usize,
    style: CellStyle,
}

impl StyleTable {
    fn build(sheet: &RenderedSheet) -> Self {
        let mut styles = Self {
            fonts: vec![Font::default()],
            fills: Vec::new(),
            number_formats: Vec::new(),
            xfs: Vec::new(),
            index: HashMap::new(),
        };
        styles.register(&CellStyle::default());
        for cell in sheet.cells() {
            styles.register(&cell.style);
        }
        styles
    }

    fn register(&mut self, style: &CellStyle) {
        if self.index.contains_key(style) {
            return;
        }
        let number_format_id = match &style.number_format {
            Some(code) => self.number_format_id(code),
            None => 0,
        };
        let font_id = match self.fonts.iter().position(|font| *font == style.font) {
            Some(id) => id,
            None => {
                self.fonts.push(style.font.clone());
                self.fonts.len() - 1
            }
        };
        let fill_id = match &style.fill {
            None => 0,
            Some(fill) => match self.fills.iter().position(|known| known == fill) {
                Some(id) => id + RESERVED_FILLS,
                None => {
                    self.fills.push(fill.clone());
                    self.fills.len() - 1 + RESERVED_FILLS
                }
            },
        };
        self.index.insert(style.clone(), self.xfs.len());
        self.xfs.push(Xf { number_format_id, font_id, fill_id, style: style.clone() });
    }

    fn number_format_id(&mut self, code: &str) -> u32 {
        if let Some(id) = builtin_number_format_id(code) {
            return id;
        }
        if let Some((id, _)) = self.number_formats.iter().find(|(_, known)| known == code) {
            return *id;
        }
        let id = FIRST_CUSTOM_FORMAT_ID + self.number_formats.len() as u32;
        self.number_formats.push((id, code.to_owned()));
        id
    }

    fn xf_index(&self, style: &CellStyle) -> usize {
        self.index.get(style).copied().unwrap_or(0)
    }

    fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(XML_DECLARATION);
        xml.push('\n');
        xml.push_str(&format!(r#"<styleSheet xmlns="{NS_MAIN}">"#));

        if !self.number_formats.is_empty() {
            xml.push_str(&format!(r#"<numFmts count="{}">"#, self.number_formats.len()));
            for (id, code) in &self.number_formats {
                xml.push_str(&format!(r#"<numFmt numFmtId="{}" formatCode="{}"/>"#, id, escape_text(code)));
            }
            xml.push_str("</numFmts>");
        }

        xml.push_str(&format!(r#"<fonts count="{}">"#, self.fonts.len()));
        for font in &self.fonts {
            xml.push_str("<font>");
            if font.bold {
                xml.push_str("<b/>");
            }
            if font.underline {
                xml.push_str("<u/>");
            }
            xml.push_str(&format!(r#"<sz val="{FONT_SIZE}"/>"#));
            if let Some(color) = &font.color {
                xml.push_str(&format!(r#"<color rgb="FF{}"/>"#, escape_text(color)));
            }
            xml.push_str(&format!(r#"<name val="{FONT_NAME}"/><family val="2"/></font>"#));
        }
        xml.push_str("</fonts>");

        xml.push_str(&format!(r#"<fills count="{}">"#, self.fills.len() + RESERVED_FILLS));
        xml.push_str(r#"<fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill>"#);
        for fill in &self.fills {
            xml.push_str(&format!(
                r#"<fill><patternFill patternType="solid"><fgColor rgb="FF{}"/><bgColor indexed="64"/></patternFill></fill>"#,
                escape_text(&fill.color)
            ));
        }
        xml.push_str("</fills>");

        xml.push_str(r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#);
        xml.push_str(r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#);

        xml.push_str(&format!(r#"<cellXfs count="{}">"#, self.xfs.len()));
        for xf in &self.xfs {
            xml.push_str(&format!(
                r#"<xf numFmtId="{}" fontId="{}" fillId="{}" borderId="0" xfId="0""#,
                xf.number_format_id, xf.font_id, xf.fill_id
            ));
            if xf.number_format_id != 0 {
                xml.push_str(r#" applyNumberFormat="1""#);
            }
            if xf.font_id != 0 {
                xml.push_str(r#" applyFont="1""#);
            }
            if xf.fill_id != 0 {
                xml.push_str(r#" applyFill="1""#);
            }
            let alignment = &xf.style.alignment;
            if alignment.is_default() {
                xml.push_str("/>");
                continue;
            }
            xml.push_str(r#" applyAlignment="1"><alignment"#);
            if let Some(horizontal) = alignment.horizontal {
                xml.push_str(&format!(r#" horizontal="{}""#, horizontal.as_str()));
            }
            if let Some(vertical) = alignment.vertical {
                xml.push_str(&format!(r#" vertical="{}""#, vertical.as_str()));
            }
            if alignment.indent > 0 {
                xml.push_str(&format!(r#" indent="{}""#, alignment.indent));
            }
            xml.push_str("/></xf>");
        }
        xml.push_str("</cellXfs>");

        xml.push_str(r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#);
        xml.push_str("</styleSheet>");
        xml
    }
}

/// Reads the first worksheet of a package back into a text grid.
///
/// Shared strings are resolved and numbers come back as written. The grid is
/// rectangular; cells missing from the sheet are empty strings.
pub fn read_cells(bytes: &[u8]) -> Result<Vec<Vec<String>>, TableSheetError> {
    let mut zip = ZipArchive::new(Cursor::new(bytes))?;
    let sheet_path = first_sheet_path(&mut zip)?;
    let shared_strings = load_shared_strings(&mut zip)?;

    let mut cells = Vec::<(usize, usize, String)>::new();
    let mut reader = zip
        .xml_reader(&sheet_path)?
        .ok_or_else(|| SpreadsheetError::MissingPart(sheet_path.to_owned()))?;
    let mut position = None::<(usize, usize)>;
    let mut kind = String::new();
    let mut value = String::new();
    let mut row_count = 0usize;
    let mut col_count = 0usize;
    match_xml_events!(reader => {
        Event::End(event) if event.name() == TAG_ROW => {
            row_count += 1;
            col_count = 0;
        }
        Event::Start(event) if event.name() == TAG_CELL => {
            position = match event.get_attribute_value("r")? {
                Some(reference) => Some(
                    reference_to_index(&reference)
                        .ok_or_else(|| SpreadsheetError::InvalidReference(reference.to_string()))?,
                ),
                None => Some((row_count, col_count)),
            };
            col_count += 1;
            kind = event.get_attribute_value("t")?.map(|t| t.to_string()).unwrap_or_default();
            value.clear();
        }
        Event::Start(event) if event.name() == TAG_VALUE => {
            value = read_text(&mut reader, TAG_VALUE, true)?;
        }
        Event::Start(event) if event.name() == TAG_INLINE_STRING => {
            value = read_text(&mut reader, TAG_INLINE_STRING, false)?;
        }
        Event::End(event) if event.name() == TAG_CELL => {
            if let Some((row, col)) = position.take() {
                let text = if kind == "s" {
                    let index = value.parse::<usize>()?;
                    shared_strings
                        .get(index)
                        .cloned()
                        .ok_or(SpreadsheetError::SharedStringOutOfRange(index))?
                } else {
                    std::mem::take(&mut value)
                };
                cells.push((row, col, text));
            }
        }
    });

    let rows = cells.iter().map(|(row, _, _)| row + 1).max().unwrap_or(0);
    let cols = cells.iter().map(|(_, col, _)| col + 1).max().unwrap_or(0);
    let mut grid = vec![vec![String::new(); cols]; rows];
    for (row, col, text) in cells {
        grid[row][col] = text;
    }
    Ok(grid)
}

/// Resolves the first `<sheet>` of the workbook to its part path.
fn first_sheet_path<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<String, TableSheetError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip
        .xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::MissingPart("xl/workbook.xml".to_owned()))?;
    let mut sheet_id = None::<String>;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            for result in event.attributes() {
                let attribute = result?;
                if attribute.key.local_name().as_ref() == b"id" {
                    sheet_id = Some(attribute.unescape_value()?.to_string());
                }
            }
            break;
        }
    });
    sheet_id
        .and_then(|id| relationships.get(&id).cloned())
        .ok_or_else(|| SpreadsheetError::MissingPart("worksheet".to_owned()).into())
}

/// Maps relationship ids to worksheet part paths.
fn load_relationships<RS: Read + Seek>(zip: &mut ZipArchive<RS>, path: &str) -> Result<HashMap<String, String>, TableSheetError> {
    let mut reader = zip
        .xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::MissingPart(path.to_owned()))?;
    let mut relationships = HashMap::<String, String>::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Workbook relationship targets are relative to `xl/` unless absolute.
fn to_zip_path(path: Cow<'_, str>) -> String {
    if let Some(absolute) = path.strip_prefix('/') {
        absolute.to_owned()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

fn load_shared_strings<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Vec<String>, TableSheetError> {
    let mut shared_strings = Vec::<String>::new();
    let mut reader = match zip.xml_reader("xl/sharedStrings.xml")? {
        Some(reader) => reader,
        None => return Ok(shared_strings),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            shared_strings.push(read_text(&mut reader, TAG_SHARED_STRING_ITEM, false)?);
        }
    });
    Ok(shared_strings)
}

/// Collects text up to `end_tag`, skipping phonetic runs.
///
/// With `is_text_content` every text node counts; otherwise only `<t>` content does.
fn read_text<B: BufRead>(reader: &mut XmlReader<B>, end_tag: QName, is_text_content: bool) -> Result<String, TableSheetError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}
