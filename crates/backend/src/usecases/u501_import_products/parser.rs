use calamine::{open_workbook_auto_from_rs, Data, Reader};
use contracts::usecases::u501_import_products::{FileSelectionError, PreviewProduct};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Cursor;

use super::error::ImportError;

/// One data row keyed by normalized header
pub type RawRecord = HashMap<String, String>;

/// Header row plus the non-blank data rows of the first sheet
#[derive(Debug, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

const NAME_ALIASES: &[&str] = &["name", "nombre", "producto"];
const SKU_ALIASES: &[&str] = &["sku", "codigo", "código"];
const BARCODE_ALIASES: &[&str] = &["barcode", "codigo_barras", "código de barras", "ean"];
const PRICE_ALIASES: &[&str] = &["price", "precio"];
const STOCK_ALIASES: &[&str] = &["stock", "stock_quantity", "cantidad"];
const MIN_STOCK_ALIASES: &[&str] = &["min_stock", "stock_minimo", "stock mínimo"];
const CATEGORY_ALIASES: &[&str] = &["category", "categoria", "categoría"];

/// Parse an uploaded product file into preview rows.
///
/// Dispatches on the extension of `file_name`. Numeric cells that do not
/// parse are left at zero; the confirm step validates them.
pub fn parse_upload(file_name: &str, bytes: &[u8]) -> Result<Vec<PreviewProduct>, ImportError> {
    let table = match extension(file_name).as_str() {
        "csv" => read_csv(bytes)?,
        "xlsx" | "xls" => read_spreadsheet(bytes)?,
        _ => {
            return Err(FileSelectionError::UnsupportedExtension {
                name: file_name.to_string(),
            }
            .into())
        }
    };
    map_table(table)
}

fn extension(file_name: &str) -> String {
    std::path::Path::new(file_name.trim())
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// `;` when the header line has more semicolons than commas
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let semicolons = first_line.iter().filter(|b| **b == b';').count();
    let commas = first_line.iter().filter(|b| **b == b',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

pub fn read_csv(bytes: &[u8]) -> Result<RawTable, ImportError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = ReaderBuilder::new()
        .delimiter(sniff_delimiter(bytes))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| normalize_header(&String::from_utf8_lossy(h)))
        .collect();

    let mut records = Vec::new();
    for result in reader.byte_records() {
        let record = result?;
        let mut row = RawRecord::new();
        for (idx, cell) in record.iter().enumerate() {
            if let Some(header) = headers.get(idx) {
                row.insert(header.clone(), String::from_utf8_lossy(cell).trim().to_string());
            }
        }
        if row.values().all(|v| v.is_empty()) {
            continue;
        }
        records.push(row);
    }

    Ok(RawTable { headers, records })
}

pub fn read_spreadsheet(bytes: &[u8]) -> Result<RawTable, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ImportError::EmptyFile)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(RawTable::default());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| normalize_header(&cell.to_string()))
        .collect();

    let mut records = Vec::new();
    for data_row in rows {
        let mut row = RawRecord::new();
        for (idx, cell) in data_row.iter().enumerate() {
            if let Some(header) = headers.get(idx) {
                row.insert(header.clone(), cell_text(cell).trim().to_string());
            }
        }
        if row.values().all(|v| v.is_empty()) {
            continue;
        }
        records.push(row);
    }

    Ok(RawTable { headers, records })
}

/// Floats are written with a decimal comma so `parse_decimal` never takes
/// their dot for a thousands separator
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Float(v) => v.to_string().replace('.', ","),
        other => other.to_string(),
    }
}

/// Column of each product field, by normalized header
#[derive(Debug)]
struct ColumnMap {
    name: String,
    sku: String,
    barcode: Option<String>,
    price: Option<String>,
    stock: Option<String>,
    min_stock: Option<String>,
    category: Option<String>,
}

impl ColumnMap {
    fn from_headers(headers: &[String]) -> Result<Self, ImportError> {
        let find = |aliases: &[&str]| {
            headers
                .iter()
                .find(|h| aliases.contains(&h.as_str()))
                .cloned()
        };

        let name = find(NAME_ALIASES);
        let sku = find(SKU_ALIASES);
        let (name, sku) = match (name, sku) {
            (Some(name), Some(sku)) => (name, sku),
            (name, sku) => {
                let mut missing = Vec::new();
                if name.is_none() {
                    missing.push("name".to_string());
                }
                if sku.is_none() {
                    missing.push("sku".to_string());
                }
                return Err(ImportError::MissingColumns(missing));
            }
        };

        Ok(Self {
            name,
            sku,
            barcode: find(BARCODE_ALIASES),
            price: find(PRICE_ALIASES),
            stock: find(STOCK_ALIASES),
            min_stock: find(MIN_STOCK_ALIASES),
            category: find(CATEGORY_ALIASES),
        })
    }
}

fn cell<'a>(row: &'a RawRecord, column: Option<&String>) -> &'a str {
    column
        .and_then(|c| row.get(c))
        .map(|v| v.as_str())
        .unwrap_or("")
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

pub fn map_table(table: RawTable) -> Result<Vec<PreviewProduct>, ImportError> {
    let columns = ColumnMap::from_headers(&table.headers)?;
    if table.records.is_empty() {
        return Err(ImportError::EmptyFile);
    }

    let rows = table
        .records
        .iter()
        .map(|row| PreviewProduct {
            id: None,
            name: cell(row, Some(&columns.name)).to_string(),
            sku: cell(row, Some(&columns.sku)).to_string(),
            barcode: non_empty(cell(row, columns.barcode.as_ref())),
            price: parse_decimal(cell(row, columns.price.as_ref())).unwrap_or(0.0),
            stock_quantity: parse_quantity(cell(row, columns.stock.as_ref())),
            category_id: None,
            category_name: non_empty(cell(row, columns.category.as_ref())),
            detected_category: None,
            min_stock: parse_quantity(cell(row, columns.min_stock.as_ref())),
            has_sizes: false,
        })
        .collect();
    Ok(rows)
}

/// Decimal with either `.` or `,` as separator; the last one wins when both
/// appear (`1.234,50` and `1,234.50` are both 1234.5).
///
/// Dots alone are thousands separators when every group after them has
/// exactly three digits, so `1.234` and `1.234.567` read as whole numbers
/// while `10.5` stays a decimal.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        (None, Some(_)) if dots_group_thousands(&cleaned) => cleaned.replace('.', ""),
        _ => cleaned,
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn dots_group_thousands(value: &str) -> bool {
    let mut groups = value.split('.');
    let head = groups.next().unwrap_or_default();
    let head = head.strip_prefix('-').unwrap_or(head);
    !head.is_empty()
        && !head.starts_with('0')
        && head.len() <= 3
        && head.chars().all(|c| c.is_ascii_digit())
        && groups.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

fn parse_quantity(raw: &str) -> i64 {
    parse_decimal(raw).map(|v| v.round() as i64).unwrap_or(0)
}
