//! Collection inventory tables.
//!
//! A collection label describes a delimited table listing its members with a
//! status (`P`rimary or `S`econdary) and a LID or LIDVID. Secondary members
//! are excluded from admission, and the table file itself is claimed so the
//! crawler never treats it as a label.

use std::fs;
use std::path::{Path, PathBuf};

use harvest_core::Identifier;
use harvest_label::{LabelTree, PathExpr, parse_file};
use tracing::{debug, warn};

use crate::admission::Exclusions;
use crate::error::CrawlError;

const FIELD_DELIMITER: &str = "//Inventory/field_delimiter";
const MEMBER_STATUS_FIELD: &str =
    "//Inventory/Record_Delimited/Field_Delimited[name='Member_Status']/field_number";
const LIDVID_LID_FIELD: &str =
    "//Inventory/Record_Delimited/Field_Delimited[name='LIDVID_LID']/field_number";
const TABLE_FILE: &str = "//File_Area*/File/file_name";

/// Membership status of an inventory row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Primary,
    Secondary,
}

impl MemberStatus {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "p" | "primary" => Some(Self::Primary),
            "s" | "secondary" => Some(Self::Secondary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryMember {
    pub status: MemberStatus,
    pub identifier: Identifier,
}

/// One collection's inventory table, read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInventory {
    pub collection: PathBuf,
    pub table: PathBuf,
    pub members: Vec<InventoryMember>,
}

impl CollectionInventory {
    /// Read the collection label at `path` and the table it names.
    ///
    /// Rows with an unknown status or a malformed identifier are logged and
    /// skipped.
    ///
    /// # Errors
    /// Returns [`CrawlError::CollectionLabel`] when the label does not parse,
    /// [`CrawlError::Inventory`] when it lacks a table description, and
    /// [`CrawlError::Io`] when the table cannot be read.
    pub fn read(path: &Path) -> Result<Self, CrawlError> {
        let tree = parse_file(path).map_err(|source| CrawlError::CollectionLabel {
            path: path.to_path_buf(),
            source,
        })?;
        let layout = TableLayout::from_label(&tree, path)?;
        let table = path
            .parent()
            .map_or_else(|| PathBuf::from(&layout.file_name), |dir| dir.join(&layout.file_name));
        let text = fs::read_to_string(&table).map_err(|err| CrawlError::io(&table, err))?;
        let members = layout.members(&text, &table);
        debug!(
            collection = %path.display(),
            members = members.len(),
            "read collection inventory"
        );
        Ok(Self {
            collection: path.to_path_buf(),
            table,
            members,
        })
    }

    /// Exclusions contributed by this inventory.
    #[must_use]
    pub fn exclusions(&self) -> Exclusions {
        let mut exclusions = Exclusions::new();
        exclusions.claim(&self.table);
        for member in &self.members {
            if member.status == MemberStatus::Secondary {
                exclusions.add_non_primary(member.identifier.clone());
            }
        }
        exclusions
    }
}

/// Exclusions from every configured collection.
///
/// # Errors
/// Returns the first error from [`CollectionInventory::read`].
pub fn collection_exclusions(collections: &[PathBuf]) -> Result<Exclusions, CrawlError> {
    let mut exclusions = Exclusions::new();
    for collection in collections {
        exclusions.merge(CollectionInventory::read(collection)?.exclusions());
    }
    Ok(exclusions)
}

#[derive(Debug)]
struct TableLayout {
    file_name: String,
    delimiter: u8,
    status_field: usize,
    identifier_field: usize,
}

impl TableLayout {
    fn from_label(tree: &LabelTree, path: &Path) -> Result<Self, CrawlError> {
        let value = |expr: &str, what: &str| -> Result<String, CrawlError> {
            let compiled = PathExpr::parse(expr)
                .map_err(|err| CrawlError::inventory(path, format!("{what} ({err})")))?;
            compiled
                .first_value(tree.root())
                .map(str::to_string)
                .ok_or_else(|| CrawlError::inventory(path, what))
        };
        let field = |expr: &str, what: &str| -> Result<usize, CrawlError> {
            value(expr, what)?
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| CrawlError::inventory(path, format!("valid {what}")))
        };

        let delimiter_name = value(FIELD_DELIMITER, "field_delimiter")?;
        let delimiter = delimiter(&delimiter_name).ok_or_else(|| {
            CrawlError::inventory(path, format!("known field delimiter (found '{delimiter_name}')"))
        })?;
        Ok(Self {
            file_name: value(TABLE_FILE, "inventory file name")?,
            delimiter,
            status_field: field(MEMBER_STATUS_FIELD, "Member_Status field number")?,
            identifier_field: field(LIDVID_LID_FIELD, "LIDVID_LID field number")?,
        })
    }

    fn members(&self, text: &str, table: &Path) -> Vec<InventoryMember> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut members = Vec::new();
        for row in reader.records() {
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    warn!(table = %table.display(), "Unreadable inventory row: {err}");
                    continue;
                }
            };
            let line = row.position().map(csv::Position::line);
            let status = row.get(self.status_field - 1).unwrap_or_default();
            let identifier = row.get(self.identifier_field - 1).unwrap_or_default();
            if status.is_empty() && identifier.is_empty() {
                continue;
            }

            let Some(status) = MemberStatus::parse(status) else {
                warn!(table = %table.display(), line, "Unknown member status '{status}'.");
                continue;
            };
            match Identifier::parse(identifier) {
                Ok(identifier) => members.push(InventoryMember { status, identifier }),
                Err(err) => warn!(table = %table.display(), line, "{err}"),
            }
        }
        members
    }
}

/// Delimiter byte for a `field_delimiter` value.
fn delimiter(name: &str) -> Option<u8> {
    let key: String = name
        .trim()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c.to_ascii_lowercase() })
        .collect();
    match key.as_str() {
        "comma" => Some(b','),
        "horizontal_tab" => Some(b'\t'),
        "semicolon" => Some(b';'),
        "vertical_bar" => Some(b'|'),
        _ => None,
    }
}
