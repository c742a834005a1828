use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Every field a bill record can carry, in output column order.
pub const FIELD_NAMES: &[&str] = &[
    "Customer",
    "Customer_No",
    "Account_No",
    "Meter_No",
    "Previous_Reading_Date",
    "Previous_Reading",
    "Current_Reading_Date",
    "Current_Reading",
    "Due_Date",
    "Reading_Type",
    "Tariff_Type",
    "Invoice_Month",
    "Government_Subsidy",
    "Consumption_KWH_1",
    "Rate_1",
    "Consumption_KWH_2",
    "Rate_2",
    "Consumption_KWH_3",
    "Rate_3",
    "Consumption_KWH_4",
    "Rate_4",
    "Consumption_KWH_5",
    "Rate_5",
    "Consumption_KWH_6",
    "Rate_6",
    "Total_Before_VAT",
    "VAT",
    "Total_After_VAT",
    "Total_Payable_Amount",
];

/// Field that receives the account number in placeholder records.
pub const ACCOUNT_FIELD: &str = "Account_No";

/// Sentinel written into every field of a placeholder record.
pub const PLACEHOLDER_VALUE: &str = "null";

pub fn is_known_field(name: &str) -> bool {
    FIELD_NAMES.contains(&name)
}

/// Bill rendering variants the classifier can tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutId {
    NewNama,
    OldNama,
    Dofar,
}

impl LayoutId {
    pub const ALL: [LayoutId; 3] = [LayoutId::NewNama, LayoutId::OldNama, LayoutId::Dofar];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutId::NewNama => "new_nama",
            LayoutId::OldNama => "old_nama",
            LayoutId::Dofar => "dofar",
        }
    }

    pub fn from_name(s: &str) -> Option<LayoutId> {
        let lower = s.trim().to_lowercase();
        LayoutId::ALL.into_iter().find(|l| l.as_str() == lower)
    }
}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rectangular clip in page space: points, origin at the top-left corner.
///
/// Serialized as `[left, top, right, bottom]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Region {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Region {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Region {
            left,
            top,
            right,
            bottom,
        }
    }

    /// An all-zero region marks a field whose position on the bill is not known.
    pub fn is_unmapped(&self) -> bool {
        self.left == 0.0 && self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.left.is_finite() && self.top.is_finite() && self.right.is_finite() && self.bottom.is_finite()
    }

    pub fn is_inverted(&self) -> bool {
        self.right < self.left || self.bottom < self.top
    }
}

impl From<[f64; 4]> for Region {
    fn from(c: [f64; 4]) -> Self {
        Region::new(c[0], c[1], c[2], c[3])
    }
}

impl From<Region> for [f64; 4] {
    fn from(r: Region) -> Self {
        [r.left, r.top, r.right, r.bottom]
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.2}, {:.2}, {:.2}, {:.2})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Field name to normalized value, in the order the fields were recorded.
///
/// A `None` value means the field was unmapped, its handler found nothing,
/// or its extraction failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, Option<String>)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any earlier value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Value of a field; `None` both for missing fields and null values.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_deref()))
    }

    /// Record substituted when a bill cannot be read: every field holds the
    /// sentinel, except the account number.
    pub fn placeholder(account: &str) -> Self {
        let mut fields = FieldMap::new();
        for name in FIELD_NAMES {
            let value = if *name == ACCOUNT_FIELD {
                account
            } else {
                PLACEHOLDER_VALUE
            };
            fields.insert(*name, Some(value.to_string()));
        }
        fields
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFailure {
    pub field: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageStatus {
    Extracted,
    Placeholder { reason: String },
}

/// Outcome for one page of a bill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutId>,
    #[serde(flatten)]
    pub status: PageStatus,
    pub fields: FieldMap,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_failures: Vec<FieldFailure>,
}

impl PageRecord {
    pub fn placeholder(account: &str, reason: impl Into<String>) -> Self {
        PageRecord {
            layout: None,
            status: PageStatus::Placeholder {
                reason: reason.into(),
            },
            fields: FieldMap::placeholder(account),
            field_failures: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.status, PageStatus::Placeholder { .. })
    }
}

/// Page-indexed extraction result for one bill PDF.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DocumentResult {
    pub pages: BTreeMap<usize, PageRecord>,
}

impl DocumentResult {
    /// Result standing in for a whole document: a single placeholder at page 0.
    pub fn placeholder(account: &str, reason: impl Into<String>) -> Self {
        let mut pages = BTreeMap::new();
        pages.insert(0, PageRecord::placeholder(account, reason));
        DocumentResult { pages }
    }

    pub fn first(&self) -> Option<&PageRecord> {
        self.pages.get(&0)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
