use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::config::DropChanceConfig;
use crate::error::{DropChanceError, Result};

pub const DROP_TABLE: &str = "DropTable";
pub const DROP_PACKAGE_TABLE: &str = "DropPackageTable";
pub const ITEM_TABLE: &str = "ItemTable";

/// One award pool as it appears in DropTable.json.
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone, Default)]
pub struct AwardEntry {
    pub AwardID: Option<Value>,
    #[serde(default, deserialize_with = "list_or_falsy")]
    pub GroupContent: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "list_or_falsy")]
    pub GroupWeight: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "list_or_falsy")]
    pub GroupRates: Option<Vec<Value>>,
}

/// One drop package as it appears in DropPackageTable.json.
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone, Default)]
pub struct PackageEntry {
    pub PackID: Option<Value>,
    #[serde(default, deserialize_with = "list_or_falsy")]
    pub PackContent: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "list_or_falsy")]
    pub GroupWeight: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "list_or_falsy")]
    pub GroupRates: Option<Vec<Value>>,
}

#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ItemEntry {
    pub Id: Option<Value>,
    pub Name: Option<Value>,
}

/// List columns accept a list, or any empty value (`null`, `0`, `""`, `false`, `{}`) as no list.
fn list_or_falsy<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(values) => Ok(Some(values)),
        value if is_falsy(&value) => Ok(None),
        other => Err(de::Error::custom(format!("expected a list, got {other}"))),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(values) => values.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

/// Reads a JSON scalar as an integer. Floats truncate toward zero.
/// ```
/// use serde_json::json;
/// use dropchance::tables::as_int;
///
/// assert_eq!(as_int(&json!(12)), Some(12));
/// assert_eq!(as_int(&json!(3.9)), Some(3));
/// assert_eq!(as_int(&json!(" 40 ")), Some(40));
/// assert_eq!(as_int(&json!("4.5")), None);
/// assert_eq!(as_int(&json!(null)), None);
/// ```
pub fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.is_finite())
                .map(|float| float.trunc() as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        Value::Bool(flag) => Some(i64::from(*flag)),
        _ => None,
    }
}

/// Reads a JSON scalar as a float.
/// ```
/// use serde_json::json;
/// use dropchance::tables::as_float;
///
/// assert_eq!(as_float(&json!(2)), Some(2.0));
/// assert_eq!(as_float(&json!("0.25")), Some(0.25));
/// assert_eq!(as_float(&json!([1])), None);
/// ```
pub fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// The decoded tables, entries kept in file order.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub drop_table: Vec<(String, AwardEntry)>,
    pub drop_package_table: Vec<(String, PackageEntry)>,
    pub item_names: HashMap<i64, String>,
}

impl Tables {
    pub fn from_json(
        drop_table: &str,
        drop_package_table: &str,
        items: Option<&str>,
    ) -> Result<Self> {
        let item_names = match items {
            Some(items) => parse_item_names(&parse_entries(ITEM_TABLE, items)?),
            None => HashMap::new(),
        };

        Ok(Self {
            drop_table: parse_entries(DROP_TABLE, drop_table)?,
            drop_package_table: parse_entries(DROP_PACKAGE_TABLE, drop_package_table)?,
            item_names,
        })
    }

    /// Loads the tables from the directories named by the config.
    /// ItemTable is optional; the other two are not.
    pub fn load(config: &DropChanceConfig) -> Result<Self> {
        let drop_table = read_table(&locate_table(config, &config.tables.drop_table)?)?;
        let drop_package_table =
            read_table(&locate_table(config, &config.tables.drop_package_table)?)?;

        let items = match locate_table(config, &config.tables.item_table) {
            Ok(path) => Some(read_table(&path)?),
            Err(DropChanceError::TableNotFound { name, .. }) => {
                tracing::warn!("{name} not found, falling back to generated item names");
                None
            }
            Err(err) => return Err(err),
        };

        Self::from_json(&drop_table, &drop_package_table, items.as_deref())
    }

    pub fn item_name(&self, item_id: i64) -> String {
        item_name(&self.item_names, item_id)
    }
}

/// The display name of an item, `Item_<id>` when the item is unnamed.
pub fn item_name(item_names: &HashMap<i64, String>, item_id: i64) -> String {
    item_names
        .get(&item_id)
        .cloned()
        .unwrap_or_else(|| fallback_item_name(item_id))
}

fn fallback_item_name(item_id: i64) -> String {
    format!("Item_{item_id}")
}

/// Returns the first table directory that holds `file_name`.
pub fn locate_table(config: &DropChanceConfig, file_name: &str) -> Result<PathBuf> {
    let candidates = config.table_dirs();
    candidates
        .iter()
        .map(|dir| dir.join(file_name))
        .find(|path| path.exists())
        .ok_or_else(|| DropChanceError::TableNotFound {
            name: file_name.to_string(),
            searched: candidates.iter().map(|dir| dir.display()).join(", "),
        })
}

fn read_table(path: &Path) -> Result<String> {
    tracing::debug!(path = %path.display(), "loading table");
    fs::read_to_string(path).map_err(|source| DropChanceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_entries<T: DeserializeOwned>(
    table: &'static str,
    raw: &str,
) -> Result<Vec<(String, T)>> {
    let entries: Map<String, Value> =
        serde_json::from_str(raw).map_err(|source| DropChanceError::Json {
            table: table.to_string(),
            source,
        })?;

    entries
        .into_iter()
        .map(|(key, value)| {
            serde_json::from_value(value)
                .map(|entry| (key.clone(), entry))
                .map_err(|err| DropChanceError::invalid(table, &key, err.to_string()))
        })
        .collect()
}

fn parse_item_names(entries: &[(String, ItemEntry)]) -> HashMap<i64, String> {
    let mut names = HashMap::with_capacity(entries.len());
    for (_, entry) in entries {
        let Some(item_id) = entry.Id.as_ref().and_then(as_int) else {
            continue;
        };
        let name = match &entry.Name {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            _ => fallback_item_name(item_id),
        };
        names.insert(item_id, name);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_names_fall_back_for_blank_or_missing_names() {
        let items = r#"{
            "a": {"Id": 1, "Name": "Iron Ore"},
            "b": {"Id": 2, "Name": ""},
            "c": {"Id": 3},
            "d": {"Name": "orphan"},
            "e": {"Id": 4, "Name": 17}
        }"#;
        let tables = Tables::from_json("{}", "{}", Some(items)).unwrap();

        assert_eq!(tables.item_name(1), "Iron Ore");
        assert_eq!(tables.item_name(2), "Item_2");
        assert_eq!(tables.item_name(3), "Item_3");
        assert_eq!(tables.item_name(4), "Item_4");
        assert_eq!(tables.item_name(99), "Item_99");
        assert_eq!(tables.item_names.len(), 4);
    }

    #[test]
    fn later_item_entries_override_earlier_ones() {
        let items = r#"{"x": {"Id": 5, "Name": "Old"}, "y": {"Id": 5, "Name": "New"}}"#;
        let tables = Tables::from_json("{}", "{}", Some(items)).unwrap();
        assert_eq!(tables.item_name(5), "New");
    }

    #[test]
    fn empty_values_stand_in_for_missing_lists() {
        let drops = r#"{"10": {"AwardID": 10, "GroupContent": [[1]], "GroupWeight": 0, "GroupRates": false}}"#;
        let packages = r#"{"1": {"PackID": 1, "PackContent": "", "GroupWeight": {}}}"#;
        let tables = Tables::from_json(drops, packages, None).unwrap();

        let (_, award) = &tables.drop_table[0];
        assert_eq!(award.GroupContent.as_ref().map(Vec::len), Some(1));
        assert!(award.GroupWeight.is_none());
        assert!(award.GroupRates.is_none());

        let (_, package) = &tables.drop_package_table[0];
        assert!(package.PackContent.is_none());
        assert!(package.GroupWeight.is_none());
        assert!(package.GroupRates.is_none());
    }

    #[test]
    fn non_empty_scalars_are_not_lists() {
        let drops = r#"{"10": {"AwardID": 10, "GroupWeight": 3}}"#;
        let err = Tables::from_json(drops, "{}", None).unwrap_err();
        match err {
            DropChanceError::InvalidEntry { table, reason, .. } => {
                assert_eq!(table, DROP_TABLE);
                assert!(reason.contains("expected a list"));
            }
            other => panic!("expected InvalidEntry, got {other:?}"),
        }
    }

    #[test]
    fn entries_keep_file_order() {
        let drops = r#"{"9": {"AwardID": 9}, "1": {"AwardID": 1}, "5": {"AwardID": 5}}"#;
        let tables = Tables::from_json(drops, "{}", None).unwrap();
        let keys: Vec<&str> = tables.drop_table.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["9", "1", "5"]);
    }

    #[test]
    fn locate_prefers_root_over_ztable() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("ztable")).unwrap();
        fs::write(temp.path().join("ztable/DropTable.json"), "{}").unwrap();

        let config = DropChanceConfig {
            root: temp.path().to_path_buf(),
            ..DropChanceConfig::default()
        };
        let found = locate_table(&config, "DropTable.json").unwrap();
        assert_eq!(found, temp.path().join("ztable/DropTable.json"));

        fs::write(temp.path().join("DropTable.json"), "{}").unwrap();
        let found = locate_table(&config, "DropTable.json").unwrap();
        assert_eq!(found, temp.path().join("DropTable.json"));
    }

    #[test]
    fn locate_reports_every_searched_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = DropChanceConfig {
            root: temp.path().to_path_buf(),
            ..DropChanceConfig::default()
        };
        match locate_table(&config, "DropTable.json") {
            Err(DropChanceError::TableNotFound { name, searched }) => {
                assert_eq!(name, "DropTable.json");
                assert!(searched.contains("ztable"));
            }
            other => panic!("expected TableNotFound, got {other:?}"),
        }
    }

    #[test]
    fn load_tolerates_missing_item_table() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("DropTable.json"), r#"{"1": {"AwardID": 1}}"#).unwrap();
        fs::write(temp.path().join("DropPackageTable.json"), "{}").unwrap();

        let config = DropChanceConfig {
            root: temp.path().to_path_buf(),
            ..DropChanceConfig::default()
        };
        let tables = Tables::load(&config).unwrap();
        assert_eq!(tables.drop_table.len(), 1);
        assert!(tables.item_names.is_empty());
    }
}
