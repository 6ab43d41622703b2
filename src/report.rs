use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap};

use comfy_table::Table;
use itertools::Itertools;

use crate::award::AwardPool;
use crate::chance::{format_probability, DropChance, HEADER};
use crate::error::{DropChanceError, Result};
use crate::math::per_run_probability;
use crate::pack::DropPackage;
use crate::tables::{item_name, Tables};

/// Every award pool and drop package, with the report rows derived from them.
#[derive(Debug, Clone)]
pub struct DropReport {
    awards: HashMap<i64, AwardPool>,
    award_order: Vec<i64>,
    packages: Vec<DropPackage>,
    item_names: HashMap<i64, String>,
    rows: OnceCell<Vec<DropChance>>,
}

impl DropReport {
    pub fn new(tables: Tables) -> Result<DropReport> {
        let mut awards = HashMap::with_capacity(tables.drop_table.len());
        let mut award_order = Vec::with_capacity(tables.drop_table.len());
        for (key, entry) in &tables.drop_table {
            let pool = AwardPool::from_entry(key, entry)?;
            let award_id = pool.award_id;
            // a repeated AwardID replaces the earlier pool but keeps its slot
            if awards.insert(award_id, pool).is_none() {
                award_order.push(award_id);
            }
        }

        let packages = tables
            .drop_package_table
            .iter()
            .map(|(key, entry)| DropPackage::from_entry(key, entry))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            awards = awards.len(),
            packages = packages.len(),
            items = tables.item_names.len(),
            "parsed drop tables"
        );

        Ok(DropReport {
            awards,
            award_order,
            packages,
            item_names: tables.item_names,
            rows: OnceCell::new(),
        })
    }

    pub fn from_json(
        drop_table: &str,
        drop_package_table: &str,
        items: Option<&str>,
    ) -> Result<DropReport> {
        Self::new(Tables::from_json(drop_table, drop_package_table, items)?)
    }

    /// Award ids in DropTable order.
    pub fn award_ids(&self) -> &[i64] {
        &self.award_order
    }

    pub fn award(&self, award_id: i64) -> Option<&AwardPool> {
        self.awards.get(&award_id)
    }

    pub fn packages(&self) -> &[DropPackage] {
        &self.packages
    }

    pub fn item_name(&self, item_id: i64) -> String {
        item_name(&self.item_names, item_id)
    }

    /// Lazy loads the report rows, in package order.
    pub fn rows(&self) -> &[DropChance] {
        self.rows.get_or_init(|| self.make_rows())
    }

    fn make_rows(&self) -> Vec<DropChance> {
        let mut rows = Vec::new();
        for package in &self.packages {
            for (award_id, rolls) in package.rolls.iter() {
                let Some(pool) = self.awards.get(&award_id).filter(|pool| !pool.is_empty()) else {
                    continue;
                };
                let pack_trigger = package.trigger_probability(award_id);

                rows.extend(pool.sorted_items().into_iter().map(|(item_id, in_pool)| {
                    DropChance {
                        award_id,
                        pack_id: package.pack_id,
                        item_id,
                        item_name: self.item_name(item_id),
                        rolls,
                        in_pool,
                        pack_trigger,
                        final_per_run: per_run_probability(pack_trigger, in_pool, rolls),
                    }
                }));
            }
        }
        rows
    }

    /// All rows sorted by award, then package, then item.
    pub fn index_rows(&self) -> Vec<&DropChance> {
        self.rows()
            .iter()
            .sorted_by_key(|row| row.sort_key())
            .collect()
    }

    /// Rows grouped per award, each group sorted by package then item.
    pub fn rows_by_award(&self) -> BTreeMap<i64, Vec<&DropChance>> {
        self.rows()
            .iter()
            .into_group_map_by(|row| row.award_id)
            .into_iter()
            .map(|(award_id, rows)| {
                let rows: Vec<&DropChance> = rows
                    .into_iter()
                    .sorted_by_key(|row| (row.pack_id, row.item_id))
                    .collect();
                (award_id, rows)
            })
            .collect()
    }

    /// Returns a table visualization of one award's drop chances.
    pub fn award_table(&self, award_id: i64, precision: usize) -> Result<String> {
        if self.award(award_id).is_none() {
            return Err(DropChanceError::UnknownAward(award_id));
        }

        let mut table = Table::new();
        table.set_header(HEADER[1..].to_vec());

        let rows = self
            .rows()
            .iter()
            .filter(|row| row.award_id == award_id)
            .sorted_by_key(|row| (row.pack_id, row.item_id));

        for row in rows {
            table.add_row(vec![
                row.pack_id.to_string(),
                row.item_id.to_string(),
                row.item_name.clone(),
                row.rolls.to_string(),
                format_probability(row.in_pool, precision),
                format_probability(row.pack_trigger, precision),
                format_probability(row.final_per_run, precision),
            ]);
        }

        Ok(table.to_string())
    }
}
