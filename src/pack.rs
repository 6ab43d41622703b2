use serde_json::Value;

use crate::error::{DropChanceError, Result};
use crate::math::{normalise, Tally};
use crate::tables::{as_float, as_int, PackageEntry, DROP_PACKAGE_TABLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Weighting {
    GroupWeight,
    GroupRates,
    Unweighted,
}

/// A drop package: which awards it rolls, how often, and how likely each is to fire.
#[derive(Debug, Clone)]
pub struct DropPackage {
    pub pack_id: i64,

    /// Total rolls per award, in first-seen order.
    pub rolls: Tally<i64>,

    triggers: Tally<f64>,
    weighting: Weighting,
}

impl DropPackage {
    pub fn from_entry(key: &str, entry: &PackageEntry) -> Result<Self> {
        let pack_id = entry
            .PackID
            .as_ref()
            .and_then(as_int)
            .ok_or_else(|| DropChanceError::invalid(DROP_PACKAGE_TABLE, key, "PackID is missing"))?;

        let group_weight = entry.GroupWeight.as_deref().unwrap_or_default();
        let group_rates = entry.GroupRates.as_deref().unwrap_or_default();
        let (weighting, weights) = if !group_weight.is_empty() {
            (Weighting::GroupWeight, group_weight)
        } else if !group_rates.is_empty() {
            (Weighting::GroupRates, group_rates)
        } else {
            (Weighting::Unweighted, &[][..])
        };

        let mut rolls: Tally<i64> = Tally::new();
        let mut weights_by_award = Tally::new();

        let contents = entry.PackContent.as_deref().unwrap_or_default();
        for (index, content) in contents.iter().enumerate() {
            let Some(content) = non_empty_content(key, content)? else {
                continue;
            };

            let award_id = int_at(key, content, 0)?;
            // [award, min, max, ...]; shorter entries carry the count last
            let count_index = if content.len() >= 3 { 2 } else { content.len() - 1 };
            rolls
                .checked_add(award_id, int_at(key, content, count_index)?)
                .ok_or_else(|| {
                    DropChanceError::invalid(
                        DROP_PACKAGE_TABLE,
                        key,
                        format!("roll count for award {award_id} overflows"),
                    )
                })?;

            if let Some(weight) = weights.get(index) {
                let weight = as_float(weight).ok_or_else(|| {
                    DropChanceError::invalid(
                        DROP_PACKAGE_TABLE,
                        key,
                        format!("weight {weight} is not a number"),
                    )
                })?;
                weights_by_award.add(award_id, weight);
            }
        }

        let triggers = match weighting {
            Weighting::Unweighted => Tally::new(),
            _ => normalise(&weights_by_award),
        };

        Ok(Self {
            pack_id,
            rolls,
            triggers,
            weighting,
        })
    }

    /// Probability that this package fires `award_id` at all.
    /// Awards that received no weight fire unconditionally.
    pub fn trigger_probability(&self, award_id: i64) -> f64 {
        match self.weighting {
            Weighting::Unweighted => 1.0,
            _ => self.triggers.get(award_id).unwrap_or(1.0),
        }
    }

    pub fn is_weighted(&self) -> bool {
        self.weighting != Weighting::Unweighted
    }
}

fn non_empty_content<'a>(key: &str, content: &'a Value) -> Result<Option<&'a [Value]>> {
    match content {
        Value::Array(values) if values.is_empty() => Ok(None),
        Value::Array(values) => Ok(Some(values.as_slice())),
        Value::Null => Ok(None),
        other => Err(DropChanceError::invalid(
            DROP_PACKAGE_TABLE,
            key,
            format!("PackContent entry {other} is not a list"),
        )),
    }
}

fn int_at(key: &str, content: &[Value], index: usize) -> Result<i64> {
    content.get(index).and_then(as_int).ok_or_else(|| {
        DropChanceError::invalid(
            DROP_PACKAGE_TABLE,
            key,
            format!("PackContent entry {content:?} has no integer at position {index}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(raw: &str) -> DropPackage {
        let entry: PackageEntry = serde_json::from_str(raw).unwrap();
        DropPackage::from_entry("test", &entry).unwrap()
    }

    #[test]
    fn rolls_use_the_max_count_column() {
        let pack = package(r#"{"PackID": 100, "PackContent": [[1, 1, 3], [2, 5], [1, 0, 2, 9]]}"#);
        assert_eq!(pack.pack_id, 100);
        assert_eq!(pack.rolls.get(1), Some(5));
        assert_eq!(pack.rolls.get(2), Some(5));
        assert!(!pack.is_weighted());
        assert_eq!(pack.trigger_probability(1), 1.0);
    }

    #[test]
    fn weighted_triggers_are_normalised_per_award() {
        let pack = package(
            r#"{"PackID": 1, "PackContent": [[7, 1, 1], [8, 1, 1], [7, 1, 1]],
                "GroupWeight": [1, 2, 1]}"#,
        );
        assert_eq!(pack.trigger_probability(7), 0.5);
        assert_eq!(pack.trigger_probability(8), 0.5);
        assert_eq!(pack.rolls.get(7), Some(2));
    }

    #[test]
    fn rates_apply_when_weights_are_absent() {
        let pack = package(
            r#"{"PackID": 1, "PackContent": [[7, 1, 1], [8, 1, 1]], "GroupRates": [1, 3]}"#,
        );
        assert_eq!(pack.trigger_probability(8), 0.75);
    }

    #[test]
    fn awards_past_the_weight_list_fire_unconditionally() {
        let pack = package(
            r#"{"PackID": 1, "PackContent": [[7, 1, 1], [8, 1, 1]], "GroupWeight": [4]}"#,
        );
        assert_eq!(pack.trigger_probability(7), 1.0);
        assert_eq!(pack.trigger_probability(8), 1.0);
    }

    #[test]
    fn empty_entries_still_occupy_a_weight_slot() {
        let pack = package(
            r#"{"PackID": 1, "PackContent": [[], [7, 1, 1], [8, 1, 1]], "GroupWeight": [9, 1, 3]}"#,
        );
        assert_eq!(pack.rolls.len(), 2);
        assert_eq!(pack.trigger_probability(7), 0.25);
        assert_eq!(pack.trigger_probability(8), 0.75);
    }

    #[test]
    fn overflowing_roll_counts_are_rejected() {
        let entry: PackageEntry = serde_json::from_str(
            r#"{"PackID": 1, "PackContent": [[10, 1, 9223372036854775807], [10, 1, 1]]}"#,
        )
        .unwrap();
        let err = DropPackage::from_entry("1", &entry).unwrap_err();
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn large_roll_counts_that_fit_are_kept() {
        let pack = package(
            r#"{"PackID": 1, "PackContent": [[10, 1, 9223372036854775806], [10, 1, 1]]}"#,
        );
        assert_eq!(pack.rolls.get(10), Some(i64::MAX));
    }

    #[test]
    fn missing_pack_id_is_rejected() {
        let entry: PackageEntry = serde_json::from_str(r#"{"PackContent": []}"#).unwrap();
        let err = DropPackage::from_entry("42", &entry).unwrap_err();
        assert!(err.to_string().contains("PackID"));
        assert!(err.to_string().contains("42"));
    }
}
