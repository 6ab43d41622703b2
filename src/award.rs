use serde_json::Value;

use crate::error::{DropChanceError, Result};
use crate::math::{aggregate_weights, normalise, Tally};
use crate::tables::{as_float, as_int, AwardEntry, DROP_TABLE};

/// An award pool: the items one roll of the award can yield.
#[derive(Debug, Clone)]
pub struct AwardPool {
    pub award_id: i64,

    /// Probability of each item on a single roll, in first-seen order.
    pub items: Tally<f64>,
}

impl AwardPool {
    pub fn from_entry(key: &str, entry: &AwardEntry) -> Result<Self> {
        let award_id = entry
            .AwardID
            .as_ref()
            .and_then(as_int)
            .ok_or_else(|| DropChanceError::invalid(DROP_TABLE, key, "AwardID is missing"))?;

        let contents = entry.GroupContent.as_deref().unwrap_or_default();
        if contents.is_empty() {
            return Ok(Self {
                award_id,
                items: Tally::new(),
            });
        }

        let item_ids = contents
            .iter()
            .map(|content| content_item_id(key, content))
            .collect::<Result<Vec<i64>>>()?;

        let weights = pick_weights(entry)
            .map(|weights| {
                weights
                    .iter()
                    .take(contents.len())
                    .map(|weight| {
                        as_float(weight).ok_or_else(|| {
                            DropChanceError::invalid(
                                DROP_TABLE,
                                key,
                                format!("weight {weight} is not a number"),
                            )
                        })
                    })
                    .collect::<Result<Vec<f64>>>()
            })
            .transpose()?;

        let per_item = aggregate_weights(&item_ids, weights.as_deref());

        Ok(Self {
            award_id,
            items: normalise(&per_item),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items and their in-pool probabilities, ascending by item id.
    pub fn sorted_items(&self) -> Vec<(i64, f64)> {
        let mut items: Vec<(i64, f64)> = self.items.iter().collect();
        items.sort_by_key(|&(item_id, _)| item_id);
        items
    }
}

/// GroupWeight wins over GroupRates; an empty list counts as absent.
fn pick_weights(entry: &AwardEntry) -> Option<&[Value]> {
    [&entry.GroupWeight, &entry.GroupRates]
        .into_iter()
        .filter_map(|weights| weights.as_deref())
        .find(|weights| !weights.is_empty())
}

fn content_item_id(key: &str, content: &Value) -> Result<i64> {
    content
        .as_array()
        .and_then(|content| content.first())
        .and_then(as_int)
        .ok_or_else(|| {
            DropChanceError::invalid(
                DROP_TABLE,
                key,
                format!("GroupContent entry {content} has no item id"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(raw: &str) -> AwardEntry {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn unweighted_pools_count_duplicates() {
        let pool = AwardPool::from_entry(
            "1",
            &entry(r#"{"AwardID": 1, "GroupContent": [[10, 1], [20, 1], [10, 3], [30, 1]]}"#),
        )
        .unwrap();

        assert_eq!(pool.award_id, 1);
        assert_eq!(
            pool.sorted_items(),
            vec![(10, 0.5), (20, 0.25), (30, 0.25)]
        );
    }

    #[test]
    fn group_weight_takes_precedence_over_rates() {
        let pool = AwardPool::from_entry(
            "2",
            &entry(
                r#"{"AwardID": 2, "GroupContent": [[1], [2]],
                    "GroupWeight": [3, 1], "GroupRates": [1, 1]}"#,
            ),
        )
        .unwrap();
        assert_eq!(pool.items.get(1), Some(0.75));
        assert_eq!(pool.items.get(2), Some(0.25));
    }

    #[test]
    fn empty_weight_list_falls_through_to_rates() {
        let pool = AwardPool::from_entry(
            "3",
            &entry(
                r#"{"AwardID": 3, "GroupContent": [[1], [2]],
                    "GroupWeight": [], "GroupRates": ["1", "3"]}"#,
            ),
        )
        .unwrap();
        assert_eq!(pool.items.get(2), Some(0.75));
    }

    #[test]
    fn short_weight_lists_drop_trailing_items() {
        let pool = AwardPool::from_entry(
            "4",
            &entry(r#"{"AwardID": 4, "GroupContent": [[1], [2], [3]], "GroupWeight": [1, 1]}"#),
        )
        .unwrap();
        assert_eq!(pool.items.len(), 2);
        assert_eq!(pool.items.get(3), None);
    }

    #[test]
    fn zero_weights_split_evenly() {
        let pool = AwardPool::from_entry(
            "5",
            &entry(r#"{"AwardID": 5, "GroupContent": [[1], [2]], "GroupWeight": [0, 0]}"#),
        )
        .unwrap();
        assert_eq!(pool.sorted_items(), vec![(1, 0.5), (2, 0.5)]);
    }

    #[test]
    fn missing_content_is_an_empty_pool() {
        let pool = AwardPool::from_entry("6", &entry(r#"{"AwardID": 6, "GroupContent": null}"#))
            .unwrap();
        assert!(pool.is_empty());
    }

    #[test]
    fn missing_award_id_is_rejected() {
        let err = AwardPool::from_entry("7", &entry(r#"{"GroupContent": [[1]]}"#)).unwrap_err();
        assert!(err.to_string().contains("AwardID"));
    }

    #[test]
    fn content_without_item_id_is_rejected() {
        let err = AwardPool::from_entry("8", &entry(r#"{"AwardID": 8, "GroupContent": [[]]}"#))
            .unwrap_err();
        assert!(matches!(err, DropChanceError::InvalidEntry { .. }));
    }
}
