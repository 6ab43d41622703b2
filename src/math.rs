use std::collections::HashMap;
use std::ops::AddAssign;

/// Per-key accumulator that remembers first-insertion order.
///
/// Totals are summed in that order, so float results do not depend on hashing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tally<V> {
    entries: Vec<(i64, V)>,
    index: HashMap<i64, usize>,
}

impl<V: Copy + Default + AddAssign> Tally<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Adds `value` to the running total for `key`.
    /// ```
    /// let mut tally = dropchance::math::Tally::new();
    /// tally.add(7, 2);
    /// tally.add(3, 1);
    /// tally.add(7, 5);
    /// assert_eq!(tally.get(7), Some(7));
    /// assert_eq!(tally.keys().collect::<Vec<_>>(), vec![7, 3]);
    /// ```
    pub fn add(&mut self, key: i64, value: V) {
        match self.index.get(&key) {
            Some(&position) => self.entries[position].1 += value,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: i64) -> Option<V> {
        self.index.get(&key).map(|&position| self.entries[position].1)
    }

    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, V)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> V {
        self.entries.iter().fold(V::default(), |mut total, (_, value)| {
            total += *value;
            total
        })
    }

    fn map_values(&self, f: impl Fn(V) -> V) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|&(key, value)| (key, f(value)))
                .collect(),
            index: self.index.clone(),
        }
    }
}

impl Tally<i64> {
    /// Adds `value` to the total for `key`, or returns `None` if the total would overflow.
    /// ```
    /// let mut tally: dropchance::math::Tally<i64> = dropchance::math::Tally::new();
    /// assert_eq!(tally.checked_add(1, i64::MAX), Some(i64::MAX));
    /// assert_eq!(tally.checked_add(1, 1), None);
    /// assert_eq!(tally.get(1), Some(i64::MAX));
    /// ```
    pub fn checked_add(&mut self, key: i64, value: i64) -> Option<i64> {
        match self.index.get(&key) {
            Some(&position) => {
                let total = self.entries[position].1.checked_add(value)?;
                self.entries[position].1 = total;
                Some(total)
            }
            None => {
                self.add(key, value);
                Some(value)
            }
        }
    }
}

/// Sums weights per id. Without weights every occurrence counts once.
/// Ids past the end of `weights` are not counted at all.
/// A non-positive total resets every id to an equal weight of 1.0.
/// ```
/// let tally = dropchance::math::aggregate_weights(&[1, 2, 1], None);
/// assert_eq!(tally.get(1), Some(2.0));
/// assert_eq!(tally.get(2), Some(1.0));
///
/// let tally = dropchance::math::aggregate_weights(&[1, 2, 3], Some(&[5.0, 3.0]));
/// assert_eq!(tally.get(2), Some(3.0));
/// assert_eq!(tally.get(3), None);
///
/// let tally = dropchance::math::aggregate_weights(&[4, 5], Some(&[0.0, 0.0]));
/// assert_eq!(tally.total(), 2.0);
/// ```
pub fn aggregate_weights(ids: &[i64], weights: Option<&[f64]>) -> Tally<f64> {
    let mut per_item = Tally::new();

    match weights {
        None => ids.iter().for_each(|&id| per_item.add(id, 1.0)),
        Some(weights) => ids
            .iter()
            .zip(weights)
            .for_each(|(&id, &weight)| per_item.add(id, weight)),
    }

    if per_item.total() <= 0.0 && !per_item.is_empty() {
        per_item = per_item.map_values(|_| 1.0);
    }

    per_item
}

/// Scales values so they sum to one, falling back to an even split.
/// ```
/// let mut tally = dropchance::math::Tally::new();
/// tally.add(1, 3.0);
/// tally.add(2, 1.0);
/// let probs = dropchance::math::normalise(&tally);
/// assert_eq!(probs.get(1), Some(0.75));
/// assert_eq!(probs.get(2), Some(0.25));
///
/// let mut zeros = dropchance::math::Tally::new();
/// zeros.add(1, 0.0);
/// zeros.add(2, 0.0);
/// assert_eq!(dropchance::math::normalise(&zeros).get(2), Some(0.5));
/// ```
pub fn normalise(values: &Tally<f64>) -> Tally<f64> {
    let total = values.total();
    if total <= 0.0 {
        if values.is_empty() {
            return Tally::new();
        }
        let equal = 1.0 / values.len() as f64;
        return values.map_values(|_| equal);
    }
    values.map_values(|value| value / total)
}

/// Chance of seeing an item at least once across `rolls` draws of a pool,
/// scaled by the chance that the pool is triggered at all.
/// ```
/// let p = dropchance::math::per_run_probability(1.0, 0.5, 2);
/// assert_eq!(p, 0.75);
///
/// let p = dropchance::math::per_run_probability(0.5, 0.25, 1);
/// assert_eq!(p, 0.125);
///
/// let p = dropchance::math::per_run_probability(1.0, 0.3, 0);
/// assert_eq!(p, 0.0);
/// ```
#[inline]
pub fn per_run_probability(trigger: f64, in_pool: f64, rolls: i64) -> f64 {
    trigger * (1.0 - (1.0 - in_pool).powf(rolls as f64))
}
