pub const HEADER: [&str; 8] = [
    "AwardID",
    "PackID",
    "ItemID",
    "ItemName",
    "Rolls",
    "InPoolProbability",
    "PackTriggerProbability",
    "FinalPerRunProbability",
];

/// One row of a drop chance report.
#[derive(Debug, Clone, PartialEq)]
pub struct DropChance {
    pub award_id: i64,
    pub pack_id: i64,
    pub item_id: i64,
    pub item_name: String,

    /// Total rolls of the award within the package.
    pub rolls: i64,

    /// Probability of the item on a single roll of the award.
    pub in_pool: f64,

    /// Probability that the package fires the award.
    pub pack_trigger: f64,

    /// Probability of the item at least once per run of the package.
    pub final_per_run: f64,
}

impl DropChance {
    /// The CSV record, probabilities fixed to `precision` decimals.
    pub fn record(&self, precision: usize) -> [String; 8] {
        [
            self.award_id.to_string(),
            self.pack_id.to_string(),
            self.item_id.to_string(),
            self.item_name.clone(),
            self.rolls.to_string(),
            format_probability(self.in_pool, precision),
            format_probability(self.pack_trigger, precision),
            format_probability(self.final_per_run, precision),
        ]
    }

    pub fn sort_key(&self) -> (i64, i64, i64) {
        (self.award_id, self.pack_id, self.item_id)
    }
}

/// ```
/// use dropchance::chance::format_probability;
///
/// assert_eq!(format_probability(0.25, 6), "0.250000");
/// assert_eq!(format_probability(1.0 / 3.0, 4), "0.3333");
/// assert_eq!(format_probability(f64::NAN, 6), "nan");
/// ```
pub fn format_probability(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    format!("{value:.precision$}")
}
