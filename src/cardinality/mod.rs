/// Decides when all the topology series have to be cleared, before publishing.
///
/// Kafka topics, partitions and brokers come and go: a series that is not published
/// anymore remains exposed at its last value. Clearing every `threshold` polls bounds
/// for how long such a series survives, and so the amount of series in the registry.
///
/// The counter lives for the whole process lifetime, and is only ever advanced
/// by polls that got to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardinalityResetPolicy {
    cycle_index: u32,
    threshold: u32,
}

impl CardinalityResetPolicy {
    /// Create a new [`CardinalityResetPolicy`].
    ///
    /// # Arguments
    ///
    /// * `threshold` - Amount of polls published between two clears; `0` is treated as `1`
    pub fn new(threshold: u32) -> Self {
        Self {
            cycle_index: 0,
            threshold: threshold.max(1),
        }
    }

    /// Polls published since the latest clear (or since startup).
    pub fn cycle_index(&self) -> u32 {
        self.cycle_index
    }

    /// Account for a poll about to publish, returning `true` if series must be cleared first.
    ///
    /// Once `threshold` polls have been published, the next one clears:
    /// the counter restarts, counting the clearing poll as the first of the new window.
    pub fn advance(&mut self) -> bool {
        let clear = self.cycle_index >= self.threshold;
        if clear {
            self.cycle_index = 0;
        }
        self.cycle_index += 1;

        clear
    }
}
