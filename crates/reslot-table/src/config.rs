//! Slot table configuration parameters.

use reslot_core::{ConfigError, Generation};

/// What happens to a slot whose generation counter is exhausted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GenerationPolicy {
    /// Take the slot out of circulation for the rest of the table's life.
    ///
    /// Costs one slot of memory per exhausted counter but rules out a very
    /// old handle ever matching a new occupant.
    #[default]
    Retire,
    /// Wrap the generation back to zero and keep reusing the slot.
    ///
    /// A handle held across a full wrap of its slot's counter will read as
    /// live again.
    Wrap,
}

/// Configuration for a slot table.
///
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableConfig {
    /// Number of slots to reserve up front.
    ///
    /// Default: 64. Reserving avoids reallocations during start-up; the
    /// table still grows on demand past this.
    pub initial_capacity: usize,

    /// Highest generation a slot may reach.
    ///
    /// Default: `u32::MAX`. Lowering it is mostly useful for exercising
    /// the exhaustion path in tests.
    pub max_generation: Generation,

    /// Behaviour once a slot's generation reaches `max_generation` and the
    /// slot is freed again.
    pub generation_policy: GenerationPolicy,
}

impl TableConfig {
    /// Default number of pre-reserved slots.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 64;

    /// Default generation ceiling.
    pub const DEFAULT_MAX_GENERATION: Generation = Generation(u32::MAX);

    /// Largest number of slots a table can address.
    pub const MAX_SLOTS: usize = u32::MAX as usize;

    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            max_generation: Self::DEFAULT_MAX_GENERATION,
            generation_policy: GenerationPolicy::default(),
        }
    }

    /// Check the config for values the table cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_generation == Generation::ZERO {
            return Err(ConfigError::ZeroMaxGeneration);
        }
        if self.initial_capacity > Self::MAX_SLOTS {
            return Err(ConfigError::CapacityTooLarge {
                requested: self.initial_capacity,
                max: Self::MAX_SLOTS,
            });
        }
        Ok(())
    }

    /// The generation a slot moves to when freed, or `None` if the slot
    /// must be retired instead.
    pub(crate) fn next_generation(&self, current: Generation) -> Option<Generation> {
        match self.generation_policy {
            GenerationPolicy::Retire => current.checked_next(self.max_generation),
            GenerationPolicy::Wrap => Some(current.wrapping_next(self.max_generation)),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(TableConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_max_generation_rejected() {
        let config = TableConfig {
            max_generation: Generation::ZERO,
            ..TableConfig::new()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxGeneration));
    }

    #[test]
    fn retire_policy_stops_at_ceiling() {
        let config = TableConfig {
            max_generation: Generation(2),
            ..TableConfig::new()
        };
        assert_eq!(config.next_generation(Generation(1)), Some(Generation(2)));
        assert_eq!(config.next_generation(Generation(2)), None);
    }

    #[test]
    fn wrap_policy_returns_to_zero() {
        let config = TableConfig {
            max_generation: Generation(2),
            generation_policy: GenerationPolicy::Wrap,
            ..TableConfig::new()
        };
        assert_eq!(config.next_generation(Generation(2)), Some(Generation::ZERO));
    }
}
