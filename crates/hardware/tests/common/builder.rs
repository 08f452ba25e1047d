use shadowboard_core::config::{Config, UnitClassConfig};

/// Fluent builder for test configurations.
///
/// Starts from a single one-cycle class called `fu` rather than the default
/// unit mix, so tests only get the units they ask for.
#[derive(Debug)]
pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        let mut config = Config::default();
        config.units = vec![UnitClassConfig::new("fu", 2)];
        config.matrix.registers = 4;
        config.matrix.shadow_width = 1;
        config.general.stall_limit = 32;
        Self { config }
    }

    /// Replaces the unit classes with a single class of `count` units.
    pub fn units(mut self, count: usize) -> Self {
        self.config.units = vec![UnitClassConfig::new("fu", count)];
        self
    }

    /// Replaces the unit classes with `(name, count, latency)` entries.
    pub fn classes(mut self, classes: &[(&str, usize, u64)]) -> Self {
        self.config.units = classes
            .iter()
            .map(|&(name, count, latency)| {
                let mut class = UnitClassConfig::new(name, count);
                class.latency = latency;
                class
            })
            .collect();
        self
    }

    pub fn registers(mut self, registers: usize) -> Self {
        self.config.matrix.registers = registers;
        self
    }

    pub fn shadow_width(mut self, width: usize) -> Self {
        self.config.matrix.shadow_width = width;
        self
    }

    pub fn stall_limit(mut self, limit: u64) -> Self {
        self.config.general.stall_limit = limit;
        self
    }

    pub fn trace_ticks(mut self) -> Self {
        self.config.general.trace_ticks = true;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
