use crate::domain::model::{AggregatedEntry, CartReport, IngredientLine};
use std::collections::HashMap;

/// Merges ingredient lines that share both name and measurement unit.
///
/// Names are compared case-insensitively; units must match exactly, so
/// `("flour", "g")` and `("flour", "cup")` stay separate. Entries keep the
/// position where their key was first seen.
#[derive(Debug, Default)]
pub struct Aggregator {
    positions: HashMap<(String, String), usize>,
    entries: Vec<AggregatedEntry>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: &IngredientLine) {
        let key = (line.name.to_lowercase(), line.unit.clone());

        match self.positions.get(&key) {
            Some(&position) => {
                // u32 行數量累加進 u64，不會溢位
                self.entries[position].total_amount += u64::from(line.amount);
            }
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push(AggregatedEntry {
                    name: key.0,
                    total_amount: u64::from(line.amount),
                    unit: key.1,
                });
            }
        }
    }

    pub fn finish(self) -> CartReport {
        CartReport::from_entries(self.entries)
    }
}

pub fn aggregate<'a, I>(lines: I) -> CartReport
where
    I: IntoIterator<Item = &'a IngredientLine>,
{
    let mut aggregator = Aggregator::new();
    for line in lines {
        aggregator.push(line);
    }
    aggregator.finish()
}
