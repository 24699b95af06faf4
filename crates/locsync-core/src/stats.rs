//! Coverage counts of a target against the reference.

use crate::catalog::{Branch, KeyPath, Slot};
use crate::walk::{Drive, Visitor, walk_paired};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    /// Reference leaf count.
    pub total_keys: usize,
    /// Reference leaf paths that are leaves in the target.
    pub present_keys: usize,
    /// Present keys whose target value is `""`.
    pub empty_keys: usize,
}

impl CatalogStats {
    pub fn missing_keys(&self) -> usize {
        self.total_keys.saturating_sub(self.present_keys)
    }

    /// Present-and-non-empty share of the reference, in `[0, 1]`.
    pub fn coverage(&self) -> f64 {
        if self.total_keys == 0 {
            return 1.0;
        }
        let translated = self.present_keys.saturating_sub(self.empty_keys);
        translated as f64 / self.total_keys as f64
    }
}

struct Counter {
    stats: CatalogStats,
}

impl Visitor for Counter {
    fn leaf(&mut self, _path: &KeyPath, _value: &Value, opposing: Slot<'_>) {
        self.stats.total_keys += 1;
        if let Slot::Leaf(value) = opposing {
            self.stats.present_keys += 1;
            if value.as_str() == Some("") {
                self.stats.empty_keys += 1;
            }
        }
    }
}

pub fn stats(reference: &Branch, target: &Branch) -> CatalogStats {
    let mut counter = Counter {
        stats: CatalogStats::default(),
    };
    walk_paired(reference, target, Drive::Reference, &mut counter);
    counter.stats
}
