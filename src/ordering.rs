/*
 * This file is part of sensors-monitor.
 *
 * Copyright (C) 2025 sensors-monitor contributors
 *
 * sensors-monitor is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * sensors-monitor is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with sensors-monitor. If not, see <https://www.gnu.org/licenses/>.
 */

//! Display order of chips.
//!
//! Each chip id is tested against an ordered rule table; the first rule whose
//! prefix matches gives the rank. Chips matching nothing sort last.

use lazy_static::lazy_static;
use regex::Regex;

/// Rank of chips no rule matches. One below `u32::MAX` so a stricter
/// "always last" value is still available.
pub const UNRANKED: u32 = u32::MAX - 1;

lazy_static! {
    static ref DEFAULT_ORDER: ChipOrder = ChipOrder::from_prefixes(&[
        ("coretemp-", 1),
        ("drivetemp-", 2),
        ("nvme-", 3),
        ("acpitz-", 4),
    ]);
}

#[derive(Debug, Clone)]
pub struct ChipOrder {
    rules: Vec<(Regex, u32)>,
}

impl ChipOrder {
    /// Build a rule table from literal chip-id prefixes, in priority order.
    pub fn from_prefixes(prefixes: &[(&str, u32)]) -> Self {
        let rules = prefixes
            .iter()
            .map(|(prefix, rank)| {
                let pattern = format!("^{}", regex::escape(prefix));
                // escaped literal behind an anchor always compiles
                let re = Regex::new(&pattern).expect("escaped prefix is a valid regex");
                (re, *rank)
            })
            .collect();
        Self { rules }
    }

    pub fn rank(&self, chip_id: &str) -> u32 {
        self.rules
            .iter()
            .find(|(re, _)| re.is_match(chip_id))
            .map(|(_, rank)| *rank)
            .unwrap_or(UNRANKED)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for ChipOrder {
    fn default() -> Self {
        DEFAULT_ORDER.clone()
    }
}

/// Rank of `chip_id` under the built-in rule table.
pub fn chip_rank(chip_id: &str) -> u32 {
    DEFAULT_ORDER.rank(chip_id)
}
