//! Plate Resolver
//!
//! Conversion between the total load of a barbell and the plates loaded onto each side of it.
//! Plates are always loaded symmetrically, so every plate on one side counts twice.
//!
//! Invalid requests (negative weights or plate counts) result in `None`. A remainder that cannot
//! be represented by the available plates is dropped silently, which is an approximation and not
//! an invalid request.

/// Plate weights in kg available by default, heaviest first.
pub const DENOMINATIONS: [f32; 4] = [20.0, 15.0, 10.0, 5.0];

/// Tolerance for rounding errors relative to the remaining weight.
///
/// The allocation is computed with `f64`, so the tolerance stays far below the `f32` resolution
/// of the input weights and never accounts for a missing plate.
const RELATIVE_TOLERANCE: f64 = 4.0 * f64::EPSILON;

/// Number of plates of each default denomination on *one* side of the bar.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlateSet {
    pub p20: i32,
    pub p15: i32,
    pub p10: i32,
    pub p5: i32,
}

impl PlateSet {
    #[must_use]
    pub fn counts(&self) -> [i32; 4] {
        [self.p20, self.p15, self.p10, self.p5]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts().iter().all(|c| *c == 0)
    }
}

impl From<[i32; 4]> for PlateSet {
    fn from(value: [i32; 4]) -> Self {
        let [p20, p15, p10, p5] = value;
        Self { p20, p15, p10, p5 }
    }
}

/// Calculate the total weight of a bar loaded with `plate_set` on each side.
///
/// Returns `None` if the bar weight or any plate count is negative.
#[must_use]
pub fn total_weight(bar_weight: f32, plate_set: &PlateSet) -> Option<f32> {
    PlateInventory::default().total(bar_weight, &plate_set.counts())
}

/// Determine the plates per side needed to load a bar to `target_weight`.
///
/// Plates are allocated greedily starting with the heaviest plate. A remainder lighter than the
/// lightest plate is dropped. A target weight below the bar weight results in no plates.
///
/// Returns `None` if the bar weight or the target weight is negative. Plate counts beyond
/// `i32::MAX` saturate.
#[must_use]
pub fn plate_set(bar_weight: f32, target_weight: f32) -> Option<PlateSet> {
    let counts = PlateInventory::default().plates(bar_weight, target_weight)?;
    let mut result = [0; 4];
    for (r, c) in result.iter_mut().zip(counts) {
        *r = i32::try_from(c).unwrap_or(i32::MAX);
    }
    Some(PlateSet::from(result))
}

/// Weight per side which is dropped by [`plate_set`].
#[must_use]
pub fn remainder(bar_weight: f32, target_weight: f32) -> Option<f32> {
    PlateInventory::default().remainder(bar_weight, target_weight)
}

/// A set of distinct plate weights, sorted in descending order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateInventory {
    denominations: Vec<f32>,
}

impl PlateInventory {
    pub fn new(denominations: &[f32]) -> Result<Self, PlateError> {
        if denominations.is_empty() {
            return Err(PlateError::Empty);
        }

        if let Some(d) = denominations.iter().find(|d| !d.is_finite() || **d <= 0.0) {
            return Err(PlateError::InvalidDenomination(*d));
        }

        let mut denominations = denominations.to_vec();
        denominations.sort_by(|a, b| b.total_cmp(a));
        denominations.dedup();

        Ok(Self { denominations })
    }

    #[must_use]
    pub fn denominations(&self) -> &[f32] {
        &self.denominations
    }

    /// Total weight of the bar with `counts` plates of each denomination on each side.
    ///
    /// `counts` must contain one entry per denomination.
    #[must_use]
    pub fn total(&self, bar_weight: f32, counts: &[i32]) -> Option<f32> {
        if bar_weight < 0.0
            || counts.len() != self.denominations.len()
            || counts.iter().any(|c| *c < 0)
        {
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let per_side = self
            .denominations
            .iter()
            .zip(counts)
            .map(|(d, c)| *c as f32 * d)
            .sum::<f32>();

        Some(bar_weight + 2.0 * per_side)
    }

    /// Plates per side for each denomination needed to reach `target_weight`.
    #[must_use]
    pub fn plates(&self, bar_weight: f32, target_weight: f32) -> Option<Vec<u32>> {
        self.allocate(bar_weight, target_weight)
            .map(|(counts, _)| counts)
    }

    /// Plates per side paired with their weight, omitting unused denominations.
    #[must_use]
    pub fn load(&self, bar_weight: f32, target_weight: f32) -> Option<Loading> {
        let (counts, remainder) = self.allocate(bar_weight, target_weight)?;
        Some(Loading {
            plates: self
                .denominations
                .iter()
                .zip(counts)
                .filter(|(_, c)| *c > 0)
                .map(|(d, c)| (*d, c))
                .collect(),
            remainder,
        })
    }

    /// Weight per side which cannot be represented by the denominations.
    #[must_use]
    pub fn remainder(&self, bar_weight: f32, target_weight: f32) -> Option<f32> {
        self.allocate(bar_weight, target_weight)
            .map(|(_, remaining)| remaining)
    }

    /// Counts beyond `u32::MAX` saturate.
    fn allocate(&self, bar_weight: f32, target_weight: f32) -> Option<(Vec<u32>, f32)> {
        if bar_weight < 0.0 || target_weight < 0.0 {
            return None;
        }

        let mut remaining = ((f64::from(target_weight) - f64::from(bar_weight)) / 2.0).max(0.0);
        let counts = self
            .denominations
            .iter()
            .map(|d| {
                let d = f64::from(*d);
                let limit = remaining + remaining * RELATIVE_TOLERANCE;
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let count = (limit / d).floor() as u32;
                let count = if f64::from(count) * d > limit {
                    count - 1
                } else {
                    count
                };
                remaining = (remaining - f64::from(count) * d).max(0.0);
                count
            })
            .collect();

        #[allow(clippy::cast_possible_truncation)]
        let remainder = remaining as f32;

        Some((counts, remainder))
    }
}

impl Default for PlateInventory {
    fn default() -> Self {
        Self {
            denominations: DENOMINATIONS.to_vec(),
        }
    }
}

/// Plates to load onto each side of the bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Loading {
    pub plates: Vec<(f32, u32)>,
    pub remainder: f32,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum PlateError {
    #[error("At least one plate weight is required")]
    Empty,
    #[error("Plate weight must be a positive number ({0})")]
    InvalidDenomination(f32),
}
