//! Strategies choosing which model an engine attempts next

use std::fmt;

use rand::RngCore;
use serde::Deserialize;

use crate::rooms::uniform;

/// Chooses the next model from those with remaining budget
///
/// `remaining[i]` is the budget left for the i-th model of the engine pool.
/// Returns `None` once every budget is zero.
pub trait ModelPicker: fmt::Debug {
    fn pick(&mut self, remaining: &[usize], rng: &mut dyn RngCore) -> Option<usize>;
}

/// Uniform over the open models; one draw per pick
#[derive(Debug, Default)]
pub struct RandomPicker;

impl ModelPicker for RandomPicker {
    fn pick(&mut self, remaining: &[usize], rng: &mut dyn RngCore) -> Option<usize> {
        let open: Vec<usize> = (0..remaining.len()).filter(|&i| remaining[i] > 0).collect();
        if open.is_empty() {
            return None;
        }
        let slot = (uniform(rng, 0.0, open.len() as f64) as usize).min(open.len() - 1);
        Some(open[slot])
    }
}

/// Cycles through the pool in declaration order, skipping closed models
#[derive(Debug, Default)]
pub struct RoundRobinPicker {
    cursor: usize,
}

impl ModelPicker for RoundRobinPicker {
    fn pick(&mut self, remaining: &[usize], _rng: &mut dyn RngCore) -> Option<usize> {
        let n = remaining.len();
        let next = (0..n).map(|k| (self.cursor + k) % n).find(|&i| remaining[i] > 0)?;
        self.cursor = next + 1;
        Some(next)
    }
}

/// Largest remaining budget first, ties broken by declaration order
#[derive(Debug, Default)]
pub struct SizePicker;

impl ModelPicker for SizePicker {
    fn pick(&mut self, remaining: &[usize], _rng: &mut dyn RngCore) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, &left) in remaining.iter().enumerate() {
            if left > 0 && best.map_or(true, |b| left > remaining[b]) {
                best = Some(i);
            }
        }
        best
    }
}

/// Named picker strategy, as it appears in engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickerKind {
    #[default]
    Random,
    RoundRobin,
    Size,
}

impl PickerKind {
    pub fn build(&self) -> Box<dyn ModelPicker> {
        match self {
            PickerKind::Random => Box::new(RandomPicker),
            PickerKind::RoundRobin => Box::new(RoundRobinPicker::default()),
            PickerKind::Size => Box::new(SizePicker),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn drain(picker: &mut dyn ModelPicker, mut remaining: Vec<usize>) -> Vec<usize> {
        let mut rng = StdRng::seed_from_u64(0);
        let mut order = Vec::new();
        while let Some(i) = picker.pick(&remaining, &mut rng) {
            remaining[i] -= 1;
            order.push(i);
        }
        order
    }

    #[test]
    fn test_round_robin_skips_closed_models() {
        let order = drain(&mut RoundRobinPicker::default(), vec![2, 0, 3]);
        assert_eq!(order, vec![0, 2, 0, 2, 2]);
    }

    #[test]
    fn test_size_prefers_largest_budget() {
        let order = drain(&mut SizePicker, vec![1, 3, 2]);
        assert_eq!(order, vec![1, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_random_drains_every_budget() {
        let mut order = drain(&mut RandomPicker, vec![3, 1, 2]);
        order.sort_unstable();
        assert_eq!(order, vec![0, 0, 0, 1, 2, 2]);
    }

    #[test]
    fn test_empty_pool() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(PickerKind::RoundRobin.build().pick(&[], &mut rng), None);
        assert_eq!(PickerKind::Random.build().pick(&[0, 0], &mut rng), None);
    }
}
