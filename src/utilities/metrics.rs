/// Minimum, mean and maximum of a population's costs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostSummary {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl CostSummary {
    pub fn new(costs: &[f64]) -> Option<CostSummary> {
        if costs.is_empty() {
            return None;
        }

        let min = costs.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = costs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        Some(CostSummary {
            min,
            mean: mean(costs),
            max,
        })
    }
}

pub fn mean(x: &[f64]) -> f64 {
    x.iter().sum::<f64>() / x.len() as f64
}
