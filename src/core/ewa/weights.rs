use crate::error::{Error, Result};

/// Gaussian weight lookup indexed by the normalized squared ellipse distance `q`.
///
/// `table[i] = exp(-alpha * qmax * i / (count - 1))` with `alpha = -ln(weight_min) / qmax`,
/// so the first entry is 1 and the last is `weight_min`.
#[derive(Debug, Clone)]
pub struct WeightTable {
    table: Vec<f32>,
    qmax: f64,
    qfactor: f64,
    distance_max: f64,
    weight_min: f64,
}

impl WeightTable {
    pub fn new(count: usize, weight_min: f64, distance_max: f64) -> Result<Self> {
        if count < 2 {
            return Err(Error::invalid("weight_count", count));
        }
        if !(weight_min > 0.0 && weight_min < 1.0) {
            return Err(Error::invalid("weight_min", weight_min));
        }
        if !(distance_max > 0.0) {
            return Err(Error::invalid("weight_distance_max", distance_max));
        }

        let qmax = distance_max * distance_max;
        let alpha = -weight_min.ln() / qmax;
        let qfactor = count as f64 / qmax;
        let step = qmax / (count - 1) as f64;
        let table = (0..count)
            .map(|i| (-alpha * step * i as f64).exp() as f32)
            .collect();

        Ok(Self {
            table,
            qmax,
            qfactor,
            distance_max,
            weight_min,
        })
    }

    /// Weight for an in-footprint `q`. Callers check `q < f` first.
    #[inline]
    pub fn lookup(&self, q: f64) -> f32 {
        let last = self.table.len() - 1;
        let index = ((q * self.qfactor) as usize).min(last);
        self.table[index]
    }

    pub fn weights(&self) -> &[f32] {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn qmax(&self) -> f64 {
        self.qmax
    }

    pub fn qfactor(&self) -> f64 {
        self.qfactor
    }

    pub fn distance_max(&self) -> f64 {
        self.distance_max
    }

    pub fn weight_min(&self) -> f64 {
        self.weight_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn monotonic_with_expected_endpoints() {
        let wt = WeightTable::new(10000, 0.01, 1.0).unwrap();
        let w = wt.weights();
        assert!(w.windows(2).all(|p| p[0] >= p[1]));
        assert_abs_diff_eq!(w[0] as f64, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(w[w.len() - 1] as f64, 0.01, epsilon = 1e-6);
    }

    #[test]
    fn two_entry_table() {
        let wt = WeightTable::new(2, 0.5, 1.0).unwrap();
        assert_abs_diff_eq!(wt.weights()[0], 1.0, epsilon = 1e-7);
        assert_abs_diff_eq!(wt.weights()[1], 0.5, epsilon = 1e-7);
        assert_eq!(wt.qfactor(), 2.0);
        assert_eq!(wt.lookup(0.0), wt.weights()[0]);
        assert_eq!(wt.lookup(0.49), wt.weights()[0]);
        assert_eq!(wt.lookup(0.5), wt.weights()[1]);
        // Past the table end clamps to the last entry
        assert_eq!(wt.lookup(3.0), wt.weights()[1]);
    }

    #[test]
    fn distance_scales_qmax() {
        let wt = WeightTable::new(100, 0.01, 2.0).unwrap();
        assert_eq!(wt.qmax(), 4.0);
        assert_eq!(wt.qfactor(), 25.0);
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(WeightTable::new(1, 0.01, 1.0).is_err());
        assert!(WeightTable::new(10, 0.0, 1.0).is_err());
        assert!(WeightTable::new(10, 1.5, 1.0).is_err());
        assert!(WeightTable::new(10, 0.01, 0.0).is_err());
    }
}
