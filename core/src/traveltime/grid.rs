use crate::prelude::{QuakeError, QuakeResult};
use crate::traveltime::TravelTimeTable;
use ndarray::Array2;

/// Precomputed depth x angle lookup table with bilinear interpolation.
///
/// Cells without an arrival hold `NaN`; a lookup touching one of them reports
/// no arrival.
#[derive(Debug, Clone)]
pub struct GridTravelTimeTable {
    depth_step_km: f64,
    angle_step_deg: f64,
    p_times: Array2<f64>,
    s_times: Array2<f64>,
}

impl GridTravelTimeTable {
    /// Samples `model` on a regular grid covering `[0, max_depth_km] x [0, max_angle_deg]`.
    pub fn from_model(
        model: &dyn TravelTimeTable,
        depth_step_km: f64,
        angle_step_deg: f64,
        max_depth_km: f64,
        max_angle_deg: f64,
    ) -> QuakeResult<Self> {
        let spans = [depth_step_km, angle_step_deg, max_depth_km, max_angle_deg];
        if spans.iter().any(|value| !value.is_finite() || *value <= 0.0) {
            return Err(QuakeError::TravelTimeTable(format!(
                "grid steps and extents must be positive, got {:?}",
                spans
            )));
        }

        let depth_cells = (max_depth_km / depth_step_km).ceil() as usize + 1;
        let angle_cells = (max_angle_deg / angle_step_deg).ceil() as usize + 1;
        let p_times = Array2::from_shape_fn((depth_cells, angle_cells), |(d, a)| {
            model
                .p_time(d as f64 * depth_step_km, a as f64 * angle_step_deg)
                .unwrap_or(f64::NAN)
        });
        let s_times = Array2::from_shape_fn((depth_cells, angle_cells), |(d, a)| {
            model
                .s_time(d as f64 * depth_step_km, a as f64 * angle_step_deg)
                .unwrap_or(f64::NAN)
        });
        log::debug!(
            "travel-time grid {}x{} ({} km, {} deg)",
            depth_cells,
            angle_cells,
            depth_step_km,
            angle_step_deg
        );

        Ok(Self {
            depth_step_km,
            angle_step_deg,
            p_times,
            s_times,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.p_times.dim()
    }

    fn interpolate(&self, grid: &Array2<f64>, depth_km: f64, angle_deg: f64) -> Option<f64> {
        if depth_km < 0.0 || angle_deg < 0.0 || !depth_km.is_finite() || !angle_deg.is_finite() {
            return None;
        }
        let (rows, cols) = grid.dim();
        let row = depth_km / self.depth_step_km;
        let col = angle_deg / self.angle_step_deg;
        let r0 = row.floor() as usize;
        let c0 = col.floor() as usize;
        if r0 >= rows || c0 >= cols {
            return None;
        }
        let r1 = (r0 + 1).min(rows - 1);
        let c1 = (c0 + 1).min(cols - 1);
        let fr = row - r0 as f64;
        let fc = col - c0 as f64;

        let top = grid[[r0, c0]] * (1.0 - fc) + grid[[r0, c1]] * fc;
        let bottom = grid[[r1, c0]] * (1.0 - fc) + grid[[r1, c1]] * fc;
        let value = top * (1.0 - fr) + bottom * fr;
        value.is_finite().then_some(value)
    }
}

impl TravelTimeTable for GridTravelTimeTable {
    fn p_time(&self, depth_km: f64, angle_deg: f64) -> Option<f64> {
        self.interpolate(&self.p_times, depth_km, angle_deg)
    }

    fn s_time(&self, depth_km: f64, angle_deg: f64) -> Option<f64> {
        self.interpolate(&self.s_times, depth_km, angle_deg)
    }
}
