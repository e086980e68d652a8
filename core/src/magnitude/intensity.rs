/// Maps distance-corrected amplitude to magnitude.
pub trait IntensityTable: Send + Sync {
    fn magnitude(&self, distance_km: f64, amplitude_ratio: f64) -> f64;
}

/// Richter-style local magnitude relation on the amplitude ratio:
/// `log10(A) + 1.110 log10(R) + 0.00189 R - 2.09`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalMagnitudeTable;

impl LocalMagnitudeTable {
    const MIN_DISTANCE_KM: f64 = 1.0;
    const MIN_AMPLITUDE: f64 = 1e-6;

    fn distance_term(distance_km: f64) -> f64 {
        let r = distance_km.max(Self::MIN_DISTANCE_KM);
        1.110 * r.log10() + 0.00189 * r - 2.09
    }

    /// Amplitude ratio a station at `distance_km` sees from a quake of `magnitude`.
    pub fn amplitude(&self, magnitude: f64, distance_km: f64) -> f64 {
        10f64.powf(magnitude - Self::distance_term(distance_km))
    }
}

impl IntensityTable for LocalMagnitudeTable {
    fn magnitude(&self, distance_km: f64, amplitude_ratio: f64) -> f64 {
        amplitude_ratio.max(Self::MIN_AMPLITUDE).log10() + Self::distance_term(distance_km)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amplitude_inverts_magnitude() {
        let table = LocalMagnitudeTable;
        let amplitude = table.amplitude(4.5, 120.0);
        assert!((table.magnitude(120.0, amplitude) - 4.5).abs() < 1e-9);
    }

    #[test]
    fn farther_stations_need_less_amplitude_for_same_magnitude() {
        let table = LocalMagnitudeTable;
        assert!(table.magnitude(300.0, 100.0) > table.magnitude(30.0, 100.0));
    }
}
