use super::domain::Dimension;

/// One constant per [`Dimension`], stored in [`Dimension::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionTable([f64; Dimension::COUNT]);

impl DimensionTable {
    pub const fn new(values: [f64; Dimension::COUNT]) -> Self {
        Self(values)
    }

    pub const fn get(&self, dimension: Dimension) -> f64 {
        self.0[dimension.index()]
    }

    pub fn with(mut self, dimension: Dimension, value: f64) -> Self {
        self.0[dimension.index()] = value;
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL
            .into_iter()
            .map(move |dimension| (dimension, self.get(dimension)))
    }
}

/// Reference maxima used to scale raw readings. AQI is the category ceiling,
/// CO is in mg/m³, PM in µg/m³, the gases in ppb.
pub const REFERENCE_MAXIMA: DimensionTable = DimensionTable::new([
    5.0,    // aqi
    1000.0, // co
    20.0,   // no
    20.0,   // no2
    200.0,  // o3
    20.0,   // so2
    50.0,   // pm2_5
    50.0,   // pm10
    20.0,   // nh3
]);

/// Hand-tuned importance of each dimension in the weighted pollution index.
pub const STATIC_WEIGHTS: DimensionTable = DimensionTable::new([
    3.0,    // aqi
    567.44, // co
    0.84,   // no
    7.37,   // no2
    110.15, // o3
    13.95,  // so2
    34.41,  // pm2_5
    40.07,  // pm10
    6.9,    // nh3
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_indexed_by_dimension() {
        assert_eq!(REFERENCE_MAXIMA.get(Dimension::Aqi), 5.0);
        assert_eq!(REFERENCE_MAXIMA.get(Dimension::O3), 200.0);
        assert_eq!(STATIC_WEIGHTS.get(Dimension::Co), 567.44);
        assert_eq!(STATIC_WEIGHTS.get(Dimension::Nh3), 6.9);
    }

    #[test]
    fn with_replaces_a_single_entry() {
        let table = REFERENCE_MAXIMA.with(Dimension::Pm10, 100.0);
        assert_eq!(table.get(Dimension::Pm10), 100.0);
        assert_eq!(table.get(Dimension::Pm25), 50.0);
        assert_eq!(table.iter().count(), Dimension::COUNT);
    }
}
