use crate::{Field, IndicatorSnapshot};

/// Ordinary least-squares slope of `values` against their index
/// (degree-1 polynomial fit).
///
/// `None` for fewer than two points or a non-finite result.
pub(crate) fn slope(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let mean_x = (values.len() - 1) as f64 / 2.0;
    // Centred on the first value: the fit is shift-invariant and a
    // constant series yields exactly zero.
    let origin = values[0];

    let (sxy, sxx) = (0_u32..)
        .zip(values)
        .fold((0.0, 0.0), |(sxy, sxx), (i, &y)| {
            let dx = f64::from(i) - mean_x;
            (dx.mul_add(y - origin, sxy), dx.mul_add(dx, sxx))
        });

    let slope = sxy / sxx;
    slope.is_finite().then_some(slope)
}

/// Slope of one snapshot field across `window`, or the field if any value
/// is undefined.
pub(crate) fn field_slope(window: &[IndicatorSnapshot], field: Field) -> Result<f64, Field> {
    let values = window
        .iter()
        .map(|s| s.require(field))
        .collect::<Result<Vec<_>, _>>()?;
    slope(&values).ok_or(field)
}

/// Slope of the MACD histogram across `window`.
pub(crate) fn histogram_slope(window: &[IndicatorSnapshot]) -> Result<f64, Field> {
    let values = window
        .iter()
        .map(IndicatorSnapshot::require_histogram)
        .collect::<Result<Vec<_>, _>>()?;
    slope(&values).ok_or(Field::Macd)
}
