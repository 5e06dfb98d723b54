use crate::foundation::error::{KawaraError, KawaraResult};

/// Behavior of [`interpolate`] outside the breakpoint range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolate {
    /// Hold the boundary output value.
    #[default]
    Clamp,
    /// Continue the slope of the boundary segment.
    Extend,
}

/// Piecewise-linear keyframe interpolation.
///
/// Maps `x` through matching `input`/`output` breakpoint arrays. Between
/// breakpoints the value is exact linear interpolation of the bracketing
/// pair; outside the range the per-side policy applies. A single-breakpoint
/// table returns its single output for every `x`.
///
/// Fails with [`KawaraError::InvalidKeyframeSpec`] when the arrays are
/// empty, of mismatched length, or the inputs are not non-decreasing.
pub fn interpolate(
    x: f64,
    input: &[f64],
    output: &[f64],
    left: Extrapolate,
    right: Extrapolate,
) -> KawaraResult<f64> {
    validate_breakpoints(input, output)?;
    Ok(sample_unchecked(x, input, output, left, right))
}

/// [`interpolate`] with clamp on both sides, the common case for overlay
/// fade and progress ramps.
pub fn interpolate_clamped(x: f64, input: &[f64], output: &[f64]) -> KawaraResult<f64> {
    interpolate(x, input, output, Extrapolate::Clamp, Extrapolate::Clamp)
}

fn validate_breakpoints(input: &[f64], output: &[f64]) -> KawaraResult<()> {
    if input.is_empty() {
        return Err(KawaraError::keyframe_spec("breakpoint arrays are empty"));
    }
    if input.len() != output.len() {
        return Err(KawaraError::keyframe_spec(format!(
            "input has {} breakpoints but output has {}",
            input.len(),
            output.len()
        )));
    }
    for pair in input.windows(2) {
        if pair[1] < pair[0] {
            return Err(KawaraError::keyframe_spec(format!(
                "inputs must be non-decreasing, found {} after {}",
                pair[1], pair[0]
            )));
        }
    }
    for (i, v) in input.iter().chain(output.iter()).enumerate() {
        if !v.is_finite() {
            return Err(KawaraError::keyframe_spec(format!(
                "breakpoint value at flat index {i} is not finite"
            )));
        }
    }
    Ok(())
}

fn sample_unchecked(
    x: f64,
    input: &[f64],
    output: &[f64],
    left: Extrapolate,
    right: Extrapolate,
) -> f64 {
    let n = input.len();
    if n == 1 {
        return output[0];
    }

    if x <= input[0] {
        return match left {
            Extrapolate::Clamp => output[0],
            Extrapolate::Extend => extend_segment(x, input[0], input[1], output[0], output[1]),
        };
    }
    if x >= input[n - 1] {
        return match right {
            Extrapolate::Clamp => output[n - 1],
            Extrapolate::Extend => {
                extend_segment(x, input[n - 2], input[n - 1], output[n - 2], output[n - 1])
            }
        };
    }

    // First breakpoint strictly greater than x brackets the segment on the
    // right; x < input[n-1] guarantees it exists.
    let hi = input.partition_point(|&i| i <= x);
    let lo = hi - 1;
    let denom = input[hi] - input[lo];
    if denom == 0.0 {
        return output[lo];
    }
    let t = (x - input[lo]) / denom;
    output[lo] + (output[hi] - output[lo]) * t
}

fn extend_segment(x: f64, i0: f64, i1: f64, o0: f64, o1: f64) -> f64 {
    let denom = i1 - i0;
    if denom == 0.0 {
        return o0;
    }
    o0 + (o1 - o0) * ((x - i0) / denom)
}

/// A validated breakpoint table, for curves sampled at many frames.
///
/// Validation runs once in [`Curve::new`]; [`Curve::at`] cannot fail.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Curve {
    input: Vec<f64>,
    output: Vec<f64>,
    #[serde(default)]
    left: Extrapolate,
    #[serde(default)]
    right: Extrapolate,
}

impl Curve {
    pub fn new(input: Vec<f64>, output: Vec<f64>) -> KawaraResult<Self> {
        Self::with_extrapolate(input, output, Extrapolate::Clamp, Extrapolate::Clamp)
    }

    pub fn with_extrapolate(
        input: Vec<f64>,
        output: Vec<f64>,
        left: Extrapolate,
        right: Extrapolate,
    ) -> KawaraResult<Self> {
        validate_breakpoints(&input, &output)?;
        Ok(Self {
            input,
            output,
            left,
            right,
        })
    }

    pub fn at(&self, x: f64) -> f64 {
        sample_unchecked(x, &self.input, &self.output, self.left, self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_between_breakpoints() {
        let y = interpolate_clamped(5.0, &[0.0, 10.0], &[0.0, 1.0]).unwrap();
        assert_eq!(y, 0.5);
    }

    #[test]
    fn output_stays_between_bracketing_pair() {
        let input = [0.0, 8.0, 16.0, 24.0, 30.0];
        let output = [1.0, 1.12, 0.95, 1.06, 1.0];
        for x in [0.0, 3.0, 8.0, 11.5, 16.0, 29.0, 30.0] {
            let y = interpolate_clamped(x, &input, &output).unwrap();
            let hi = input.partition_point(|&i| i <= x).min(input.len() - 1);
            let lo = hi.saturating_sub(1);
            let (a, b) = (output[lo].min(output[hi]), output[lo].max(output[hi]));
            assert!(y >= a && y <= b, "x={x} y={y} not in [{a},{b}]");
        }
    }

    #[test]
    fn exact_breakpoint_hits() {
        let input = [0.0, 12.0, 40.0];
        let output = [40.0, 0.0, -8.0];
        for (x, want) in input.iter().zip(output.iter()) {
            assert_eq!(interpolate_clamped(*x, &input, &output).unwrap(), *want);
        }
    }

    #[test]
    fn clamp_vs_extend_below_range() {
        let input = [10.0, 20.0];
        let output = [1.0, 3.0];
        assert_eq!(
            interpolate(0.0, &input, &output, Extrapolate::Clamp, Extrapolate::Clamp).unwrap(),
            1.0
        );
        assert_eq!(
            interpolate(0.0, &input, &output, Extrapolate::Extend, Extrapolate::Clamp).unwrap(),
            -1.0
        );
    }

    #[test]
    fn clamp_vs_extend_above_range() {
        let input = [0.0, 10.0];
        let output = [0.0, 1.0];
        assert_eq!(
            interpolate(25.0, &input, &output, Extrapolate::Clamp, Extrapolate::Clamp).unwrap(),
            1.0
        );
        assert_eq!(
            interpolate(25.0, &input, &output, Extrapolate::Clamp, Extrapolate::Extend).unwrap(),
            2.5
        );
    }

    #[test]
    fn single_breakpoint_is_constant() {
        for x in [-100.0, 0.0, 55.5] {
            assert_eq!(interpolate_clamped(x, &[7.0], &[0.25]).unwrap(), 0.25);
        }
    }

    #[test]
    fn zero_width_segment_takes_left_output() {
        let y = interpolate_clamped(5.0, &[0.0, 5.0, 5.0, 10.0], &[0.0, 1.0, 2.0, 3.0]).unwrap();
        // partition_point skips past both x==5 breakpoints, bracketing [5,10).
        assert_eq!(y, 2.0);

        let y = interpolate_clamped(4.0, &[4.0, 4.0], &[1.0, 9.0]).unwrap();
        assert_eq!(y, 1.0);
    }

    #[test]
    fn rejects_malformed_tables() {
        assert!(matches!(
            interpolate_clamped(0.0, &[], &[]),
            Err(KawaraError::InvalidKeyframeSpec(_))
        ));
        assert!(matches!(
            interpolate_clamped(0.0, &[0.0, 1.0], &[0.0]),
            Err(KawaraError::InvalidKeyframeSpec(_))
        ));
        assert!(matches!(
            interpolate_clamped(0.0, &[0.0, 10.0, 5.0], &[0.0, 1.0, 2.0]),
            Err(KawaraError::InvalidKeyframeSpec(_))
        ));
        assert!(matches!(
            interpolate_clamped(0.0, &[0.0, f64::NAN], &[0.0, 1.0]),
            Err(KawaraError::InvalidKeyframeSpec(_))
        ));
    }

    #[test]
    fn curve_validates_once_then_samples() {
        let c = Curve::new(vec![0.0, 60.0], vec![0.0, 1.0]).unwrap();
        assert_eq!(c.at(30.0), 0.5);
        assert_eq!(c.at(-5.0), 0.0);
        assert_eq!(c.at(90.0), 1.0);
        assert!(Curve::new(vec![1.0, 0.0], vec![0.0, 1.0]).is_err());
    }
}
