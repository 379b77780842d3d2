//! Sprite atlas mapping.
//!
//! The sheet is a 7x7 grid of camera-angle snapshots of one model: seven
//! pitch bands pole-to-pole by seven yaw bands covering a half turn, with the
//! other half turn produced by mirroring. These helpers are pure functions
//! from a smoothed orientation to a sheet cell plus a screen roll angle.

use std::f32::consts::{PI, TAU};

use crate::vector_math::wrap_yaw;

/// Number of pitch/yaw bands along each axis of the sprite sheet.
pub const SHEET_BANDS: u8 = 7;

/// Index of the last band along either sheet axis.
const LAST_BAND: u8 = SHEET_BANDS - 1;

/// One cell of the sprite sheet, selected from an actor's orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SheetCell {
    /// Pitch band, `0` (top pole) through `6` (bottom pole).
    pub row: u8,
    /// Yaw band, `0` through `6`, covering the half turn `[0, PI]`.
    pub column: u8,
    /// Whether the frame is mirrored horizontally to cover yaw beyond `PI`.
    pub mirrored: bool,
}

/// Quantises a fraction in `[0, 1]` into a band index.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "The rounded value is clamped into the band range before casting."
)]
fn band(fraction: f32) -> u8 {
    let index = (fraction * f32::from(LAST_BAND)).round();
    index.clamp(0.0, f32::from(LAST_BAND)) as u8
}

/// Maps a continuous orientation onto a sheet cell.
///
/// `yaw` may be any angle; it is wrapped into `[0, 2*PI)` and folded across
/// `PI` with the mirror flag. `pitch` is the polar angle and is clamped into
/// `[0, PI]`. At the poles (`row` 0 or 6) the column is forced to `0`: a
/// straight top or bottom view has no yaw-distinguishable silhouette, so the
/// sheet stores exactly one frame per pole.
///
/// # Examples
/// ```
/// use std::f32::consts::FRAC_PI_2;
/// use flotilla::atlas::cell_for_orientation;
/// let cell = cell_for_orientation(0.0, FRAC_PI_2);
/// assert_eq!((cell.row, cell.column, cell.mirrored), (3, 0, false));
/// ```
#[must_use]
pub fn cell_for_orientation(yaw: f32, pitch: f32) -> SheetCell {
    let row = band(pitch.clamp(0.0, PI) / PI);

    let wrapped = wrap_yaw(yaw);
    let (column, mirrored) = if wrapped <= PI {
        (band(wrapped / PI), false)
    } else {
        (band((TAU - wrapped) / PI), true)
    };

    let column = if row == 0 || row == LAST_BAND {
        0
    } else {
        column
    };

    SheetCell {
        row,
        column,
        mirrored,
    }
}

/// Fixed roll, in degrees, applied to a cell to sell the tilt of off-axis
/// views.
///
/// The equator row is upright; rows toward either pole roll proportionally to
/// the column index, with opposite signs for the upper and lower hemisphere.
#[must_use]
pub fn base_roll_deg(cell: SheetCell) -> f32 {
    let equator = LAST_BAND / 2;
    if cell.row == equator {
        return 0.0;
    }
    let lean = f32::from(cell.column) / f32::from(LAST_BAND) * 180.0;
    if cell.row < equator {
        -lean
    } else {
        lean
    }
}

/// Banking roll, in degrees, from the residual yaw error left after
/// smoothing.
///
/// Actors mid-turn still carry an error between their smoothed yaw and the
/// heading they want; scaling it by `gain_deg` per radian tilts the frame
/// into the turn.
#[must_use]
pub fn banking_roll_deg(yaw_error: f32, gain_deg: f32) -> f32 {
    yaw_error * gain_deg
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::f32::consts::FRAC_PI_2;

    const STEP: f32 = PI / 6.0;

    #[rstest]
    #[case::equator_front(0.0, FRAC_PI_2, 3, 0, false)]
    #[case::equator_side(3.0 * STEP, FRAC_PI_2, 3, 3, false)]
    #[case::equator_back(6.0 * STEP, FRAC_PI_2, 3, 6, false)]
    #[case::mirrored_side(TAU - 3.0 * STEP, FRAC_PI_2, 3, 3, true)]
    #[case::upper_band(2.0 * STEP, 2.0 * STEP, 2, 2, false)]
    #[case::lower_band(5.0 * STEP, 4.0 * STEP, 4, 5, false)]
    fn grid_points_map_exactly(
        #[case] yaw: f32,
        #[case] pitch: f32,
        #[case] row: u8,
        #[case] column: u8,
        #[case] mirrored: bool,
    ) {
        let cell = cell_for_orientation(yaw, pitch);
        assert_eq!(cell.row, row);
        assert_eq!(cell.column, column);
        assert_eq!(cell.mirrored, mirrored);
    }

    #[rstest]
    #[case::top_pole(0.0)]
    #[case::bottom_pole(PI)]
    fn poles_force_column_zero(#[case] pitch: f32) {
        for step in 0u8..12 {
            let yaw = f32::from(step) * (TAU / 12.0);
            let cell = cell_for_orientation(yaw, pitch);
            assert_eq!(cell.column, 0, "pole column must ignore yaw {yaw}");
        }
    }

    #[rstest]
    #[case(0.3)]
    #[case(1.1)]
    #[case(2.9)]
    fn mirroring_is_symmetric(#[case] yaw: f32) {
        let direct = cell_for_orientation(yaw, FRAC_PI_2);
        let reflected = cell_for_orientation(TAU - yaw, FRAC_PI_2);
        assert_eq!(direct.row, reflected.row);
        assert_eq!(direct.column, reflected.column);
        assert_ne!(direct.mirrored, reflected.mirrored);
    }

    #[test]
    fn out_of_range_pitch_clamps_to_poles() {
        assert_eq!(cell_for_orientation(1.0, -0.5).row, 0);
        assert_eq!(cell_for_orientation(1.0, PI + 0.5).row, 6);
    }

    #[test]
    fn equator_row_has_no_base_roll() {
        let cell = cell_for_orientation(2.0 * STEP, FRAC_PI_2);
        assert_eq!(base_roll_deg(cell), 0.0);
    }

    #[test]
    fn hemispheres_roll_in_opposite_directions() {
        let upper = SheetCell {
            row: 1,
            column: 3,
            mirrored: false,
        };
        let lower = SheetCell {
            row: 5,
            column: 3,
            mirrored: false,
        };
        assert!(base_roll_deg(upper) < 0.0);
        assert!(base_roll_deg(lower) > 0.0);
        assert!((base_roll_deg(upper) + base_roll_deg(lower)).abs() < 1e-6);
    }

    #[test]
    fn banking_scales_with_error() {
        assert!((banking_roll_deg(0.5, 45.0) - 22.5).abs() < 1e-6);
        assert_eq!(banking_roll_deg(0.0, 45.0), 0.0);
    }
}
