//! Bit-exact conversion between IBM System/370 and IEEE 754 single-precision
//! floating-point words.
//!
//! Both routines work on raw 4-byte words, read and written big-endian, with
//! integer bit operations only; the byte layout, not the host float type,
//! is the contract. Normalized numbers inside the overlapping range convert
//! exactly; when precision is lost the fraction is truncated toward zero,
//! never rounded to nearest.

use crate::prelude::{KernelError, KernelResult};
use crate::telemetry::log::LogManager;

const WORD: usize = 4;

fn check_words(dst: &[u8], src: &[u8]) -> KernelResult<usize> {
    if src.len() % WORD != 0 {
        return Err(KernelError::InvalidShape(format!(
            "source length {} is not a multiple of {} bytes",
            src.len(),
            WORD
        )));
    }
    if dst.len() != src.len() {
        return Err(KernelError::InvalidShape(format!(
            "destination holds {} bytes, source {}",
            dst.len(),
            src.len()
        )));
    }
    Ok(src.len() / WORD)
}

/// Converts IBM 370 single-precision words to IEEE 754 single precision.
///
/// The IBM format has greater range but less precision than IEEE. Magnitudes
/// too large for IEEE become signed infinity; magnitudes below the normal
/// range become denormalized numbers, down to an exact signed zero once even
/// the denormal range is exceeded.
pub fn ibm2ieee(dst: &mut [u8], src: &[u8]) -> KernelResult<()> {
    let words = check_words(dst, src)?;
    LogManager::scoped("ibm2ieee").record(&format!("words {}", words));

    for (out, word) in dst.chunks_exact_mut(WORD).zip(src.chunks_exact(WORD)) {
        let value = u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
        out.copy_from_slice(&ibm_bits_to_ieee(value).to_be_bytes());
    }
    Ok(())
}

/// Converts IEEE 754 single-precision words to IBM 370 single precision.
///
/// IEEE infinities and NaNs clamp to the largest representable IBM magnitude
/// with the sign preserved; the mapping is lossy and does not distinguish
/// NaN from infinity.
pub fn ieee2ibm(dst: &mut [u8], src: &[u8]) -> KernelResult<()> {
    let words = check_words(dst, src)?;
    LogManager::scoped("ieee2ibm").record(&format!("words {}", words));

    for (out, word) in dst.chunks_exact_mut(WORD).zip(src.chunks_exact(WORD)) {
        let value = u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
        out.copy_from_slice(&ieee_bits_to_ibm(value).to_be_bytes());
    }
    Ok(())
}

fn ibm_bits_to_ieee(word: u32) -> u32 {
    let sign = word >> 31;
    let mut fraction = word << 1; // sign shifted out
    let mut exponent = (fraction >> 25) as i32; // 7-bit base-16 exponent
    fraction <<= 7; // exponent shifted out

    if fraction == 0 {
        return sign << 31;
    }

    // Base-16 offset-64 with the radix point before the first digit, to
    // base-2 offset-127 with the radix point after the first bit:
    // (exp - 64) * 4 + 127 - 1 == (exp << 2) - 130.
    exponent = (exponent << 2) - 130;

    // Renormalize. At most three shifts for well-formed input, because a
    // base-16 digit wastes at most three leading fraction bits.
    while fraction < 0x8000_0000 {
        exponent -= 1;
        fraction <<= 1;
    }

    if exponent <= 0 {
        if exponent < -24 {
            // Below the denormal range: exact signed zero.
            fraction = 0;
        } else {
            // Denormalized, truncating toward zero.
            fraction >>= (-exponent) as u32;
        }
        exponent = 0;
    } else if exponent >= 255 {
        // Too large for IEEE: signed infinity.
        fraction = 0;
        exponent = 255;
    } else {
        // Normal number: drop the assumed leading bit.
        fraction <<= 1;
    }

    (fraction >> 9) | ((exponent as u32) << 23) | (sign << 31)
}

fn ieee_bits_to_ibm(word: u32) -> u32 {
    let sign = word >> 31;
    let mut fraction = word << 1; // sign shifted out
    let mut exponent = (fraction >> 24) as i32; // 8-bit exponent
    fraction <<= 8; // exponent shifted out

    if exponent == 255 {
        // Infinity and NaN clamp to the largest representable magnitude.
        fraction = 0xffff_ff00;
        exponent = 0x7f;
    } else if exponent > 0 || fraction != 0 {
        if exponent > 0 {
            // Restore the assumed leading bit.
            fraction = (fraction >> 1) | 0x8000_0000;
        }

        // Base-2 offset-127 to base-16 offset-64; truncate the fraction to
        // land the radix point on a digit boundary.
        exponent += 130;
        fraction >>= ((-exponent) & 3) as u32;
        exponent = (exponent + 3) >> 2;

        // Unreachable for normalized input, kept for malformed words.
        while fraction < 0x1000_0000 {
            exponent -= 1;
            fraction <<= 4;
        }
    }
    // Exponent and fraction both zero fall through as a signed zero.

    (fraction >> 8) | ((exponent as u32) << 24) | (sign << 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ibm_from_ieee_words(words: &[u32]) -> Vec<u32> {
        let src: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
        let mut dst = vec![0u8; src.len()];
        ieee2ibm(&mut dst, &src).unwrap();
        dst.chunks_exact(WORD)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    fn ieee_from_ibm_words(words: &[u32]) -> Vec<u32> {
        let src: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
        let mut dst = vec![0u8; src.len()];
        ibm2ieee(&mut dst, &src).unwrap();
        dst.chunks_exact(WORD)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn known_word_pairs_convert_exactly() {
        // 1.0 is 16^1 * 0x100000/2^24 in IBM terms.
        assert_eq!(ieee_from_ibm_words(&[0x4110_0000]), vec![1.0f32.to_bits()]);
        assert_eq!(ibm_from_ieee_words(&[1.0f32.to_bits()]), vec![0x4110_0000]);

        // The textbook -118.625 pattern.
        assert_eq!(ieee_from_ibm_words(&[0xC276_A000]), vec![0xC2ED_4000]);
        assert_eq!(ibm_from_ieee_words(&[0xC2ED_4000]), vec![0xC276_A000]);
    }

    #[test]
    fn one_round_trips_without_loss() {
        let ibm = ibm_from_ieee_words(&[1.0f32.to_bits()]);
        let back = ieee_from_ibm_words(&ibm);
        assert_eq!(f32::from_bits(back[0]), 1.0);
    }

    #[test]
    fn signed_zero_survives_both_directions() {
        assert_eq!(ieee_from_ibm_words(&[0x0000_0000]), vec![0x0000_0000]);
        assert_eq!(ieee_from_ibm_words(&[0x8000_0000]), vec![0x8000_0000]);
        assert_eq!(ibm_from_ieee_words(&[0x0000_0000]), vec![0x0000_0000]);
        assert_eq!(ibm_from_ieee_words(&[0x8000_0000]), vec![0x8000_0000]);
    }

    #[test]
    fn infinity_and_nan_clamp_to_largest_ibm_magnitude() {
        assert_eq!(
            ibm_from_ieee_words(&[f32::INFINITY.to_bits()]),
            vec![0x7FFF_FFFF]
        );
        assert_eq!(
            ibm_from_ieee_words(&[f32::NEG_INFINITY.to_bits()]),
            vec![0xFFFF_FFFF]
        );
        assert_eq!(
            ibm_from_ieee_words(&[f32::NAN.to_bits()]),
            vec![0x7FFF_FFFF]
        );

        // The largest IBM magnitude (~7.2e75) exceeds the IEEE range, so the
        // way back overflows to infinity; only NaN is truly lost.
        let back = ieee_from_ibm_words(&[0x7FFF_FFFF]);
        assert_eq!(f32::from_bits(back[0]), f32::INFINITY);
    }

    #[test]
    fn small_ibm_magnitudes_become_denormals_or_zero() {
        // 16^-32 * 0.5 == 2^-129, representable only as an IEEE denormal.
        assert_eq!(ieee_from_ibm_words(&[0x2080_0000]), vec![0x0010_0000]);

        // 16^-64 * 2^-4 underflows even the denormal range.
        assert_eq!(ieee_from_ibm_words(&[0x0010_0000]), vec![0x0000_0000]);
        assert_eq!(ieee_from_ibm_words(&[0x8010_0000]), vec![0x8000_0000]);
    }

    #[test]
    fn round_trip_error_stays_within_ibm_epsilon() {
        let values = [
            0.15625f32, 0.1, 1.0, -1.0, 3.141_592_7, -118.625, 118.625, 1e-6, -1e-6, 1e6,
            123_456.79, 0.785_398_2, 2.718_281_8, -4.9e-3, 7.0e30, -7.0e30,
        ];

        for &f1 in &values {
            let ibm1 = ibm_from_ieee_words(&[f1.to_bits()]);
            let f2 = f32::from_bits(ieee_from_ibm_words(&ibm1)[0]);

            // Truncation toward zero never grows the magnitude.
            assert!(f2.abs() <= f1.abs(), "{} grew to {}", f1, f2);

            let rel = f64::from((f1 - f2).abs()) / f64::from(f1.abs());
            assert!(rel <= 9.6e-7, "{} -> {} relative error {}", f1, f2, rel);

            // A second pass over the truncated value is bit-identical.
            let ibm2 = ibm_from_ieee_words(&[f2.to_bits()]);
            assert_eq!(ibm1, ibm2, "second conversion of {} drifted", f1);
        }
    }

    #[test]
    fn mismatched_buffers_are_rejected() {
        let src = [0u8; 8];
        let mut short_dst = [0u8; 4];
        assert!(matches!(
            ibm2ieee(&mut short_dst, &src),
            Err(KernelError::InvalidShape(_))
        ));

        let ragged = [0u8; 6];
        let mut dst = [0u8; 6];
        assert!(matches!(
            ieee2ibm(&mut dst, &ragged),
            Err(KernelError::InvalidShape(_))
        ));
    }

    #[test]
    fn empty_buffers_are_a_no_op() {
        let src: [u8; 0] = [];
        let mut dst: [u8; 0] = [];
        ibm2ieee(&mut dst, &src).unwrap();
        ieee2ibm(&mut dst, &src).unwrap();
    }
}
