//! MySQL binary decimals, as stored by TiDB.
//!
//! A decimal(precision, frac) value is stored as groups of 9 decimal digits
//! packed into 4-byte big-endian words, with shorter words for the leading
//! integer digits and trailing fraction digits. The first byte has its high
//! bit set for non-negative values, and negative values have all bytes
//! inverted, such that the encoding sorts correctly.

use crate::encoding::memcomparable::{take_byte, take_slice};
use crate::errvalue;
use crate::error::Result;

use serde::{Deserialize, Serialize};

/// Number of decimal digits in a full word.
const DIGITS_PER_WORD: usize = 9;

/// Number of bytes needed to store the given number of digits (0-9).
const DIG2BYTES: [usize; 10] = [0, 1, 1, 2, 2, 3, 3, 4, 4, 4];

/// Maximum precision of a decimal.
const MAX_PRECISION: u8 = 65;

/// A fixed-point decimal, with exactly `frac` fraction digits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decimal {
    negative: bool,
    /// Integer digits, without leading zeros ("0" for none).
    integer: String,
    /// Fraction digits, exactly frac of them.
    fraction: String,
}

impl Decimal {
    /// Decodes a decimal from a precision byte, a frac byte and the binary
    /// digits, and advances the input.
    pub fn take(input: &mut &[u8]) -> Result<Self> {
        let precision = take_byte(input)?;
        let frac = take_byte(input)?;
        if precision == 0 || precision > MAX_PRECISION || frac > precision {
            return errvalue!("invalid decimal precision {precision} and frac {frac}");
        }
        let intg = (precision - frac) as usize;
        let frac = frac as usize;
        let (int_words, int_lead) = (intg / DIGITS_PER_WORD, intg % DIGITS_PER_WORD);
        let (frac_words, frac_trail) = (frac / DIGITS_PER_WORD, frac % DIGITS_PER_WORD);
        let size = DIG2BYTES[int_lead] + (int_words + frac_words) * 4 + DIG2BYTES[frac_trail];

        let mut bin = take_slice(input, size)?.to_vec();
        let negative = bin[0] & 0x80 == 0;
        bin[0] ^= 0x80;
        if negative {
            bin.iter_mut().for_each(|b| *b = !*b);
        }

        let mut bin = bin.as_slice();
        let mut integer = String::with_capacity(intg);
        take_word(&mut bin, int_lead, &mut integer)?;
        for _ in 0..int_words {
            take_word(&mut bin, DIGITS_PER_WORD, &mut integer)?;
        }
        let mut fraction = String::with_capacity(frac);
        for _ in 0..frac_words {
            take_word(&mut bin, DIGITS_PER_WORD, &mut fraction)?;
        }
        take_word(&mut bin, frac_trail, &mut fraction)?;

        let integer = match integer.trim_start_matches('0') {
            "" => "0".to_string(),
            trimmed => trimmed.to_string(),
        };
        Ok(Self { negative, integer, fraction })
    }

    /// Returns true if the value is zero.
    pub fn is_zero(&self) -> bool {
        self.integer == "0" && self.fraction.bytes().all(|b| b == b'0')
    }
}

/// Decodes a word of the given number of digits, appending them zero-padded
/// to the output.
fn take_word(input: &mut &[u8], digits: usize, output: &mut String) -> Result<()> {
    if digits == 0 {
        return Ok(());
    }
    let word = take_slice(input, DIG2BYTES[digits])?.iter().fold(0u32, |w, b| w << 8 | *b as u32);
    if word >= 10u32.pow(digits as u32) {
        return errvalue!("invalid decimal word {word} for {digits} digits");
    }
    output.push_str(&format!("{word:0digits$}"));
    Ok(())
}

impl std::fmt::Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.negative && !self.is_zero() {
            f.write_str("-")?;
        }
        f.write_str(&self.integer)?;
        if !self.fraction.is_empty() {
            write!(f, ".{}", self.fraction)?;
        }
        Ok(())
    }
}
