use crate::{
    Result,
    constants::{FACTORY_ADMIN_CODE, MAX_CODE_SIZE, MAX_PASSCODE_SLOTS},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// A complete lock code: exactly [`MAX_CODE_SIZE`] decimal digits.
///
/// Digits are stored as their values (0-9), not as ASCII characters, so the
/// factory passcode of slot `i` is literally `{i,i,i,i,i,i}`.
///
/// # Security
/// Equality is constant-time so that comparing an entered code against a
/// stored one takes the same time wherever the two differ.
///
/// # Examples
///
/// ```
/// use keylock_core::Code;
///
/// let code: Code = "012345".parse().unwrap();
/// assert_eq!(code.digits(), &[0, 1, 2, 3, 4, 5]);
/// assert_eq!(code.to_string(), "012345");
///
/// assert!("01234".parse::<Code>().is_err());
/// assert!("01234x".parse::<Code>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Code([u8; MAX_CODE_SIZE]);

impl Code {
    /// Create a code from six digit values.
    ///
    /// # Errors
    /// Returns `Error::InvalidDigit` if any value is greater than 9.
    pub fn new(digits: [u8; MAX_CODE_SIZE]) -> Result<Self> {
        if let Some(bad) = digits.iter().find(|d| **d > 9) {
            return Err(Error::InvalidDigit(*bad));
        }
        Ok(Code(digits))
    }

    /// Create a code from a slice of digit values.
    ///
    /// # Errors
    /// Returns `Error::InvalidCodeLength` if the slice is not exactly
    /// [`MAX_CODE_SIZE`] long, or `Error::InvalidDigit` for a value above 9.
    pub fn from_digits(digits: &[u8]) -> Result<Self> {
        let digits: [u8; MAX_CODE_SIZE] =
            digits.try_into().map_err(|_| Error::InvalidCodeLength {
                expected: MAX_CODE_SIZE,
                actual: digits.len(),
            })?;
        Code::new(digits)
    }

    /// The admin code installed at start-up and by factory reset.
    #[must_use]
    pub fn factory_admin() -> Self {
        Code(FACTORY_ADMIN_CODE)
    }

    /// The factory passcode of `slot`: its index repeated six times.
    #[must_use]
    pub fn factory_passcode(slot: SlotIndex) -> Self {
        Code([slot.as_u8(); MAX_CODE_SIZE])
    }

    /// Digit values of the code.
    #[must_use]
    pub fn digits(&self) -> &[u8; MAX_CODE_SIZE] {
        &self.0
    }
}

impl PartialEq for Code {
    fn eq(&self, other: &Self) -> bool {
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

impl ConstantTimeEq for Code {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.0[..].ct_eq(&other.0[..])
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for digit in self.0 {
            write!(f, "{digit}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Code {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .chars()
            .map(|c| {
                c.to_digit(10)
                    .map(|d| d as u8)
                    .ok_or_else(|| Error::InvalidCode(format!("'{c}' is not a decimal digit")))
            })
            .collect::<Result<Vec<u8>>>()?;
        Code::from_digits(&digits)
    }
}

impl TryFrom<String> for Code {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Code> for String {
    fn from(code: Code) -> Self {
        code.to_string()
    }
}

/// Index of a passcode slot (0-9).
///
/// Out-of-range slots cannot be constructed, so code-store operations taking
/// a `SlotIndex` never need a runtime bounds check.
///
/// # Examples
///
/// ```
/// use keylock_core::SlotIndex;
///
/// let slot = SlotIndex::new(3).unwrap();
/// assert_eq!(slot.as_usize(), 3);
/// assert!(SlotIndex::new(10).is_err());
/// assert_eq!(SlotIndex::all().count(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SlotIndex(u8);

impl SlotIndex {
    /// Create a slot index with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidSlotIndex` if `index` is not below
    /// [`MAX_PASSCODE_SLOTS`].
    pub fn new(index: u8) -> Result<Self> {
        if usize::from(index) >= MAX_PASSCODE_SLOTS {
            return Err(Error::InvalidSlotIndex(index));
        }
        Ok(SlotIndex(index))
    }

    /// Iterate over every slot in ascending order.
    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (0..MAX_PASSCODE_SLOTS as u8).map(SlotIndex)
    }

    /// Get the raw index as u8.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// Get the index for array access.
    #[must_use]
    pub fn as_usize(&self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for SlotIndex {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        SlotIndex::new(value)
    }
}

impl From<SlotIndex> for u8 {
    fn from(slot: SlotIndex) -> Self {
        slot.0
    }
}

/// A single decimal digit key value (0-9).
///
/// # Examples
///
/// ```
/// use keylock_core::Digit;
///
/// let digit = Digit::new(7).unwrap();
/// assert_eq!(digit.value(), 7);
/// assert_eq!(Digit::from_ascii(b'4'), Some(Digit::new(4).unwrap()));
/// assert!(Digit::new(10).is_err());
/// assert_eq!(Digit::from_ascii(b'x'), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Digit(u8);

impl Digit {
    /// Create a digit with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidDigit` if `value` is greater than 9.
    pub fn new(value: u8) -> Result<Self> {
        if value > 9 {
            return Err(Error::InvalidDigit(value));
        }
        Ok(Digit(value))
    }

    /// Decode an ASCII `0`-`9` byte.
    #[must_use]
    pub fn from_ascii(byte: u8) -> Option<Self> {
        byte.is_ascii_digit().then(|| Digit(byte - b'0'))
    }

    /// The digit's value.
    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }

    /// The digit as an ASCII character.
    #[must_use]
    pub fn to_char(&self) -> char {
        char::from(b'0' + self.0)
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Digit {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Digit::new(value)
    }
}

impl From<Digit> for u8 {
    fn from(digit: Digit) -> Self {
        digit.0
    }
}
