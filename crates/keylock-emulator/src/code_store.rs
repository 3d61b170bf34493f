//! Admin code and passcode slots.
//!
//! The store is volatile: it starts from factory defaults and lives as long
//! as its [`LockController`](crate::LockController).
//!
//! # Factory Defaults
//!
//! - Admin code: `012345`
//! - Passcode slot `i`: `iiiiii`
//!
//! # Examples
//!
//! ```
//! use keylock_core::{Code, SlotIndex};
//! use keylock_emulator::code_store::{Classification, CodeStore};
//!
//! let mut store = CodeStore::new();
//! assert_eq!(store.classify(&[0, 1, 2, 3, 4, 5]), Classification::Admin);
//!
//! let slot = SlotIndex::new(4).unwrap();
//! store.save_passcode_at("271828".parse().unwrap(), slot);
//! assert_eq!(store.classify(&[2, 7, 1, 8, 2, 8]), Classification::Passcode(slot));
//! assert_eq!(store.classify(&[4, 4, 4, 4, 4, 4]), Classification::Unknown);
//! ```

use keylock_core::{Code, SlotIndex, constants::MAX_CODE_SIZE, constants::MAX_PASSCODE_SLOTS};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// Contents of one passcode slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeSlot {
    /// No passcode; never matches any input.
    Empty,

    /// A passcode that opens the lock.
    Valid(Code),
}

impl CodeSlot {
    /// The stored code, if the slot is valid.
    pub fn code(&self) -> Option<&Code> {
        match self {
            CodeSlot::Empty => None,
            CodeSlot::Valid(code) => Some(code),
        }
    }

    /// Check if the slot holds a passcode.
    pub fn is_valid(&self) -> bool {
        matches!(self, CodeSlot::Valid(_))
    }
}

/// Result of comparing entered digits against a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Match,
    Mismatch,

    /// The slot compared against is empty.
    Invalid,
}

/// What an entered code turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The admin code.
    Admin,

    /// The passcode held in this slot (the lowest slot, if several match).
    Passcode(SlotIndex),

    /// Neither.
    Unknown,
}

/// Compare two digit entries over exactly [`MAX_CODE_SIZE`] positions.
///
/// An entry shorter than a code has no digit at the missing positions and
/// therefore never matches.
pub fn compare_buffers(a: &[u8], b: &[u8]) -> Comparison {
    match (a.get(..MAX_CODE_SIZE), b.get(..MAX_CODE_SIZE)) {
        (Some(a), Some(b)) if bool::from(a.ct_eq(b)) => Comparison::Match,
        _ => Comparison::Mismatch,
    }
}

/// Compare a digit entry against a stored slot.
pub fn compare_against(input: &[u8], slot: &CodeSlot) -> Comparison {
    match slot {
        CodeSlot::Empty => Comparison::Invalid,
        CodeSlot::Valid(code) => compare_buffers(input, code.digits()),
    }
}

/// One admin code plus [`MAX_PASSCODE_SLOTS`] passcode slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeStore {
    admin: Code,
    slots: [CodeSlot; MAX_PASSCODE_SLOTS],
}

impl CodeStore {
    /// Create a store holding the factory admin code and factory passcodes.
    pub fn new() -> Self {
        let mut store = Self {
            admin: Code::factory_admin(),
            slots: [CodeSlot::Empty; MAX_PASSCODE_SLOTS],
        };
        store.init_all_slots();
        store
    }

    /// Restore one slot to its factory passcode.
    pub fn init_slot(&mut self, slot: SlotIndex) {
        self.slots[slot.as_usize()] = CodeSlot::Valid(Code::factory_passcode(slot));
    }

    /// Restore every slot to its factory passcode.
    ///
    /// This is both the bulk erase and the factory reset of the passcodes.
    pub fn init_all_slots(&mut self) {
        for slot in SlotIndex::all() {
            self.init_slot(slot);
        }
    }

    /// Restore the factory admin code.
    pub fn init_admin(&mut self) {
        self.admin = Code::factory_admin();
    }

    /// Identify an entry as the admin code, a passcode, or neither.
    ///
    /// The admin code is checked first.
    pub fn classify(&self, input: &[u8]) -> Classification {
        if compare_against(input, &CodeSlot::Valid(self.admin)) == Comparison::Match {
            return Classification::Admin;
        }

        SlotIndex::all()
            .find(|slot| compare_against(input, self.slot(*slot)) == Comparison::Match)
            .map_or(Classification::Unknown, Classification::Passcode)
    }

    /// Replace the admin code.
    pub fn save_admin(&mut self, code: Code) {
        self.admin = code;
    }

    /// Replace the passcode in `slot`.
    pub fn save_passcode_at(&mut self, code: Code, slot: SlotIndex) {
        self.slots[slot.as_usize()] = CodeSlot::Valid(code);
    }

    /// The current admin code.
    pub fn admin(&self) -> &Code {
        &self.admin
    }

    /// Contents of one slot.
    pub fn slot(&self, slot: SlotIndex) -> &CodeSlot {
        &self.slots[slot.as_usize()]
    }

    /// Contents of every slot, in index order.
    pub fn slots(&self) -> &[CodeSlot; MAX_PASSCODE_SLOTS] {
        &self.slots
    }

    /// Check if every slot holds its factory passcode.
    pub fn slots_are_factory(&self) -> bool {
        SlotIndex::all()
            .all(|slot| *self.slot(slot) == CodeSlot::Valid(Code::factory_passcode(slot)))
    }
}

impl Default for CodeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn slot(i: u8) -> SlotIndex {
        SlotIndex::new(i).unwrap()
    }

    fn code(s: &str) -> Code {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_store_is_factory() {
        let store = CodeStore::new();

        assert_eq!(store.admin(), &Code::factory_admin());
        assert!(store.slots_are_factory());
        assert_eq!(
            store.slot(slot(7)),
            &CodeSlot::Valid(code("777777"))
        );
    }

    #[rstest]
    #[case(&[0, 1, 2, 3, 4, 5], &[0, 1, 2, 3, 4, 5], Comparison::Match)]
    #[case(&[0, 1, 2, 3, 4, 5], &[0, 1, 2, 3, 4, 6], Comparison::Mismatch)]
    #[case(&[0, 1, 2, 3, 4], &[0, 1, 2, 3, 4, 5], Comparison::Mismatch)]
    #[case(&[], &[], Comparison::Mismatch)]
    fn test_compare_buffers(#[case] a: &[u8], #[case] b: &[u8], #[case] expected: Comparison) {
        assert_eq!(compare_buffers(a, b), expected);
        assert_eq!(compare_buffers(b, a), expected);
    }

    #[test]
    fn test_compare_buffers_ignores_positions_past_code() {
        assert_eq!(
            compare_buffers(&[1, 1, 1, 1, 1, 1, 9], &[1, 1, 1, 1, 1, 1]),
            Comparison::Match
        );
    }

    #[test]
    fn test_compare_against_empty_slot_is_invalid() {
        assert_eq!(
            compare_against(&[0, 0, 0, 0, 0, 0], &CodeSlot::Empty),
            Comparison::Invalid
        );
    }

    #[test]
    fn test_compare_against_valid_slot() {
        let stored = CodeSlot::Valid(code("123456"));
        assert_eq!(compare_against(&[1, 2, 3, 4, 5, 6], &stored), Comparison::Match);
        assert_eq!(
            compare_against(&[1, 2, 3, 4, 5, 5], &stored),
            Comparison::Mismatch
        );
    }

    #[rstest]
    #[case(&[0, 1, 2, 3, 4, 5], Classification::Admin)]
    #[case(&[3, 3, 3, 3, 3, 3], Classification::Passcode(slot(3)))]
    #[case(&[0, 0, 0, 0, 0, 0], Classification::Passcode(slot(0)))]
    #[case(&[1, 2, 3, 4, 5, 6], Classification::Unknown)]
    #[case(&[3, 3, 3, 3, 3], Classification::Unknown)]
    fn test_classify_factory_store(#[case] input: &[u8], #[case] expected: Classification) {
        assert_eq!(CodeStore::new().classify(input), expected);
    }

    #[test]
    fn test_classify_admin_takes_priority() {
        let mut store = CodeStore::new();
        store.save_passcode_at(code("012345"), slot(2));

        assert_eq!(store.classify(&[0, 1, 2, 3, 4, 5]), Classification::Admin);
    }

    #[test]
    fn test_save_admin_replaces_old_code() {
        let mut store = CodeStore::new();
        store.save_admin(code("999000"));

        assert_eq!(store.classify(&[9, 9, 9, 0, 0, 0]), Classification::Admin);
        assert_eq!(store.classify(&[0, 1, 2, 3, 4, 5]), Classification::Unknown);

        store.init_admin();
        assert_eq!(store.classify(&[0, 1, 2, 3, 4, 5]), Classification::Admin);
    }

    #[test]
    fn test_save_and_init_slot() {
        let mut store = CodeStore::new();
        store.save_passcode_at(code("135790"), slot(5));

        assert!(!store.slots_are_factory());
        assert_eq!(
            store.classify(&[1, 3, 5, 7, 9, 0]),
            Classification::Passcode(slot(5))
        );
        assert_eq!(store.classify(&[5, 5, 5, 5, 5, 5]), Classification::Unknown);

        store.init_slot(slot(5));
        assert!(store.slots_are_factory());
    }

    #[test]
    fn test_init_all_slots_restores_every_slot() {
        let mut store = CodeStore::new();
        for i in SlotIndex::all() {
            store.save_passcode_at(code("864200"), i);
        }

        store.init_all_slots();
        assert!(store.slots_are_factory());
    }
}
