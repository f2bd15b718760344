use super::{address32::Address32, address64::Address64};

/// Hands out locally unique addresses: the session salt in the upper half and
/// a forward-only counter in the lower half.
pub struct AddressGenerator {
    session: Address32,
    next: u32,
}

impl AddressGenerator {
    pub fn new(session: Address32) -> Self {
        Self { session, next: 0 }
    }

    /// The counter wraps after 2^32 addresses
    pub fn generate(&mut self) -> Address64 {
        let address = Address64::from_halves(self.session, Address32::from_u32(self.next));
        self.next = self.next.wrapping_add(1);
        address
    }

    pub fn session(&self) -> Address32 {
        self.session
    }

    /// Replaces the salt for every address generated from now on. The counter
    /// keeps going, so no lower half is reused within the process.
    pub fn rekey(&mut self, session: Address32) {
        self.session = session;
    }

    pub fn issued(&self) -> u32 {
        self.next
    }
}
