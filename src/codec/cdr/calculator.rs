// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CDR size calculator for computing the size of CDR-encoded data.
//!
//! Based on the TypeScript implementation at:
//! https://github.com/emulated-devices/rtps-cdr/blob/main/src/CdrSizeCalculator.ts

/// CDR size calculator.
///
/// This calculator computes the size of CDR-encoded data before actually
/// encoding it. This is useful for pre-allocating buffers.
///
/// # Example
///
/// ```no_run
/// # fn main() {
/// use robocodec::codec::cdr::calculator::CdrCalculator;
///
/// let mut calc = CdrCalculator::new();
/// calc.int32();    // 4 bytes
/// calc.int32();    // 4 bytes
/// calc.string(5);  // 4 (length) + 5 + 1 (null) = 10 bytes
/// assert_eq!(calc.size(), 18);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CdrCalculator {
    /// Current size offset (starts at 4 after CDR header)
    offset: usize,
    /// Origin offset for alignment calculation (4 for proper field alignment after CDR header)
    origin: usize,
}

impl Default for CdrCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl CdrCalculator {
    /// Create a new calculator.
    ///
    /// The offset starts at 4, representing the size of the CDR header.
    /// The origin starts at 4 (after CDR header) for proper field alignment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            offset: 4,
            origin: 4,
        }
    }

    /// Get the current calculated size.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.offset
    }

    /// Calculate size for an 8-bit signed/unsigned integer.
    pub fn int8(&mut self) -> usize {
        self.increment_and_return(1)
    }

    /// Calculate size for an 8-bit signed/unsigned integer.
    pub fn uint8(&mut self) -> usize {
        self.int8()
    }

    /// Calculate size for a 16-bit signed/unsigned integer.
    pub fn int16(&mut self) -> usize {
        self.increment_and_return(2)
    }

    /// Calculate size for a 16-bit signed/unsigned integer.
    pub fn uint16(&mut self) -> usize {
        self.int16()
    }

    /// Calculate size for a 32-bit signed/unsigned integer.
    pub fn int32(&mut self) -> usize {
        self.increment_and_return(4)
    }

    /// Calculate size for a 32-bit signed/unsigned integer.
    pub fn uint32(&mut self) -> usize {
        self.int32()
    }

    /// Calculate size for a 64-bit signed/unsigned integer.
    pub fn int64(&mut self) -> usize {
        self.increment_and_return(8)
    }

    /// Calculate size for a 64-bit signed/unsigned integer.
    pub fn uint64(&mut self) -> usize {
        self.int64()
    }

    /// Calculate size for a 32-bit float.
    pub fn float32(&mut self) -> usize {
        self.increment_and_return(4)
    }

    /// Calculate size for a 64-bit double.
    pub fn float64(&mut self) -> usize {
        self.increment_and_return(8)
    }

    /// Calculate size for a string.
    ///
    /// # Arguments
    ///
    /// * `length` - The length of the string content (not including null terminator)
    pub fn string(&mut self, length: usize) -> usize {
        self.uint32();
        self.offset += length + 1; // Add one for the null terminator
        self.offset
    }

    /// Calculate size for a sequence length prefix.
    pub fn sequence_length(&mut self) -> usize {
        self.uint32()
    }

    /// Calculate size for an array of fixed-size elements.
    ///
    /// # Arguments
    ///
    /// * `count` - Number of elements in the array
    /// * `element_size` - Size of each element in bytes
    /// * `element_alignment` - Alignment requirement of each element
    pub fn array(&mut self, count: usize, element_size: usize, element_alignment: usize) -> usize {
        self.sequence_length();
        for _ in 0..count {
            self.align(element_alignment);
            self.offset += element_size;
        }
        self.offset
    }

    /// Add padding for alignment.
    ///
    /// # Arguments
    ///
    /// * `byte_count` - The byte width to align to (e.g., 4 for 4-byte alignment)
    pub fn align(&mut self, byte_count: usize) {
        let alignment = (self.offset - self.origin) % byte_count;
        if alignment > 0 {
            self.offset += byte_count - alignment;
        }
    }

    /// Reset the calculator to its initial state.
    pub fn reset(&mut self) {
        self.offset = 4;
        self.origin = 4;
    }

    /// Reset the origin to the current offset (for nested structs).
    ///
    /// This matches the TypeScript `resetOrigin()` function.
    pub fn reset_origin(&mut self) {
        self.origin = self.offset;
    }

    /// Increment the offset by `byte_count` and any required padding bytes,
    /// then return the new offset.
    ///
    /// This matches the TypeScript `incrementAndReturn` method.
    fn increment_and_return(&mut self, byte_count: usize) -> usize {
        self.align(byte_count);
        self.offset += byte_count;
        self.offset
    }
}
