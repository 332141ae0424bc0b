// Raw 16-byte vector register images

use serde::{Deserialize, Serialize};

/// Width of every vector register handled by the engine
pub const VECTOR_WIDTH_BYTES: usize = 16;

/// Byte order used to decode lanes out of a register image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Byte order of the platform this crate was compiled for
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        ByteOrder::native()
    }
}

/// A vector register image.
///
/// The bytes carry no element typing of their own; they only acquire meaning
/// once paired with a conversion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VectorValue([u8; VECTOR_WIDTH_BYTES]);

macro_rules! lane_constructor {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $lanes:expr) => {
        $(#[$doc])*
        pub fn $name(lanes: [$ty; $lanes], order: ByteOrder) -> Self {
            let mut bytes = [0u8; VECTOR_WIDTH_BYTES];
            for (chunk, lane) in bytes
                .chunks_exact_mut(std::mem::size_of::<$ty>())
                .zip(lanes)
            {
                let encoded = match order {
                    ByteOrder::Little => lane.to_le_bytes(),
                    ByteOrder::Big => lane.to_be_bytes(),
                };
                chunk.copy_from_slice(&encoded);
            }
            Self(bytes)
        }
    };
}

impl VectorValue {
    pub const fn from_bytes(bytes: [u8; VECTOR_WIDTH_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; VECTOR_WIDTH_BYTES] {
        &self.0
    }

    lane_constructor!(
        /// `vector unsigned int`
        from_u32s, u32, 4
    );
    lane_constructor!(
        /// `vector signed int`
        from_i32s, i32, 4
    );
    lane_constructor!(
        /// `vector unsigned short`
        from_u16s, u16, 8
    );
    lane_constructor!(
        /// `vector signed short`
        from_i16s, i16, 8
    );
    lane_constructor!(
        /// `vector signed char`
        from_i8s, i8, 16
    );
    lane_constructor!(
        /// `vector float`
        from_f32s, f32, 4
    );
    lane_constructor!(
        /// `vector double`
        from_f64s, f64, 2
    );

    /// `vector unsigned char`; byte order is irrelevant for single-byte lanes
    pub const fn from_u8s(lanes: [u8; VECTOR_WIDTH_BYTES]) -> Self {
        Self(lanes)
    }

    /// A single 128-bit integer laid out the way the platform with `order`
    /// would store it in memory.
    pub fn from_u128(value: u128, order: ByteOrder) -> Self {
        match order {
            ByteOrder::Little => Self(value.to_le_bytes()),
            ByteOrder::Big => Self(value.to_be_bytes()),
        }
    }
}

impl From<[u8; VECTOR_WIDTH_BYTES]> for VectorValue {
    fn from(bytes: [u8; VECTOR_WIDTH_BYTES]) -> Self {
        Self(bytes)
    }
}
