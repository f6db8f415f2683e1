//! Shared types used across swathgrid.
//! Includes the raw element tag `DataType`, the `Sample` numeric trait implemented once
//! per concrete element type, and `GridImage`, a finalized grid of any supported type.
use clap::ValueEnum;
use ndarray::Array2;
use num_traits::{Bounded, NumCast, ToPrimitive};
use serde::{Deserialize, Serialize};

/// Element type of a raw row-major binary array.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// 1-byte unsigned integer
    #[value(name = "u1")]
    U1,
    /// 2-byte unsigned integer
    #[value(name = "u2")]
    U2,
    /// 2-byte signed integer
    #[value(name = "s2")]
    S2,
    /// 4-byte unsigned integer
    #[value(name = "u4")]
    U4,
    /// 4-byte signed integer
    #[value(name = "s4")]
    S4,
    /// 4-byte float
    #[value(name = "f4")]
    F4,
    /// 8-byte float
    #[value(name = "f8")]
    F8,
}

impl DataType {
    /// Width of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            DataType::U1 => 1,
            DataType::U2 | DataType::S2 => 2,
            DataType::U4 | DataType::S4 | DataType::F4 => 4,
            DataType::F8 => 8,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, DataType::F4 | DataType::F8)
    }

    /// Whether `value` can be stored as a fill value of this type. Integer types need
    /// an in-range whole number.
    pub fn can_represent(self, value: f64) -> bool {
        let (lo, hi) = match self {
            DataType::U1 => (u8::MIN as f64, u8::MAX as f64),
            DataType::U2 => (u16::MIN as f64, u16::MAX as f64),
            DataType::S2 => (i16::MIN as f64, i16::MAX as f64),
            DataType::U4 => (u32::MIN as f64, u32::MAX as f64),
            DataType::S4 => (i32::MIN as f64, i32::MAX as f64),
            DataType::F4 => return !value.is_finite() || value.abs() <= f32::MAX as f64,
            DataType::F8 => return true,
        };
        value.fract() == 0.0 && value >= lo && value <= hi
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DataType::U1 => "u1",
            DataType::U2 => "u2",
            DataType::S2 => "s2",
            DataType::U4 => "u4",
            DataType::S4 => "s4",
            DataType::F4 => "f4",
            DataType::F8 => "f8",
        };
        write!(f, "{}", s)
    }
}

/// A scalar element that can be stored in a swath or grid array.
pub trait Sample: Copy + Send + Sync + PartialEq + Bounded + NumCast + ToPrimitive + 'static {
    const DATA_TYPE: DataType;

    /// Decode one element from native-endian bytes. `bytes` has exactly `DATA_TYPE.size()` bytes.
    fn from_ne_slice(bytes: &[u8]) -> Self;

    /// Append the native-endian encoding of `self` to `out`.
    fn extend_ne_bytes(self, out: &mut Vec<u8>);

    /// Convert a weighted average into this type: integers are rounded half away from
    /// zero and clamped to the representable range, floats are cast.
    fn from_grid_value(value: f64, fill: Self) -> Self {
        Self::cast_clamped(value, fill, true)
    }

    /// Clamp and cast without the rounding offset (integers truncate toward zero).
    /// NaN becomes `fill` for integer types.
    fn cast_clamped(value: f64, fill: Self, round: bool) -> Self {
        if !Self::DATA_TYPE.is_integer() {
            return <Self as NumCast>::from(value).unwrap_or(fill);
        }
        if value.is_nan() {
            return fill;
        }
        let value = match (round, value >= 0.0) {
            (true, true) => value + 0.5,
            (true, false) => value - 0.5,
            (false, _) => value,
        };
        let lo = Self::min_value().to_f64().unwrap_or(f64::MIN);
        let hi = Self::max_value().to_f64().unwrap_or(f64::MAX);
        <Self as NumCast>::from(value.clamp(lo, hi).trunc()).unwrap_or(fill)
    }
}

macro_rules! impl_sample {
    ($t:ty, $tag:expr) => {
        impl Sample for $t {
            const DATA_TYPE: DataType = $tag;

            #[inline]
            fn from_ne_slice(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$t>()];
                raw.copy_from_slice(bytes);
                <$t>::from_ne_bytes(raw)
            }

            #[inline]
            fn extend_ne_bytes(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_ne_bytes());
            }
        }
    };
}

impl_sample!(u8, DataType::U1);
impl_sample!(u16, DataType::U2);
impl_sample!(i16, DataType::S2);
impl_sample!(u32, DataType::U4);
impl_sample!(i32, DataType::S4);
impl_sample!(f32, DataType::F4);
impl_sample!(f64, DataType::F8);

/// A finalized output grid, tagged by its element type.
#[derive(Debug, Clone, PartialEq)]
pub enum GridImage {
    U1(Array2<u8>),
    U2(Array2<u16>),
    S2(Array2<i16>),
    U4(Array2<u32>),
    S4(Array2<i32>),
    F4(Array2<f32>),
    F8(Array2<f64>),
}

impl GridImage {
    pub fn data_type(&self) -> DataType {
        match self {
            GridImage::U1(_) => DataType::U1,
            GridImage::U2(_) => DataType::U2,
            GridImage::S2(_) => DataType::S2,
            GridImage::U4(_) => DataType::U4,
            GridImage::S4(_) => DataType::S4,
            GridImage::F4(_) => DataType::F4,
            GridImage::F8(_) => DataType::F8,
        }
    }

    /// (rows, cols)
    pub fn dim(&self) -> (usize, usize) {
        match self {
            GridImage::U1(a) => a.dim(),
            GridImage::U2(a) => a.dim(),
            GridImage::S2(a) => a.dim(),
            GridImage::U4(a) => a.dim(),
            GridImage::S4(a) => a.dim(),
            GridImage::F4(a) => a.dim(),
            GridImage::F8(a) => a.dim(),
        }
    }

    /// Row-major native-endian bytes of the whole grid.
    pub fn to_ne_bytes(&self) -> Vec<u8> {
        fn encode<T: Sample>(a: &Array2<T>) -> Vec<u8> {
            let mut out = Vec::with_capacity(a.len() * T::DATA_TYPE.size());
            for &v in a.iter() {
                v.extend_ne_bytes(&mut out);
            }
            out
        }
        match self {
            GridImage::U1(a) => encode(a),
            GridImage::U2(a) => encode(a),
            GridImage::S2(a) => encode(a),
            GridImage::U4(a) => encode(a),
            GridImage::S4(a) => encode(a),
            GridImage::F4(a) => encode(a),
            GridImage::F8(a) => encode(a),
        }
    }

    /// Value at (row, col) widened to f64, mainly for inspection and tests.
    pub fn get_f64(&self, row: usize, col: usize) -> Option<f64> {
        match self {
            GridImage::U1(a) => a.get((row, col)).and_then(|v| v.to_f64()),
            GridImage::U2(a) => a.get((row, col)).and_then(|v| v.to_f64()),
            GridImage::S2(a) => a.get((row, col)).and_then(|v| v.to_f64()),
            GridImage::U4(a) => a.get((row, col)).and_then(|v| v.to_f64()),
            GridImage::S4(a) => a.get((row, col)).and_then(|v| v.to_f64()),
            GridImage::F4(a) => a.get((row, col)).and_then(|v| v.to_f64()),
            GridImage::F8(a) => a.get((row, col)).copied(),
        }
    }
}
