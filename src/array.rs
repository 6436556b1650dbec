//! Typed, shape-carrying numeric arrays.
//!
//! [`NumericArray`] is the in-memory form of one dataset copied out of a capture
//! file and the unit written into (and read back from) an `.npz` archive. The
//! element type of the source dataset is preserved end to end.

use std::fmt;

/// Errors raised when constructing a [`NumericArray`]
#[derive(Debug, thiserror::Error)]
pub enum ArrayError {
    /// Element count does not match the product of the shape
    #[error("shape {shape:?} holds {expected} elements but {actual} were provided")]
    ShapeMismatch {
        /// Requested shape
        shape: Vec<usize>,
        /// Number of elements implied by the shape
        expected: usize,
        /// Number of elements actually provided
        actual: usize,
    },
}

/// Element type of a [`NumericArray`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Boolean stored as one byte
    Bool,
    /// Signed 8-bit integer
    I8,
    /// Signed 16-bit integer
    I16,
    /// Signed 32-bit integer
    I32,
    /// Signed 64-bit integer
    I64,
    /// Unsigned 8-bit integer
    U8,
    /// Unsigned 16-bit integer
    U16,
    /// Unsigned 32-bit integer
    U32,
    /// Unsigned 64-bit integer
    U64,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
}

impl ElementType {
    /// Size of one element in bytes.
    pub fn size(&self) -> usize {
        match self {
            ElementType::Bool | ElementType::I8 | ElementType::U8 => 1,
            ElementType::I16 | ElementType::U16 => 2,
            ElementType::I32 | ElementType::U32 | ElementType::F32 => 4,
            ElementType::I64 | ElementType::U64 | ElementType::F64 => 8,
        }
    }

    /// NumPy type character and width, without byte-order prefix (e.g. `i2`).
    pub fn kind_code(&self) -> &'static str {
        match self {
            ElementType::Bool => "b1",
            ElementType::I8 => "i1",
            ElementType::I16 => "i2",
            ElementType::I32 => "i4",
            ElementType::I64 => "i8",
            ElementType::U8 => "u1",
            ElementType::U16 => "u2",
            ElementType::U32 => "u4",
            ElementType::U64 => "u8",
            ElementType::F32 => "f4",
            ElementType::F64 => "f8",
        }
    }

    /// Look up an element type from its kind code (see [`ElementType::kind_code`]).
    pub fn from_kind_code(code: &str) -> Option<Self> {
        let element = match code {
            "b1" => ElementType::Bool,
            "i1" => ElementType::I8,
            "i2" => ElementType::I16,
            "i4" => ElementType::I32,
            "i8" => ElementType::I64,
            "u1" => ElementType::U8,
            "u2" => ElementType::U16,
            "u4" => ElementType::U32,
            "u8" => ElementType::U64,
            "f4" => ElementType::F32,
            "f8" => ElementType::F64,
            _ => return None,
        };
        Some(element)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Bool => "bool",
            ElementType::I8 => "int8",
            ElementType::I16 => "int16",
            ElementType::I32 => "int32",
            ElementType::I64 => "int64",
            ElementType::U8 => "uint8",
            ElementType::U16 => "uint16",
            ElementType::U32 => "uint32",
            ElementType::U64 => "uint64",
            ElementType::F32 => "float32",
            ElementType::F64 => "float64",
        };
        f.write_str(name)
    }
}

/// Flat element buffer of a [`NumericArray`], in C (row-major) order.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayData {
    /// Boolean elements
    Bool(Vec<bool>),
    /// `i8` elements
    I8(Vec<i8>),
    /// `i16` elements
    I16(Vec<i16>),
    /// `i32` elements
    I32(Vec<i32>),
    /// `i64` elements
    I64(Vec<i64>),
    /// `u8` elements
    U8(Vec<u8>),
    /// `u16` elements
    U16(Vec<u16>),
    /// `u32` elements
    U32(Vec<u32>),
    /// `u64` elements
    U64(Vec<u64>),
    /// `f32` elements
    F32(Vec<f32>),
    /// `f64` elements
    F64(Vec<f64>),
}

macro_rules! impl_from_vec {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for ArrayData {
                fn from(values: Vec<$ty>) -> Self {
                    ArrayData::$variant(values)
                }
            }
        )*
    };
}

impl_from_vec!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
);

impl ArrayData {
    /// Number of elements in the buffer.
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Bool(v) => v.len(),
            ArrayData::I8(v) => v.len(),
            ArrayData::I16(v) => v.len(),
            ArrayData::I32(v) => v.len(),
            ArrayData::I64(v) => v.len(),
            ArrayData::U8(v) => v.len(),
            ArrayData::U16(v) => v.len(),
            ArrayData::U32(v) => v.len(),
            ArrayData::U64(v) => v.len(),
            ArrayData::F32(v) => v.len(),
            ArrayData::F64(v) => v.len(),
        }
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type of the buffer.
    pub fn element_type(&self) -> ElementType {
        match self {
            ArrayData::Bool(_) => ElementType::Bool,
            ArrayData::I8(_) => ElementType::I8,
            ArrayData::I16(_) => ElementType::I16,
            ArrayData::I32(_) => ElementType::I32,
            ArrayData::I64(_) => ElementType::I64,
            ArrayData::U8(_) => ElementType::U8,
            ArrayData::U16(_) => ElementType::U16,
            ArrayData::U32(_) => ElementType::U32,
            ArrayData::U64(_) => ElementType::U64,
            ArrayData::F32(_) => ElementType::F32,
            ArrayData::F64(_) => ElementType::F64,
        }
    }

    /// Widen every element to `f64` (booleans map to 0.0 / 1.0).
    ///
    /// 64-bit integers beyond 2^53 lose precision.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            ArrayData::Bool(v) => v.iter().map(|&x| if x { 1.0 } else { 0.0 }).collect(),
            ArrayData::I8(v) => v.iter().map(|&x| f64::from(x)).collect(),
            ArrayData::I16(v) => v.iter().map(|&x| f64::from(x)).collect(),
            ArrayData::I32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            ArrayData::I64(v) => v.iter().map(|&x| x as f64).collect(),
            ArrayData::U8(v) => v.iter().map(|&x| f64::from(x)).collect(),
            ArrayData::U16(v) => v.iter().map(|&x| f64::from(x)).collect(),
            ArrayData::U32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            ArrayData::U64(v) => v.iter().map(|&x| x as f64).collect(),
            ArrayData::F32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            ArrayData::F64(v) => v.clone(),
        }
    }
}

/// Min / max / mean of an array's elements, as `f64`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArraySummary {
    /// Smallest element
    pub min: f64,
    /// Largest element
    pub max: f64,
    /// Arithmetic mean
    pub mean: f64,
}

/// An n-dimensional numeric array with a preserved element type.
#[derive(Clone, Debug, PartialEq)]
pub struct NumericArray {
    shape: Vec<usize>,
    data: ArrayData,
}

impl NumericArray {
    /// Create an array, checking that `data` holds exactly `product(shape)` elements.
    ///
    /// An empty shape denotes a scalar and requires exactly one element.
    pub fn new(shape: Vec<usize>, data: impl Into<ArrayData>) -> Result<Self, ArrayError> {
        let data = data.into();
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(ArrayError::ShapeMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Create a one-dimensional array from a vector.
    pub fn from_vec<T>(values: Vec<T>) -> Self
    where
        Vec<T>: Into<ArrayData>,
    {
        let data = values.into();
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Dimensions in C order.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions (0 for a scalar).
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Extent of the first dimension, or `None` for a scalar.
    pub fn first_extent(&self) -> Option<usize> {
        self.shape.first().copied()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Element type.
    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    /// Flat element buffer.
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Min / max / mean over all elements, `None` when empty.
    pub fn summary(&self) -> Option<ArraySummary> {
        if self.is_empty() {
            return None;
        }
        let values = self.data.to_f64_vec();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &value in &values {
            min = min.min(value);
            max = max.max(value);
            sum += value;
        }
        Some(ArraySummary {
            min,
            max,
            mean: sum / values.len() as f64,
        })
    }
}
