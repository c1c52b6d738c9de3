//! NumPy `.npy` (format 1.0) arrays
//!
//! Every dataset in a trial file is stored as one `.npy` blob, so each array
//! carries its own dtype and shape.

use crate::error::WriterError;

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const ALIGN: usize = 64;

/// Element types used by trial files
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dtype {
    F32,
    I32,
    U8,
}

impl Dtype {
    /// NumPy type descriptor
    pub fn descr(self) -> &'static str {
        match self {
            Dtype::F32 => "<f4",
            Dtype::I32 => "<i4",
            Dtype::U8 => "|u1",
        }
    }

    pub fn size(self) -> usize {
        match self {
            Dtype::F32 | Dtype::I32 => 4,
            Dtype::U8 => 1,
        }
    }

    fn from_descr(descr: &str) -> Option<Self> {
        [Dtype::F32, Dtype::I32, Dtype::U8]
            .into_iter()
            .find(|d| d.descr() == descr)
    }
}

/// A typed, shaped array with little-endian element bytes
#[derive(Clone, Debug, PartialEq)]
pub struct NpyArray {
    pub dtype: Dtype,
    pub shape: Vec<usize>,
    pub data: Vec<u8>,
}

impl NpyArray {
    pub fn from_f32(shape: &[usize], values: &[f32]) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), values.len());
        Self {
            dtype: Dtype::F32,
            shape: shape.to_vec(),
            data: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    pub fn from_i32(shape: &[usize], values: &[i32]) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), values.len());
        Self {
            dtype: Dtype::I32,
            shape: shape.to_vec(),
            data: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    pub fn from_u8(shape: &[usize], values: &[u8]) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), values.len());
        Self {
            dtype: Dtype::U8,
            shape: shape.to_vec(),
            data: values.to_vec(),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements as `f32`, if this is a float array
    pub fn to_f32(&self) -> Option<Vec<f32>> {
        (self.dtype == Dtype::F32).then(|| {
            self.data
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect()
        })
    }

    /// Elements as `i32`, if this is an integer array
    pub fn to_i32(&self) -> Option<Vec<i32>> {
        (self.dtype == Dtype::I32).then(|| {
            self.data
                .chunks_exact(4)
                .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect()
        })
    }

    /// Serialize to `.npy` bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut header = format!(
            "{{'descr': '{}', 'fortran_order': False, 'shape': {}, }}",
            self.dtype.descr(),
            shape_literal(&self.shape)
        );
        // magic + version + u16 length prefix
        let prefix = MAGIC.len() + 2 + 2;
        let unpadded = prefix + header.len() + 1;
        let padding = (ALIGN - unpadded % ALIGN) % ALIGN;
        header.extend(std::iter::repeat(' ').take(padding));
        header.push('\n');

        let mut out = Vec::with_capacity(prefix + header.len() + self.data.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&[1, 0]);
        out.extend_from_slice(&(header.len() as u16).to_le_bytes());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(&self.data);
        out
    }

    /// Parse `.npy` bytes written by [`NpyArray::to_bytes`]
    pub fn parse(bytes: &[u8]) -> Result<Self, WriterError> {
        let invalid = |reason: &str| WriterError::InvalidArray(reason.to_string());
        if bytes.len() < 10 || &bytes[..6] != MAGIC {
            return Err(invalid("missing NPY magic"));
        }
        if bytes[6] != 1 {
            return Err(invalid("unsupported NPY version"));
        }
        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        let header = bytes
            .get(10..10 + header_len)
            .and_then(|h| std::str::from_utf8(h).ok())
            .ok_or_else(|| invalid("bad NPY header"))?;

        let descr = between(header, "'descr': '", "'").ok_or_else(|| invalid("missing descr"))?;
        let dtype = Dtype::from_descr(descr).ok_or_else(|| invalid("unsupported dtype"))?;
        let shape_text =
            between(header, "'shape': (", ")").ok_or_else(|| invalid("missing shape"))?;
        let shape = shape_text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<usize>().map_err(|_| invalid("bad shape")))
            .collect::<Result<Vec<_>, _>>()?;

        let data = bytes[10 + header_len..].to_vec();
        if data.len() != shape.iter().product::<usize>() * dtype.size() {
            return Err(invalid("data length does not match shape"));
        }
        Ok(Self { dtype, shape, data })
    }
}

fn shape_literal(shape: &[usize]) -> String {
    match shape {
        [] => "()".to_string(),
        [n] => format!("({n},)"),
        dims => {
            let dims: Vec<String> = dims.iter().map(usize::to_string).collect();
            format!("({})", dims.join(", "))
        }
    }
}

fn between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = text.find(start)? + start.len();
    let len = text[from..].find(end)?;
    Some(&text[from..from + len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_is_aligned() {
        let bytes = NpyArray::from_f32(&[2, 3], &[0.0; 6]).to_bytes();
        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert_eq!((10 + header_len) % 64, 0);
        assert_eq!(bytes[10 + header_len - 1], b'\n');
        assert_eq!(bytes.len(), 10 + header_len + 24);
    }

    #[test]
    fn test_header_text() {
        let bytes = NpyArray::from_i32(&[4], &[1, 2, 3, 4]).to_bytes();
        let text = String::from_utf8_lossy(&bytes[10..]);
        assert!(text.starts_with("{'descr': '<i4', 'fortran_order': False, 'shape': (4,), }"));
    }

    #[test]
    fn test_shape_literals() {
        assert_eq!(shape_literal(&[]), "()");
        assert_eq!(shape_literal(&[0]), "(0,)");
        assert_eq!(shape_literal(&[0, 2, 3]), "(0, 2, 3)");
    }

    #[test]
    fn test_parse_reads_back() {
        let array = NpyArray::from_f32(&[2, 2], &[1.0, -2.0, 3.5, 0.0]);
        let parsed = NpyArray::parse(&array.to_bytes()).unwrap();
        assert_eq!(parsed.shape, [2, 2]);
        assert_eq!(parsed.to_f32().unwrap(), [1.0, -2.0, 3.5, 0.0]);
        assert!(parsed.to_i32().is_none());
    }

    #[test]
    fn test_empty_array() {
        let array = NpyArray::from_i32(&[0, 2], &[]);
        assert!(array.is_empty());
        let parsed = NpyArray::parse(&array.to_bytes()).unwrap();
        assert_eq!(parsed.shape, [0, 2]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(NpyArray::parse(b"not an array").is_err());
    }
}
