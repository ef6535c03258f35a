//! Fixed-size frame buffers reused for every submitted frame.

/// Frame size after rounding up to the encoder's alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignedDimensions {
    pub width: u32,
    pub height: u32,
}

impl AlignedDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when these dimensions are at least `width` x `height`
    pub fn covers(&self, width: u32, height: u32) -> bool {
        self.width >= width && self.height >= height
    }

    /// Chroma plane width for 4:2:0 subsampling
    pub fn chroma_width(&self) -> u32 {
        chroma_extent(self.width)
    }

    /// Chroma plane height for 4:2:0 subsampling
    pub fn chroma_height(&self) -> u32 {
        chroma_extent(self.height)
    }
}

/// Subsampled extent of a 4:2:0 chroma plane; odd sizes round up.
#[inline]
pub fn chroma_extent(luma_extent: u32) -> u32 {
    luma_extent.div_ceil(2)
}

/// One contiguous, strided image plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    data: Vec<u8>,
    stride: usize,
    rows: usize,
}

impl Plane {
    /// Zero-filled plane of `rows` lines, `stride` bytes each
    pub fn new(stride: usize, rows: usize) -> Self {
        Self {
            data: vec![0; stride * rows],
            stride,
            rows,
        }
    }

    /// Bytes between the starts of consecutive rows
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Allocated rows, padding included
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// The first `len` bytes of row `y`
    pub fn row(&self, y: usize, len: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + len]
    }

    pub fn row_mut(&mut self, y: usize, len: usize) -> &mut [u8] {
        let start = y * self.stride;
        &mut self.data[start..start + len]
    }
}

/// Copy `rows` lines of `row_bytes` bytes between buffers with independent strides.
///
/// Both buffers must hold at least `stride * (rows - 1) + row_bytes` bytes.
pub fn copy_rows(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    row_bytes: usize,
    rows: usize,
) {
    for y in 0..rows {
        let src_start = y * src_stride;
        let dst_start = y * dst_stride;
        dst[dst_start..dst_start + row_bytes].copy_from_slice(&src[src_start..src_start + row_bytes]);
    }
}

/// Interleaved RGB source buffer plus the three planar YUV 4:2:0 targets.
///
/// Allocated once from the aligned dimensions and overwritten in place for
/// every frame. The luma plane uses the aligned width as its stride; each
/// chroma plane uses the subsampled aligned width.
#[derive(Debug)]
pub struct FrameBuffers {
    aligned: AlignedDimensions,
    interleaved: Plane,
    planes: [Plane; 3],
}

impl FrameBuffers {
    pub fn allocate(aligned: AlignedDimensions) -> Self {
        let width = aligned.width as usize;
        let height = aligned.height as usize;
        let chroma_width = aligned.chroma_width() as usize;
        let chroma_height = aligned.chroma_height() as usize;

        Self {
            aligned,
            interleaved: Plane::new(3 * width, height),
            planes: [
                Plane::new(width, height),
                Plane::new(chroma_width, chroma_height),
                Plane::new(chroma_width, chroma_height),
            ],
        }
    }

    pub fn aligned(&self) -> AlignedDimensions {
        self.aligned
    }

    /// Copy `height` rows of `3 * width` bytes from a caller buffer laid out
    /// with `line_stride` bytes per row.
    pub fn load_interleaved(&mut self, pixels: &[u8], line_stride: usize, width: u32, height: u32) {
        let stride = self.interleaved.stride();
        copy_rows(
            pixels,
            line_stride,
            self.interleaved.data_mut(),
            stride,
            3 * width as usize,
            height as usize,
        );
    }

    pub fn interleaved(&self) -> &Plane {
        &self.interleaved
    }

    pub fn planes(&self) -> &[Plane; 3] {
        &self.planes
    }

    /// Source plane and conversion targets, borrowed together
    pub fn split_mut(&mut self) -> (&Plane, &mut [Plane; 3]) {
        (&self.interleaved, &mut self.planes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_sizes() {
        let buffers = FrameBuffers::allocate(AlignedDimensions::new(64, 48));
        assert_eq!(buffers.interleaved().stride(), 192);
        assert_eq!(buffers.interleaved().data().len(), 64 * 48 * 3);
        assert_eq!(buffers.planes()[0].stride(), 64);
        assert_eq!(buffers.planes()[0].data().len(), 64 * 48);
        assert_eq!(buffers.planes()[1].stride(), 32);
        assert_eq!(buffers.planes()[1].rows(), 24);
        assert_eq!(buffers.planes()[2].data().len(), 32 * 24);
    }

    #[test]
    fn test_odd_chroma_extent() {
        let aligned = AlignedDimensions::new(65, 49);
        assert_eq!(aligned.chroma_width(), 33);
        assert_eq!(aligned.chroma_height(), 25);
        assert!(aligned.covers(65, 49));
        assert!(!aligned.covers(66, 49));
    }

    #[test]
    fn test_load_honours_both_strides() {
        let mut buffers = FrameBuffers::allocate(AlignedDimensions::new(4, 2));
        // 2x2 image, caller stride 8 (2 bytes of padding per row)
        let pixels = [1, 2, 3, 4, 5, 6, 0xEE, 0xEE, 7, 8, 9, 10, 11, 12];
        buffers.load_interleaved(&pixels, 8, 2, 2);

        let plane = buffers.interleaved();
        assert_eq!(plane.stride(), 12);
        assert_eq!(plane.row(0, 6), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(plane.row(1, 6), &[7, 8, 9, 10, 11, 12]);
        assert!(!plane.data().contains(&0xEE));
    }

    #[test]
    fn test_copy_rows() {
        let src = [1u8, 2, 9, 3, 4, 9];
        let mut dst = [0u8; 8];
        copy_rows(&src, 3, &mut dst, 4, 2, 2);
        assert_eq!(dst, [1, 2, 0, 0, 3, 4, 0, 0]);
    }
}
