use media_types::FourCc;

use crate::error::{AviError, AviResult};

/**
    A cursor over a region of a RIFF file.

    Positions reported by [`RiffReader::offset`] are absolute file offsets,
    also for readers created with [`RiffReader::sub_reader_lossy`], so chunk
    locations can be recorded once and sliced straight out of the file later.
*/
#[derive(Clone)]
pub struct RiffReader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> RiffReader<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            base: 0,
        }
    }

    /**
        Absolute offset of the cursor within the file.
    */
    pub const fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn ensure(&self, n: usize) -> AviResult<()> {
        if self.remaining() < n {
            Err(AviError::Truncated {
                needed: self.base + self.pos + n,
                have: self.base + self.data.len(),
            })
        } else {
            Ok(())
        }
    }

    pub fn read_bytes(&mut self, n: usize) -> AviResult<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> AviResult<[u8; N]> {
        let b = self.read_bytes(N)?;
        let mut arr = [0u8; N];
        arr.copy_from_slice(b);
        Ok(arr)
    }

    pub fn read_fourcc(&mut self) -> AviResult<FourCc> {
        Ok(FourCc(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> AviResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> AviResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> AviResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn skip(&mut self, n: usize) -> AviResult<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /**
        Skip the pad byte that follows an odd-sized chunk, if present.
        A missing pad byte at the very end of the data is tolerated.
    */
    pub fn skip_padding(&mut self, chunk_size: usize) {
        if chunk_size % 2 == 1 && self.remaining() > 0 {
            self.pos += 1;
        }
    }

    /**
        Split off the next `n` bytes as a reader of their own, advancing
        this reader past them. `n` is clamped to what is left, since
        writers often leave a stale size on the last list of a file.
    */
    pub fn sub_reader_lossy(&mut self, n: usize) -> RiffReader<'a> {
        let n = n.min(self.remaining());
        let base = self.offset();
        let data = &self.data[self.pos..self.pos + n];
        self.pos += n;
        RiffReader { data, pos: 0, base }
    }
}
