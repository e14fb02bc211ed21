use crate::Error;

/// Owned row-major raster, used for annotation masks.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

pub type Mask = Image<u8>;

impl<T: Clone> Image<T> {
    pub fn new_fill(width: usize, height: usize, value: T) -> Result<Self, Error> {
        let len = width.checked_mul(height).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: 0,
        })?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }
}

impl<T> Image<T> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        self.index(x, y).and_then(|i| self.data.get(i))
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) -> Result<(), Error> {
        let i = self.index(x, y).ok_or(Error::OutOfBounds)?;
        self.data[i] = value;
        Ok(())
    }
}

impl Image<u8> {
    /// Number of non-zero pixels.
    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::{Image, Mask};
    use crate::Error;

    #[test]
    fn set_get_and_count() {
        let mut mask: Mask = Image::new_fill(4, 3, 0u8).expect("small mask");
        mask.set(1, 2, 1).expect("in bounds");
        mask.set(3, 0, 255).expect("in bounds");

        assert_eq!(mask.get(1, 2), Some(&1));
        assert_eq!(mask.get(0, 0), Some(&0));
        assert_eq!(mask.get(4, 0), None);
        assert_eq!(mask.get(0, 3), None);
        assert_eq!(mask.count_set(), 2);
        assert_eq!(mask.set(4, 0, 1), Err(Error::OutOfBounds));
    }

    #[test]
    fn oversized_mask_is_rejected() {
        assert!(matches!(
            Image::new_fill(usize::MAX, 2, 0u8),
            Err(Error::SizeMismatch { .. })
        ));
    }
}
