//! Zigzag placement of codeword bits into a template.

use crate::matrix::{Module, ModuleMatrix};

/// Walks the data area of a template in placement order.
///
/// Starting at the bottom-right corner, the walk covers two-column strips from
/// right to left, alternately upward and downward, right column before left
/// within each row. Column 6 (vertical timing) is never a strip column. Only
/// [`Module::Unset`] positions are yielded.
pub struct FrameFiller<'a> {
    frame: &'a mut ModuleMatrix,
    // Right-hand column of the current strip
    right: i32,
    // Rows already completed in the current strip
    vert: i32,
    // 0 for the right column, 1 for the left
    side: i32,
}

impl<'a> FrameFiller<'a> {
    pub fn new(frame: &'a mut ModuleMatrix) -> Self {
        let right = frame.width() as i32 - 1;
        Self {
            frame,
            right,
            vert: 0,
            side: 0,
        }
    }

    /// Next free module as `(x, y)`, or `None` when the walk is exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(usize, usize)> {
        let size = self.frame.width() as i32;
        while self.right >= 1 {
            let x = self.right - self.side;
            let upward = ((self.right + 1) & 2) == 0;
            let y = if upward { size - 1 - self.vert } else { self.vert };

            self.side += 1;
            if self.side == 2 {
                self.side = 0;
                self.vert += 1;
                if self.vert == size {
                    self.vert = 0;
                    self.right -= 2;
                    if self.right == 6 {
                        self.right = 5;
                    }
                }
            }

            if self.frame.get(x as usize, y as usize) == Module::Unset {
                return Some((x as usize, y as usize));
            }
        }
        None
    }

    pub fn set_frame_at(&mut self, addr: (usize, usize), dark: bool) {
        self.frame.set(addr.0, addr.1, Module::Data(dark));
    }
}
