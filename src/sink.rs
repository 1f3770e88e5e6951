//! Column framebuffer and the MAX7219 module chain behind it

use max7219::connectors::Connector;
use max7219::{DataError, MAX7219};

/// Columns driven by one MAX7219 module
pub const MODULE_COLUMNS: usize = 8;

/// Column-addressed output device.
///
/// Writes are fire-and-forget; implementations deal with their own failures.
pub trait ColumnSink {
    /// Set one column, index 0 being the rightmost LED column
    fn set_column(&mut self, index: usize, bits: u8);

    /// Blank every column
    fn clear_all(&mut self);

    /// Toggle pushing writes to the LEDs as they happen.
    ///
    /// Turning refresh back on pushes the whole frame once.
    fn set_refresh_enabled(&mut self, enabled: bool);
}

/// A chain of 8x8 modules that accepts one module's rows at a time
pub trait ModuleChain {
    type Error;

    /// Write the 8 row bytes of `module`, 0 being the leftmost module
    fn write_module(&mut self, module: usize, rows: &[u8; 8]) -> Result<(), Self::Error>;
}

impl<C: Connector> ModuleChain for MAX7219<C> {
    type Error = DataError;

    fn write_module(&mut self, module: usize, rows: &[u8; 8]) -> Result<(), Self::Error> {
        self.write_raw(module, rows)
    }
}

/// In-memory image of `DEVICES` modules, stored column-wise
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer<const DEVICES: usize> {
    // Blocks of eight columns, block 0 holding columns 0..8 (rightmost)
    blocks: [[u8; MODULE_COLUMNS]; DEVICES],
}

impl<const DEVICES: usize> Default for Framebuffer<DEVICES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const DEVICES: usize> Framebuffer<DEVICES> {
    pub const WIDTH: usize = DEVICES * MODULE_COLUMNS;

    pub const fn new() -> Self {
        Self {
            blocks: [[0; MODULE_COLUMNS]; DEVICES],
        }
    }

    /// Set a column; indices past the last column are ignored.
    /// Returns the module the column belongs to.
    pub fn set(&mut self, index: usize, bits: u8) -> Option<usize> {
        if index >= Self::WIDTH {
            return None;
        }
        let block = index / MODULE_COLUMNS;
        self.blocks[block][index % MODULE_COLUMNS] = bits;
        Some(DEVICES - 1 - block)
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        (index < Self::WIDTH).then(|| self.blocks[index / MODULE_COLUMNS][index % MODULE_COLUMNS])
    }

    pub fn clear(&mut self) {
        self.blocks = [[0; MODULE_COLUMNS]; DEVICES];
    }

    /// Row bytes for `module` (0 = leftmost) in FC16 layout: bit 7 of a row
    /// is the module's leftmost column, row `r` is bit `r` of each column.
    pub fn module_rows(&self, module: usize) -> [u8; 8] {
        let columns = &self.blocks[DEVICES - 1 - module];
        let mut rows = [0u8; 8];
        for (r, row) in rows.iter_mut().enumerate() {
            for (k, column) in columns.iter().enumerate() {
                *row |= ((column >> r) & 1) << k;
            }
        }
        rows
    }
}

/// [`ColumnSink`] over a real module chain
pub struct Matrix<D, const DEVICES: usize> {
    chain: D,
    frame: Framebuffer<DEVICES>,
    refresh: bool,
    failures: u32,
}

impl<D: ModuleChain, const DEVICES: usize> Matrix<D, DEVICES> {
    pub fn new(chain: D) -> Self {
        Self {
            chain,
            frame: Framebuffer::new(),
            refresh: true,
            failures: 0,
        }
    }

    pub fn frame(&self) -> &Framebuffer<DEVICES> {
        &self.frame
    }

    /// Module writes that failed so far
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn chain_mut(&mut self) -> &mut D {
        &mut self.chain
    }

    /// Push every module
    pub fn flush(&mut self) {
        for module in 0..DEVICES {
            self.push(module);
        }
    }

    fn push(&mut self, module: usize) {
        let rows = self.frame.module_rows(module);
        if self.chain.write_module(module, &rows).is_err() {
            self.failures = self.failures.wrapping_add(1);
            warn!("module {} write failed ({} failures)", module, self.failures);
        }
    }
}

impl<D: ModuleChain, const DEVICES: usize> ColumnSink for Matrix<D, DEVICES> {
    fn set_column(&mut self, index: usize, bits: u8) {
        if let Some(module) = self.frame.set(index, bits) {
            if self.refresh {
                self.push(module);
            }
        }
    }

    fn clear_all(&mut self) {
        self.frame.clear();
        if self.refresh {
            self.flush();
        }
    }

    fn set_refresh_enabled(&mut self, enabled: bool) {
        let resumed = enabled && !self.refresh;
        self.refresh = enabled;
        if resumed {
            self.flush();
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Sink that keeps the last frame and counts calls
    #[derive(Debug)]
    pub struct RecordingSink {
        pub columns: [u8; 32],
        pub refresh_enabled: bool,
        pub refreshes: usize,
        pub clears: usize,
    }

    impl Default for RecordingSink {
        fn default() -> Self {
            Self {
                columns: [0; 32],
                refresh_enabled: true,
                refreshes: 0,
                clears: 0,
            }
        }
    }

    impl ColumnSink for RecordingSink {
        fn set_column(&mut self, index: usize, bits: u8) {
            if let Some(column) = self.columns.get_mut(index) {
                *column = bits;
            }
        }

        fn clear_all(&mut self) {
            self.columns = [0; 32];
            self.clears += 1;
        }

        fn set_refresh_enabled(&mut self, enabled: bool) {
            self.refresh_enabled = enabled;
            if enabled {
                self.refreshes += 1;
            }
        }
    }
}
