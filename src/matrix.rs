//! The working module grid that the encoder fills in place.

/// One cell of a [`ModuleMatrix`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Module {
    /// Not yet assigned; only data placement may claim it.
    Unset,
    /// Finder, separator, timing or alignment module (`true` = dark).
    Function(bool),
    /// Format or version information area, stamped after masking.
    Reserved(bool),
    /// Codeword or remainder bit placed by the frame filler.
    Data(bool),
}

impl Module {
    pub fn is_dark(self) -> bool {
        match self {
            Module::Unset => false,
            Module::Function(dark) | Module::Reserved(dark) | Module::Data(dark) => dark,
        }
    }

    /// Whether masking applies to this module.
    pub fn is_data(self) -> bool {
        matches!(self, Module::Data(_))
    }
}

/// A `width × width` grid of tagged modules, addressed as `(x, y)` with
/// `x` the column and `y` the row.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ModuleMatrix {
    width: usize,
    cells: Vec<Module>,
}

impl ModuleMatrix {
    /// An all-`Unset` grid.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            cells: vec![Module::Unset; width * width],
        }
    }

    /// Side length in modules.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Module at column `x`, row `y`. Panics out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Module {
        assert!(x < self.width && y < self.width, "Module ({x}, {y}) out of bounds");
        self.cells[y * self.width + x]
    }

    /// Overwrites the module at column `x`, row `y`. Panics out of bounds.
    pub fn set(&mut self, x: usize, y: usize, module: Module) {
        assert!(x < self.width && y < self.width, "Module ({x}, {y}) out of bounds");
        self.cells[y * self.width + x] = module;
    }

    /// Whether the module at `(x, y)` is dark.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_dark()
    }

    /// Flips the colour of a data module; any other module is left alone.
    pub fn invert_data(&mut self, x: usize, y: usize) {
        let cell = &mut self.cells[y * self.width + x];
        if let Module::Data(dark) = *cell {
            *cell = Module::Data(!dark);
        }
    }

    /// Number of modules matching `pred`.
    pub fn count(&self, pred: impl Fn(Module) -> bool) -> usize {
        self.cells.iter().filter(|&&m| pred(m)).count()
    }

    /// Number of dark modules of any kind.
    pub fn dark_count(&self) -> usize {
        self.count(Module::is_dark)
    }

    /// Row-major colours, `true` = dark.
    pub fn to_bools(&self) -> Vec<bool> {
        self.cells.iter().map(|m| m.is_dark()).collect()
    }
}
