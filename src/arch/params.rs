/// The `(w, b)` pair of an affine model, stored contiguously so it can be walked by index.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Params([f32; 2]);

impl Params {
    pub fn new(w: f32, b: f32) -> Self {
        Self([w, b])
    }

    pub fn w(&self) -> f32 {
        self.0[0]
    }

    pub fn b(&self) -> f32 {
        self.0[1]
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.0
    }

    /// Whether both values are neither NaN nor infinite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}
