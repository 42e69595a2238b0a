use nalgebra::{Matrix3x2, Vector3};
use std::fmt;

/// Boundary condition of one box face, following the LAMMPS single-letter
/// codes (`p`, `f`, `s`, `m`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Periodic,
    Fixed,
    Shrink,
    ShrinkMin,
}

impl Boundary {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'p' => Some(Boundary::Periodic),
            'f' => Some(Boundary::Fixed),
            's' => Some(Boundary::Shrink),
            'm' => Some(Boundary::ShrinkMin),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Boundary::Periodic => 'p',
            Boundary::Fixed => 'f',
            Boundary::Shrink => 's',
            Boundary::ShrinkMin => 'm',
        }
    }
}

/// Simulation cell of a single snapshot.
///
/// `bounds` rows are the x, y, z axes and the columns are (lo, hi). Tilt
/// factors are present only for explicitly triclinic cells and are ordered
/// (xy, xz, yz). `bc` holds the boundary condition of the (lo, hi) face pair
/// per axis.
///
/// Equality is exact value equality of all bounds, flags, and tilt factors.
#[derive(Debug, Clone, PartialEq)]
pub struct SimBox {
    pub bounds: Matrix3x2<f64>,
    pub tilt: Option<Vector3<f64>>,
    pub bc: [[Boundary; 2]; 3],
}

impl SimBox {
    pub fn new(bounds: Matrix3x2<f64>, tilt: Option<Vector3<f64>>, bc: [[Boundary; 2]; 3]) -> Self {
        SimBox { bounds, tilt, bc }
    }

    /// Length of box in X dimension
    pub fn lx(&self) -> f64 {
        self.bounds[(0, 1)] - self.bounds[(0, 0)]
    }

    /// Length of box in Y dimension
    pub fn ly(&self) -> f64 {
        self.bounds[(1, 1)] - self.bounds[(1, 0)]
    }

    /// Length of box in Z dimension
    pub fn lz(&self) -> f64 {
        self.bounds[(2, 1)] - self.bounds[(2, 0)]
    }

    /// Length of box in each dimension
    pub fn lengths(&self) -> Vector3<f64> {
        Vector3::new(self.lx(), self.ly(), self.lz())
    }

    /// Center of box in each dimension
    pub fn center(&self) -> Vector3<f64> {
        Vector3::new(
            (self.bounds[(0, 0)] + self.bounds[(0, 1)]) / 2.0,
            (self.bounds[(1, 0)] + self.bounds[(1, 1)]) / 2.0,
            (self.bounds[(2, 0)] + self.bounds[(2, 1)]) / 2.0,
        )
    }

    pub fn is_triclinic(&self) -> bool {
        self.tilt.is_some()
    }

    /// XY tilt factor; zero for orthogonal cells
    pub fn xy(&self) -> f64 {
        self.tilt.map_or(0.0, |tilt| tilt[0])
    }

    /// XZ tilt factor; zero for orthogonal cells
    pub fn xz(&self) -> f64 {
        self.tilt.map_or(0.0, |tilt| tilt[1])
    }

    /// YZ tilt factor; zero for orthogonal cells
    pub fn yz(&self) -> f64 {
        self.tilt.map_or(0.0, |tilt| tilt[2])
    }

    /// Scale every bound by `factor`. Tilt factors and per-atom data are
    /// left untouched.
    pub fn scale_bounds(&mut self, factor: f64) {
        self.bounds *= factor;
    }

    /// Join the boundary codes in dim-grouped format, e.g. `pp pp pp`
    pub fn bc_line(&self) -> String {
        let pairs: Vec<String> = self
            .bc
            .iter()
            .map(|pair| format!("{}{}", pair[0].code(), pair[1].code()))
            .collect();
        pairs.join(" ")
    }
}

impl fmt::Display for SimBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BC: {}", self.bc_line())?;
        writeln!(f, "Size: {} x {} x {}", self.lx(), self.ly(), self.lz())?;
        let center = self.center();
        writeln!(f, "Center: {}, {}, {}", center[0], center[1], center[2])?;
        if let Some(tilt) = self.tilt {
            writeln!(
                f,
                "Tilt factors (xy, xz, yz): {}, {}, {}",
                tilt[0], tilt[1], tilt[2]
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn periodic() -> [[Boundary; 2]; 3] {
        [[Boundary::Periodic; 2]; 3]
    }

    #[test]
    fn boundary_codes() {
        for code in ['p', 'f', 's', 'm'] {
            let boundary = Boundary::from_code(code).unwrap();
            assert_eq!(boundary.code(), code);
        }
        assert!(Boundary::from_code('x').is_none());
    }

    #[test]
    fn lengths_and_center() {
        let sim_box = SimBox::new(
            Matrix3x2::new(0.0, 10.0, -5.0, 5.0, 2.0, 6.0),
            None,
            periodic(),
        );
        assert_approx_eq!(sim_box.lx(), 10.0);
        assert_approx_eq!(sim_box.ly(), 10.0);
        assert_approx_eq!(sim_box.lz(), 4.0);
        assert_eq!(sim_box.lengths(), Vector3::new(10.0, 10.0, 4.0));
        assert_eq!(sim_box.center(), Vector3::new(5.0, 0.0, 4.0));
    }

    #[test]
    fn tilt_accessors() {
        let orthogonal = SimBox::new(Matrix3x2::zeros(), None, periodic());
        assert!(!orthogonal.is_triclinic());
        assert_approx_eq!(orthogonal.xy(), 0.0);

        let tilted = SimBox::new(
            Matrix3x2::zeros(),
            Some(Vector3::new(1.5, 0.5, 0.25)),
            periodic(),
        );
        assert!(tilted.is_triclinic());
        assert_approx_eq!(tilted.xy(), 1.5);
        assert_approx_eq!(tilted.xz(), 0.5);
        assert_approx_eq!(tilted.yz(), 0.25);
    }

    #[test]
    fn scale_bounds_scales_everything() {
        let mut sim_box = SimBox::new(
            Matrix3x2::new(0.0, 10.0, 1.0, 2.0, -4.0, 4.0),
            None,
            periodic(),
        );
        sim_box.scale_bounds(2.0);
        assert_eq!(
            sim_box.bounds,
            Matrix3x2::new(0.0, 20.0, 2.0, 4.0, -8.0, 8.0)
        );
    }

    #[test]
    fn bc_line_format() {
        let bc = [
            [Boundary::Periodic, Boundary::Periodic],
            [Boundary::Fixed, Boundary::Shrink],
            [Boundary::ShrinkMin, Boundary::Periodic],
        ];
        let sim_box = SimBox::new(Matrix3x2::zeros(), None, bc);
        assert_eq!(sim_box.bc_line(), "pp fs mp");
    }

    #[test]
    fn exact_equality() {
        let a = SimBox::new(Matrix3x2::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0), None, periodic());
        let b = a.clone();
        assert_eq!(a, b);

        let mut c = a.clone();
        c.bounds[(0, 1)] += 1e-12;
        assert_ne!(a, c);

        let mut d = a.clone();
        d.tilt = Some(Vector3::zeros());
        assert_ne!(a, d);
    }
}
