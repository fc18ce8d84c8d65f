use super::bemt_error::BemtError;
use super::blade_section::{BladeSection, Mode, SectionState};
use crate::Airfoils::polar::Airfoil;
use std::f64::consts::PI;
use std::sync::Arc;

/// Rotor-level data every blade section needs: blade count, tip and hub radius, mode.
/// Sections receive it by reference from the owning [`Rotor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotorGeometry {
    pub n_blades: usize,
    pub diameter: f64,
    pub radius_hub: f64,
    /// tip radius, `diameter/2`
    pub blade_radius: f64,
    /// swept area, `π·blade_radius²`
    pub area: f64,
    pub mode: Mode,
}

impl RotorGeometry {
    pub fn new(n_blades: usize, diameter: f64, radius_hub: f64, mode: Mode) -> Self {
        let mut geometry = Self {
            n_blades,
            diameter,
            radius_hub,
            blade_radius: 0.0,
            area: 0.0,
            mode,
        };
        geometry.precalc();
        geometry
    }

    pub fn precalc(&mut self) {
        self.blade_radius = 0.5 * self.diameter;
        self.area = PI * self.blade_radius.powi(2);
    }
}

/// Input for one blade section. Pitch in degrees, lengths in metres.
#[derive(Debug, Clone)]
pub struct SectionSpec {
    pub airfoil: Arc<Airfoil>,
    pub radius: f64,
    pub width: f64,
    pub pitch_deg: f64,
    pub chord: f64,
}

/// A rotor (propeller or turbine): geometry plus its ordered blade sections.
#[derive(Debug, Clone)]
pub struct Rotor {
    pub geometry: RotorGeometry,
    pub sections: Vec<BladeSection>,
    /// configured pitch of every section [deg]; collective pitch changes are applied on top of it
    pub design_pitch: Vec<f64>,
    /// result of the most recent solve, one record per section
    last_states: Vec<SectionState>,
}

impl Rotor {
    pub fn new(
        n_blades: usize,
        diameter: f64,
        radius_hub: f64,
        mode: Mode,
        specs: Vec<SectionSpec>,
    ) -> Result<Self, BemtError> {
        if n_blades < 1 {
            return Err(BemtError::invalid("nblades", "a rotor needs at least one blade"));
        }
        if !(diameter.is_finite() && diameter > 0.0) {
            return Err(BemtError::invalid("diameter", format!("must be > 0, got {}", diameter)));
        }
        let geometry = RotorGeometry::new(n_blades, diameter, radius_hub, mode);
        if !(radius_hub >= 0.0 && radius_hub < geometry.blade_radius) {
            return Err(BemtError::invalid(
                "radius_hub",
                format!(
                    "must satisfy 0 <= radius_hub < {}, got {}",
                    geometry.blade_radius, radius_hub
                ),
            ));
        }
        if specs.is_empty() {
            return Err(BemtError::invalid("radius", "a rotor needs at least one section"));
        }
        for (i, spec) in specs.iter().enumerate() {
            if !(spec.radius > 0.0
                && spec.radius >= radius_hub
                && spec.radius <= geometry.blade_radius)
            {
                return Err(BemtError::invalid(
                    "radius",
                    format!(
                        "section {}: radius {} outside [{}, {}]",
                        i, spec.radius, radius_hub, geometry.blade_radius
                    ),
                ));
            }
            if !(spec.chord.is_finite() && spec.chord > 0.0) {
                return Err(BemtError::invalid(
                    "chord",
                    format!("section {}: chord must be > 0, got {}", i, spec.chord),
                ));
            }
            if !(spec.width.is_finite() && spec.width > 0.0) {
                return Err(BemtError::invalid(
                    "dr",
                    format!("section {}: width must be > 0, got {}", i, spec.width),
                ));
            }
            if !spec.pitch_deg.is_finite() {
                return Err(BemtError::invalid(
                    "pitch",
                    format!("section {}: pitch is not finite", i),
                ));
            }
        }
        if specs.windows(2).any(|w| w[1].radius <= w[0].radius) {
            return Err(BemtError::invalid(
                "radius",
                "section radii must be strictly increasing",
            ));
        }

        let design_pitch = specs.iter().map(|s| s.pitch_deg).collect();
        let sections = specs
            .into_iter()
            .map(|s| {
                BladeSection::new(
                    s.airfoil,
                    s.radius,
                    s.width,
                    s.pitch_deg.to_radians(),
                    s.chord,
                    &geometry,
                )
            })
            .collect();
        Ok(Self {
            geometry,
            sections,
            design_pitch,
            last_states: Vec::new(),
        })
    }

    /// Re-derives tip radius, swept area and section solidities.
    pub fn precalc(&mut self) {
        self.geometry.precalc();
        for section in self.sections.iter_mut() {
            section.precalc(&self.geometry);
        }
    }

    pub fn set_diameter(&mut self, diameter: f64) {
        self.geometry.diameter = diameter;
        self.precalc();
    }

    pub fn diameter(&self) -> f64 {
        self.geometry.diameter
    }

    pub fn blade_radius(&self) -> f64 {
        self.geometry.blade_radius
    }

    pub fn area(&self) -> f64 {
        self.geometry.area
    }

    pub fn mode(&self) -> Mode {
        self.geometry.mode
    }

    pub fn n_sections(&self) -> usize {
        self.sections.len()
    }

    /// Sets every section's pitch [deg] and makes it the new design pitch.
    pub fn set_pitch_deg(&mut self, pitch_deg: &[f64]) {
        for (section, &pitch) in self.sections.iter_mut().zip(pitch_deg) {
            section.pitch = pitch.to_radians();
        }
        for (design, &pitch) in self.design_pitch.iter_mut().zip(pitch_deg) {
            *design = pitch;
        }
    }

    /// Pitch of every section set to its design pitch plus `offset_deg`.
    pub fn set_collective_pitch(&mut self, offset_deg: f64) {
        for (section, design) in self.sections.iter_mut().zip(&self.design_pitch) {
            section.pitch = (design + offset_deg).to_radians();
        }
    }

    pub fn pitch_deg(&self) -> Vec<f64> {
        self.sections.iter().map(|s| s.pitch.to_degrees()).collect()
    }

    /// Replaces the reporting cache with the records of the latest solve.
    pub fn record_states(&mut self, states: &[SectionState]) {
        self.last_states = states.to_vec();
    }

    pub fn last_states(&self) -> &[SectionState] {
        &self.last_states
    }

    /// Per-section table of the most recent solve. Sections without a record report zeros.
    pub fn sections_summary(&self) -> SectionsSummary {
        let rows = self
            .sections
            .iter()
            .enumerate()
            .map(|(i, section)| {
                let state = self.last_states.get(i).copied().unwrap_or_default();
                SectionRow {
                    radius: section.radius,
                    chord: section.chord,
                    pitch: section.pitch.to_degrees(),
                    Cl: state.Cl,
                    Cd: state.Cd,
                    dT: state.dT,
                    dQ: state.dQ,
                    F: state.F,
                    a: state.a,
                    ap: state.ap,
                    Re: state.Re,
                }
            })
            .collect();
        SectionsSummary { rows }
    }
}

/// One row of [`SectionsSummary`]. Pitch in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionRow {
    pub radius: f64,
    pub chord: f64,
    pub pitch: f64,
    pub Cl: f64,
    pub Cd: f64,
    pub dT: f64,
    pub dQ: f64,
    pub F: f64,
    pub a: f64,
    pub ap: f64,
    pub Re: f64,
}

impl SectionRow {
    pub fn values(&self) -> [f64; 11] {
        [
            self.radius,
            self.chord,
            self.pitch,
            self.Cl,
            self.Cd,
            self.dT,
            self.dQ,
            self.F,
            self.a,
            self.ap,
            self.Re,
        ]
    }
}

/// Read-only per-section table of a rotor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SectionsSummary {
    pub rows: Vec<SectionRow>,
}

impl SectionsSummary {
    pub const COLUMNS: [&'static str; 11] = [
        "radius", "chord", "pitch", "Cl", "Cd", "dT", "dQ", "F", "a", "ap", "Re",
    ];

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let j = Self::COLUMNS.iter().position(|c| *c == name)?;
        Some(self.rows.iter().map(|row| row.values()[j]).collect())
    }

    pub fn to_csv(&self) -> String {
        let mut csv = Self::COLUMNS.join(",");
        csv.push('\n');
        for row in &self.rows {
            let line: Vec<String> = row.values().iter().map(|v| v.to_string()).collect();
            csv.push_str(&line.join(","));
            csv.push('\n');
        }
        csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Airfoils::polar::ConstantPolar;
    use approx::assert_relative_eq;

    fn specs(radii: &[f64]) -> Vec<SectionSpec> {
        let airfoil = Arc::new(Airfoil::from(ConstantPolar::new(0.5, 0.02)));
        radii
            .iter()
            .map(|&r| SectionSpec {
                airfoil: airfoil.clone(),
                radius: r,
                width: 0.05,
                pitch_deg: 10.0,
                chord: 0.05,
            })
            .collect()
    }

    #[test]
    fn derived_geometry() {
        let rotor = Rotor::new(3, 2.0, 0.1, Mode::Propeller, specs(&[0.3, 0.6, 0.9])).unwrap();
        assert_eq!(rotor.blade_radius(), 1.0);
        assert_relative_eq!(rotor.area(), PI, epsilon = 1e-15);
        assert_relative_eq!(rotor.sections[0].sigma, 3.0 * 0.05 / (2.0 * PI * 0.3));
    }

    #[test]
    fn precalc_follows_diameter_change() {
        let mut rotor = Rotor::new(2, 2.0, 0.1, Mode::Propeller, specs(&[0.3, 0.6])).unwrap();
        rotor.set_diameter(4.0);
        assert_eq!(rotor.blade_radius(), 2.0);
        assert_relative_eq!(rotor.area(), 4.0 * PI, epsilon = 1e-12);
    }

    #[test]
    fn rejects_invalid_geometry() {
        let bad = |n, d, hub, radii: &[f64]| Rotor::new(n, d, hub, Mode::Propeller, specs(radii));
        assert!(bad(0, 1.0, 0.1, &[0.3]).is_err());
        assert!(bad(2, 0.0, 0.1, &[0.3]).is_err());
        assert!(bad(2, 1.0, 0.5, &[0.3]).is_err());
        assert!(bad(2, 1.0, 0.1, &[0.6]).is_err());
        assert!(bad(2, 1.0, 0.1, &[0.05]).is_err());
        assert!(bad(2, 1.0, 0.1, &[0.3, 0.3]).is_err());
        assert!(bad(2, 1.0, 0.1, &[]).is_err());
        match bad(2, 1.0, 0.1, &[0.4, 0.2]) {
            Err(BemtError::InvalidConfig { field, .. }) => assert_eq!(field, "radius"),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn pitch_updates() {
        let mut rotor = Rotor::new(2, 1.0, 0.1, Mode::Propeller, specs(&[0.2, 0.4])).unwrap();
        rotor.set_collective_pitch(5.0);
        assert_relative_eq!(rotor.pitch_deg()[1], 15.0, epsilon = 1e-12);
        assert_eq!(rotor.design_pitch, vec![10.0, 10.0]);
        rotor.set_pitch_deg(&[3.0, 4.0]);
        assert_eq!(rotor.design_pitch, vec![3.0, 4.0]);
        rotor.set_collective_pitch(1.0);
        assert_relative_eq!(rotor.pitch_deg()[0], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn summary_before_and_after_recording() {
        let mut rotor = Rotor::new(2, 1.0, 0.1, Mode::Propeller, specs(&[0.2, 0.4])).unwrap();
        let summary = rotor.sections_summary();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary.column("dT").unwrap(), vec![0.0, 0.0]);

        let state = SectionState {
            dT: 3.0,
            Re: 1.0e5,
            ..Default::default()
        };
        rotor.record_states(&[state, state]);
        let summary = rotor.sections_summary();
        assert_eq!(summary.column("dT").unwrap(), vec![3.0, 3.0]);
        assert_eq!(summary.column("radius").unwrap(), vec![0.2, 0.4]);
        assert!(summary.column("thrust").is_none());
        let csv = summary.to_csv();
        assert!(csv.starts_with("radius,chord,pitch,Cl,Cd,dT,dQ,F,a,ap,Re\n"));
        assert_eq!(csv.lines().count(), 3);
    }
}
