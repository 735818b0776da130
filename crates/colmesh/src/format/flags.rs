//! Per-triangle surface classification flags

bitflags::bitflags! {
    /// Classification and surface-type bits carried by every triangle record.
    ///
    /// The low nibble describes what the triangle is (floor, wall, ceiling,
    /// trigger volume); the next nibble describes what it is made of. The
    /// engine itself branches only on `WALKABLE`; the remaining bits pass
    /// through query results for gameplay code (footstep audio, particle
    /// effects, damage volumes).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SurfaceFlags: u16 {
        /// Eligible ground for floor probes
        const WALKABLE = 0x0001;
        /// Steep blocking geometry
        const WALL = 0x0002;
        /// Downward-facing overhead geometry
        const CEILING = 0x0004;
        /// Volume reported to gameplay without blocking movement
        const TRIGGER = 0x0008;

        /// Water surface
        const WATER = 0x0010;
        /// Snow surface
        const SNOW = 0x0020;
        /// Wooden surface
        const WOOD = 0x0040;
        /// Cement or stone surface
        const CEMENT = 0x0080;
    }
}

impl SurfaceFlags {
    /// Look up a surface-type flag by its asset-pipeline name.
    ///
    /// Names match the keys accepted in surface sidecar files. Returns
    /// `None` for anything that is not a material family (geometry
    /// classification is derived from normals, never named).
    pub fn from_surface_name(name: &str) -> Option<Self> {
        match name {
            "water" => Some(Self::WATER),
            "snow" => Some(Self::SNOW),
            "wood" => Some(Self::WOOD),
            "cement" => Some(Self::CEMENT),
            _ => None,
        }
    }
}
