//! Photon population manager
//!
//! Each frame every live photon is stepped from its own pre-frame state with
//! the same `dt` and settings. Photons at or past the escape cutoff are then
//! frozen into trails. The population never drops to zero: if every photon
//! escapes in the same frame a fresh one is spawned at the origin.

use crate::Settings;
use photon_physics::{step, Photon, PhotonId, Trail, MAX_PHOTONS};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Outcome of one [`PhotonSimulation::reap`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReapReport {
    /// Photons retired into trails
    pub retired: usize,
    /// Whether a replacement photon was spawned to keep the population alive
    pub respawned: bool,
}

/// Live photons plus the trails of the ones that got away
pub struct PhotonSimulation {
    photons: Vec<Photon>,
    trails: Vec<Trail>,
    next_id: PhotonId,
    paused: bool,
    rng: StdRng,
}

impl PhotonSimulation {
    /// New simulation with a single photon, seeded from the OS
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// New simulation with a reproducible random stream
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut simulation = Self {
            photons: Vec::with_capacity(MAX_PHOTONS),
            trails: Vec::new(),
            next_id: 0,
            paused: false,
            rng,
        };
        let photon = simulation.spawn();
        simulation.photons.push(photon);
        simulation
    }

    fn spawn(&mut self) -> Photon {
        let id = self.next_id;
        self.next_id += 1;
        Photon::spawn(id, &mut self.rng)
    }

    /// Advance every live photon by `dt`. Does nothing while paused.
    pub fn tick(&mut self, settings: &Settings, dt: f32) {
        if self.paused {
            return;
        }
        self.advance_all(settings, dt);
    }

    fn advance_all(&mut self, settings: &Settings, dt: f32) {
        let params = settings.walk_params();
        let rng = &mut self.rng;
        self.photons = self
            .photons
            .iter()
            .map(|photon| step(photon, params, dt, rng))
            .collect();
    }

    /// Retire escaped photons into trails and keep at least one photon alive
    pub fn reap(&mut self) -> ReapReport {
        let (escaped, active): (Vec<Photon>, Vec<Photon>) = std::mem::take(&mut self.photons)
            .into_iter()
            .partition(Photon::has_escaped);

        for photon in &escaped {
            log::debug!(
                "Photon {} escaped at {:.2} with {} path points",
                photon.id,
                photon.distance_from_center,
                photon.path.len()
            );
            self.trails.push(Trail::from_photon(photon));
        }

        self.photons = active;

        let respawned = self.photons.is_empty();
        if respawned {
            let photon = self.spawn();
            log::debug!("Population empty, respawned photon {}", photon.id);
            self.photons.push(photon);
        }

        ReapReport {
            retired: escaped.len(),
            respawned,
        }
    }

    /// One frame: tick then reap. Does nothing while paused.
    pub fn update(&mut self, settings: &Settings, dt: f32) -> ReapReport {
        if self.paused {
            return ReapReport::default();
        }
        self.advance_all(settings, dt);
        self.reap()
    }

    /// One frame regardless of the pause gate, for single-stepping
    pub fn step_frame(&mut self, settings: &Settings, dt: f32) -> ReapReport {
        self.advance_all(settings, dt);
        self.reap()
    }

    /// Add a photon at the origin. Returns `None` when already at capacity.
    pub fn add_photon(&mut self) -> Option<PhotonId> {
        if self.photons.len() >= MAX_PHOTONS {
            log::debug!("Photon limit of {} reached, not adding", MAX_PHOTONS);
            return None;
        }

        let photon = self.spawn();
        let id = photon.id;
        self.photons.push(photon);
        log::debug!("Added photon {} ({} live)", id, self.photons.len());
        Some(id)
    }

    /// Back to a single fresh photon with no trails. Ids keep counting up.
    pub fn reset(&mut self) {
        self.trails.clear();
        self.photons.clear();
        let photon = self.spawn();
        self.photons.push(photon);
        log::info!("Simulation reset");
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Live photons
    pub fn photons(&self) -> &[Photon] {
        &self.photons
    }

    /// Retired trails, oldest first
    pub fn trails(&self) -> &[Trail] {
        &self.trails
    }

    pub fn photon_count(&self) -> usize {
        self.photons.len()
    }

    pub fn trail_count(&self) -> usize {
        self.trails.len()
    }

    #[cfg(test)]
    fn photons_mut(&mut self) -> &mut Vec<Photon> {
        &mut self.photons
    }
}

impl Default for PhotonSimulation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use photon_physics::{ESCAPE_CUTOFF, SPHERE_RADIUS};

    const DT: f32 = 1.0 / 60.0;

    fn fast_settings() -> Settings {
        Settings {
            photon_speed: 10.8,
            step_distance: 3.2,
            ..Default::default()
        }
    }

    fn escaped_photon(id: PhotonId) -> Photon {
        let mut photon = Photon::new(id, Vec3::new(ESCAPE_CUTOFF + 0.1, 0.0, 0.0), Vec3::X);
        photon.is_outside = true;
        photon
    }

    #[test]
    fn test_starts_with_one_photon() {
        let sim = PhotonSimulation::with_seed(0);
        assert_eq!(sim.photon_count(), 1);
        assert_eq!(sim.trail_count(), 0);
        assert_eq!(sim.photons()[0].path.len(), 2);
    }

    #[test]
    fn test_add_photon_respects_capacity() {
        let mut sim = PhotonSimulation::with_seed(0);
        for _ in 1..MAX_PHOTONS {
            assert!(sim.add_photon().is_some());
        }
        assert_eq!(sim.photon_count(), MAX_PHOTONS);

        assert_eq!(sim.add_photon(), None);
        assert_eq!(sim.photon_count(), MAX_PHOTONS);
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut sim = PhotonSimulation::with_seed(0);
        let a = sim.add_photon().unwrap();
        let b = sim.add_photon().unwrap();
        assert!(b > a);

        sim.reset();
        let after_reset = sim.photons()[0].id;
        assert!(after_reset > b);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut sim = PhotonSimulation::with_seed(0);
        sim.add_photon();
        sim.add_photon();
        sim.photons_mut().push(escaped_photon(100));
        sim.reap();
        assert_eq!(sim.trail_count(), 1);

        sim.reset();
        assert_eq!(sim.photon_count(), 1);
        assert_eq!(sim.photons()[0].path.len(), 2);
        assert_eq!(sim.trail_count(), 0);
    }

    #[test]
    fn test_reap_last_photon_respawns() {
        let mut sim = PhotonSimulation::with_seed(0);
        *sim.photons_mut() = vec![escaped_photon(7)];

        let report = sim.reap();

        assert_eq!(report.retired, 1);
        assert!(report.respawned);
        assert_eq!(sim.trail_count(), 1);
        assert_eq!(sim.trails()[0].id(), 7);
        assert_eq!(sim.photon_count(), 1);
        assert_ne!(sim.photons()[0].id, 7);
        assert_eq!(sim.photons()[0].position, Vec3::ZERO);
    }

    #[test]
    fn test_reap_keeps_active_photons() {
        let mut sim = PhotonSimulation::with_seed(0);
        sim.photons_mut().push(escaped_photon(50));
        sim.photons_mut().push(escaped_photon(51));

        let report = sim.reap();

        assert_eq!(report.retired, 2);
        assert!(!report.respawned);
        assert_eq!(sim.photon_count(), 1);
        let ids: Vec<_> = sim.trails().iter().map(Trail::id).collect();
        assert_eq!(ids, vec![50, 51]);
    }

    #[test]
    fn test_reap_pads_degenerate_paths() {
        let mut sim = PhotonSimulation::with_seed(0);
        let mut photon = escaped_photon(8);
        photon.path.clear();
        let position = photon.position;
        *sim.photons_mut() = vec![photon];

        sim.reap();

        assert_eq!(sim.trails()[0].path(), &[position, position]);
    }

    #[test]
    fn test_pause_freezes_state() {
        let mut sim = PhotonSimulation::with_seed(3);
        let settings = fast_settings();
        sim.update(&settings, DT);

        sim.pause();
        let before = sim.photons().to_vec();
        for _ in 0..100 {
            sim.update(&settings, DT);
            sim.tick(&settings, DT);
        }
        assert_eq!(sim.photons(), before.as_slice());

        sim.resume();
        sim.update(&settings, DT);
        assert!(!sim.is_paused());
    }

    #[test]
    fn test_step_frame_ignores_pause() {
        let mut sim = PhotonSimulation::with_seed(3);
        *sim.photons_mut() = vec![Photon::new(0, Vec3::ZERO, Vec3::X)];
        sim.pause();

        sim.step_frame(&Settings::default(), 0.5);

        assert!(sim.is_paused());
        assert_ne!(sim.photons()[0].position, Vec3::ZERO);
    }

    #[test]
    fn test_toggle_pause() {
        let mut sim = PhotonSimulation::with_seed(0);
        sim.toggle_pause();
        assert!(sim.is_paused());
        sim.toggle_pause();
        assert!(!sim.is_paused());
    }

    #[test]
    fn test_long_run_invariants() {
        let mut sim = PhotonSimulation::with_seed(11);
        let settings = fast_settings();
        for _ in 1..MAX_PHOTONS {
            sim.add_photon();
        }

        let mut frozen: Vec<Trail> = Vec::new();
        let mut outside: std::collections::HashSet<PhotonId> = Default::default();

        for _ in 0..5_000 {
            sim.update(&settings, DT);

            assert!(sim.photon_count() >= 1);
            assert!(sim.photon_count() <= MAX_PHOTONS);

            for photon in sim.photons() {
                assert!(photon.path.len() >= 2);
                assert!(!photon.has_escaped());
                if outside.contains(&photon.id) {
                    assert!(photon.is_outside);
                }
                if photon.is_outside {
                    outside.insert(photon.id);
                } else {
                    assert!(photon.distance_from_center < SPHERE_RADIUS);
                }
            }

            // Earlier trails never change and each id retires once
            assert_eq!(&sim.trails()[..frozen.len()], frozen.as_slice());
            frozen = sim.trails().to_vec();
            for trail in sim.trails() {
                assert!(trail.path().len() >= 2);
                assert!(sim.photons().iter().all(|p| p.id != trail.id()));
            }
        }

        let mut ids: Vec<_> = sim.trails().iter().map(Trail::id).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert!(total > 0);
    }
}
