use kurbo::Size;

/// Capability probes reported by the embedding environment.
///
/// Every probe is optional; a missing probe never counts as "low-end".
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeviceProfile {
    /// Logical CPU cores.
    pub hardware_concurrency: Option<u32>,
    /// Approximate device memory in GB.
    pub device_memory_gb: Option<f64>,
    /// Device pixels per CSS pixel.
    pub pixel_ratio: Option<f64>,
}

/// Thresholds deciding when the particle field degrades.
///
/// Defaults mirror the heuristics the product shipped with; they are tunable, not a contract.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DegradationPolicy {
    /// Devices reporting at most this many cores are low-end.
    pub max_low_end_cores: u32,
    /// Devices reporting at most this much memory (GB) are low-end.
    pub max_low_end_memory_gb: f64,
    /// Particle count ceiling on low-end devices.
    pub low_end_particle_cap: u32,
    /// Low-end devices simulate only every Nth frame.
    pub low_end_frame_skip: u32,
    /// Pixel ratio ceiling on low-end devices.
    pub low_end_pixel_ratio_cap: f64,
    /// Pixel ratio ceiling otherwise.
    pub pixel_ratio_cap: f64,
}

impl Default for DegradationPolicy {
    fn default() -> Self {
        Self {
            max_low_end_cores: 4,
            max_low_end_memory_gb: 4.0,
            low_end_particle_cap: 50,
            low_end_frame_skip: 2,
            low_end_pixel_ratio_cap: 1.0,
            pixel_ratio_cap: 2.0,
        }
    }
}

impl DegradationPolicy {
    /// Defaults overridden by `BIOFX_LOW_END_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn positive<T: std::str::FromStr + PartialOrd + Default>(raw: Option<String>) -> Option<T> {
            raw.and_then(|v| v.trim().parse::<T>().ok())
                .filter(|v| *v > T::default())
        }

        let d = Self::default();
        Self {
            max_low_end_cores: positive(lookup("BIOFX_LOW_END_MAX_CORES"))
                .unwrap_or(d.max_low_end_cores),
            max_low_end_memory_gb: positive(lookup("BIOFX_LOW_END_MAX_MEMORY_GB"))
                .unwrap_or(d.max_low_end_memory_gb),
            low_end_particle_cap: positive(lookup("BIOFX_LOW_END_PARTICLE_CAP"))
                .unwrap_or(d.low_end_particle_cap),
            low_end_frame_skip: positive(lookup("BIOFX_LOW_END_FRAME_SKIP"))
                .unwrap_or(d.low_end_frame_skip),
            ..d
        }
    }

    /// Whether `device` reports constrained cores or memory.
    pub fn is_low_end(&self, device: &DeviceProfile) -> bool {
        let cores = device
            .hardware_concurrency
            .is_some_and(|c| c <= self.max_low_end_cores);
        let memory = device
            .device_memory_gb
            .is_some_and(|m| m.is_finite() && m <= self.max_low_end_memory_gb);
        cores || memory
    }

    /// Particle count after the low-end cap.
    pub fn effective_particle_count(&self, requested: u32, device: &DeviceProfile) -> u32 {
        if self.is_low_end(device) {
            requested.min(self.low_end_particle_cap)
        } else {
            requested
        }
    }

    /// Simulate one frame out of this many.
    pub fn frame_skip(&self, device: &DeviceProfile) -> u32 {
        if self.is_low_end(device) {
            self.low_end_frame_skip.max(1)
        } else {
            1
        }
    }

    /// Effective device pixel ratio for rasterization.
    pub fn pixel_ratio(&self, device: &DeviceProfile) -> f64 {
        let reported = device
            .pixel_ratio
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(1.0);
        let cap = if self.is_low_end(device) {
            self.low_end_pixel_ratio_cap
        } else {
            self.pixel_ratio_cap
        };
        reported.min(cap.max(1.0))
    }
}

/// Construction-time options for an effect renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct RendererOptions {
    /// Capability probes.
    pub device: DeviceProfile,
    /// Degradation thresholds.
    pub degradation: DegradationPolicy,
    /// Seed for the simulations; entropy-seeded when absent.
    pub seed: Option<u64>,
    /// Enables card drag repositioning (editor preview).
    pub editable: bool,
    /// Laid-out card size in CSS pixels.
    pub card_size: Size,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            device: DeviceProfile::default(),
            degradation: DegradationPolicy::default(),
            seed: None,
            editable: false,
            card_size: Size::new(384.0, 320.0),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/device.rs"]
mod tests;
