/// Initialization parameters for a [`Device`](super::Device).
///
/// The device cannot query the host surface itself; the extent given here
/// seeds the default target and the base of the viewport register. Call
/// [`Device::resize`](super::Device::resize) when the host surface changes.
#[derive(Debug, Clone)]
pub struct DeviceInit {
    /// Default surface width in physical pixels.
    pub width: u32,

    /// Default surface height in physical pixels.
    pub height: u32,
}

impl Default for DeviceInit {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}
