use rand_core::RngCore;

const PROFILE_IMAGE_COUNT: usize = 4;

/// Profile images handed out to sessions as they are fetched. The choice is
/// cosmetic and not stable across runs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AvatarPool {
    images: Vec<String>,
}

impl AvatarPool {
    pub fn from_assets_base(assets_base: &str) -> Self {
        let base = assets_base.trim_end_matches('/');
        let images = (1..=PROFILE_IMAGE_COUNT)
            .map(|index| format!("{base}/Images/Profile{index}.png"))
            .collect();
        Self { images }
    }

    #[cfg(test)]
    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Uniform pick; `PROFILE_IMAGE_COUNT` divides 2^32 so the modulo is unbiased.
    pub fn pick<R: RngCore + ?Sized>(&self, rng: &mut R) -> String {
        let index = rng.next_u32() as usize % self.images.len();
        self.images[index].clone()
    }

    pub fn index_of(&self, image: &str) -> Option<usize> {
        self.images.iter().position(|candidate| candidate == image)
    }
}

/// Deterministic [`RngCore`] that replays a fixed sequence; used in tests.
#[cfg(test)]
pub struct SequenceRng {
    values: Vec<u32>,
    next: usize,
}

#[cfg(test)]
impl SequenceRng {
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, next: 0 }
    }
}

#[cfg(test)]
impl RngCore for SequenceRng {
    fn next_u32(&mut self) -> u32 {
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }

    fn next_u64(&mut self) -> u64 {
        u64::from(self.next_u32())
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand_core::impls::fill_bytes_via_next(self, dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
