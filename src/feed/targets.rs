/// Maps card index to whatever handle the rendering side uses to scroll a
/// card into view. Handles are opaque to the feed.
#[derive(Debug, Clone)]
pub struct TargetArena<H> {
    slots: Vec<Option<H>>,
}

impl<H> Default for TargetArena<H> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<H: Copy> TargetArena<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, index: usize, handle: H) {
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        self.slots[index] = Some(handle);
    }

    pub fn get(&self, index: usize) -> Option<H> {
        self.slots.get(index).copied().flatten()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
