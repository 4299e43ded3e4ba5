//! Generation-stamped cache of uploaded page textures.

use std::ops::RangeInclusive;

use egui::TextureHandle;

#[derive(Default)]
struct Slot {
    texture: Option<TextureHandle>,
    stamp: u64,
}

/// Per-page texture slots guarded by a global reload counter.
///
/// A slot is current iff its stamp equals the cache generation. The
/// generation increments on zoom changes, window resizes and document
/// reloads, never on scrolling, so a full invalidation is one integer
/// bump instead of a cache clear.
pub struct PageCache {
    slots: Vec<Slot>,
    generation: u64,
}

impl PageCache {
    /// Empty slots for every page of a freshly opened document.
    #[must_use]
    pub fn new(page_count: usize) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(page_count, Slot::default);
        Self {
            slots,
            generation: 1,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True if the page has been reconciled since the last invalidation.
    #[must_use]
    pub fn is_current(&self, page: usize) -> bool {
        self.slots
            .get(page)
            .is_some_and(|slot| slot.stamp == self.generation)
    }

    /// The displayable texture for a page, if one has ever been uploaded.
    #[must_use]
    pub fn texture(&self, page: usize) -> Option<&TextureHandle> {
        self.slots.get(page)?.texture.as_ref()
    }

    /// Bring every in-range, in-bounds page up to the current generation.
    ///
    /// `render` returns the freshly uploaded texture, or `None` when the
    /// page could not be rasterized. Slots are stamped before rendering:
    /// a failed page keeps its previous texture and is not retried until
    /// the next invalidation. Pages outside the range are left untouched,
    /// so per-frame cost stays proportional to the visible range.
    pub fn ensure_visible<F>(&mut self, range: RangeInclusive<usize>, mut render: F)
    where
        F: FnMut(usize) -> Option<TextureHandle>,
    {
        for page in range {
            let Some(slot) = self.slots.get_mut(page) else {
                continue;
            };
            if slot.stamp == self.generation {
                continue;
            }

            slot.stamp = self.generation;
            if let Some(texture) = render(page) {
                // Replacing the handle drops the previous texture.
                slot.texture = Some(texture);
            }
        }
    }

    /// Mark every slot stale. Resolved lazily by `ensure_visible`.
    pub fn invalidate_all(&mut self) {
        self.generation += 1;
    }

    /// Drop all slots and their textures and start over for a reloaded
    /// document. A reload invalidates every rendered pixel size, so the
    /// generation advances too.
    pub fn reset(&mut self, page_count: usize) {
        self.slots.clear();
        self.slots.resize_with(page_count, Slot::default);
        self.generation += 1;
    }
}
